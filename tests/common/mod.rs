//! Shared mock instances for integration and load testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use failover_balancer::Envelope;

#[allow(dead_code)]
pub type TestEnvelope = Envelope<u32, String>;

/// Start an instance that answers `"<name>:<payload>"` after `delay`.
#[allow(dead_code)]
pub fn start_responsive_instance(name: &'static str, delay: Duration) -> mpsc::Sender<TestEnvelope> {
    start_counting_instance(name, delay, Arc::new(AtomicUsize::new(0)))
}

/// Like `start_responsive_instance`, counting every envelope it receives.
#[allow(dead_code)]
pub fn start_counting_instance(
    name: &'static str,
    delay: Duration,
    received: Arc<AtomicUsize>,
) -> mpsc::Sender<TestEnvelope> {
    let (tx, mut rx) = mpsc::channel::<TestEnvelope>(16);
    tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            received.fetch_add(1, Ordering::SeqCst);
            // Serve concurrently so queued envelopes do not stack their delays
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let reply = format!("{}:{}", name, envelope.payload);
                envelope.reply(reply);
            });
        }
    });
    tx
}

/// Start an instance that has stopped consuming: its inbox stays open, nothing is read.
#[allow(dead_code)]
pub fn start_stuck_instance(capacity: usize) -> (mpsc::Sender<TestEnvelope>, mpsc::Receiver<TestEnvelope>) {
    mpsc::channel(capacity)
}

/// Start an instance that reads envelopes and counts them but never replies.
#[allow(dead_code)]
pub fn start_silent_instance(received: Arc<AtomicUsize>) -> mpsc::Sender<TestEnvelope> {
    let (tx, mut rx) = mpsc::channel::<TestEnvelope>(16);
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Some(envelope) = rx.recv().await {
            received.fetch_add(1, Ordering::SeqCst);
            held.push(envelope);
        }
    });
    tx
}
