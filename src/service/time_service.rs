//! A service instance that sleeps for a while and replies with the current time.

use std::time::{Duration, SystemTime};
use rand::Rng;
use tokio::sync::{broadcast, mpsc, oneshot};
use crate::dispatch::Envelope;

/// Envelope type understood by the time service. The payload carries nothing.
pub type TimeEnvelope = Envelope<(), SystemTime>;

/// One time service instance.
pub struct TimeService {
    inbox: mpsc::Receiver<TimeEnvelope>,
    avg_response: Duration,
    kill: oneshot::Receiver<()>,
    shutdown: broadcast::Receiver<()>,
}

impl TimeService {
    pub fn new(
        inbox: mpsc::Receiver<TimeEnvelope>,
        avg_response: Duration,
        kill: oneshot::Receiver<()>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            inbox,
            avg_response,
            kill,
            shutdown,
        }
    }

    /// Serve requests until killed or shut down.
    ///
    /// A killed service keeps holding its inbox so senders see silence
    /// rather than a closed channel.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = &mut self.kill => {
                    tracing::debug!("Time service killed, no longer consuming");
                    let _ = self.shutdown.recv().await;
                    return;
                }
                _ = self.shutdown.recv() => return,
                envelope = self.inbox.recv() => {
                    let Some(envelope) = envelope else { return };
                    tokio::time::sleep(self.processing_time()).await;
                    if !envelope.reply(SystemTime::now()) {
                        tracing::trace!("Reply discarded, requester gave up");
                    }
                }
            }
        }
    }

    /// `avg_response + 1s - rand[0, 1)s`, truncated to whole seconds.
    fn processing_time(&self) -> Duration {
        let jitter: f64 = rand::thread_rng().gen();
        let secs = (self.avg_response.as_secs_f64() + 1.0 - jitter).max(0.0).trunc();
        Duration::from_secs(secs as u64)
    }
}
