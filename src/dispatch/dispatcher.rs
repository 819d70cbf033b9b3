//! The dispatcher and its per-request retry loop.

use std::collections::HashSet;
use std::sync::Arc;
use arc_swap::ArcSwap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::dispatch::envelope::{Envelope, Reply};
use crate::dispatch::error::DispatchError;
use crate::dispatch::LoadBalancer;
use crate::load_balancer::{InstanceId, Registry, SelectError, SelectedInstance};
use crate::observability::metrics::{self, Outcome};
use crate::resilience::timeouts::forward;

/// Routes requests to registered instances, failing over on unresponsive ones.
pub struct Dispatcher<P, R> {
    registry: Arc<Registry<Envelope<P, R>>>,
    timings: Arc<ArcSwap<DispatchConfig>>,
}

impl<P, R> Clone for Dispatcher<P, R> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            timings: self.timings.clone(),
        }
    }
}

impl<P, R> Dispatcher<P, R>
where
    P: Clone + Send + 'static,
    R: Send + 'static,
{
    pub fn new(timings: DispatchConfig) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            timings: Arc::new(ArcSwap::from_pointee(timings)),
        }
    }

    pub fn registry(&self) -> &Registry<Envelope<P, R>> {
        &self.registry
    }

    /// Timings in effect for the next attempt.
    pub fn timings(&self) -> DispatchConfig {
        **self.timings.load()
    }

    /// Swap in new timings. In-flight retry loops pick them up on their next attempt.
    pub fn update_timings(&self, timings: DispatchConfig) {
        tracing::info!(
            response_timeout_ms = timings.response_timeout_ms,
            disable_interval_ms = timings.disable_interval_ms,
            "Dispatch timings updated"
        );
        self.timings.store(Arc::new(timings));
    }

    pub fn register_instance(&self, inbox: mpsc::Sender<Envelope<P, R>>) -> InstanceId {
        self.registry.register_instance(inbox)
    }

    /// Submit a request. Returns at once with a channel that receives one reply.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime while an instance is
    /// eligible, since the retry loop is spawned onto the current runtime.
    pub fn request(&self, payload: P) -> oneshot::Receiver<Reply<R>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        match self.registry.next_alive() {
            Ok(first) => {
                tracing::debug!(request_id = %request_id, instance = %first.id, "Dispatching request");
                let retry = RetryLoop {
                    request_id,
                    started,
                    registry: self.registry.clone(),
                    timings: self.timings.clone(),
                    tried: HashSet::new(),
                };
                tokio::spawn(retry.run(first, payload, reply_tx));
            }
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = %err, "Rejecting request");
                metrics::record_request(Outcome::NoAlive, started);
                let _ = reply_tx.send(Err(err.into()));
            }
        }

        reply_rx
    }
}

impl<P, R> LoadBalancer<P, R> for Dispatcher<P, R>
where
    P: Clone + Send + 'static,
    R: Send + 'static,
{
    fn request(&self, payload: P) -> oneshot::Receiver<Reply<R>> {
        Dispatcher::request(self, payload)
    }

    fn register_instance(&self, inbox: mpsc::Sender<Envelope<P, R>>) -> InstanceId {
        Dispatcher::register_instance(self, inbox)
    }
}

/// State owned by one request's retry task.
struct RetryLoop<P, R> {
    request_id: Uuid,
    started: Instant,
    registry: Arc<Registry<Envelope<P, R>>>,
    timings: Arc<ArcSwap<DispatchConfig>>,
    tried: HashSet<InstanceId>,
}

impl<P, R> RetryLoop<P, R>
where
    P: Clone + Send + 'static,
    R: Send + 'static,
{
    async fn run(
        mut self,
        first: SelectedInstance<Envelope<P, R>>,
        payload: P,
        mut reply_tx: oneshot::Sender<Reply<R>>,
    ) {
        let mut current = first;

        loop {
            self.tried.insert(current.id);
            let timings = **self.timings.load();

            let result = tokio::select! {
                result = forward(&current.inbox, payload.clone(), timings.response_timeout()) => result,
                _ = reply_tx.closed() => {
                    tracing::debug!(
                        request_id = %self.request_id,
                        attempts = self.tried.len(),
                        "Caller stopped waiting, abandoning request"
                    );
                    metrics::record_request(Outcome::Cancelled, self.started);
                    return;
                }
            };

            match result {
                Ok(reply) => {
                    metrics::record_attempt("reply");
                    metrics::record_request(Outcome::Success, self.started);
                    tracing::debug!(
                        request_id = %self.request_id,
                        instance = %current.id,
                        attempts = self.tried.len(),
                        "Request completed"
                    );
                    let _ = reply_tx.send(Ok(reply));
                    return;
                }
                Err(err) => {
                    metrics::record_attempt(err.label());
                    tracing::warn!(
                        request_id = %self.request_id,
                        instance = %current.id,
                        error = %err,
                        disable_ms = timings.disable_interval_ms,
                        "Attempt failed, disabling instance"
                    );

                    match self.registry.disable_and_next(current.id, timings.disable_interval()) {
                        Ok(next) if !self.tried.contains(&next.id) => {
                            current = next;
                        }
                        Ok(next) => {
                            tracing::warn!(
                                request_id = %self.request_id,
                                instance = %next.id,
                                attempts = self.tried.len(),
                                "Next candidate was already tried, giving up"
                            );
                            self.fail(reply_tx);
                            return;
                        }
                        Err(SelectError::NoAliveInstances) => {
                            tracing::warn!(
                                request_id = %self.request_id,
                                attempts = self.tried.len(),
                                "No alive instances left, giving up"
                            );
                            self.fail(reply_tx);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn fail(&self, reply_tx: oneshot::Sender<Reply<R>>) {
        metrics::record_request(Outcome::Exhausted, self.started);
        let _ = reply_tx.send(Err(DispatchError::Exhausted {
            attempts: self.tried.len(),
        }));
    }
}
