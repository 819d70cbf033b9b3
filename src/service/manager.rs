//! Spawns and kills time service instances.

use std::time::Duration;
use rand::Rng;
use tokio::sync::{mpsc, oneshot};
use crate::config::ServiceConfig;
use crate::lifecycle::Shutdown;
use crate::service::time_service::{TimeEnvelope, TimeService};

struct ServiceHandle {
    avg_response: Duration,
    kill: oneshot::Sender<()>,
}

/// Owns the kill switches of every live service.
pub struct ServiceManager {
    config: ServiceConfig,
    shutdown: Shutdown,
    live: Vec<ServiceHandle>,
}

impl ServiceManager {
    pub fn new(config: ServiceConfig, shutdown: Shutdown) -> Self {
        Self {
            config,
            shutdown,
            live: Vec::new(),
        }
    }

    /// Start a new service with a random average response time.
    /// Returns the inbox to register with the dispatcher.
    pub fn spawn(&mut self) -> mpsc::Sender<TimeEnvelope> {
        let avg_response = self.random_avg_response();
        let (inbox_tx, inbox_rx) = mpsc::channel(self.config.inbox_capacity.max(1));
        let (kill_tx, kill_rx) = oneshot::channel();

        let service = TimeService::new(inbox_rx, avg_response, kill_rx, self.shutdown.subscribe());
        tokio::spawn(service.run());

        self.live.push(ServiceHandle {
            avg_response,
            kill: kill_tx,
        });
        tracing::info!(avg_response_ms = avg_response.as_millis() as u64, live = self.live.len(), "Time service spawned");
        inbox_tx
    }

    /// Make a random live service unresponsive. Returns false if none was live.
    pub fn kill(&mut self) -> bool {
        if self.live.is_empty() {
            return false;
        }
        let index = rand::thread_rng().gen_range(0..self.live.len());
        let handle = self.live.remove(index);
        let _ = handle.kill.send(());
        tracing::info!(
            avg_response_ms = handle.avg_response.as_millis() as u64,
            live = self.live.len(),
            "Time service killed"
        );
        true
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn random_avg_response(&self) -> Duration {
        if self.config.max_avg_response_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..self.config.max_avg_response_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_and_kill_track_live_services() {
        let mut manager = ServiceManager::new(ServiceConfig::default(), Shutdown::new());
        assert!(!manager.kill());

        let _a = manager.spawn();
        let _b = manager.spawn();
        assert_eq!(manager.live_count(), 2);

        assert!(manager.kill());
        assert_eq!(manager.live_count(), 1);
        assert!(manager.kill());
        assert!(!manager.kill());
    }

    #[tokio::test]
    async fn test_inbox_uses_configured_capacity() {
        let config = ServiceConfig {
            inbox_capacity: 3,
            max_avg_response_ms: 0,
        };
        let mut manager = ServiceManager::new(config, Shutdown::new());
        let inbox = manager.spawn();
        assert_eq!(inbox.max_capacity(), 3);
    }
}
