//! Instance registry.
//!
//! # Responsibilities
//! - Hold the append-only list of registered instances
//! - Select the next eligible instance in round-robin order
//! - Apply time-bounded disablement after failed attempts
//!
//! Every read or mutation happens under one mutex. Nothing here awaits,
//! so the lock is never held across a suspension point.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use crate::load_balancer::instance::{Instance, InstanceId};
use crate::load_balancer::round_robin::RoundRobin;
use crate::observability::metrics;

/// Selection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no alive instances")]
    NoAliveInstances,
}

/// An instance picked for one attempt.
pub struct SelectedInstance<T> {
    pub id: InstanceId,
    pub inbox: mpsc::Sender<T>,
}

impl<T> Clone for SelectedInstance<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inbox: self.inbox.clone(),
        }
    }
}

impl<T> std::fmt::Debug for SelectedInstance<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedInstance").field("id", &self.id).finish()
    }
}

/// Point-in-time view of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceStatus {
    pub id: InstanceId,
    /// Remaining cool-down, `None` when eligible.
    pub disabled_for: Option<Duration>,
}

struct RegistryState<T> {
    instances: Vec<Instance<T>>,
    round_robin: RoundRobin,
}

/// Registered instances plus the round-robin cursor.
pub struct Registry<T> {
    state: Mutex<RegistryState<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                instances: Vec::new(),
                round_robin: RoundRobin::new(),
            }),
        }
    }

    /// Append a new, never-disabled instance wrapping `inbox`.
    pub fn register_instance(&self, inbox: mpsc::Sender<T>) -> InstanceId {
        let mut state = self.lock();
        let id = InstanceId(state.instances.len());
        state.instances.push(Instance::new(id, inbox));
        metrics::record_instances_registered(state.instances.len());
        drop(state);

        tracing::info!(instance = %id, "Instance registered");
        id
    }

    /// Select the next eligible instance, starting just after the last one returned.
    pub fn next_alive(&self) -> Result<SelectedInstance<T>, SelectError> {
        let mut state = self.lock();
        Self::select(&mut state, Instant::now())
    }

    /// Keep `id` out of rotation for `interval` from now.
    ///
    /// A repeated call overwrites the deadline with the later call's value.
    pub fn mark_disabled(&self, id: InstanceId, interval: Duration) {
        let mut state = self.lock();
        Self::disable(&mut state, id, Instant::now() + interval);
    }

    /// Disable `id` and pick the next candidate under a single lock acquisition.
    pub fn disable_and_next(
        &self,
        id: InstanceId,
        interval: Duration,
    ) -> Result<SelectedInstance<T>, SelectError> {
        let mut state = self.lock();
        let now = Instant::now();
        Self::disable(&mut state, id, now + interval);
        Self::select(&mut state, now)
    }

    pub fn is_disabled(&self, id: InstanceId) -> bool {
        let state = self.lock();
        state
            .instances
            .get(id.0)
            .is_some_and(|instance| !instance.is_eligible(Instant::now()))
    }

    pub fn len(&self) -> usize {
        self.lock().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of instances currently out of rotation.
    pub fn disabled_count(&self) -> usize {
        let state = self.lock();
        let now = Instant::now();
        state.instances.iter().filter(|i| !i.is_eligible(now)).count()
    }

    pub fn snapshot(&self) -> Vec<InstanceStatus> {
        let state = self.lock();
        let now = Instant::now();
        state
            .instances
            .iter()
            .map(|instance| InstanceStatus {
                id: instance.id(),
                disabled_for: instance.disabled_for(now),
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState<T>> {
        self.state.lock().expect("registry mutex poisoned")
    }

    fn select(state: &mut RegistryState<T>, now: Instant) -> Result<SelectedInstance<T>, SelectError> {
        let RegistryState { instances, round_robin } = state;
        match round_robin.next_index(instances, now) {
            Some(index) => {
                let instance = &instances[index];
                Ok(SelectedInstance {
                    id: instance.id,
                    inbox: instance.inbox.clone(),
                })
            }
            None => {
                tracing::debug!(instance_count = instances.len(), "No eligible instance found");
                Err(SelectError::NoAliveInstances)
            }
        }
    }

    fn disable(state: &mut RegistryState<T>, id: InstanceId, until: Instant) {
        if let Some(instance) = state.instances.get_mut(id.0) {
            instance.disable_until(until);
            metrics::record_instance_disabled();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: usize) -> (Registry<u32>, Vec<mpsc::Receiver<u32>>) {
        let registry = Registry::new();
        let mut receivers = Vec::new();
        for _ in 0..n {
            let (tx, rx) = mpsc::channel(1);
            registry.register_instance(tx);
            receivers.push(rx);
        }
        (registry, receivers)
    }

    #[test]
    fn test_cycles_through_every_instance() {
        let (registry, _rx) = registry(5);

        let first_round: Vec<usize> = (0..5)
            .map(|_| registry.next_alive().unwrap().id.index())
            .collect();
        assert_eq!(first_round, vec![0, 1, 2, 3, 4]);

        let second_round: Vec<usize> = (0..5)
            .map(|_| registry.next_alive().unwrap().id.index())
            .collect();
        assert_eq!(second_round, first_round);
    }

    #[test]
    fn test_single_eligible_instance_always_returned() {
        let (registry, _rx) = registry(4);
        for index in [0, 1, 3] {
            registry.mark_disabled(InstanceId(index), Duration::from_secs(60));
        }

        for _ in 0..6 {
            assert_eq!(registry.next_alive().unwrap().id, InstanceId(2));
        }
    }

    #[test]
    fn test_empty_registry_has_no_alive_instances() {
        let registry: Registry<u32> = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.next_alive().unwrap_err(), SelectError::NoAliveInstances);
    }

    #[test]
    fn test_all_disabled_until_new_registration() {
        let (registry, _rx) = registry(2);
        registry.mark_disabled(InstanceId(0), Duration::from_secs(60));
        registry.mark_disabled(InstanceId(1), Duration::from_secs(60));

        for _ in 0..3 {
            assert_eq!(registry.next_alive().unwrap_err(), SelectError::NoAliveInstances);
        }
        assert_eq!(registry.disabled_count(), 2);

        let (tx, _new_rx) = mpsc::channel(1);
        let id = registry.register_instance(tx);
        assert_eq!(registry.next_alive().unwrap().id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cool_down_expiry_restores_instance() {
        let (registry, _rx) = registry(1);
        registry.mark_disabled(InstanceId(0), Duration::from_secs(60));
        assert!(registry.next_alive().is_err());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(registry.next_alive().is_err());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(registry.next_alive().unwrap().id, InstanceId(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_disabled_twice_keeps_later_deadline() {
        let (registry, _rx) = registry(1);
        let id = InstanceId(0);

        registry.mark_disabled(id, Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(10)).await;
        registry.mark_disabled(id, Duration::from_secs(60));

        let status = registry.snapshot()[0];
        assert_eq!(status.disabled_for, Some(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(55)).await;
        assert!(registry.is_disabled(id));
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!registry.is_disabled(id));
    }

    #[test]
    fn test_disable_and_next_moves_on() {
        let (registry, _rx) = registry(3);
        let first = registry.next_alive().unwrap();
        assert_eq!(first.id, InstanceId(0));

        let next = registry.disable_and_next(first.id, Duration::from_secs(60)).unwrap();
        assert_eq!(next.id, InstanceId(1));
        assert!(registry.is_disabled(first.id));

        // 0 is disabled, so the scan wraps from 2 to 1
        assert_eq!(registry.next_alive().unwrap().id, InstanceId(2));
        assert_eq!(registry.next_alive().unwrap().id, InstanceId(1));
    }

    #[tokio::test]
    async fn test_selected_inbox_reaches_registered_receiver() {
        let (registry, mut receivers) = registry(2);
        let selected = registry.next_alive().unwrap();
        selected.inbox.send(7).await.unwrap();
        assert_eq!(receivers[0].recv().await, Some(7));
    }
}
