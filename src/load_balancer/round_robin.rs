//! Round-robin selection over instances, skipping disabled ones.

use tokio::time::Instant;
use crate::load_balancer::instance::Instance;

/// Round-robin cursor.
/// The caller must hold the registry lock for every call.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position the next scan starts from (already reduced modulo `len`).
    pub fn position(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.cursor % len
        }
    }

    /// Return the index of the first eligible instance at or after the cursor,
    /// wrapping once around. The cursor then points just past it.
    pub fn next_index<T>(&mut self, instances: &[Instance<T>], now: Instant) -> Option<usize> {
        let len = instances.len();
        let start = self.position(len);

        for offset in 0..len {
            let index = (start + offset) % len;
            if instances[index].is_eligible(now) {
                self.cursor = (index + 1) % len;
                return Some(index);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use crate::load_balancer::instance::InstanceId;

    fn instances(n: usize) -> Vec<Instance<()>> {
        (0..n)
            .map(|i| {
                let (tx, _rx) = mpsc::channel(1);
                Instance::new(InstanceId(i), tx)
            })
            .collect()
    }

    #[test]
    fn test_round_robin() {
        let mut rr = RoundRobin::new();
        let list = instances(3);
        let now = Instant::now();

        assert_eq!(rr.next_index(&list, now), Some(0));
        assert_eq!(rr.next_index(&list, now), Some(1));
        assert_eq!(rr.next_index(&list, now), Some(2));
        assert_eq!(rr.next_index(&list, now), Some(0));
    }

    #[test]
    fn test_skips_disabled_and_resumes_after_pick() {
        let mut rr = RoundRobin::new();
        let mut list = instances(4);
        let now = Instant::now();
        list[1].disable_until(now + Duration::from_secs(30));

        assert_eq!(rr.next_index(&list, now), Some(0));
        assert_eq!(rr.next_index(&list, now), Some(2));
        assert_eq!(rr.next_index(&list, now), Some(3));
        assert_eq!(rr.next_index(&list, now), Some(0));
    }

    #[test]
    fn test_empty_and_all_disabled() {
        let mut rr = RoundRobin::new();
        let now = Instant::now();
        assert_eq!(rr.next_index::<()>(&[], now), None);

        let mut list = instances(2);
        for instance in &mut list {
            instance.disable_until(now + Duration::from_secs(1));
        }
        assert_eq!(rr.next_index(&list, now), None);
    }

    #[test]
    fn test_cursor_wraps_when_list_grows() {
        let mut rr = RoundRobin::new();
        let mut list = instances(2);
        let now = Instant::now();

        assert_eq!(rr.next_index(&list, now), Some(0));
        assert_eq!(rr.next_index(&list, now), Some(1));

        let (tx, _rx) = mpsc::channel(1);
        list.push(Instance::new(InstanceId(2), tx));
        assert_eq!(rr.next_index(&list, now), Some(0));
        assert_eq!(rr.next_index(&list, now), Some(1));
        assert_eq!(rr.next_index(&list, now), Some(2));
    }
}
