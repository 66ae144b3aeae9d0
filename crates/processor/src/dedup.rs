//! Bounded deduplication of webhook deliveries.
//!
//! GitHub delivers at-least-once: redeliveries and near-simultaneous
//! duplicates of the same logical event both happen. The gate keeps a
//! fingerprint per seen occurrence and answers check-and-insert in a
//! single critical section, so two racing deliveries resolve to exactly
//! one winner. The set is bounded: a long-lived process trades perfect
//! dedup history for bounded memory.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};

/// Stable fingerprint of one logical event occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn new(
        event_kind: &str,
        action: &str,
        delivery_id: &str,
        pr_number: i32,
        merge_sha: &str,
    ) -> Self {
        let mut hasher = Sha256::new();
        for part in [
            event_kind,
            action,
            delivery_id,
            &pr_number.to_string(),
            merge_sha,
        ] {
            hasher.update(part.as_bytes());
            // Separator keeps ("ab","c") distinct from ("a","bc")
            hasher.update([0u8]);
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct Inner {
    seen: HashSet<DedupKey>,
    order: VecDeque<DedupKey>,
}

/// Insertion-ordered bounded set of delivery fingerprints.
///
/// Eviction is FIFO: when the capacity is reached the oldest fingerprint
/// is dropped to make room, so the most recently seen keys always remain
/// deduplicated.
pub struct DedupGate {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl DedupGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(Inner {
                seen: HashSet::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
        }
    }

    /// Atomically record the key. Returns true when it was not present,
    /// i.e. the caller won the gate and may proceed.
    pub fn check_and_insert(&self, key: &DedupKey) -> bool {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if inner.seen.contains(key) {
            return false;
        }
        while inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.seen.remove(&oldest);
            }
        }
        inner.order.push_back(key.clone());
        inner.seen.insert(key.clone());
        true
    }

    /// Number of fingerprints currently retained
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> DedupKey {
        DedupKey::new("pull_request", "closed", &format!("delivery-{}", n), 1, "sha")
    }

    #[test]
    fn same_inputs_produce_same_key() {
        let a = DedupKey::new("pull_request", "closed", "d1", 42, "abc");
        let b = DedupKey::new("pull_request", "closed", "d1", 42, "abc");
        assert_eq!(a, b);
    }

    #[test]
    fn any_field_changes_the_key() {
        let base = DedupKey::new("pull_request", "closed", "d1", 42, "abc");
        assert_ne!(base, DedupKey::new("pull_request", "closed", "d2", 42, "abc"));
        assert_ne!(base, DedupKey::new("pull_request", "closed", "d1", 43, "abc"));
        assert_ne!(base, DedupKey::new("pull_request", "closed", "d1", 42, "abd"));
        assert_ne!(base, DedupKey::new("pull_request", "reopened", "d1", 42, "abc"));
    }

    #[test]
    fn key_is_loggable_hex() {
        let key = DedupKey::new("pull_request", "closed", "d1", 42, "abc");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn field_boundaries_do_not_collide() {
        let a = DedupKey::new("ab", "c", "d", 1, "e");
        let b = DedupKey::new("a", "bc", "d", 1, "e");
        assert_ne!(a, b);
    }

    #[test]
    fn first_insert_wins_second_loses() {
        let gate = DedupGate::new(8);
        assert!(gate.check_and_insert(&key(1)));
        assert!(!gate.check_and_insert(&key(1)));
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn capacity_bound_evicts_oldest_first() {
        let gate = DedupGate::new(3);
        for n in 0..5 {
            assert!(gate.check_and_insert(&key(n)));
        }
        assert_eq!(gate.len(), 3);
        // Oldest two were evicted, so they pass the gate again
        assert!(gate.check_and_insert(&key(0)));
        // The most recent keys are still deduplicated
        assert!(!gate.check_and_insert(&key(4)));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let gate = DedupGate::new(0);
        assert!(gate.check_and_insert(&key(1)));
        assert!(!gate.check_and_insert(&key(1)));
        assert_eq!(gate.len(), 1);
    }
}
