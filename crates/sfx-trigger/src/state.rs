//! Playback State Store
//!
//! Per-descriptor "last admitted at" timestamps backing the replay gate.
//!
//! ## Thread Safety Design
//!
//! Each descriptor entry has its own lock, so the admission
//! read-modify-write is indivisible per descriptor while unrelated
//! descriptors never contend. The map lock is only held long enough to
//! find or insert an entry.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::DescriptorId;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// Trigger may play
    Admitted,
    /// Trigger arrived inside the replay interval
    Rejected {
        /// Seconds until the gate opens again
        remaining_secs: f64,
    },
}

impl Admission {
    #[inline]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Gate record for one descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackRecord {
    /// Clock time of the last admitted trigger
    pub last_admitted_at: Option<f64>,
    /// Admitted triggers recorded in this entry
    pub admitted_count: u64,
}

impl PlaybackRecord {
    /// Record an admission; never moves the timestamp backwards
    fn record(&mut self, now: f64) {
        self.last_admitted_at = Some(match self.last_admitted_at {
            Some(last) => last.max(now),
            None => now,
        });
        self.admitted_count += 1;
    }
}

/// Explicit store of replay-gate state, keyed by descriptor identity
///
/// Cheap to clone; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct PlaybackStateStore {
    entries: Arc<RwLock<HashMap<DescriptorId, Arc<Mutex<PlaybackRecord>>>>>,
}

impl PlaybackStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: DescriptorId) -> Option<Arc<Mutex<PlaybackRecord>>> {
        self.entries.read().get(&id).cloned()
    }

    fn entry_or_insert(&self, id: DescriptorId) -> Arc<Mutex<PlaybackRecord>> {
        if let Some(entry) = self.entry(id) {
            return entry;
        }
        Arc::clone(self.entries.write().entry(id).or_default())
    }

    /// Decide whether a trigger of `id` at clock time `now` may play
    ///
    /// - No entry and no interval: admitted, nothing recorded.
    /// - No prior timestamp: admitted; recorded when `min_interval_secs > 0`.
    /// - Otherwise admitted iff `now - last >= min_interval_secs`, and the
    ///   timestamp moves to `now`. Rejection changes nothing.
    ///
    /// The elapsed time is compared at the interval's own `f32` precision,
    /// so a trigger exactly one authored interval later always passes.
    pub fn try_admit(&self, id: DescriptorId, min_interval_secs: f32, now: f64) -> Admission {
        let interval = min_interval_secs.max(0.0);

        let entry = if interval > 0.0 {
            self.entry_or_insert(id)
        } else {
            match self.entry(id) {
                Some(entry) => entry,
                None => return Admission::Admitted,
            }
        };

        let mut record = entry.lock();
        match record.last_admitted_at {
            None => {
                record.record(now);
                Admission::Admitted
            }
            Some(last) if (now - last) as f32 >= interval => {
                record.record(now);
                Admission::Admitted
            }
            Some(last) => Admission::Rejected {
                remaining_secs: (f64::from(interval) - (now - last)).max(0.0),
            },
        }
    }

    /// Last admitted trigger time of a descriptor
    pub fn last_admitted_at(&self, id: DescriptorId) -> Option<f64> {
        self.record(id).and_then(|r| r.last_admitted_at)
    }

    /// Copy of a descriptor's record
    pub fn record(&self, id: DescriptorId) -> Option<PlaybackRecord> {
        let entry = self.entry(id)?;
        let record = *entry.lock();
        Some(record)
    }

    /// Drop one descriptor's state
    pub fn forget(&self, id: DescriptorId) -> bool {
        self.entries.write().remove(&id).is_some()
    }

    /// Drop all state
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn test_no_interval_never_records() {
        let store = PlaybackStateStore::new();
        for i in 0..5 {
            assert!(store.try_admit(1, 0.0, i as f64 * 0.01).is_admitted());
        }
        assert!(store.is_empty());
        assert_eq!(store.last_admitted_at(1), None);
    }

    #[test]
    fn test_interval_gate() {
        let store = PlaybackStateStore::new();

        assert!(store.try_admit(1, 1.0, 0.0).is_admitted());
        assert_eq!(store.last_admitted_at(1), Some(0.0));

        match store.try_admit(1, 1.0, 0.1) {
            Admission::Rejected { remaining_secs } => {
                approx::assert_relative_eq!(remaining_secs, 0.9, epsilon = 1e-9)
            }
            Admission::Admitted => panic!("should be debounced"),
        }
        // Rejection leaves the timestamp alone
        assert_eq!(store.last_admitted_at(1), Some(0.0));

        // Boundary is inclusive
        assert!(store.try_admit(1, 1.0, 1.0).is_admitted());
        assert_eq!(store.last_admitted_at(1), Some(1.0));
        assert_eq!(store.record(1).unwrap().admitted_count, 2);
    }

    #[test]
    fn test_inexact_interval_boundary_admits() {
        let store = PlaybackStateStore::new();
        assert!(store.try_admit(3, 0.1, 0.0).is_admitted());
        assert!(store.try_admit(3, 0.1, 0.1).is_admitted());

        // Clock accumulated frame by frame
        let store = PlaybackStateStore::new();
        let mut now = 0.0f64;
        assert!(store.try_admit(4, 0.3, now).is_admitted());
        for _ in 0..3 {
            now += 0.1;
        }
        assert!(store.try_admit(4, 0.3, now).is_admitted());
        assert!(!store.try_admit(4, 0.3, now + 0.2).is_admitted());
    }

    #[test]
    fn test_descriptors_are_independent() {
        let store = PlaybackStateStore::new();
        assert!(store.try_admit(1, 5.0, 0.0).is_admitted());
        assert!(store.try_admit(2, 5.0, 0.0).is_admitted());
        assert!(!store.try_admit(1, 5.0, 1.0).is_admitted());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_timestamp_never_rolls_back() {
        let store = PlaybackStateStore::new();
        assert!(store.try_admit(1, 1.0, 10.0).is_admitted());

        // A stale clock reading cannot pass the gate or rewind it
        assert!(!store.try_admit(1, 1.0, 3.0).is_admitted());
        assert_eq!(store.last_admitted_at(1), Some(10.0));
    }

    #[test]
    fn test_forget_and_clear() {
        let store = PlaybackStateStore::new();
        store.try_admit(1, 1.0, 0.0);
        store.try_admit(2, 1.0, 0.0);

        assert!(store.forget(1));
        assert!(!store.forget(1));
        assert!(store.try_admit(1, 1.0, 0.1).is_admitted());

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_triggers_admit_once() {
        let store = PlaybackStateStore::new();

        let admitted: usize = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.try_admit(42, 1.0, 0.5).is_admitted() as usize)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .sum();

        assert_eq!(admitted, 1);
    }

    proptest! {
        #[test]
        fn prop_gate_spacing(
            interval in 0.01f32..10.0,
            gap in 0.0f64..20.0,
            start in 0.0f64..1000.0,
        ) {
            let store = PlaybackStateStore::new();
            prop_assert!(store.try_admit(7, interval, start).is_admitted());

            let second = store.try_admit(7, interval, start + gap).is_admitted();
            prop_assert_eq!(second, ((start + gap) - start) as f32 >= interval);
        }
    }
}
