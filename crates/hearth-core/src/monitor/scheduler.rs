//! Deterministic one-shot fire scheduler.
//!
//! Holds at most one pending fire per key. Scheduling a key replaces (and
//! so cancels) its previous fire. Nothing runs by itself: the owner polls
//! [`TimerScheduler::take_due`] with the current time.

use serde::{Deserialize, Serialize};

/// Handle identifying one scheduled fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FireId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledFire<K> {
    pub id: FireId,
    pub key: K,
    /// Epoch milliseconds.
    pub fire_at: i64,
}

#[derive(Debug, Clone)]
pub struct TimerScheduler<K> {
    entries: Vec<ScheduledFire<K>>,
    next_id: u64,
}

impl<K> Default for TimerScheduler<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<K: Clone + PartialEq> TimerScheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire at `fire_at`, cancelling any pending fire for it.
    pub fn schedule(&mut self, key: K, fire_at: i64) -> FireId {
        self.cancel(&key);
        let id = FireId(self.next_id);
        self.next_id += 1;
        self.entries.push(ScheduledFire { id, key, fire_at });
        id
    }

    /// Cancel the pending fire for `key`, returning it.
    pub fn cancel(&mut self, key: &K) -> Option<ScheduledFire<K>> {
        let index = self.entries.iter().position(|e| &e.key == key)?;
        Some(self.entries.swap_remove(index))
    }

    /// Cancel by handle. Returns false if it already fired or was replaced.
    pub fn cancel_id(&mut self, id: FireId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Cancel everything. Returns how many fires were pending.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn pending(&self, key: &K) -> Option<&ScheduledFire<K>> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Earliest pending fire time.
    pub fn next_fire_at(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.fire_at).min()
    }

    /// Remove and return every fire with `fire_at <= now`, earliest first.
    pub fn take_due(&mut self, now: i64) -> Vec<ScheduledFire<K>> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].fire_at <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| (e.fire_at, e.id));
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledFire<K>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reschedule_replaces_pending() {
        let mut s = TimerScheduler::new();
        let first = s.schedule("a", 100);
        let second = s.schedule("a", 200);
        assert_ne!(first, second);
        assert_eq!(s.len(), 1);
        assert!(!s.cancel_id(first));
        assert!(s.take_due(150).is_empty());
        let due = s.take_due(200);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, second);
        assert!(s.is_empty());
    }

    #[test]
    fn take_due_orders_by_time() {
        let mut s = TimerScheduler::new();
        s.schedule("late", 300);
        s.schedule("early", 100);
        s.schedule("future", 1_000);
        assert_eq!(s.next_fire_at(), Some(100));
        let keys: Vec<_> = s.take_due(500).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["early", "late"]);
        assert_eq!(s.pending(&"future").map(|e| e.fire_at), Some(1_000));
    }

    #[test]
    fn cancel_all_clears() {
        let mut s = TimerScheduler::new();
        s.schedule(1u8, 10);
        s.schedule(2u8, 20);
        assert_eq!(s.cancel_all(), 2);
        assert!(s.take_due(i64::MAX).is_empty());
        assert!(s.cancel(&1).is_none());
    }
}
