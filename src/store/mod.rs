pub mod entry;

use crate::config::StreamClock;
use crate::types::Value;
use entry::{Entry, now_millis};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The engine's single keyspace: key -> value slot, with expiry tracking.
///
/// Expiry is enforced lazily on every access (an expired key is removed
/// and reported absent) and eagerly by the background sweep. Lazy expiry
/// alone is sufficient for correctness; the sweep only bounds memory held
/// by keys that are never touched again.
#[derive(Debug)]
pub struct Keyspace {
    data: HashMap<String, Entry>,
    /// Clock used for stream ID assignment; injected so tests can pin it.
    pub clock: StreamClock,
    /// Precision for HyperLogLog sketches created in this keyspace.
    pub hll_precision: u8,
}

impl Keyspace {
    pub fn new(clock: StreamClock, hll_precision: u8) -> Self {
        Keyspace {
            data: HashMap::new(),
            clock,
            hll_precision,
        }
    }

    /// Get a value, removing it first if its deadline has passed.
    pub fn get(&mut self, key: &str) -> Option<&Entry> {
        if self.is_expired(key) {
            self.data.remove(key);
            return None;
        }
        self.data.get(key)
    }

    /// Get a mutable value, removing it first if its deadline has passed.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        if self.is_expired(key) {
            self.data.remove(key);
            return None;
        }
        self.data.get_mut(key)
    }

    pub fn set(&mut self, key: String, entry: Entry) {
        self.data.insert(key, entry);
    }

    /// Delete a key. Returns true if it existed (and had not expired).
    pub fn remove(&mut self, key: &str) -> bool {
        if self.is_expired(key) {
            self.data.remove(key);
            return false;
        }
        self.data.remove(key).is_some()
    }

    pub fn contains(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Type name of the value at `key`, or None if absent.
    pub fn type_name(&mut self, key: &str) -> Option<&'static str> {
        self.get(key).map(|e| e.value.type_name())
    }

    /// Replace the expiry deadline on an existing key. A new deadline
    /// always supersedes any prior one. Returns false if the key is absent.
    pub fn set_expiry(&mut self, key: &str, deadline_ms: u64) -> bool {
        match self.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(deadline_ms);
                true
            }
            None => false,
        }
    }

    /// TTL in seconds: -2 if the key is absent, -1 if it has no expiry.
    pub fn ttl_seconds(&mut self, key: &str) -> i64 {
        match self.get(key) {
            Some(entry) => entry.ttl_seconds(),
            None => -2,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fetch the value at `key` if it holds the requested variant,
    /// creating it with `make` when absent.
    pub fn get_or_create_with(
        &mut self,
        key: &str,
        make: impl FnOnce() -> Value,
    ) -> &mut Entry {
        if !self.contains(key) {
            self.data.insert(key.to_string(), Entry::new(make()));
        }
        self.data.get_mut(key).expect("entry just ensured")
    }

    /// One active-expiry cycle: sample up to `sample` volatile keys at
    /// random and remove the expired ones. Returns the number removed.
    pub fn active_expire(&mut self, sample: usize) -> usize {
        use rand::seq::IteratorRandom;
        let now = now_millis();
        let mut rng = rand::thread_rng();
        let candidates: Vec<String> = self
            .data
            .iter()
            .filter(|(_, e)| e.expires_at.is_some())
            .map(|(k, _)| k.clone())
            .choose_multiple(&mut rng, sample);

        let mut removed = 0;
        for key in candidates {
            let expired = self
                .data
                .get(&key)
                .is_some_and(|e| e.expires_at.is_some_and(|d| now >= d));
            if expired {
                self.data.remove(&key);
                removed += 1;
            }
        }
        removed
    }

    fn is_expired(&self, key: &str) -> bool {
        self.data.get(key).is_some_and(|e| e.is_expired())
    }
}

pub type SharedStore = Arc<RwLock<Keyspace>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn keyspace() -> Keyspace {
        Keyspace::new(StreamClock::system(), 14)
    }

    #[test]
    fn lazy_expiry_removes_on_access() {
        let mut ks = keyspace();
        ks.set(
            "k".to_string(),
            Entry::with_expiry(Value::String(b"v".to_vec()), now_millis() - 1),
        );
        assert!(ks.get("k").is_none());
        assert_eq!(ks.len(), 0);
    }

    #[test]
    fn new_deadline_replaces_old() {
        let mut ks = keyspace();
        ks.set(
            "k".to_string(),
            Entry::with_expiry(Value::String(b"v".to_vec()), now_millis() + 1_000),
        );
        assert!(ks.set_expiry("k", now_millis() + 60_000));
        let ttl = ks.ttl_seconds("k");
        assert!(ttl > 30, "ttl {ttl} should reflect the replaced deadline");
    }

    #[test]
    fn active_expire_removes_expired_sample() {
        let mut ks = keyspace();
        for i in 0..10 {
            ks.set(
                format!("k{i}"),
                Entry::with_expiry(Value::String(b"v".to_vec()), now_millis() - 1),
            );
        }
        ks.set("live".to_string(), Entry::new(Value::String(b"v".to_vec())));
        let removed = ks.active_expire(64);
        assert_eq!(removed, 10);
        assert!(ks.contains("live"));
    }

    #[test]
    fn ttl_reports_absent_and_persistent() {
        let mut ks = keyspace();
        assert_eq!(ks.ttl_seconds("missing"), -2);
        ks.set("k".to_string(), Entry::new(Value::String(b"v".to_vec())));
        assert_eq!(ks.ttl_seconds("k"), -1);
    }
}
