use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Wakeup registry for blocked stream reads.
///
/// A reader that finds no new entries registers a handle under the
/// stream's key while still holding the store lock, then waits on it
/// after releasing; XADD notifies the key's waiters while the write lock
/// is still held, so a wakeup can never slip between poll and park.
/// Interior locking is a plain `Mutex` — registration has to happen with
/// the store lock held, so the critical section must not await.
#[derive(Debug, Default)]
pub struct StreamWaiters {
    waiters: Mutex<HashMap<String, Vec<Arc<Notify>>>>,
}

impl StreamWaiters {
    pub fn new() -> Self {
        StreamWaiters::default()
    }

    /// Register a fresh waiter on `key`.
    pub fn register(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.waiters
            .lock()
            .expect("waiter registry poisoned")
            .entry(key.to_string())
            .or_default()
            .push(notify.clone());
        notify
    }

    /// Wake and deregister every waiter on `key`. Returns the number woken.
    pub fn notify(&self, key: &str) -> usize {
        let waiters = self
            .waiters
            .lock()
            .expect("waiter registry poisoned")
            .remove(key);
        match waiters {
            Some(list) => {
                let count = list.len();
                for w in list {
                    w.notify_one();
                }
                count
            }
            None => 0,
        }
    }

    /// Remove one waiter from `key`, e.g. after its deadline elapsed.
    /// Harmless if a concurrent notify already consumed it.
    pub fn unregister(&self, key: &str, notify: &Arc<Notify>) {
        let mut waiters = self.waiters.lock().expect("waiter registry poisoned");
        if let Some(list) = waiters.get_mut(key) {
            list.retain(|w| !Arc::ptr_eq(w, notify));
            if list.is_empty() {
                waiters.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_consumes_registrations() {
        let waiters = StreamWaiters::new();
        let _a = waiters.register("s");
        let _b = waiters.register("s");
        assert_eq!(waiters.notify("s"), 2);
        assert_eq!(waiters.notify("s"), 0);
    }

    #[test]
    fn unregister_leaves_others_in_place() {
        let waiters = StreamWaiters::new();
        let a = waiters.register("s");
        let _b = waiters.register("s");
        waiters.unregister("s", &a);
        assert_eq!(waiters.notify("s"), 1);
    }
}
