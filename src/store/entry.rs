use crate::types::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// An entry in the keyspace — a value plus its expiry metadata.
#[derive(Debug, Clone)]
pub struct Entry {
    pub value: Value,
    /// Expiry deadline as milliseconds since the UNIX epoch. None = no expiry.
    /// Stored absolute so batched execution cannot drift a relative counter.
    pub expires_at: Option<u64>,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Entry {
            value,
            expires_at: None,
        }
    }

    pub fn with_expiry(value: Value, expires_at: u64) -> Self {
        Entry {
            value,
            expires_at: Some(expires_at),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => now_millis() >= deadline,
            None => false,
        }
    }

    /// Remaining time-to-live in seconds, or -1 if no expiry is set.
    pub fn ttl_seconds(&self) -> i64 {
        match self.expires_at {
            None => -1,
            Some(deadline) => {
                let now = now_millis();
                if now >= deadline {
                    -2
                } else {
                    ((deadline - now + 500) / 1000) as i64
                }
            }
        }
    }
}

/// Current time in milliseconds since the UNIX epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_millis() as u64
}
