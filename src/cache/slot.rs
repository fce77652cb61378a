//! Store Slot Module
//!
//! A stored entry together with its optional expiry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Slot ==
/// Holds one stored entry and its expiry.
#[derive(Debug, Clone)]
pub struct Slot<E> {
    /// The stored entry
    pub entry: E,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<E> Slot<E> {
    // == Constructor ==
    /// Wraps `entry`, expiring it `ttl` after now if given.
    pub fn new(entry: E, ttl: Option<Duration>) -> Self {
        let expires_at =
            ttl.map(|ttl| current_timestamp_ms().saturating_add(ttl.as_millis() as u64));

        Self { entry, expires_at }
    }

    // == Is Expired ==
    /// Checks if the slot has expired.
    ///
    /// A slot is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
