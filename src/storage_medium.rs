//! Synchronous string key-value storage backing the document store.
//!
//! A [`KeyValueMedium`] behaves like browser local storage: values are plain
//! strings, every call completes before returning, and nothing is transactional
//! across keys. [`MemoryMedium`] is the in-process implementation; the durable
//! one lives in [`crate::lmdb_medium`].

use std::cell::RefCell;
use std::collections::BTreeMap;

use log::debug;

use crate::error::{StoreError, StoreResult};

pub trait KeyValueMedium {
    /// Returns the raw value stored under `key`, or `None` when the key is absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing whatever was there.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-memory medium with an optional byte quota.
///
/// The quota counts the length of every key plus its value, the same way a
/// browser accounts for its local storage origin. A `set` that would push the
/// total past the quota fails with [`StoreError::QuotaExceeded`] and leaves the
/// previous value in place.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    /// Total bytes currently held (keys plus values).
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueMedium for MemoryMedium {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if let Some(quota) = self.quota {
            let current = self.entries.borrow().get(key).map_or(0, |v| key.len() + v.len());
            let needed = self.used_bytes() - current + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        debug!("medium set '{}' ({} bytes)", key, value.len());
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_of_absent_key_is_none() {
        let medium = MemoryMedium::new();
        assert_eq!(medium.get("warehouses").unwrap(), None);
    }

    #[test]
    fn set_replaces_and_remove_clears() {
        let medium = MemoryMedium::new();
        medium.set("user", "{\"name\":\"a\"}").unwrap();
        medium.set("user", "{\"name\":\"b\"}").unwrap();
        assert_eq!(medium.get("user").unwrap().as_deref(), Some("{\"name\":\"b\"}"));

        medium.remove("user").unwrap();
        medium.remove("user").unwrap();
        assert!(medium.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let medium = MemoryMedium::with_quota(20);
        medium.set("orders", "[]").unwrap();

        let err = medium.set("orders", &"x".repeat(64)).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { quota: 20, .. }));
        assert_eq!(medium.get("orders").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn quota_accounts_for_replaced_value() {
        // "k" + 9 bytes = 10; replacing it with another 9 bytes must still fit.
        let medium = MemoryMedium::with_quota(10);
        medium.set("k", "123456789").unwrap();
        medium.set("k", "987654321").unwrap();
        assert_eq!(medium.used_bytes(), 10);
    }
}
