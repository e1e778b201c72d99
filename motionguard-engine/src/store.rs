//! In-memory settings store
//!
//! Stands in for the board's non-volatile storage on hosts and in tests.
//! Values are typed: reading a key back as another type yields `None`,
//! the same as a missing key.

use std::collections::{HashMap, HashSet};

use motionguard_core::SettingsStore;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Settings store is read-only")]
    ReadOnly,
    #[error("Settings store rejected key {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    F32(f32),
    Bool(bool),
    U32(u32),
}

/// HashMap-backed [`SettingsStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<(String, String), Value>,
    read_only: bool,
    failing: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write, as a worn-out or locked partition would
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Reject writes to one key, as a single bad flash page would
    pub fn failing_key(mut self, key: &str) -> Self {
        self.failing.insert(key.to_owned());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.values
            .get(&(namespace.to_owned(), key.to_owned()))
            .copied()
    }

    fn put(&mut self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        if self.failing.contains(key) {
            return Err(StoreError::Rejected(key.to_owned()));
        }
        self.values
            .insert((namespace.to_owned(), key.to_owned()), value);
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    type Error = StoreError;

    fn get_f32(&self, namespace: &str, key: &str) -> Option<f32> {
        match self.get(namespace, key)? {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }

    fn put_f32(&mut self, namespace: &str, key: &str, value: f32) -> Result<(), StoreError> {
        self.put(namespace, key, Value::F32(value))
    }

    fn get_bool(&self, namespace: &str, key: &str) -> Option<bool> {
        match self.get(namespace, key)? {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn put_bool(&mut self, namespace: &str, key: &str, value: bool) -> Result<(), StoreError> {
        self.put(namespace, key, Value::Bool(value))
    }

    fn get_u32(&self, namespace: &str, key: &str) -> Option<u32> {
        match self.get(namespace, key)? {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    fn put_u32(&mut self, namespace: &str, key: &str, value: u32) -> Result<(), StoreError> {
        self.put(namespace, key, Value::U32(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_round_trip() {
        let mut store = MemoryStore::new();
        store.put_f32("imu", "WOM_THR", 20.0).unwrap();
        store.put_bool("imu", "ACC_COMR", false).unwrap();

        assert_eq!(store.get_f32("imu", "WOM_THR"), Some(20.0));
        assert_eq!(store.get_bool("imu", "ACC_COMR"), Some(false));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn wrong_type_or_namespace_is_missing() {
        let mut store = MemoryStore::new();
        store.put_u32("imu", "WOM_LPF", 3).unwrap();

        assert_eq!(store.get_f32("imu", "WOM_LPF"), None);
        assert_eq!(store.get_u32("other", "WOM_LPF"), None);
    }

    #[test]
    fn read_only_rejects_writes() {
        let mut store = MemoryStore::new().read_only();
        assert_eq!(store.put_bool("imu", "ACC_COMR", true), Err(StoreError::ReadOnly));
        assert!(store.is_empty());
    }

    #[test]
    fn failing_key_rejects_only_that_key() {
        let mut store = MemoryStore::new().failing_key("M_TH_ROLL");
        assert_eq!(
            store.put_f32("imu", "M_TH_ROLL", 1.0),
            Err(StoreError::Rejected("M_TH_ROLL".to_owned()))
        );
        store.put_f32("imu", "M_TH_PITCH", 1.0).unwrap();
        assert_eq!(store.len(), 1);
    }
}
