//! Core traits
//!
//! Seams to the outside world the core needs to talk through. Kept small;
//! the firmware implements them over NVS, tests over a map.

/// Typed, namespaced key/value settings storage
///
/// Getters return `None` for a missing key or a stored value of another
/// type; callers fall back to compiled defaults.
pub trait SettingsStore {
    /// Storage-specific write error
    type Error: core::fmt::Debug;

    fn get_f32(&self, namespace: &str, key: &str) -> Option<f32>;
    fn put_f32(&mut self, namespace: &str, key: &str, value: f32) -> Result<(), Self::Error>;

    fn get_bool(&self, namespace: &str, key: &str) -> Option<bool>;
    fn put_bool(&mut self, namespace: &str, key: &str, value: bool) -> Result<(), Self::Error>;

    fn get_u32(&self, namespace: &str, key: &str) -> Option<u32>;
    fn put_u32(&mut self, namespace: &str, key: &str, value: u32) -> Result<(), Self::Error>;
}
