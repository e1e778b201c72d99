//! Fixed-Size Ring Buffer for Vibration Energy
//!
//! ## Overview
//!
//! The classifier pushes one band-passed acceleration magnitude per sample
//! and callers ask for the RMS over the most recent `n` values. Capacity is a
//! const generic so the buffer lives inline in its owner, with no global
//! state and no heap.
//!
//! ### Behaviour
//!
//! - O(1) push, overwriting the oldest value when full
//! - O(n) RMS over the newest `n` values, newest first
//!
//! ```text
//! EnergyBuffer<5> after 7 pushes (v0..v6):
//! ┌────┬────┬────┬────┬────┐
//! │ v5 │ v6 │ v2 │ v3 │ v4 │
//! └────┴────┴────┴────┴────┘
//!           ↑
//!           write_pos = 2 (oldest live value)
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use motionguard_core::buffer::EnergyBuffer;
//!
//! let mut energy: EnergyBuffer<8> = EnergyBuffer::new();
//! energy.push(3.0);
//! energy.push(4.0);
//!
//! // sqrt((9 + 16) / 2)
//! assert!((energy.rms_last(2) - 3.5355).abs() < 1e-3);
//! ```

/// Fixed-size ring buffer of `f32` energy values
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
///
/// Not thread-safe; the classifier owns it exclusively.
#[derive(Debug, Clone)]
pub struct EnergyBuffer<const N: usize> {
    data: [f32; N],
    write_pos: usize,
    len: usize,
}

impl<const N: usize> EnergyBuffer<N> {
    /// Creates an empty buffer
    pub const fn new() -> Self {
        Self {
            data: [0.0; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Appends a value, overwriting the oldest once full
    pub fn push(&mut self, value: f32) {
        self.data[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Get number of stored values
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Capacity `N`
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Most recent value
    pub fn last(&self) -> Option<f32> {
        self.newest().next()
    }

    /// Iterate from newest to oldest
    pub fn newest(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).map(move |i| {
            let idx = (self.write_pos + N - 1 - i) % N;
            self.data[idx]
        })
    }

    /// RMS over the newest `n` values
    ///
    /// `n` is clamped to the number stored. Returns 0 for `n == 0` or an
    /// empty buffer.
    pub fn rms_last(&self, n: usize) -> f32 {
        let n = n.min(self.len);
        if n == 0 {
            return 0.0;
        }

        let sum: f32 = self.newest().take(n).map(|v| v * v).sum();
        libm::sqrtf(sum / n as f32)
    }

    /// Drop all values
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }
}

impl<const N: usize> Default for EnergyBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
