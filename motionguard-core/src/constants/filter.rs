//! Vibration Energy Filter Constants

/// Sample rate fed to the band-pass filter (Hz).
///
/// DMP quaternion output rate on the tracker firmware.
pub const ENERGY_SAMPLE_RATE_HZ: f32 = 50.0;

/// Lower band edge (Hz). Below this is posture drift.
pub const ENERGY_BAND_LOW_HZ: f32 = 0.5;

/// Upper band edge (Hz). Engine idle vibration sits around 10-30 Hz and is
/// cut off here.
pub const ENERGY_BAND_HIGH_HZ: f32 = 5.0;

/// Capacity of the energy ring buffer (samples).
pub const ENERGY_BUFFER_LEN: usize = 512;
