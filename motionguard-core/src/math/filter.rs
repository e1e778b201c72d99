//! Second-order band-pass filter
//!
//! Bilinear-transform biquad with constant 0 dB peak gain, used to isolate
//! the vibration band of the linear acceleration magnitude before it goes
//! into the energy buffer.

use core::f32::consts::PI;

/// Biquad band-pass section with its delay line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Design a band-pass between `low_hz` and `high_hz` at sample rate `fs_hz`
    ///
    /// Out-of-range edges are clamped: `low_hz` to at least 1 Hz when
    /// non-positive, `high_hz` below Nyquist, and an inverted band is widened
    /// to 10% above `low_hz`.
    pub fn bandpass(fs_hz: f32, low_hz: f32, high_hz: f32) -> Self {
        let low = if low_hz <= 0.0 { 1.0 } else { low_hz };
        let mut high = high_hz.min(fs_hz * 0.499);
        if high <= low {
            high = low * 1.1;
        }

        let w1 = 2.0 * PI * low / fs_hz;
        let w2 = 2.0 * PI * high / fs_hz;
        let wc = libm::sqrtf(w1 * w2);
        let q = wc / (w2 - w1);

        let omega = 2.0 * PI * libm::sqrtf(low * high) / fs_hz;
        let alpha = libm::sinf(omega) / (2.0 * q);
        let cos_w = libm::cosf(omega);
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: -2.0 * cos_w / a0,
            a2: (1.0 - alpha) / a0,
            ..Self::default()
        }
    }

    /// Filter one sample (direct form I)
    pub fn process(&mut self, input: f32) -> f32 {
        let out = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = out;
        out
    }

    /// Clear the delay line, keep the coefficients
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
