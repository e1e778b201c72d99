//! Unit quaternions for DMP orientation output
//!
//! The DMP reports orientation as four signed Q30 integers. We only ever
//! need two things from them: a normalised float quaternion, and the
//! rotation of a sensor-frame vector into the world frame.

use crate::constants::calibration::Q30_SCALE;

/// Three-component vector in g (acceleration) or unitless
pub type Vector3 = [f32; 3];

/// Quaternion `[w, x, y, z]` representing an orientation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    /// Scalar component
    pub w: f32,
    /// X (i) component
    pub x: f32,
    /// Y (j) component
    pub y: f32,
    /// Z (k) component
    pub z: f32,
}

impl Quaternion {
    /// No rotation
    pub const IDENTITY: Self = Self { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Convert a raw Q30 DMP quaternion `[w, x, y, z]` to a normalised float quaternion
    ///
    /// An all-zero input stays all-zero; there is no rotation to recover.
    pub fn from_q30(raw: [i32; 4]) -> Self {
        Self {
            w: raw[0] as f32 / Q30_SCALE,
            x: raw[1] as f32 / Q30_SCALE,
            y: raw[2] as f32 / Q30_SCALE,
            z: raw[3] as f32 / Q30_SCALE,
        }
        .normalize()
    }

    /// Euclidean norm of all four components
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Scale to unit length; a zero quaternion is returned unchanged
    pub fn normalize(self) -> Self {
        let n = self.magnitude();
        if n > 0.0 {
            Self {
                w: self.w / n,
                x: self.x / n,
                y: self.y / n,
                z: self.z / n,
            }
        } else {
            self
        }
    }

    /// Rotate a sensor-frame vector into the world frame
    ///
    /// Uses the expanded form of `q * v * q⁻¹`:
    /// `v' = v + 2w (q_vec × v) + 2 q_vec × (q_vec × v)`.
    /// Assumes `self` is normalised.
    pub fn rotate(&self, v: Vector3) -> Vector3 {
        let q = [self.x, self.y, self.z];
        let uv = cross(q, v);
        let uuv = cross(q, uv);
        let two_w = 2.0 * self.w;

        [
            v[0] + two_w * uv[0] + 2.0 * uuv[0],
            v[1] + two_w * uv[1] + 2.0 * uuv[1],
            v[2] + two_w * uv[2] + 2.0 * uuv[2],
        ]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn cross(a: Vector3, b: Vector3) -> Vector3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
