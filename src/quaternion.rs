//! Quaternion algebra for attitude representation.
//!
//! [`Quaternion`] is a plain `(w, x, y, z)` value with the scalar part first.
//! Operations that need a unit quaternion to make sense (normalization,
//! inversion, axis-angle extraction) resolve degenerate inputs to fixed
//! fallback values instead of dividing by something close to zero, so every
//! call returns a finite result in bounded time.
//!
//! Sums, differences, scaled values and [`Quaternion::derivative`] are plain
//! algebraic results and are not claimed to be rotations.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use nalgebra::{UnitQuaternion, Vector3};

use crate::euler::EulerAngles;

/// Threshold below which a norm is treated as zero.
pub const EPSILON: f32 = 1.0e-6;

/// A quaternion `w + xi + yj + zk`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    /// Real part.
    pub w: f32,
    /// Imaginary `i` part.
    pub x: f32,
    /// Imaginary `j` part.
    pub y: f32,
    /// Imaginary `k` part.
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 0.0);

    /// Create a quaternion from its components.
    #[must_use]
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Returns the identity rotation.
    #[must_use]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create a pure quaternion `[0, v]` from a 3-vector.
    #[must_use]
    pub fn pure(v: Vector3<f32>) -> Self {
        Self::new(0.0, v.x, v.y, v.z)
    }

    /// Overwrite all four components.
    pub fn set(&mut self, w: f32, x: f32, y: f32, z: f32) {
        *self = Self::new(w, x, y, z);
    }

    /// The imaginary part as a 3-vector.
    #[must_use]
    pub fn vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Hamilton product `self ⊗ rhs`.
    ///
    /// The product is associative but not commutative: `a ⊗ b` and `b ⊗ a`
    /// differ unless the rotation axes are parallel.
    #[must_use]
    pub fn multiply(self, rhs: Self) -> Self {
        let Self {
            w: w1,
            x: x1,
            y: y1,
            z: z1,
        } = self;
        let Self {
            w: w2,
            x: x2,
            y: y2,
            z: z2,
        } = rhs;

        Self::new(
            w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
            w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
            w1 * y2 + y1 * w2 - x1 * z2 + z1 * x2,
            w1 * z2 + z1 * w2 + x1 * y2 - y1 * x2,
        )
    }

    /// Multiply every component by `scalar`.
    #[must_use]
    pub fn scale(self, scalar: f32) -> Self {
        Self::new(
            self.w * scalar,
            self.x * scalar,
            self.y * scalar,
            self.z * scalar,
        )
    }

    /// Squared Euclidean norm of the 4-vector.
    #[must_use]
    pub fn norm_squared(&self) -> f32 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Euclidean norm of the 4-vector.
    #[must_use]
    pub fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }

    /// Scale `self` to unit length in place.
    ///
    /// If $\|q\|^2 \le \epsilon^2$ the quaternion is reset to
    /// [`Quaternion::IDENTITY`] instead. Returns `false` when that fallback
    /// was taken.
    pub fn normalize(&mut self) -> bool {
        let norm_squared = self.norm_squared();
        if norm_squared > EPSILON * EPSILON {
            *self = self.scale(1.0 / norm_squared.sqrt());
            true
        } else {
            *self = Self::IDENTITY;
            false
        }
    }

    /// By-value variant of [`Quaternion::normalize`].
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Negate the imaginary part.
    #[must_use]
    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Multiplicative inverse $q^* / \|q\|^2$.
    ///
    /// Returns [`Quaternion::IDENTITY`] when $\|q\|^2 \le \epsilon$.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let norm_squared = self.norm_squared();
        if norm_squared > EPSILON {
            self.conjugate().scale(1.0 / norm_squared)
        } else {
            Self::IDENTITY
        }
    }

    /// Time derivative of `self` under the body-frame angular rate `omega`
    /// (rad/s):
    ///
    /// $$\dot q = \frac{1}{2} q \otimes [0, \omega]$$
    #[must_use]
    pub fn derivative(&self, omega: Vector3<f32>) -> Self {
        let Self { w, x, y, z } = *self;
        let (wx, wy, wz) = (omega.x, omega.y, omega.z);

        Self::new(
            0.5 * (-wx * x - wy * y - wz * z),
            0.5 * (wx * w + wz * y - wy * z),
            0.5 * (wy * w - wz * x + wx * z),
            0.5 * (wz * w + wy * x - wx * y),
        )
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// The axis does not need to be normalized. A near-zero axis yields the
    /// identity.
    #[must_use]
    pub fn from_axis_angle(axis: Vector3<f32>, angle: f32) -> Self {
        let axis_norm = axis.norm();
        if axis_norm <= EPSILON {
            return Self::IDENTITY;
        }

        let (sin_half, cos_half) = (angle * 0.5).sin_cos();
        let scale = sin_half / axis_norm;
        Self::new(cos_half, axis.x * scale, axis.y * scale, axis.z * scale)
    }

    /// Decompose into a unit rotation axis and an angle in `[0, 2π]`.
    ///
    /// The axis is undefined when the angle is `0` or `2π`; the `+X` axis is
    /// returned in that case. A near-zero quaternion yields `(+X, 0)`.
    #[must_use]
    pub fn to_axis_angle(&self) -> (Vector3<f32>, f32) {
        let norm = self.norm();
        if norm <= EPSILON {
            return (Vector3::x(), 0.0);
        }

        let cos_half = (self.w / norm).clamp(-1.0, 1.0);
        let angle = 2.0 * cos_half.acos();

        // rounding can push this slightly below zero
        let sin_half = (1.0 - cos_half * cos_half).max(0.0).sqrt();
        if sin_half <= EPSILON {
            return (Vector3::x(), angle);
        }

        let scale = 1.0 / (sin_half * norm);
        (self.vector() * scale, angle)
    }

    /// Rotate `v` by `self`, i.e. $q \otimes [0, v] \otimes q^*$ for a unit
    /// quaternion.
    ///
    /// Uses $v' = v + w t + u \times t$ with $t = 2 (u \times v)$ and
    /// $u = (x, y, z)$, which avoids building the rotation matrix.
    #[must_use]
    pub fn rotate_vector(&self, v: Vector3<f32>) -> Vector3<f32> {
        let u = self.vector();
        let t = 2.0 * u.cross(&v);
        v + self.w * t + u.cross(&t)
    }

    /// Yaw, pitch and roll (ZYX intrinsic) of the rotation.
    ///
    /// The quaternion is normalized first. Pitch is computed from a clamped
    /// `asin` argument so it saturates at ±90° instead of turning into NaN at
    /// gimbal lock.
    #[must_use]
    pub fn to_euler(&self) -> EulerAngles {
        let Self { w, x, y, z } = self.normalized();

        let sinr_cosp = 2.0 * (w * x + y * z);
        let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
        let roll = sinr_cosp.atan2(cosr_cosp);

        let sinp = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        let pitch = sinp.asin();

        let siny_cosp = 2.0 * (w * z + x * y);
        let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
        let yaw = siny_cosp.atan2(cosy_cosp);

        EulerAngles { yaw, pitch, roll }
    }

    /// Compose yaw, pitch and roll (ZYX intrinsic) into a unit quaternion.
    ///
    /// Equivalent to $q_z(\psi) \otimes q_y(\theta) \otimes q_x(\phi)$.
    #[must_use]
    pub fn from_euler(euler: EulerAngles) -> Self {
        let (sy, cy) = (euler.yaw * 0.5).sin_cos();
        let (sp, cp) = (euler.pitch * 0.5).sin_cos();
        let (sr, cr) = (euler.roll * 0.5).sin_cos();

        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }

    /// Returns `true` if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.w + rhs.w,
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
        )
    }
}

impl AddAssign for Quaternion {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Quaternion {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.w - rhs.w,
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl Mul<f32> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl From<nalgebra::Quaternion<f32>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f32>) -> Self {
        Self::new(q.w, q.i, q.j, q.k)
    }
}

impl From<Quaternion> for nalgebra::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        nalgebra::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl From<UnitQuaternion<f32>> for Quaternion {
    fn from(q: UnitQuaternion<f32>) -> Self {
        q.into_inner().into()
    }
}

impl From<Quaternion> for UnitQuaternion<f32> {
    fn from(q: Quaternion) -> Self {
        UnitQuaternion::new_unchecked(q.normalized().into())
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from([w, x, y, z]: [f32; 4]) -> Self {
        Self::new(w, x, y, z)
    }
}

impl From<Quaternion> for [f32; 4] {
    fn from(q: Quaternion) -> Self {
        [q.w, q.x, q.y, q.z]
    }
}
