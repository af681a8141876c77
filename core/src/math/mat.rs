//! Column-major 4×4 transform matrices.

use core::fmt::{self, Debug, Formatter};
use core::ops::Mul;

use super::approx::ApproxEq;

/// A 4×4 matrix of `f32`, stored in column-major order.
///
/// The element at row `r`, column `c` is at index `c * 4 + r` of the
/// backing array. Vectors are column vectors multiplied on the right:
/// `m.apply(v)` computes `M · v`.
#[derive(Copy, Clone, PartialEq)]
pub struct Mat4(pub [f32; 16]);

impl Mat4 {
    /// The all-zeros matrix.
    pub const fn zero() -> Self {
        Self([0.0; 16])
    }

    /// The identity matrix.
    pub const fn identity() -> Self {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        Self(m)
    }

    /// Returns the element at row `r`, column `c`.
    #[inline]
    pub const fn get(&self, r: usize, c: usize) -> f32 {
        self.0[c * 4 + r]
    }

    #[inline]
    fn set(&mut self, r: usize, c: usize, val: f32) {
        self.0[c * 4 + r] = val;
    }

    /// Returns the matrix product `self · other`.
    ///
    /// Applying the result to a vector applies `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        let mut res = Self::zero();
        for r in 0..4 {
            for c in 0..4 {
                let dot = (0..4).map(|k| self.get(r, k) * other.get(k, c));
                res.set(r, c, dot.sum());
            }
        }
        res
    }

    /// Returns the matrix product `other · self`.
    ///
    /// Applying the result to a vector applies `self` first, then `other`.
    pub fn then(&self, other: &Self) -> Self {
        other.compose(self)
    }

    /// Transforms the homogeneous vector `v` by `self`.
    #[inline]
    pub fn apply(&self, v: &[f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let [x, y, z, w] = *v;
        [0, 1, 2, 3].map(|r| {
            m[r] * x + m[4 + r] * y + m[8 + r] * z + m[12 + r] * w
        })
    }
}

/// Returns a matrix translating by (`x`, `y`, `z`).
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = Mat4::identity();
    m.set(0, 3, x);
    m.set(1, 3, y);
    m.set(2, 3, z);
    m
}

/// Returns a matrix scaling by (`x`, `y`, `z`).
pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = Mat4::zero();
    m.set(0, 0, x);
    m.set(1, 1, y);
    m.set(2, 2, z);
    m.set(3, 3, 1.0);
    m
}

/// Returns a matrix that swaps the y and z axes, mapping a z-up world to
/// a y-up view (x, y, z) → (x, z, -y).
pub fn swap_yz() -> Mat4 {
    let mut m = Mat4::zero();
    m.set(0, 0, 1.0);
    m.set(1, 2, 1.0);
    m.set(2, 1, -1.0);
    m.set(3, 3, 1.0);
    m
}

/// Returns a perspective projection from the view frustum bounded by the
/// planes `left`, `right`, `bottom`, `top` at distance `near`, and `far`.
///
/// The result maps view space (looking down the negative z axis) to clip
/// space such that the frustum becomes the cube `-w ≤ x, y, z ≤ w`.
pub fn frustum(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let mut m = Mat4::zero();
    m.set(0, 0, 2.0 * near / (right - left));
    m.set(1, 1, 2.0 * near / (top - bottom));
    m.set(0, 2, (right + left) / (right - left));
    m.set(1, 2, (top + bottom) / (top - bottom));
    m.set(2, 2, -(far + near) / (far - near));
    m.set(2, 3, -(2.0 * far * near) / (far - near));
    m.set(3, 2, -1.0);
    m
}

/// Returns a perspective projection with vertical field of view `fovy`
/// degrees and the given aspect ratio and near and far plane distances.
#[cfg(feature = "fp")]
pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    use super::float::f32;
    let f = 1.0 / f32::tan(fovy.to_radians() / 2.0);
    let mut m = Mat4::zero();
    m.set(0, 0, f / aspect);
    m.set(1, 1, f);
    m.set(2, 2, (far + near) / (near - far));
    m.set(2, 3, 2.0 * far * near / (near - far));
    m.set(3, 2, -1.0);
    m
}

/// Returns a matrix rotating `angle` radians about the unit axis
/// (`x`, `y`, `z`).
#[cfg(feature = "fp")]
pub fn rotate(angle: f32, x: f32, y: f32, z: f32) -> Mat4 {
    use super::float::f32;
    let (s, c) = (f32::sin(angle), f32::cos(angle));
    let t = 1.0 - c;
    let mut m = Mat4::zero();
    m.set(0, 0, x * x * t + c);
    m.set(0, 1, x * y * t - z * s);
    m.set(0, 2, x * z * t + y * s);
    m.set(1, 0, y * x * t + z * s);
    m.set(1, 1, y * y * t + c);
    m.set(1, 2, y * z * t - x * s);
    m.set(2, 0, x * z * t - y * s);
    m.set(2, 1, y * z * t + x * s);
    m.set(2, 2, z * z * t + c);
    m.set(3, 3, 1.0);
    m
}

impl Default for Mat4 {
    /// Returns the identity matrix.
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

impl Debug for Mat4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mat4[")?;
        for r in 0..4 {
            let row = [0, 1, 2, 3].map(|c| self.get(r, c));
            writeln!(f, "    {row:>8.3?}")?;
        }
        write!(f, "]")
    }
}

impl ApproxEq for Mat4 {
    fn approx_eq_eps(&self, other: &Self, eps: f32) -> bool {
        self.0.approx_eq_eps(&other.0, eps)
    }
}
