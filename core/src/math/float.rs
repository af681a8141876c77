//! Floating-point compatibility API.
//!
//! `floor`, `round`, and the trigonometric functions are unavailable in
//! `no_std`. This module provides them using either the `libm` or the
//! `micromath` crate, depending on which feature is enabled. The
//! rasterizer cannot do without `floor` and `round`, so those two are
//! also implemented in a fallback used when no backend is enabled.

#[cfg(feature = "libm")]
pub mod libm {
    pub use libm::floorf as floor;
    pub use libm::roundf as round;

    pub use libm::cosf as cos;
    pub use libm::sinf as sin;
    pub use libm::tanf as tan;
}

#[cfg(feature = "mm")]
pub mod mm {
    use micromath::F32Ext as mm;

    pub use super::fallback::round;

    #[inline]
    pub fn floor(x: f32) -> f32 {
        mm::floor(x)
    }
    #[inline]
    pub fn sin(x: f32) -> f32 {
        mm::sin(x)
    }
    #[inline]
    pub fn cos(x: f32) -> f32 {
        mm::cos(x)
    }
    #[inline]
    pub fn tan(x: f32) -> f32 {
        mm::tan(x)
    }
}

pub mod fallback {
    /// Returns the largest integer less than or equal to `x`.
    #[inline]
    pub fn floor(x: f32) -> f32 {
        let t = x as i64;
        (t - (x < t as f32) as i64) as f32
    }
    /// Returns the integer nearest to `x`, rounding half-way cases away
    /// from zero.
    #[inline]
    pub fn round(x: f32) -> f32 {
        let t = x as i64;
        let frac = x - t as f32;
        if frac >= 0.5 {
            (t + 1) as f32
        } else if frac <= -0.5 {
            (t - 1) as f32
        } else {
            t as f32
        }
    }
}

#[cfg(feature = "std")]
#[allow(non_camel_case_types)]
pub type f32 = core::primitive::f32;

#[cfg(all(feature = "libm", not(feature = "std")))]
pub use libm as f32;

#[cfg(all(feature = "mm", not(feature = "std"), not(feature = "libm")))]
pub use mm as f32;

#[cfg(not(feature = "fp"))]
pub use fallback as f32;
