//! Approximate equality of floating-point values.
//!
//! Clipping and projection accumulate rounding error in every
//! interpolation step, so clip and screen coordinates are compared with a
//! tolerance instead of `==`. The tolerance is relative to the larger
//! magnitude of the two operands, but never smaller than `eps` itself, so
//! values near zero are compared with an absolute tolerance.

/// Default tolerance of [`ApproxEq::approx_eq`].
///
/// Looser without an accurate float backend, as the fallback functions
/// are approximations.
pub const EPSILON: f32 = if cfg!(any(feature = "std", feature = "libm")) {
    1e-6
} else {
    5e-3
};

/// Approximate equality with a relative tolerance.
pub trait ApproxEq {
    /// Returns whether `self` and `other` differ by at most `eps` times
    /// the larger of their magnitudes and one.
    fn approx_eq_eps(&self, other: &Self, eps: f32) -> bool;

    /// Returns whether `self` and `other` are equal within [`EPSILON`].
    fn approx_eq(&self, other: &Self) -> bool {
        self.approx_eq_eps(other, EPSILON)
    }
}

impl ApproxEq for f32 {
    fn approx_eq_eps(&self, other: &Self, eps: f32) -> bool {
        let abs = |x: f32| if x < 0.0 { -x } else { x };
        let scale = abs(*self).max(abs(*other)).max(1.0);
        abs(self - other) <= eps * scale
    }
}

impl<T: ApproxEq> ApproxEq for [T] {
    fn approx_eq_eps(&self, other: &Self, eps: f32) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a.approx_eq_eps(b, eps))
    }
}

impl<T: ApproxEq, const N: usize> ApproxEq for [T; N] {
    fn approx_eq_eps(&self, other: &Self, eps: f32) -> bool {
        self[..].approx_eq_eps(&other[..], eps)
    }
}

/// Asserts that two values are equal within a relative tolerance.
///
/// The tolerance defaults to [`EPSILON`](crate::math::approx::EPSILON)
/// and can be given as `eps = <expr>`.
///
/// # Examples
/// ```
/// use softpoly_core::assert_approx_eq;
///
/// assert_approx_eq!(0.1_f32 + 0.2, 0.3);
/// assert_approx_eq!([0.5_f32, -1.0], [0.5, -1.0000001]);
/// assert_approx_eq!(1000.0_f32, 1000.5, eps = 1e-3);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr) => {
        $crate::assert_approx_eq!($a, $b, eps = $crate::math::approx::EPSILON)
    };
    ($a:expr, $b:expr, eps = $eps:expr) => {{
        let (a, b) = (&$a, &$b);
        let eps: f32 = $eps;
        assert!(
            $crate::math::approx::ApproxEq::approx_eq_eps(a, b, eps),
            "{a:?} and {b:?} differ by more than eps = {eps}"
        );
    }};
}
