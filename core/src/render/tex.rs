//! Textures and texture sampling.

use alloc::vec::Vec;

use crate::{Error, Result};

/// A texture stored in column-major order.
///
/// Texel (u, v) is at index `u * height + v`, so that walls, which are
/// drawn in vertical strips, read their texels sequentially.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Texture<P> {
    width: usize,
    height: usize,
    texels: Vec<P>,
}

impl<P: Copy> Texture<P> {
    /// Returns a texture of size `width` × `height` with the given texels
    /// in column-major order.
    ///
    /// # Errors
    /// If either dimension is zero or `texels.len() != width * height`.
    pub fn new(width: usize, height: usize, texels: Vec<P>) -> Result<Self> {
        if width == 0 || height == 0 || texels.len() != width * height {
            return Err(Error::TextureSize {
                width,
                height,
                len: texels.len(),
            });
        }
        Ok(Self { width, height, texels })
    }

    /// Returns a texture of size `width` × `height` with texel (u, v)
    /// initialized to `f(u, v)`.
    ///
    /// # Errors
    /// If either dimension is zero.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> P,
    {
        let texels = (0..width)
            .flat_map(|u| (0..height).map(move |v| (u, v)))
            .map(|(u, v)| f(u, v))
            .collect();
        Self::new(width, height, texels)
    }

    /// Returns the width of `self` in texels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }
    /// Returns the height of `self` in texels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the texels of `self` in column-major order.
    pub fn texels(&self) -> &[P] {
        &self.texels
    }

    /// Returns texel (`u`, `v`).
    ///
    /// # Panics
    /// If `u` or `v` is out of bounds.
    #[inline]
    pub fn get(&self, u: usize, v: usize) -> P {
        assert!(v < self.height, "v = {v} out of bounds");
        self.texels[u * self.height + v]
    }

    /// Samples `self` at the 0.16 fixed-point texture coordinates
    /// (`u`, `v`), which wrap around at 1.
    #[inline]
    pub fn sample(&self, u: u32, v: u32) -> P {
        let x = ((u & 0xFFFF) as usize * self.width) >> 16;
        let y = ((v & 0xFFFF) as usize * self.height) >> 16;
        self.texels[x * self.height + y]
    }
}

/// Returns the fractional part of `a` as a 0.16 fixed-point number.
///
/// Negative values wrap, so that `frac16(-0.25) == frac16(0.75)`.
#[inline]
pub fn frac16(a: f32) -> u32 {
    ((a * 65536.0) as i64 as u32) & 0xFFFF
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn wrong_size_is_error() {
        assert_eq!(
            Texture::new(3, 2, vec![0u8; 5]),
            Err(Error::TextureSize { width: 3, height: 2, len: 5 })
        );
        assert!(Texture::<u8>::new(0, 2, vec![]).is_err());
    }

    #[test]
    fn column_major_layout() {
        let tex = Texture::new(2, 3, vec![0, 1, 2, 10, 11, 12]).unwrap();
        assert_eq!(tex.get(0, 2), 2);
        assert_eq!(tex.get(1, 0), 10);

        let tex = Texture::from_fn(2, 3, |u, v| 10 * u + v).unwrap();
        assert_eq!(tex.texels(), &[0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn fractions_wrap() {
        assert_eq!(frac16(0.0), 0);
        assert_eq!(frac16(0.5), 0x8000);
        assert_eq!(frac16(3.25), 0x4000);
        assert_eq!(frac16(-0.25), 0xC000);
    }

    #[test]
    fn sample_nearest() {
        let tex = Texture::from_fn(4, 2, |u, v| (u, v)).unwrap();
        assert_eq!(tex.sample(0, 0), (0, 0));
        assert_eq!(tex.sample(0x4000, 0x7FFF), (1, 0));
        assert_eq!(tex.sample(0xFFFF, 0x8000), (3, 1));
        assert_eq!(tex.sample(frac16(1.3), frac16(-0.2)), (1, 1));
    }
}
