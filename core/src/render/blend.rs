//! Color blending and palettes.
//!
//! Blending happens in 8-bit-per-channel RGB. Indexed pixels are expanded
//! to RGB through a [`Palette`] and mapped back to the nearest palette
//! index through its 15-bit inverse lookup table.

use alloc::{boxed::Box, vec::Vec};

use crate::{Error, Result};

use super::target::{Pixel, PixelFormat};

/// How a shaded source color is combined with the color already in the
/// color buffer.
///
/// `sa` and `da` below are the source and destination alpha factors of
/// the draw call, 0 to 256. Texels with zero alpha (index 0 in indexed
/// textures) are transparent in every mode except `Copy`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BlendMode {
    /// Overwrites the destination with the source.
    #[default]
    Copy,
    /// Blends the source over the destination using the texel alpha.
    AlphaBlend,
    /// `color·sa + dst·da`, using the flat draw color for opaque texels.
    AddSolid,
    /// `src·sa + dst·da`.
    Add,
    /// `src·sa − dst·da`.
    Sub,
    /// `dst·da − src·sa`.
    RevSub,
    /// Blends the flat draw color over the destination by `sa`
    /// wherever the texel is opaque.
    Stencil,
    /// Blends the flat draw color over the destination by the texel
    /// value, scaled by `sa`.
    Shaded,
    /// `src + dst·(1 − src)`.
    AddSrcColorOneMinusSrcColor,
}

/// 256-color palette with an inverse lookup table.
#[derive(Clone, Eq, PartialEq)]
pub struct Palette {
    colors: [u32; 256],
    rgb32k: Box<[u8]>,
}

/// Per-draw-call blending parameters.
#[derive(Copy, Clone, Debug)]
pub struct BlendParams<'a> {
    /// The flat draw color as 0xAARRGGBB.
    pub color: u32,
    /// Source factor, 0 to 256.
    pub src_alpha: u32,
    /// Destination factor, 0 to 256.
    pub dest_alpha: u32,
    /// Palette for indexed pixels, if any.
    pub palette: Option<&'a Palette>,
}

/// A blend operation, selected once per draw call.
pub trait BlendOp {
    /// Returns the new value of a pixel with color `dst` when `src`,
    /// lit by `light` (0 to 256), is drawn over it, or `None` if the
    /// pixel is to be left unchanged.
    fn blend<P: Pixel>(src: P, dst: P, light: u32, p: &BlendParams) -> Option<P>;
}

//
// Inherent impls
//

impl BlendMode {
    /// Returns whether `self` blends colors arithmetically, and thus
    /// needs a palette when drawing to an indexed target.
    pub fn needs_palette(&self) -> bool {
        !matches!(self, Self::Copy | Self::AlphaBlend)
    }
}

impl Palette {
    /// Returns a palette with the given 0xAARRGGBB colors.
    ///
    /// # Errors
    /// If `colors` does not have exactly 256 entries.
    pub fn new(colors: &[u32]) -> Result<Self> {
        let colors: [u32; 256] = colors
            .try_into()
            .map_err(|_| Error::InvalidPalette { len: colors.len() })?;

        let rgb32k = (0..1u32 << 15)
            .map(|i| {
                let ch = |s: u32| {
                    let c = (i >> s) & 0x1F;
                    c << 3 | c >> 2
                };
                best_color(&colors, [ch(10), ch(5), ch(0)])
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self { colors, rgb32k })
    }

    /// Returns the color at index `i`.
    #[inline]
    pub fn color(&self, i: u8) -> u32 {
        self.colors[i as usize]
    }

    /// Returns the colors of `self`.
    pub fn colors(&self) -> &[u32; 256] {
        &self.colors
    }

    /// Returns the index of the color closest to `argb`, looked up with
    /// five bits of precision per channel.
    #[inline]
    pub fn nearest(&self, argb: u32) -> u8 {
        let i = (argb >> 9) & 0x7C00 | (argb >> 6) & 0x3E0 | (argb >> 3) & 0x1F;
        self.rgb32k[i as usize]
    }
}

impl core::fmt::Debug for Palette {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Palette").finish_non_exhaustive()
    }
}

impl BlendParams<'_> {
    /// Returns `src` lit by `light`.
    ///
    /// Indexed colors can only be lit through a palette; without one,
    /// they are returned unchanged.
    #[inline]
    pub fn lit<P: Pixel>(&self, src: P, light: u32) -> P {
        let unlit = light >= 256
            || (P::FORMAT == PixelFormat::Indexed && self.palette.is_none());
        if unlit {
            src
        } else {
            let c = shade(src.to_argb(self.palette), light);
            P::from_argb(argb(0xFF, c), self.palette)
        }
    }

    /// Combines `src` with the color of `dst` channel by channel with
    /// `f`, whose result has eight fractional bits.
    #[inline]
    fn combine<P: Pixel>(
        &self,
        src: [u32; 3],
        dst: P,
        f: impl Fn(u32, u32) -> u32,
    ) -> P {
        let d = rgb(dst.to_argb(self.palette));
        let c = [0, 1, 2].map(|i| (f(src[i], d[i]) >> 8).min(255));
        P::from_argb(argb(0xFF, c), self.palette)
    }
}

//
// Blend operations
//

/// The [`BlendOp`] of each [`BlendMode`].
pub mod ops {
    use super::*;

    pub struct Copy;
    pub struct AlphaBlend;
    pub struct AddSolid;
    pub struct Add;
    pub struct Sub;
    pub struct RevSub;
    pub struct Stencil;
    pub struct Shaded;
    pub struct AddSrcColorOneMinusSrcColor;

    impl BlendOp for Copy {
        #[inline]
        fn blend<P: Pixel>(s: P, _: P, l: u32, p: &BlendParams) -> Option<P> {
            Some(p.lit(s, l))
        }
    }

    impl BlendOp for AlphaBlend {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            match s.alpha() {
                0 => None,
                255 => Some(p.lit(s, l)),
                a => {
                    let s = shade(s.to_argb(p.palette), l);
                    Some(over(p, d, s, scale(a)))
                }
            }
        }
    }

    impl BlendOp for AddSolid {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            (s.alpha() != 0).then(|| {
                let c = shade(p.color, l);
                p.combine(c, d, |s, d| s * p.src_alpha + d * p.dest_alpha)
            })
        }
    }

    impl BlendOp for Add {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            (s.alpha() != 0).then(|| {
                let s = shade(s.to_argb(p.palette), l);
                p.combine(s, d, |s, d| s * p.src_alpha + d * p.dest_alpha)
            })
        }
    }

    impl BlendOp for Sub {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            (s.alpha() != 0).then(|| {
                let s = shade(s.to_argb(p.palette), l);
                p.combine(s, d, |s, d| {
                    (s * p.src_alpha).saturating_sub(d * p.dest_alpha)
                })
            })
        }
    }

    impl BlendOp for RevSub {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            (s.alpha() != 0).then(|| {
                let s = shade(s.to_argb(p.palette), l);
                p.combine(s, d, |s, d| {
                    (d * p.dest_alpha).saturating_sub(s * p.src_alpha)
                })
            })
        }
    }

    impl BlendOp for Stencil {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            (s.alpha() != 0).then(|| over(p, d, shade(p.color, l), p.src_alpha))
        }
    }

    impl BlendOp for Shaded {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            let a = scale(s.coverage()) * p.src_alpha.min(256) >> 8;
            (a != 0).then(|| over(p, d, shade(p.color, l), a))
        }
    }

    impl BlendOp for AddSrcColorOneMinusSrcColor {
        #[inline]
        fn blend<P: Pixel>(s: P, d: P, l: u32, p: &BlendParams) -> Option<P> {
            (s.alpha() != 0).then(|| {
                let s = shade(s.to_argb(p.palette), l);
                p.combine(s, d, |s, d| (s << 8) + d * (256 - scale(s)))
            })
        }
    }

    /// Blends `src` over `dst` with opacity `a`, 0 to 256.
    #[inline]
    fn over<P: Pixel>(p: &BlendParams, dst: P, src: [u32; 3], a: u32) -> P {
        let a = a.min(256);
        p.combine(src, dst, |s, d| s * a + d * (256 - a))
    }
}

//
// Free functions
//

/// Returns the channel value `a` scaled from 0..=255 to 0..=256.
#[inline]
fn scale(a: u32) -> u32 {
    a + (a >> 7)
}

#[inline]
fn rgb(c: u32) -> [u32; 3] {
    [(c >> 16) & 0xFF, (c >> 8) & 0xFF, c & 0xFF]
}

#[inline]
fn argb(a: u32, [r, g, b]: [u32; 3]) -> u32 {
    a << 24 | r.min(255) << 16 | g.min(255) << 8 | b.min(255)
}

/// Returns the RGB channels of `c` multiplied by `light / 256`.
#[inline]
fn shade(c: u32, light: u32) -> [u32; 3] {
    let light = light.min(256);
    rgb(c).map(|ch| ch * light >> 8)
}

fn best_color(colors: &[u32; 256], [r, g, b]: [u32; 3]) -> u8 {
    let dist = |c: &u32| {
        let [cr, cg, cb] = rgb(*c).map(|x| x as i32);
        let (dr, dg, db) = (cr - r as i32, cg - g as i32, cb - b as i32);
        dr * dr + dg * dg + db * db
    };
    let (i, _) = colors
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| dist(c))
        .unwrap_or((0, &0));
    i as u8
}
