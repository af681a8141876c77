//! Render targets.
//!
//! A [`Framebuf`] comprises a color buffer, a block-compressed stencil
//! buffer, and a subsector visibility buffer, all the size of the canvas.
//! To render on several cores at once, a framebuffer is [split][Framebuf::split]
//! into per-core [`CoreTarget`]s, each holding mutable borrows of the
//! 8-pixel bands owned by one core.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::util::buf::Buf2;

use super::blend::Palette;
use super::raster::BLOCK;
use super::stencil::{StencilBlock, StencilBuf};
use super::vis::VisBuf;

/// The layout of a pixel value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    /// An 8-bit index into a palette.
    Indexed,
    /// 32-bit direct color, 0xAARRGGBB.
    Argb,
}

/// Trait for types usable as color buffer pixels and texels.
pub trait Pixel: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    const FORMAT: PixelFormat;

    /// Returns `self` as a 0xAARRGGBB color.
    ///
    /// Indexed pixels are looked up in `pal`; without a palette, an index
    /// is interpreted as a gray level.
    fn to_argb(self, pal: Option<&Palette>) -> u32;

    /// Returns the pixel value closest to the 0xAARRGGBB color `argb`.
    fn from_argb(argb: u32, pal: Option<&Palette>) -> Self;

    /// Returns the opacity of `self` as a texel, from 0 to 255.
    fn alpha(self) -> u32;

    /// Returns the amount of the flat draw color `self` stands for when
    /// used as a coverage texel, from 0 to 255.
    fn coverage(self) -> u32;

    /// Maps `self` through a color translation table.
    fn translate(self, table: &[u8; 256]) -> Self;
}

impl Pixel for u8 {
    const FORMAT: PixelFormat = PixelFormat::Indexed;

    #[inline]
    fn to_argb(self, pal: Option<&Palette>) -> u32 {
        match pal {
            Some(p) => p.color(self),
            None => 0xFF_00_00_00 | self as u32 * 0x01_01_01,
        }
    }
    #[inline]
    fn from_argb(argb: u32, pal: Option<&Palette>) -> Self {
        match pal {
            Some(p) => p.nearest(argb),
            None => {
                let [_, r, g, b] = argb.to_be_bytes();
                ((r as u32 + g as u32 + b as u32) / 3) as u8
            }
        }
    }
    /// Index 0 is transparent, everything else opaque.
    #[inline]
    fn alpha(self) -> u32 {
        if self == 0 { 0 } else { 255 }
    }
    #[inline]
    fn coverage(self) -> u32 {
        self as u32
    }
    #[inline]
    fn translate(self, table: &[u8; 256]) -> Self {
        table[self as usize]
    }
}

impl Pixel for u32 {
    const FORMAT: PixelFormat = PixelFormat::Argb;

    #[inline]
    fn to_argb(self, _: Option<&Palette>) -> u32 {
        self
    }
    #[inline]
    fn from_argb(argb: u32, _: Option<&Palette>) -> Self {
        argb
    }
    #[inline]
    fn alpha(self) -> u32 {
        self >> 24
    }
    #[inline]
    fn coverage(self) -> u32 {
        self >> 24
    }
    /// Translation tables only apply to indexed texels.
    #[inline]
    fn translate(self, _: &[u8; 256]) -> Self {
        self
    }
}

/// Framebuffer, combining a color buffer with a stencil buffer and a
/// subsector visibility buffer of the same size.
#[derive(Clone, Debug)]
pub struct Framebuf<P> {
    pub color: Buf2<P>,
    pub stencil: StencilBuf,
    pub vis: VisBuf,
}

/// The part of a [`Framebuf`] owned by a single core.
///
/// Holds the 8-row bands `b` of the framebuffer for which
/// `b % num_cores == core`. Rows are addressed with canvas coordinates;
/// accessing a row not owned by `self` panics or, in debug builds,
/// fails an assertion.
pub struct CoreTarget<'a, P> {
    core: usize,
    num_cores: usize,
    width: usize,
    height: usize,
    color: Vec<&'a mut [P]>,
    stencil: Vec<&'a mut [StencilBlock]>,
    vis: Vec<&'a mut [u32]>,
}

impl<P: Pixel> Framebuf<P> {
    /// Returns a `w` × `h` framebuffer with the color buffer initialized
    /// to `P::default()` and the stencil and subsector buffers to zero.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            color: Buf2::new_default(w, h),
            stencil: StencilBuf::new(w, h, 0),
            vis: VisBuf::new(w, h, 0),
        }
    }

    /// Returns the width of `self` in pixels.
    pub fn width(&self) -> usize {
        self.color.width()
    }
    /// Returns the height of `self` in pixels.
    pub fn height(&self) -> usize {
        self.color.height()
    }
    /// Returns the width and height of `self`.
    pub fn size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Splits `self` into `num_cores` disjoint per-core targets.
    ///
    /// `num_cores` of zero is treated as one.
    pub fn split(&mut self, num_cores: usize) -> Vec<CoreTarget<'_, P>> {
        let n = num_cores.max(1);
        let (width, height) = self.size();
        let mut targets: Vec<_> = (0..n)
            .map(|core| CoreTarget {
                core,
                num_cores: n,
                width,
                height,
                color: Vec::new(),
                stencil: Vec::new(),
                vis: Vec::new(),
            })
            .collect();

        let color = self.color.data_mut().chunks_mut((width * BLOCK).max(1));
        let bands = color
            .zip(self.stencil.block_rows_mut())
            .zip(self.vis.bands_mut());
        for (b, ((c, s), v)) in bands.enumerate() {
            let t = &mut targets[b % n];
            t.color.push(c);
            t.stencil.push(s);
            t.vis.push(v);
        }
        targets
    }
}

impl<P> CoreTarget<'_, P> {
    /// Returns the index of the core owning `self`.
    pub fn core(&self) -> usize {
        self.core
    }
    /// Returns the total number of cores the framebuffer is split between.
    pub fn num_cores(&self) -> usize {
        self.num_cores
    }
    /// Returns the width of the whole framebuffer.
    pub fn width(&self) -> usize {
        self.width
    }
    /// Returns the height of the whole framebuffer.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns whether row `y` belongs to `self`.
    ///
    /// A framebuffer with zero width has no bands, so no core owns any of
    /// its rows.
    #[inline]
    pub fn owns(&self, y: usize) -> bool {
        self.width > 0
            && y < self.height
            && y / BLOCK % self.num_cores == self.core
    }

    /// Returns an iterator over the rows owned by `self`.
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.height).filter(|&y| self.owns(y))
    }

    #[inline]
    fn band(&self, y: usize) -> usize {
        debug_assert!(self.owns(y), "row {y} not owned by core {}", self.core);
        y / BLOCK / self.num_cores
    }

    /// Returns color buffer row `y`.
    pub fn color_row(&self, y: usize) -> &[P] {
        let w = self.width;
        &self.color[self.band(y)][y % BLOCK * w..][..w]
    }
    /// Returns color buffer row `y` mutably.
    pub fn color_row_mut(&mut self, y: usize) -> &mut [P] {
        let (b, w) = (self.band(y), self.width);
        &mut self.color[b][y % BLOCK * w..][..w]
    }

    /// Returns the stencil block containing pixel (`x`, `y`).
    #[inline]
    pub fn stencil_block(&self, x: usize, y: usize) -> &StencilBlock {
        &self.stencil[self.band(y)][x / BLOCK]
    }
    /// Returns the stencil block containing pixel (`x`, `y`) mutably.
    #[inline]
    pub fn stencil_block_mut(&mut self, x: usize, y: usize) -> &mut StencilBlock {
        let b = self.band(y);
        &mut self.stencil[b][x / BLOCK]
    }

    /// Returns subsector buffer row `y`.
    #[inline]
    pub fn vis_row(&self, y: usize) -> &[u32] {
        let w = self.width;
        &self.vis[self.band(y)][y % BLOCK * w..][..w]
    }
    /// Returns subsector buffer row `y` mutably.
    #[inline]
    pub fn vis_row_mut(&mut self, y: usize) -> &mut [u32] {
        let (b, w) = (self.band(y), self.width);
        &mut self.vis[b][y % BLOCK * w..][..w]
    }

    /// Sets every stencil value in the bands of `self` to `val`.
    pub fn clear_stencil(&mut self, val: u8) {
        for band in &mut self.stencil {
            band.iter_mut().for_each(|b| b.fill(val));
        }
    }
    /// Sets every subsector token in the bands of `self` to `token`.
    pub fn clear_vis(&mut self, token: u32) {
        for band in &mut self.vis {
            band.fill(token);
        }
    }
}

impl<P> Debug for CoreTarget<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CoreTarget")
            .field("core", &self.core)
            .field("num_cores", &self.num_cores)
            .field("bands", &self.color.len())
            .finish_non_exhaustive()
    }
}
