//! Subsector visibility buffer.
//!
//! Instead of a depth buffer, the renderer resolves visibility with a
//! per-pixel *subsector token*: walls and planes are submitted roughly
//! front to back, each carrying a token that grows the further away its
//! subsector is. A draw tested against the buffer only touches pixels
//! whose stored token is at least its own, so nearer geometry drawn
//! earlier is not overwritten.

use alloc::vec::Vec;

use super::raster::BLOCK;

/// A canvas-sized buffer of subsector tokens, one per pixel.
#[derive(Clone, Eq, PartialEq)]
pub struct VisBuf {
    width: usize,
    height: usize,
    tokens: Vec<u32>,
}

impl VisBuf {
    /// Returns a `w` × `h` buffer with every token set to `token`.
    pub fn new(w: usize, h: usize, token: u32) -> Self {
        Self {
            width: w,
            height: h,
            tokens: alloc::vec![token; w * h],
        }
    }

    /// Returns the width of `self`.
    pub fn width(&self) -> usize {
        self.width
    }
    /// Returns the height of `self`.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the token at (`x`, `y`).
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.tokens[y * self.width + x]
    }

    /// Returns whether a draw with token `depth` may touch (`x`, `y`).
    #[inline]
    pub fn is_visible(&self, x: usize, y: usize, depth: u32) -> bool {
        self.get(x, y) >= depth
    }

    /// Returns row `y` of `self`.
    pub fn row(&self, y: usize) -> &[u32] {
        &self.tokens[y * self.width..][..self.width]
    }
    /// Returns row `y` of `self` mutably.
    pub fn row_mut(&mut self, y: usize) -> &mut [u32] {
        &mut self.tokens[y * self.width..][..self.width]
    }

    /// Sets every token to `token`.
    pub fn fill(&mut self, token: u32) {
        self.tokens.fill(token);
    }

    /// Returns the tokens of `self` split into bands of `BLOCK` rows.
    pub(crate) fn bands_mut(&mut self) -> impl Iterator<Item = &mut [u32]> {
        self.tokens.chunks_mut((self.width * BLOCK).max(1))
    }
}

impl core::fmt::Debug for VisBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisBuf")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
