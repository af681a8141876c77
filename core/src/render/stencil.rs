//! Block-compressed stencil buffer.
//!
//! The stencil buffer is stored as 8×8 pixel blocks. Large regions of the
//! screen usually hold a single stencil value, so a block can be in one of
//! two states: *uniform*, where one value stands for all 64 pixels and the
//! per-pixel storage is ignored, or *materialized*, where every pixel has
//! its own value. Filling a block never touches its pixels; writing to
//! part of a uniform block first expands the uniform value into the
//! pixels, and a materialized block whose pixels all end up equal is
//! collapsed back to uniform.

use alloc::vec::Vec;

use super::raster::{BLOCK, BLOCK_PIXELS};

/// Whether a stencil block holds a single value or per-pixel values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlockState {
    /// Every pixel in the block has this value.
    Uniform(u8),
    /// Pixel values are stored individually.
    Materialized,
}

/// An 8×8 block of stencil values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StencilBlock {
    state: BlockState,
    pixels: [u8; BLOCK_PIXELS],
}

/// A stencil buffer covering a canvas, in 8×8 blocks.
#[derive(Clone, Debug)]
pub struct StencilBuf {
    blocks_w: usize,
    blocks_h: usize,
    blocks: Vec<StencilBlock>,
}

//
// Inherent impls
//

impl StencilBlock {
    /// Returns a uniform block with value `val`.
    pub const fn uniform(val: u8) -> Self {
        Self {
            state: BlockState::Uniform(val),
            pixels: [0; BLOCK_PIXELS],
        }
    }

    /// Returns a materialized block with the given pixel values, in
    /// row-major order.
    pub const fn from_pixels(pixels: [u8; BLOCK_PIXELS]) -> Self {
        Self { state: BlockState::Materialized, pixels }
    }

    /// Returns the state of `self`.
    #[inline]
    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Returns the single value of `self` if it is uniform.
    #[inline]
    pub fn value(&self) -> Option<u8> {
        match self.state {
            BlockState::Uniform(v) => Some(v),
            BlockState::Materialized => None,
        }
    }

    /// Returns the value of pixel `i`, counting in row-major order.
    #[inline]
    pub fn get(&self, i: usize) -> u8 {
        match self.state {
            BlockState::Uniform(v) => v,
            BlockState::Materialized => self.pixels[i],
        }
    }

    /// Returns the per-pixel storage of `self`.
    ///
    /// The contents are stale while `self` is uniform.
    pub fn raw_pixels(&self) -> &[u8; BLOCK_PIXELS] {
        &self.pixels
    }

    /// Makes every pixel of `self` equal to `val`.
    ///
    /// Only the block state is updated; the per-pixel storage is untouched.
    #[inline]
    pub fn fill(&mut self, val: u8) {
        self.state = BlockState::Uniform(val);
    }

    /// Sets the pixels selected by `mask` to `val`.
    ///
    /// Bit 31 of `mask[0]` selects pixel (0, 0) and bit 0 of `mask[1]`
    /// pixel (7, 7). A uniform block is materialized first; if all pixels
    /// hold `val` afterwards, the block becomes uniform again. Returns the
    /// number of pixels that hold `val` after the write.
    pub fn write_masked(&mut self, mask: [u32; 2], val: u8) -> usize {
        if let BlockState::Uniform(v) = self.state {
            self.pixels = [v; BLOCK_PIXELS];
            self.state = BlockState::Materialized;
        }
        let bits = (mask[0] as u64) << 32 | mask[1] as u64;
        let mut count = 0;
        for (i, px) in self.pixels.iter_mut().enumerate() {
            let covered = bits & (1 << (BLOCK_PIXELS - 1 - i)) != 0;
            if covered || *px == val {
                *px = val;
                count += 1;
            }
        }
        if count == BLOCK_PIXELS {
            self.state = BlockState::Uniform(val);
        }
        count
    }
}

impl StencilBuf {
    /// Returns a stencil buffer covering a `w` × `h` pixel canvas, with
    /// every pixel set to `val`.
    pub fn new(w: usize, h: usize, val: u8) -> Self {
        let blocks_w = w.div_ceil(BLOCK);
        let blocks_h = h.div_ceil(BLOCK);
        let blocks = alloc::vec![StencilBlock::uniform(val); blocks_w * blocks_h];
        Self { blocks_w, blocks_h, blocks }
    }

    /// Returns the width of `self` in blocks.
    pub fn blocks_w(&self) -> usize {
        self.blocks_w
    }
    /// Returns the height of `self` in blocks.
    pub fn blocks_h(&self) -> usize {
        self.blocks_h
    }

    /// Returns the block containing pixel (`x`, `y`).
    pub fn block(&self, x: usize, y: usize) -> &StencilBlock {
        &self.blocks[y / BLOCK * self.blocks_w + x / BLOCK]
    }
    /// Returns the block containing pixel (`x`, `y`) mutably.
    pub fn block_mut(&mut self, x: usize, y: usize) -> &mut StencilBlock {
        &mut self.blocks[y / BLOCK * self.blocks_w + x / BLOCK]
    }

    /// Returns the stencil value of pixel (`x`, `y`).
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.block(x, y).get(y % BLOCK * BLOCK + x % BLOCK)
    }

    /// Sets every pixel to `val`.
    pub fn clear(&mut self, val: u8) {
        self.blocks.iter_mut().for_each(|b| b.fill(val));
    }

    /// Returns the blocks of `self` split into block rows.
    pub(crate) fn block_rows_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut [StencilBlock]> {
        self.blocks.chunks_mut(self.blocks_w.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [u32; 2] = [!0, !0];

    #[test]
    fn new_is_uniform() {
        let buf = StencilBuf::new(20, 9, 3);
        assert_eq!((buf.blocks_w(), buf.blocks_h()), (3, 2));
        assert_eq!(buf.block(19, 8).value(), Some(3));
        assert_eq!(buf.get(19, 8), 3);
    }

    #[test]
    fn fill_leaves_pixels_untouched() {
        let sentinel = core::array::from_fn(|i| i as u8 ^ 0xA5);
        let mut b = StencilBlock::from_pixels(sentinel);
        b.fill(7);
        assert_eq!(b.value(), Some(7));
        assert_eq!(b.raw_pixels(), &sentinel);
        assert_eq!(b.get(13), 7);
    }

    #[test]
    fn partial_write_materializes() {
        let mut b = StencilBlock::uniform(1);
        // Top-left pixel only
        let n = b.write_masked([1 << 31, 0], 5);
        assert_eq!(n, 1);
        assert_eq!(b.state(), BlockState::Materialized);
        assert_eq!(b.get(0), 5);
        assert_eq!(b.get(1), 1);
        assert_eq!(b.get(63), 1);
    }

    #[test]
    fn mask_bit_order_is_row_major() {
        let mut b = StencilBlock::uniform(0);
        // Last pixel of row 3 and first pixel of row 4
        b.write_masked([1, 1 << 31], 9);
        assert_eq!(b.get(31), 9);
        assert_eq!(b.get(32), 9);
        assert_eq!(b.get(30), 0);
        assert_eq!(b.get(33), 0);
    }

    #[test]
    fn partial_writes_completing_block_become_uniform() {
        let mut b = StencilBlock::uniform(0);
        b.write_masked([!0, 0], 4);
        assert_eq!(b.value(), None);
        // Pixels already equal to the value count towards the total
        let n = b.write_masked([0, !0], 4);
        assert_eq!(n, 64);
        assert_eq!(b.value(), Some(4));
    }

    #[test]
    fn full_mask_write_to_uniform_block() {
        let mut b = StencilBlock::uniform(2);
        assert_eq!(b.write_masked(ALL, 6), 64);
        assert_eq!(b.value(), Some(6));
    }

    #[test]
    fn empty_mask_write_to_equal_uniform_block() {
        let mut b = StencilBlock::uniform(6);
        assert_eq!(b.write_masked([0, 0], 6), 64);
        assert_eq!(b.value(), Some(6));
    }

    #[test]
    fn clear_buffer() {
        let mut buf = StencilBuf::new(16, 16, 0);
        buf.block_mut(9, 9).write_masked([1 << 31, 0], 1);
        assert_eq!(buf.get(8, 8), 1);
        buf.clear(2);
        assert_eq!(buf.get(8, 8), 2);
        assert_eq!(buf.block(8, 8).value(), Some(2));
    }
}
