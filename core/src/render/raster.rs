//! Coverage computation for triangles in 8×8 pixel blocks.
//!
//! Rasterization proceeds block by block over the screen-space bounding
//! box of a triangle. Each triangle edge is represented by a half-space
//! *edge function* in 28.4 fixed point, positive on the inside of the edge.
//! Evaluating the three edge functions at the four corners of a block
//! classifies it as either
//!
//! * fully outside, if all four corners are outside any one edge,
//! * fully inside, if all corners are inside all edges, or
//! * partially covered otherwise.
//!
//! Consecutive fully covered blocks on a block row are merged into
//! [*full spans*][FullSpan], and partially covered blocks are tested pixel
//! by pixel to produce [*partial blocks*][PartialBlock] carrying a 64-bit
//! coverage mask. The stencil and subsector buffers are consulted during
//! classification, so the resulting [`Coverage`] only contains pixels that
//! pass every test.
//!
//! Block rows ("bands") are distributed round-robin among the worker
//! cores: band `y / 8` belongs to core `(y / 8) % num_cores`, and each
//! core only ever visits its own bands.

use alloc::vec::Vec;
use core::ops::Range;

use crate::geom::Vertex;

use super::target::{CoreTarget, Pixel};

/// Width and height of a raster block in pixels.
pub const BLOCK: usize = 8;

/// Number of pixels in a raster block.
pub const BLOCK_PIXELS: usize = BLOCK * BLOCK;

/// Bits of subpixel precision in rasterizer coordinates.
const SUBPIXEL_BITS: u32 = 4;
const SUBPIXEL_SCALE: f32 = (1 << SUBPIXEL_BITS) as f32;

//
// Types
//

/// A pixel-aligned clipping rectangle; `right` and `bottom` are exclusive.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ClipRect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

/// A run of fully covered blocks on a single block row.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FullSpan {
    /// Pixel x coordinate of the first block.
    pub x: usize,
    /// Pixel y coordinate of the block row.
    pub y: usize,
    /// Number of blocks in the run.
    pub len: usize,
}

/// A partially covered block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PartialBlock {
    /// Pixel x coordinate of the block.
    pub x: usize,
    /// Pixel y coordinate of the block.
    pub y: usize,
    /// Coverage bits in row-major order, rows 0–3 in `mask[0]` and rows
    /// 4–7 in `mask[1]`. The most significant bit of each word is the
    /// leftmost pixel of its first row.
    pub mask: [u32; 2],
}

/// The set of pixels covered by a triangle on one core.
///
/// Every block is either absent, part of exactly one full span, or present
/// as exactly one partial block. The buffers are meant to be reused from
/// triangle to triangle.
#[derive(Clone, Debug, Default)]
pub struct Coverage {
    pub spans: Vec<FullSpan>,
    pub blocks: Vec<PartialBlock>,
    visited: usize,
}

/// Which per-pixel tests a triangle is subject to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SetupTest {
    /// A pixel passes if its stencil value equals `stencil`.
    Normal { stencil: u8 },
    /// A pixel passes if its stencil value is at least `stencil` and its
    /// subsector token is at least `depth`.
    Subsector { stencil: u8, depth: u32 },
}

/// Half-space function of one triangle edge.
#[derive(Copy, Clone, Debug)]
struct Edge {
    c: i64,
    dx: i64,
    dy: i64,
}

//
// Inherent impls
//

impl ClipRect {
    /// Returns whether `self` contains no pixels.
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Returns whether the whole block at (`x`, `y`) is inside `self`.
    #[inline]
    pub fn contains_block(&self, x: usize, y: usize) -> bool {
        x >= self.left
            && x + BLOCK <= self.right
            && y >= self.top
            && y + BLOCK <= self.bottom
    }

    /// Returns whether pixel (`x`, `y`) is inside `self`.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.left..self.right).contains(&x)
            && (self.top..self.bottom).contains(&y)
    }

    /// Returns `self` restricted to the given rows.
    #[must_use]
    pub fn intersect_rows(&self, rows: &Range<usize>) -> Self {
        Self {
            top: self.top.max(rows.start),
            bottom: self.bottom.min(rows.end),
            ..*self
        }
    }
}

impl FullSpan {
    /// Returns the number of pixels in `self`.
    pub fn pixel_count(&self) -> usize {
        self.len * BLOCK_PIXELS
    }

    /// Returns the pixel x coordinates covered by `self`.
    pub fn xs(&self) -> Range<usize> {
        self.x..self.x + self.len * BLOCK
    }
}

impl PartialBlock {
    /// Returns whether pixel (`ix`, `iy`) relative to the block's top left
    /// corner is covered.
    #[inline]
    pub fn covers(&self, ix: usize, iy: usize) -> bool {
        let bit = 31 - (iy % 4 * BLOCK + ix);
        self.mask[iy / 4] & (1 << bit) != 0
    }

    /// Returns the number of covered pixels.
    pub fn pixel_count(&self) -> usize {
        self.mask.iter().map(|m| m.count_ones() as usize).sum()
    }
}

impl Coverage {
    /// Returns a new, empty coverage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties `self` while retaining allocated memory.
    pub fn clear(&mut self) {
        self.spans.clear();
        self.blocks.clear();
        self.visited = 0;
    }

    /// Returns whether no pixels are covered.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty() && self.blocks.is_empty()
    }

    /// Returns the number of blocks examined by the last setup.
    pub fn blocks_visited(&self) -> usize {
        self.visited
    }

    /// Returns the number of blocks with nonzero coverage.
    pub fn blocks_covered(&self) -> usize {
        self.spans.iter().map(|s| s.len).sum::<usize>() + self.blocks.len()
    }

    /// Returns the total number of covered pixels.
    pub fn pixel_count(&self) -> usize {
        let full: usize = self.spans.iter().map(FullSpan::pixel_count).sum();
        let part: usize = self.blocks.iter().map(PartialBlock::pixel_count).sum();
        full + part
    }

    /// Calls `f` with the coordinates of every covered pixel.
    ///
    /// Pixels of full spans are visited before pixels of partial blocks.
    pub fn for_each_pixel(&self, mut f: impl FnMut(usize, usize)) {
        for s in &self.spans {
            for y in s.y..s.y + BLOCK {
                s.xs().for_each(|x| f(x, y));
            }
        }
        for b in &self.blocks {
            for iy in 0..BLOCK {
                for ix in (0..BLOCK).filter(|&ix| b.covers(ix, iy)) {
                    f(b.x + ix, b.y + iy);
                }
            }
        }
    }

    fn accept(&mut self, x: usize, y: usize, open: &mut bool) {
        match self.spans.last_mut() {
            Some(s) if *open => s.len += 1,
            _ => self.spans.push(FullSpan { x, y, len: 1 }),
        }
        *open = true;
    }
}

impl SetupTest {
    /// Returns the stencil reference value.
    pub fn stencil(&self) -> u8 {
        match *self {
            Self::Normal { stencil } | Self::Subsector { stencil, .. } => {
                stencil
            }
        }
    }

    /// Returns whether a pixel with stencil value `val` passes.
    #[inline]
    pub fn stencil_pass(&self, val: u8) -> bool {
        match *self {
            Self::Normal { stencil } => val == stencil,
            Self::Subsector { stencil, .. } => val >= stencil,
        }
    }

    /// Returns whether a pixel with subsector token `token` passes.
    #[inline]
    pub fn vis_pass(&self, token: u32) -> bool {
        match *self {
            Self::Normal { .. } => true,
            Self::Subsector { depth, .. } => token >= depth,
        }
    }
}

impl Edge {
    /// Returns the edge function of the edge from `a` to `b`, including
    /// the top-left fill convention bias.
    fn new((x1, y1): (i64, i64), (x2, y2): (i64, i64)) -> Self {
        let (dx, dy) = (x1 - x2, y1 - y2);
        let mut c = dy * x1 - dx * y1;
        // Pixels exactly on a top or left edge are inside
        if dy < 0 || (dy == 0 && dx > 0) {
            c += 1;
        }
        Self { c, dx, dy }
    }

    /// Evaluates `self` at pixel (`x`, `y`).
    #[inline]
    fn eval(&self, x: i64, y: i64) -> i64 {
        self.c + self.dx * (y << SUBPIXEL_BITS) - self.dy * (x << SUBPIXEL_BITS)
    }

    /// Returns a four-bit mask of the corners of the block at (`x`, `y`)
    /// that are inside `self`.
    #[inline]
    fn corners(&self, x: i64, y: i64) -> u8 {
        let last = BLOCK as i64 - 1;
        (self.eval(x, y) > 0) as u8
            | ((self.eval(x + last, y) > 0) as u8) << 1
            | ((self.eval(x, y + last) > 0) as u8) << 2
            | ((self.eval(x + last, y + last) > 0) as u8) << 3
    }
}

/// Converts a screen coordinate to 28.4 fixed point.
#[inline]
fn to_fixed(a: f32) -> i64 {
    use crate::math::float::f32;
    f32::round(a * SUBPIXEL_SCALE) as i64
}

/// Returns the smallest pixel coordinate at or above the 28.4 value `a`.
#[inline]
fn ceil_px(a: i64) -> i64 {
    (a + (1 << SUBPIXEL_BITS) - 1) >> SUBPIXEL_BITS
}

/// Computes the coverage of the screen-space triangle `verts` on the bands
/// of the core owning `target`, and writes it to `out`.
///
/// Pixels are sampled at integer coordinates. A pixel is covered if it is
/// strictly inside all three edges, or exactly on an edge that is a top or
/// left edge. Only triangles with positive orientation in screen space
/// (counter-clockwise with y up) cover anything. Only pixels inside `clip`
/// that pass `test` are included.
///
/// If the bounding box of the triangle has no area within `clip`, `out`
/// is left empty.
pub fn setup<P: Pixel>(
    verts: [&Vertex; 3],
    test: SetupTest,
    clip: &ClipRect,
    target: &CoreTarget<P>,
    out: &mut Coverage,
) {
    out.clear();

    let [p1, p2, p3] = verts.map(|v| (to_fixed(v.x()), to_fixed(v.y())));
    let edges = [Edge::new(p1, p2), Edge::new(p2, p3), Edge::new(p3, p1)];

    let xs = [p1.0, p2.0, p3.0];
    let ys = [p1.1, p2.1, p3.1];
    let (Some(&x_lo), Some(&x_hi)) = (xs.iter().min(), xs.iter().max()) else {
        return;
    };
    let (Some(&y_lo), Some(&y_hi)) = (ys.iter().min(), ys.iter().max()) else {
        return;
    };

    // Bounding box in pixels, max exclusive
    let min_x = ceil_px(x_lo).max(clip.left as i64);
    let max_x = ((x_hi >> SUBPIXEL_BITS) + 1).min(clip.right as i64);
    let min_y = ceil_px(y_lo).max(clip.top as i64);
    let max_y = ((y_hi >> SUBPIXEL_BITS) + 1).min(clip.bottom as i64);
    if min_x >= max_x || min_y >= max_y {
        return;
    }
    let (min_x, max_x) = (min_x as usize, max_x as usize);
    let (min_y, max_y) = (min_y as usize, max_y as usize);

    // Start at the block containing the top left corner, then skip to
    // the first band owned by this core
    let min_x = min_x & !(BLOCK - 1);
    let min_y = min_y & !(BLOCK - 1);
    let (core, n) = (target.core(), target.num_cores());
    let skip = (core + n - min_y / BLOCK % n) % n;

    for y in (min_y + skip * BLOCK..max_y).step_by(BLOCK * n) {
        debug_assert!(target.owns(y), "band at y={y} not owned by {core}");
        let mut open = false;

        for x in (min_x..max_x).step_by(BLOCK) {
            out.visited += 1;

            let stencil = target.stencil_block(x, y);
            let uniform = stencil.value();
            let skip_block = uniform.is_some_and(|v| !test.stencil_pass(v));

            let (bx, by) = (x as i64, y as i64);
            let masks = edges.map(|e| e.corners(bx, by));
            if skip_block || masks.contains(&0) {
                open = false;
                continue;
            }

            let fully_inside = masks == [0xF; 3]
                && clip.contains_block(x, y)
                && uniform.is_some();
            if fully_inside && vis_pass_block(&test, target, x, y) {
                out.accept(x, y, &mut open);
                continue;
            }

            let mask = partial_mask(&edges, &test, clip, target, x, y);
            match mask {
                [0, 0] => open = false,
                [u32::MAX, u32::MAX] => out.accept(x, y, &mut open),
                mask => {
                    out.blocks.push(PartialBlock { x, y, mask });
                    open = false;
                }
            }
        }
    }
}

/// Returns whether every pixel of the block at (`x`, `y`) passes the
/// subsector test.
fn vis_pass_block<P: Pixel>(
    test: &SetupTest,
    target: &CoreTarget<P>,
    x: usize,
    y: usize,
) -> bool {
    match test {
        SetupTest::Normal { .. } => true,
        SetupTest::Subsector { .. } => (y..y + BLOCK).all(|y| {
            target.vis_row(y)[x..x + BLOCK]
                .iter()
                .all(|&t| test.vis_pass(t))
        }),
    }
}

/// Tests each pixel of the block at (`x`, `y`) and returns its coverage
/// mask.
fn partial_mask<P: Pixel>(
    edges: &[Edge; 3],
    test: &SetupTest,
    clip: &ClipRect,
    target: &CoreTarget<P>,
    x: usize,
    y: usize,
) -> [u32; 2] {
    let stencil = target.stencil_block(x, y);
    let mut bits = 0u64;
    for iy in 0..BLOCK {
        let py = y + iy;
        let vis = (py < clip.bottom).then(|| target.vis_row(py));
        for ix in 0..BLOCK {
            let px = x + ix;
            let covered = clip.contains(px, py)
                && edges.iter().all(|e| e.eval(px as i64, py as i64) > 0)
                && test.stencil_pass(stencil.get(iy * BLOCK + ix))
                && vis.is_none_or(|row| test.vis_pass(row[px]));
            bits = bits << 1 | covered as u64;
        }
    }
    [(bits >> 32) as u32, bits as u32]
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::geom::vertex;
    use crate::render::stencil::StencilBlock;
    use crate::render::target::Framebuf;
    use crate::util::buf::Buf2;

    use super::*;

    const NORMAL: SetupTest = SetupTest::Normal { stencil: 0 };

    fn v(x: f32, y: f32) -> Vertex {
        vertex([x, y, 0.0, 1.0], [0.0; 2])
    }

    fn full(w: usize, h: usize) -> ClipRect {
        ClipRect { left: 0, top: 0, right: w, bottom: h }
    }

    fn rasterize(
        fb: &mut Framebuf<u32>,
        tri: [Vertex; 3],
        test: SetupTest,
    ) -> Coverage {
        let clip = full(fb.width(), fb.height());
        let targets = fb.split(1);
        let mut cov = Coverage::new();
        setup([&tri[0], &tri[1], &tri[2]], test, &clip, &targets[0], &mut cov);
        cov
    }

    fn coverage_map(w: usize, h: usize, covs: &[&Coverage]) -> Buf2<u8> {
        let mut map = Buf2::new_default(w, h);
        for c in covs {
            c.for_each_pixel(|x, y| map[[x, y]] += 1);
        }
        map
    }

    #[test]
    fn edge_function_sign() {
        // Positive on the left of the edge from (0,0) to (0,16) in a
        // y-down coordinate system
        let e = Edge::new((0, 0), (0, 16 * 16));
        assert!(e.eval(1, 1) > 0);
        assert!(e.eval(-1, 1) < 0);
    }

    #[test]
    fn fill_convention_bias_on_opposite_edges() {
        let a = (3 * 16, 5 * 16);
        let b = (11 * 16, 2 * 16);
        let (ab, ba) = (Edge::new(a, b), Edge::new(b, a));
        // Exactly one of the two directions gets the bias
        assert_eq!(ab.c + ba.c, 1);
        assert_eq!((ab.dx, ab.dy), (-ba.dx, -ba.dy));
    }

    #[test]
    fn partial_block_bit_order() {
        let b = PartialBlock { x: 0, y: 0, mask: [1 << 31, 1] };
        assert!(b.covers(0, 0));
        assert!(b.covers(7, 7));
        assert!(!b.covers(1, 0));
        assert!(!b.covers(0, 4));
        assert_eq!(b.pixel_count(), 2);
    }

    #[test]
    fn clip_rect_rows() {
        let r = full(64, 64).intersect_rows(&(8..16));
        assert_eq!(r, ClipRect { left: 0, top: 8, right: 64, bottom: 16 });
        assert!(r.contains_block(56, 8));
        assert!(!r.contains_block(56, 16));
        assert!(full(8, 0).is_empty());
    }

    #[test]
    fn collinear_triangle_is_empty() {
        let mut fb = Framebuf::new(32, 32);
        let cov = rasterize(&mut fb, [v(1.0, 1.0), v(9.0, 1.0), v(20.0, 1.0)], NORMAL);
        assert!(cov.is_empty());
    }

    #[test]
    fn sliver_between_pixel_columns_is_skipped() {
        // No pixel center in 1.2 ≤ x ≤ 1.7
        let mut fb = Framebuf::new(32, 32);
        let cov = rasterize(&mut fb, [v(1.2, 0.0), v(1.7, 10.0), v(1.5, 5.0)], NORMAL);
        assert!(cov.is_empty());
        assert_eq!(cov.blocks_visited(), 0);
    }

    #[test]
    fn offscreen_triangle_is_empty() {
        let mut fb = Framebuf::new(32, 32);
        let cov = rasterize(
            &mut fb,
            [v(40.0, 40.0), v(40.0, 60.0), v(60.0, 40.0)],
            NORMAL,
        );
        assert!(cov.is_empty());
    }

    #[test]
    fn back_facing_triangle_is_empty() {
        let mut fb = Framebuf::new(32, 32);
        let cov =
            rasterize(&mut fb, [v(0.0, 0.0), v(20.0, 0.0), v(0.0, 20.0)], NORMAL);
        assert!(cov.is_empty());
        // Visited, but nothing covered
        assert!(cov.blocks_visited() > 0);
    }

    #[test]
    fn small_triangle_is_single_partial_block() {
        //   0 1 2 3 4
        // 0 * * * * .
        // 1 * * * . .
        // 2 * * . . .
        // 3 * . . . .
        // 4 . . . . .
        let mut fb = Framebuf::new(16, 16);
        let cov =
            rasterize(&mut fb, [v(0.0, 0.0), v(0.0, 4.0), v(4.0, 0.0)], NORMAL);
        assert!(cov.spans.is_empty());
        assert_eq!(cov.blocks.len(), 1);
        let b = cov.blocks[0];
        assert_eq!((b.x, b.y), (0, 0));
        assert_eq!(b.mask, [0xF0_E0_C0_80, 0]);
    }

    #[test]
    fn shared_edge_covered_exactly_once() {
        //  0                 19
        //  +------------------+ 0
        //  |  \       B       |
        //  |     \            |
        //  |   A    \         |
        //  |           \      |
        //  +------------------+ 13
        let (w, h) = (24, 16);
        let mut fb = Framebuf::new(w, h);
        let (a, b, c, d) =
            (v(0.0, 0.0), v(0.0, 13.0), v(19.0, 13.0), v(19.0, 0.0));

        let ca = rasterize(&mut fb, [a, b, c], NORMAL);
        let cb = rasterize(&mut fb, [a, c, d], NORMAL);

        let map = coverage_map(w, h, &[&ca, &cb]);
        for y in 0..h {
            for x in 0..w {
                let inside = x < 19 && y < 13;
                let expected = inside as u8;
                assert_eq!(map[[x, y]], expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn aligned_rectangle_is_all_full_spans() {
        // A triangle much larger than the screen covers every block
        let mut fb = Framebuf::new(32, 24);
        let cov = rasterize(
            &mut fb,
            [v(-100.0, -100.0), v(-100.0, 300.0), v(300.0, -100.0)],
            NORMAL,
        );
        assert!(cov.blocks.is_empty());
        assert_eq!(
            cov.spans,
            [
                FullSpan { x: 0, y: 0, len: 4 },
                FullSpan { x: 0, y: 8, len: 4 },
                FullSpan { x: 0, y: 16, len: 4 },
            ]
        );
        assert_eq!(cov.pixel_count(), 32 * 24);
        assert_eq!(cov.blocks_covered(), 12);
    }

    #[test]
    fn clip_rect_produces_partial_edge_blocks() {
        let mut fb = Framebuf::<u32>::new(32, 16);
        let targets = fb.split(1);
        let tri = [v(-100.0, -100.0), v(-100.0, 300.0), v(300.0, -100.0)];
        let clip = ClipRect { left: 4, top: 0, right: 28, bottom: 8 };
        let mut cov = Coverage::new();
        setup([&tri[0], &tri[1], &tri[2]], NORMAL, &clip, &targets[0], &mut cov);

        assert_eq!(cov.spans, [FullSpan { x: 8, y: 0, len: 2 }]);
        assert_eq!(cov.blocks.len(), 2);
        assert_eq!(cov.blocks[0].mask, [0x0F0F_0F0F; 2]);
        assert_eq!(cov.blocks[1].mask, [0xF0F0_F0F0; 2]);
        assert_eq!(cov.pixel_count(), 24 * 8);
    }

    #[test]
    fn stencil_mismatch_skips_uniform_blocks() {
        let mut fb = Framebuf::<u32>::new(16, 8);
        fb.stencil.block_mut(8, 0).fill(1);
        let cov = rasterize(
            &mut fb,
            [v(-100.0, -100.0), v(-100.0, 300.0), v(300.0, -100.0)],
            NORMAL,
        );
        assert_eq!(cov.spans, [FullSpan { x: 0, y: 0, len: 1 }]);
        assert!(cov.blocks.is_empty());
    }

    #[test]
    fn stencil_tested_per_pixel_in_materialized_block() {
        let mut fb = Framebuf::<u32>::new(8, 8);
        // Left half of the block 1, right half 0
        let px = core::array::from_fn(|i| (i % 8 < 4) as u8);
        *fb.stencil.block_mut(0, 0) = StencilBlock::from_pixels(px);
        let cov = rasterize(
            &mut fb,
            [v(-100.0, -100.0), v(-100.0, 300.0), v(300.0, -100.0)],
            NORMAL,
        );
        assert!(cov.spans.is_empty());
        assert_eq!(cov.blocks, [PartialBlock { x: 0, y: 0, mask: [0x0F0F_0F0F; 2] }]);
    }

    #[test]
    fn fully_passing_materialized_block_joins_span() {
        let mut fb = Framebuf::<u32>::new(16, 8);
        *fb.stencil.block_mut(0, 0) = StencilBlock::from_pixels([0; 64]);
        let cov = rasterize(
            &mut fb,
            [v(-100.0, -100.0), v(-100.0, 300.0), v(300.0, -100.0)],
            NORMAL,
        );
        // Tested per pixel, but every pixel passes
        assert!(cov.blocks.is_empty());
        assert_eq!(cov.spans, [FullSpan { x: 0, y: 0, len: 2 }]);
    }

    #[test]
    fn subsector_test_masks_occluded_pixels() {
        let mut fb = Framebuf::<u32>::new(16, 8);
        fb.vis.fill(5);
        // Top row of the second block already has a nearer token
        for x in 8..16 {
            fb.vis.row_mut(0)[x] = 3;
        }
        let test = SetupTest::Subsector { stencil: 0, depth: 4 };
        let cov = rasterize(
            &mut fb,
            [v(-100.0, -100.0), v(-100.0, 300.0), v(300.0, -100.0)],
            test,
        );
        assert_eq!(cov.spans, [FullSpan { x: 0, y: 0, len: 1 }]);
        assert_eq!(cov.blocks, [PartialBlock { x: 8, y: 0, mask: [0x00FF_FFFF, !0] }]);
    }

    #[test]
    fn subsector_stencil_test_is_greater_or_equal() {
        let mut fb = Framebuf::<u32>::new(24, 8);
        fb.stencil.block_mut(0, 0).fill(2);
        fb.stencil.block_mut(8, 0).fill(3);
        fb.stencil.block_mut(16, 0).fill(1);
        let test = SetupTest::Subsector { stencil: 2, depth: 0 };
        let cov = rasterize(
            &mut fb,
            [v(-100.0, -100.0), v(-100.0, 300.0), v(300.0, -100.0)],
            test,
        );
        assert_eq!(cov.spans, [FullSpan { x: 0, y: 0, len: 2 }]);
    }

    #[test]
    fn bands_are_split_between_cores() {
        let (w, h) = (16, 40);
        let mut fb = Framebuf::<u32>::new(w, h);
        let clip = full(w, h);
        let tri = [v(1.0, 1.0), v(3.0, 39.0), v(15.0, 2.0)];
        let covs: Vec<_> = fb
            .split(3)
            .iter()
            .map(|t| {
                let mut cov = Coverage::new();
                setup([&tri[0], &tri[1], &tri[2]], NORMAL, &clip, t, &mut cov);
                cov
            })
            .collect();

        for (core, cov) in covs.iter().enumerate() {
            cov.for_each_pixel(|_, y| assert_eq!(y / 8 % 3, core));
        }
        let map = coverage_map(w, h, &covs.iter().collect::<Vec<_>>());
        assert!(map.data().iter().all(|&n| n <= 1));

        let mut serial = Coverage::new();
        let targets = fb.split(1);
        setup([&tri[0], &tri[1], &tri[2]], NORMAL, &clip, &targets[0], &mut serial);
        let total: usize = covs.iter().map(Coverage::pixel_count).sum();
        assert_eq!(total, serial.pixel_count());
        assert!(total > 0);
    }

    #[test]
    fn coverage_reuse_clears_previous() {
        let mut fb = Framebuf::<u32>::new(16, 16);
        let targets = fb.split(1);
        let clip = full(16, 16);
        let mut cov = Coverage {
            spans: vec![FullSpan { x: 0, y: 0, len: 9 }],
            ..Coverage::default()
        };
        let tri = [v(40.0, 0.0), v(40.0, 4.0), v(44.0, 0.0)];
        setup([&tri[0], &tri[1], &tri[2]], NORMAL, &clip, &targets[0], &mut cov);
        assert!(cov.is_empty());
    }
}
