//! Coverage consumers: the passes that write a rasterized triangle's
//! coverage into the color, stencil, and subsector buffers.
//!
//! The color pass shades pixels with perspective-correct texture
//! coordinates and distance-based light, and blends them into the color
//! buffer. Its inner loop is monomorphized for every blend mode and for
//! textured and flat-colored triangles; the right variant is selected once
//! per draw call with [`select`].

use crate::geom::Vertex;

use super::blend::{BlendMode, BlendOp, BlendParams, ops};
use super::raster::{BLOCK, Coverage};
use super::target::{CoreTarget, Pixel};
use super::tex::{Texture, frac16};

/// Light falloff constant: how quickly light fades with distance.
const GLOBAL_VIS: f32 = 1706.0;

/// Per-draw-call shading state.
#[derive(Copy, Clone, Debug)]
pub struct Shading<'a, P> {
    pub texture: Option<&'a Texture<P>>,
    pub translation: Option<&'a [u8; 256]>,
    /// The flat draw color, used by fill draws and by the blend modes
    /// that draw with a solid color.
    pub color: P,
    /// Sector light level, 0 to 256.
    pub light: u32,
    pub blend: BlendParams<'a>,
}

/// A color pass routine.
pub type DrawFn<P> =
    fn(&Shading<P>, [&Vertex; 3], &Coverage, &mut CoreTarget<P>);

/// An attribute linearly interpolated in screen space.
#[derive(Copy, Clone, Debug, Default)]
struct Plane {
    at: f32,
    dx: f32,
    dy: f32,
    x0: f32,
    y0: f32,
}

/// Light level as a function of 1/w.
#[derive(Copy, Clone, Debug)]
struct LightRamp {
    shade: f32,
}

impl Plane {
    /// Returns the plane through the points (x, y, c) of the three
    /// vertices.
    fn new(v: [&Vertex; 3], c: [f32; 3]) -> Self {
        let [(x0, y0), (x1, y1), (x2, y2)] = v.map(|v| (v.x(), v.y()));
        let [c0, c1, c2] = c;
        let det = (x1 - x2) * (y0 - y2) - (x0 - x2) * (y1 - y2);
        let (dx, dy) = if det == 0.0 {
            (0.0, 0.0)
        } else {
            let dx = (c1 - c2) * (y0 - y2) - (c0 - c2) * (y1 - y2);
            let dy = (c1 - c2) * (x0 - x2) - (c0 - c2) * (x1 - x2);
            (dx / det, -dy / det)
        };
        Self { at: c0, dx, dy, x0, y0 }
    }

    #[inline]
    fn eval(&self, x: f32, y: f32) -> f32 {
        self.at + self.dx * (x - self.x0) + self.dy * (y - self.y0)
    }
}

impl LightRamp {
    fn new(light: u32) -> Self {
        let l = (light.min(256) * 255 / 256) as f32;
        Self {
            shade: (64.0 - (l + 12.0) * 32.0 / 128.0) / 32.0,
        }
    }

    /// Returns the light level, 0 to 256, at reciprocal depth `w_inv`.
    #[inline]
    fn at(&self, w_inv: f32) -> u32 {
        let vis = (GLOBAL_VIS * w_inv).min(24.0) / 32.0;
        let dark = (self.shade - vis).clamp(0.0, 31.0 / 32.0);
        256 - (dark * 256.0) as u32
    }
}

/// Returns the color pass routine for `mode`, textured or flat.
pub fn select<P: Pixel>(mode: BlendMode, textured: bool) -> DrawFn<P> {
    macro_rules! pick {
        ($op:ty) => {
            if textured {
                color_pass::<P, $op, true>
            } else {
                color_pass::<P, $op, false>
            }
        };
    }
    match mode {
        BlendMode::Copy => pick!(ops::Copy),
        BlendMode::AlphaBlend => pick!(ops::AlphaBlend),
        BlendMode::AddSolid => pick!(ops::AddSolid),
        BlendMode::Add => pick!(ops::Add),
        BlendMode::Sub => pick!(ops::Sub),
        BlendMode::RevSub => pick!(ops::RevSub),
        BlendMode::Stencil => pick!(ops::Stencil),
        BlendMode::Shaded => pick!(ops::Shaded),
        BlendMode::AddSrcColorOneMinusSrcColor => {
            pick!(ops::AddSrcColorOneMinusSrcColor)
        }
    }
}

/// Shades and blends every pixel of `cov` into the color buffer.
fn color_pass<P: Pixel, B: BlendOp, const TEX: bool>(
    sh: &Shading<P>,
    verts: [&Vertex; 3],
    cov: &Coverage,
    target: &mut CoreTarget<P>,
) {
    let w_inv = Plane::new(verts, verts.map(Vertex::w));
    let uv = [0, 1].map(|i| Plane::new(verts, verts.map(|v| v.var[i] * v.w())));
    let light = LightRamp::new(sh.light);
    let tex = if TEX { sh.texture } else { None };

    let shade = |x: usize, y: usize, dst: &mut P| {
        let (x, y) = (x as f32, y as f32);
        let wi = w_inv.eval(x, y);
        let src = match tex {
            Some(tex) => {
                let z = 1.0 / wi;
                let [u, v] = uv.map(|p| frac16(p.eval(x, y) * z));
                let texel = tex.sample(u, v);
                sh.translation.map_or(texel, |t| texel.translate(t))
            }
            None => sh.color,
        };
        if let Some(c) = B::blend(src, *dst, light.at(wi), &sh.blend) {
            *dst = c;
        }
    };

    for span in &cov.spans {
        for y in span.y..span.y + BLOCK {
            let row = target.color_row_mut(y);
            for x in span.xs() {
                shade(x, y, &mut row[x]);
            }
        }
    }
    for block in &cov.blocks {
        for iy in 0..BLOCK {
            let y = block.y + iy;
            let row = target.color_row_mut(y);
            for ix in (0..BLOCK).filter(|&ix| block.covers(ix, iy)) {
                let x = block.x + ix;
                shade(x, y, &mut row[x]);
            }
        }
    }
}

/// Writes `val` to the stencil buffer at every pixel of `cov`.
///
/// Full spans only update the block states. Partial blocks are
/// materialized if needed and collapse back to a uniform block if every
/// pixel ends up equal to `val`.
pub fn stencil_pass<P>(cov: &Coverage, val: u8, target: &mut CoreTarget<P>) {
    for span in &cov.spans {
        for x in span.xs().step_by(BLOCK) {
            target.stencil_block_mut(x, span.y).fill(val);
        }
    }
    for b in &cov.blocks {
        target.stencil_block_mut(b.x, b.y).write_masked(b.mask, val);
    }
}

/// Writes the subsector token `depth` at every pixel of `cov`.
pub fn subsector_pass<P>(cov: &Coverage, depth: u32, target: &mut CoreTarget<P>) {
    for span in &cov.spans {
        for y in span.y..span.y + BLOCK {
            target.vis_row_mut(y)[span.xs()].fill(depth);
        }
    }
    for b in &cov.blocks {
        for iy in 0..BLOCK {
            let row = target.vis_row_mut(b.y + iy);
            for ix in (0..BLOCK).filter(|&ix| b.covers(ix, iy)) {
                row[b.x + ix] = depth;
            }
        }
    }
}
