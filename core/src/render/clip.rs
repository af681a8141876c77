//! Clipping triangles against the view frustum and a user plane.
//!
//! A triangle is clipped against seven half-spaces in turn: the six planes
//! `-w ≤ x ≤ w`, `-w ≤ y ≤ w`, `-w ≤ z ≤ w` of the view frustum, and the
//! half-space where the user clip distance is non-negative.
//!
//! The polygon being clipped is represented by barycentric weights relative
//! to the three input vertices, starting from the identity triangle. Each
//! new vertex is a blend of two existing weight triples, and the signed
//! distance of any weight triple to a plane is just the weighted sum of the
//! per-vertex distances. Positions and varyings are only materialized once,
//! after the last plane.

use core::ops::Deref;

use crate::geom::{NUM_VARYING, Vertex};

use super::shader::{NUM_CLIP_PLANES, ShadedVertex};

/// Maximum number of vertices a clipped triangle can have.
///
/// Clipping stops emitting new vertices for the current plane once the
/// bound is reached; the rest of the polygon is lost.
pub const MAX_CLIP_VERTS: usize = 16;

type Weights = [f32; 3];

/// A convex polygon produced by clipping a single triangle.
///
/// Holds up to [`MAX_CLIP_VERTS`] vertices in a fixed-size array; a
/// `ClipPoly` is meant to be reused from triangle to triangle.
#[derive(Clone, Debug)]
pub struct ClipPoly {
    verts: [Vertex; MAX_CLIP_VERTS],
    len: usize,
}

impl ClipPoly {
    /// Returns a new empty polygon.
    pub fn new() -> Self {
        Self {
            verts: [Vertex::default(); MAX_CLIP_VERTS],
            len: 0,
        }
    }

    /// Returns the vertices of `self` as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [Vertex] {
        &mut self.verts[..self.len]
    }
}

impl Default for ClipPoly {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for ClipPoly {
    type Target = [Vertex];

    fn deref(&self) -> &[Vertex] {
        &self.verts[..self.len]
    }
}

/// Computes the part of the edge from distance `d1` to distance `d2` that
/// lies inside a half-space.
///
/// Returns `None` if the edge is entirely outside, otherwise the start and
/// end interpolation parameters of the inside part.
#[inline]
fn cull_half_space(d1: f32, d2: f32) -> Option<(f32, f32)> {
    if d1 < 0.0 && d2 < 0.0 {
        return None;
    }
    let t1 = if d1 < 0.0 { (-d1 / (d2 - d1)).max(0.0) } else { 0.0 };
    let t2 = if d2 < 0.0 {
        (1.0 + d2 / (d1 - d2)).min(1.0)
    } else {
        1.0
    };
    Some((t1, t2))
}

#[inline]
fn lerp(a: &Weights, b: &Weights, t: f32) -> Weights {
    [0, 1, 2].map(|k| a[k] * (1.0 - t) + b[k] * t)
}

/// Clips the triangle `tri` and writes the resulting polygon to `out`.
///
/// The result has at most [`MAX_CLIP_VERTS`] vertices, in clip space and in
/// the same winding order as the input. A triangle entirely inside every
/// half-space comes out as its own three vertices; one entirely outside any
/// half-space comes out empty.
pub fn clip_tri(tri: &[ShadedVertex; 3], out: &mut ClipPoly) {
    let dists = tri.map(|v| v.plane_dists());

    let mut bufs = [[[0.0; 3]; MAX_CLIP_VERTS]; 2];
    bufs[0][0] = [1.0, 0.0, 0.0];
    bufs[0][1] = [0.0, 1.0, 0.0];
    bufs[0][2] = [0.0, 0.0, 1.0];
    let mut cur = 0;
    let mut len = 3;

    for p in 0..NUM_CLIP_PLANES {
        let [b0, b1] = &mut bufs;
        let (input, output) = if cur == 0 { (&*b0, b1) } else { (&*b1, b0) };

        let dist = |w: &Weights| {
            w[0] * dists[0][p] + w[1] * dists[1][p] + w[2] * dists[2][p]
        };

        let mut n = 0;
        for i in 0..len {
            let (wi, wj) = (&input[i], &input[(i + 1) % len]);
            let Some((t1, t2)) = cull_half_space(dist(wi), dist(wj)) else {
                continue;
            };
            if n + 1 >= MAX_CLIP_VERTS {
                continue;
            }
            output[n] = lerp(wi, wj, t1);
            n += 1;
            if t2 != 1.0 && t2 > t1 {
                output[n] = lerp(wi, wj, t2);
                n += 1;
            }
        }
        cur ^= 1;
        len = n;
        if len == 0 {
            break;
        }
    }

    out.len = len;
    for (v, w) in out.verts.iter_mut().zip(&bufs[cur][..len]) {
        let mut pos = [0.0; 4];
        let mut var = [0.0; NUM_VARYING];
        for (src, &wt) in tri.iter().zip(w) {
            pos.iter_mut().zip(src.pos).for_each(|(p, s)| *p += s * wt);
            var.iter_mut().zip(src.var).for_each(|(a, s)| *a += s * wt);
        }
        *v = Vertex { pos, var };
    }
}
