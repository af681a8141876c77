//! Vertex transform and clip-space shading.

use crate::geom::{NUM_VARYING, Vertex};
use crate::math::mat::Mat4;

/// Number of half-spaces every triangle is clipped against.
pub const NUM_CLIP_PLANES: usize = 7;

/// A vertex transformed to clip space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ShadedVertex {
    /// Clip-space position (x, y, z, w).
    pub pos: [f32; 4],
    /// Signed distance of the untransformed vertex to the user clip plane.
    /// The vertex is kept where this is non-negative.
    pub clip_dist: f32,
    /// Varyings, passed through unchanged.
    pub var: [f32; NUM_VARYING],
}

/// Transforms `v` to clip space with `to_clip` and computes its distance
/// to the user clip plane `plane` = (a, b, c, d).
///
/// The plane is evaluated on the *object-space* position:
/// `dist = a·x + b·y + c·z + d·w`.
#[inline]
pub fn shade_vertex(
    to_clip: &Mat4,
    plane: &[f32; 4],
    v: &Vertex,
) -> ShadedVertex {
    let [x, y, z, w] = v.pos;
    ShadedVertex {
        pos: to_clip.apply(&v.pos),
        clip_dist: x * plane[0] + y * plane[1] + z * plane[2] + w * plane[3],
        var: v.var,
    }
}

impl ShadedVertex {
    /// Returns the signed distances of `self` to each clip half-space, in
    /// clipping order: left, right, bottom, top, near, far, user plane.
    /// The vertex is inside a half-space iff its distance is non-negative.
    #[inline]
    pub fn plane_dists(&self) -> [f32; NUM_CLIP_PLANES] {
        let [x, y, z, w] = self.pos;
        [x + w, w - x, y + w, w - y, z + w, w - z, self.clip_dist]
    }
}
