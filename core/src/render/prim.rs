//! Primitive assembly: turning vertex streams and clipped polygons into
//! triangles.

use crate::geom::{Topology, Tri, Winding};

/// Assembles a stream of `n` vertices into triangles of vertex indices.
///
/// Calls `f` once per triangle with its indices and the winding it should
/// be rasterized with. Fans keep the winding of the draw call; strips flip
/// it at every step since every other triangle of a strip is listed in
/// reverse order. Streams of fewer than three vertices produce nothing,
/// and trailing vertices of a list that do not form a whole triangle are
/// ignored.
pub fn assemble<F>(topology: Topology, winding: Winding, n: usize, mut f: F)
where
    F: FnMut(Tri<usize>, Winding),
{
    if n < 3 {
        return;
    }
    match topology {
        Topology::List => {
            for i in (0..n - n % 3).step_by(3) {
                f(Tri([i, i + 1, i + 2]), winding);
            }
        }
        Topology::Fan => {
            for i in 2..n {
                f(Tri([0, i - 1, i]), winding);
            }
        }
        Topology::Strip => {
            let mut w = winding;
            for i in 2..n {
                f(Tri([i - 2, i - 1, i]), w);
                w = w.flip();
            }
        }
    }
}

/// Splits a convex polygon of `n` vertices into a fan of triangles.
///
/// With counter-clockwise winding, the fan is rooted at vertex 0 and walks
/// forward. With clockwise winding, it is rooted at the last vertex and
/// walks backward, so that every emitted triangle is counter-clockwise
/// if the polygon is clockwise.
pub fn fan<F>(n: usize, winding: Winding, mut f: F)
where
    F: FnMut(Tri<usize>),
{
    match winding {
        Winding::Ccw => {
            for i in 2..n {
                f(Tri([0, i - 1, i]));
            }
        }
        Winding::Cw => {
            for i in (2..n).rev() {
                f(Tri([n - 1, i - 1, i - 2]));
            }
        }
    }
}
