//! Perspective division and the viewport transform.

use crate::geom::{NUM_VARYING, Vertex};

use super::raster::ClipRect;

/// A rectangular region of the destination canvas that normalized device
/// coordinates are mapped onto.
///
/// The viewport may extend past the canvas edges, or even lie partly at
/// negative coordinates; only the part inside the canvas is rasterized.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    canvas: (usize, usize),
}

impl Viewport {
    /// Creates a viewport at (`x`, `y`) of size `width` × `height` on a
    /// canvas of size `canvas_w` × `canvas_h`.
    pub fn new(
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        (canvas_w, canvas_h): (usize, usize),
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            canvas: (canvas_w, canvas_h),
        }
    }

    /// Returns the size of the canvas `self` was set up for.
    pub fn canvas_size(&self) -> (usize, usize) {
        self.canvas
    }

    /// Returns the intersection of `self` with the canvas.
    pub fn clip_rect(&self) -> ClipRect {
        let clamp = |v: i64, max: usize| v.clamp(0, max as i64) as usize;
        let (cw, ch) = self.canvas;
        let (x, y) = (self.x as i64, self.y as i64);
        ClipRect {
            left: clamp(x, cw),
            top: clamp(y, ch),
            right: clamp(x + self.width as i64, cw),
            bottom: clamp(y + self.height as i64, ch),
        }
    }

    /// Maps normalized device coordinates to canvas pixel coordinates.
    ///
    /// NDC y points up, screen y points down.
    #[inline]
    pub fn to_screen(&self, ndc_x: f32, ndc_y: f32) -> (f32, f32) {
        let (w, h) = (self.width as f32, self.height as f32);
        let sx = self.x as f32 + w * (1.0 + ndc_x) * 0.5;
        let sy = self.y as f32 + h * (1.0 - ndc_y) * 0.5;
        (sx, sy)
    }
}

/// Projects clipped vertices to screen space in place.
///
/// Divides x, y, and z by w, stores 1/w in place of w, and maps x and y
/// through the viewport. Then rebases every varying channel so that the
/// first vertex's value lies in [0, 10); texture coordinates wrap, so
/// only their fractional part matters, and keeping magnitudes small keeps
/// the interpolation precise far from the world origin.
pub fn project(verts: &mut [Vertex], vp: &Viewport) {
    for v in verts.iter_mut() {
        let [x, y, z, w] = v.pos;
        let w_inv = 1.0 / w;
        let (sx, sy) = vp.to_screen(x * w_inv, y * w_inv);
        v.pos = [sx, sy, z * w_inv, w_inv];
    }
    let Some(first) = verts.first() else {
        return;
    };
    let origin: [f32; NUM_VARYING] = first.var.map(|a| {
        use crate::math::float::f32;
        f32::floor(a * 0.1) * 10.0
    });
    for v in verts.iter_mut() {
        for (a, o) in v.var.iter_mut().zip(origin) {
            *a -= o;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;
    use crate::geom::vertex;

    use super::*;

    #[test]
    fn ndc_corners_map_to_viewport_corners() {
        let vp = Viewport::new(10, 20, 100, 50, (320, 200));
        assert_eq!(vp.to_screen(-1.0, 1.0), (10.0, 20.0));
        assert_eq!(vp.to_screen(1.0, -1.0), (110.0, 70.0));
        assert_eq!(vp.to_screen(0.0, 0.0), (60.0, 45.0));
    }

    #[test]
    fn clip_rect_is_clamped_to_canvas() {
        let vp = Viewport::new(-10, 5, 100, 500, (64, 48));
        let r = vp.clip_rect();
        assert_eq!((r.left, r.top, r.right, r.bottom), (0, 5, 64, 48));

        let vp = Viewport::new(100, 100, 10, 10, (64, 48));
        assert!(vp.clip_rect().is_empty());
    }

    #[test]
    fn perspective_divide() {
        let vp = Viewport::new(0, 0, 8, 8, (8, 8));
        let mut vs = [vertex([1.0, 1.0, 1.0, 2.0], [0.0; 2])];
        project(&mut vs, &vp);
        // NDC (0.5, 0.5) -> screen (6, 2)
        assert_approx_eq!(vs[0].pos, [6.0, 2.0, 0.5, 0.5]);
    }

    #[test]
    fn varyings_are_rebased_by_first_vertex() {
        let vp = Viewport::new(0, 0, 8, 8, (8, 8));
        let mut vs = [
            vertex([0.0, 0.0, 0.0, 1.0], [123.5, -7.0]),
            vertex([0.0, 0.0, 0.0, 1.0], [125.0, -3.0]),
        ];
        project(&mut vs, &vp);
        assert_approx_eq!(vs[0].var, [3.5, 3.0]);
        assert_approx_eq!(vs[1].var, [5.0, 7.0]);
    }

    #[test]
    fn project_empty_is_noop() {
        project(&mut [], &Viewport::default());
    }
}
