//! Per-draw-call arguments.

use crate::geom::{Topology, Winding};
use crate::math::mat::Mat4;

use super::blend::{BlendMode, Palette};
use super::target::Pixel;
use super::tex::Texture;

/// Arguments of a single draw call: how to assemble, transform, clip,
/// shade, and test the triangles of a vertex stream.
///
/// Constructed with [`DrawArgs::new`] and configured with builder-style
/// setters:
/// ```
/// use softpoly_core::prelude::*;
///
/// let tex = Texture::new(1, 1, vec![7u8]).unwrap();
/// let args = DrawArgs::new()
///     .topology(Topology::Fan)
///     .texture(&tex)
///     .light(192)
///     .stencil_test(1);
/// ```
#[derive(Clone, Debug)]
pub struct DrawArgs<'a, P> {
    pub(crate) topology: Topology,
    pub(crate) winding: Winding,
    pub(crate) transform: Mat4,
    pub(crate) clip_plane: [f32; 4],

    pub(crate) texture: Option<&'a Texture<P>>,
    pub(crate) translation: Option<&'a [u8; 256]>,
    pub(crate) palette: Option<&'a Palette>,
    pub(crate) blend: BlendMode,
    pub(crate) color: P,
    pub(crate) light: u32,
    pub(crate) src_alpha: u32,
    pub(crate) dest_alpha: u32,

    pub(crate) stencil_test: u8,
    pub(crate) stencil_write: u8,
    pub(crate) subsector_test: bool,
    pub(crate) subsector_depth: u32,

    pub(crate) write_color: bool,
    pub(crate) write_stencil: bool,
    pub(crate) write_subsector: bool,
}

impl<'a, P: Pixel> DrawArgs<'a, P> {
    /// Returns the default draw arguments.
    ///
    /// The defaults are:
    /// * Topology:       triangle list, counter-clockwise
    /// * Transform:      identity
    /// * Clip plane:     (0, 0, 0, 1), which keeps everything
    /// * Texture:        none, fill with `P::default()`
    /// * Blend mode:     [`Copy`][BlendMode::Copy], fully lit
    /// * Alpha:          256 for both source and destination
    /// * Stencil test:   equal to 0, no subsector test
    /// * Writes:         color only
    pub fn new() -> Self {
        Self {
            topology: Topology::List,
            winding: Winding::Ccw,
            transform: Mat4::identity(),
            clip_plane: [0.0, 0.0, 0.0, 1.0],
            texture: None,
            translation: None,
            palette: None,
            blend: BlendMode::Copy,
            color: P::default(),
            light: 256,
            src_alpha: 256,
            dest_alpha: 256,
            stencil_test: 0,
            stencil_write: 0,
            subsector_test: false,
            subsector_depth: 0,
            write_color: true,
            write_stencil: false,
            write_subsector: false,
        }
    }

    pub fn topology(self, topology: Topology) -> Self {
        Self { topology, ..self }
    }
    /// Sets the winding of front faces. Back faces are never drawn.
    pub fn winding(self, winding: Winding) -> Self {
        Self { winding, ..self }
    }
    /// Sets the object-to-clip-space transform.
    pub fn transform(self, transform: Mat4) -> Self {
        Self { transform, ..self }
    }
    /// Sets the user clip plane (a, b, c, d). Object-space points where
    /// `a·x + b·y + c·z + d·w < 0` are clipped away.
    pub fn clip_plane(self, plane: [f32; 4]) -> Self {
        Self { clip_plane: plane, ..self }
    }

    pub fn texture(self, tex: &'a Texture<P>) -> Self {
        Self { texture: Some(tex), ..self }
    }
    /// Sets a table that remaps indexed texels before blending.
    pub fn translation(self, table: &'a [u8; 256]) -> Self {
        Self { translation: Some(table), ..self }
    }
    /// Sets the palette used to blend indexed pixels.
    pub fn palette(self, pal: &'a Palette) -> Self {
        Self { palette: Some(pal), ..self }
    }
    pub fn blend(self, blend: BlendMode) -> Self {
        Self { blend, ..self }
    }
    /// Sets the flat color of untextured draws and of the blend modes
    /// that draw with a solid color.
    pub fn color(self, color: P) -> Self {
        Self { color, ..self }
    }
    /// Sets the sector light level, from 0 (dark) to 256 (fully lit).
    pub fn light(self, light: u32) -> Self {
        Self { light: light.min(256), ..self }
    }
    /// Sets the translucency: the source factor to `alpha` and the
    /// destination factor to `256 - alpha`.
    pub fn alpha(self, alpha: u32) -> Self {
        let a = alpha.min(256);
        Self {
            src_alpha: a,
            dest_alpha: 256 - a,
            ..self
        }
    }
    pub fn src_alpha(self, a: u32) -> Self {
        Self { src_alpha: a.min(256), ..self }
    }
    pub fn dest_alpha(self, a: u32) -> Self {
        Self { dest_alpha: a.min(256), ..self }
    }

    /// Sets the stencil reference value.
    ///
    /// Without a subsector test, a pixel passes if its stencil value
    /// equals `val`; with one, if it is at least `val`.
    pub fn stencil_test(self, val: u8) -> Self {
        Self { stencil_test: val, ..self }
    }
    /// Sets the value written to the stencil buffer, if stencil writes
    /// are enabled.
    pub fn stencil_write(self, val: u8) -> Self {
        Self { stencil_write: val, ..self }
    }
    /// Sets the subsector token of the draw.
    pub fn subsector_depth(self, depth: u32) -> Self {
        Self { subsector_depth: depth, ..self }
    }
    /// Sets whether pixels are tested against the subsector buffer.
    pub fn subsector_test(self, enabled: bool) -> Self {
        Self { subsector_test: enabled, ..self }
    }

    pub fn write_color(self, enabled: bool) -> Self {
        Self { write_color: enabled, ..self }
    }
    pub fn write_stencil(self, enabled: bool) -> Self {
        Self { write_stencil: enabled, ..self }
    }
    pub fn write_subsector(self, enabled: bool) -> Self {
        Self { write_subsector: enabled, ..self }
    }

    /// Returns the blend mode.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }
    /// Returns the winding of front faces.
    pub fn front_face(&self) -> Winding {
        self.winding
    }
}

impl<P: Pixel> Default for DrawArgs<'_, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = DrawArgs::<u8>::default();
        assert_eq!(args.topology, Topology::List);
        assert_eq!(args.clip_plane, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(args.light, 256);
        assert!(args.write_color && !args.write_stencil && !args.write_subsector);
        assert!(args.texture.is_none());
    }

    #[test]
    fn alpha_sets_both_factors() {
        let args = DrawArgs::<u32>::new().alpha(64);
        assert_eq!((args.src_alpha, args.dest_alpha), (64, 192));

        let args = DrawArgs::<u32>::new().alpha(1000);
        assert_eq!((args.src_alpha, args.dest_alpha), (256, 0));
    }

    #[test]
    fn setters_chain() {
        let args = DrawArgs::<u32>::new()
            .winding(Winding::Cw)
            .blend(BlendMode::Add)
            .light(300)
            .stencil_test(2)
            .stencil_write(3)
            .write_stencil(true)
            .subsector_depth(9)
            .subsector_test(true);
        assert_eq!(args.front_face(), Winding::Cw);
        assert_eq!(args.blend_mode(), BlendMode::Add);
        assert_eq!(args.light, 256);
        assert_eq!((args.stencil_test, args.stencil_write), (2, 3));
        assert!(args.write_stencil && args.subsector_test);
        assert_eq!(args.subsector_depth, 9);
    }
}
