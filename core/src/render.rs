//! Turning triangles into pixels.
//!
//! This module constitutes the polygon pipeline of `softpoly`. It contains
//! code for [transforming][shader], [clipping][clip], [projecting][project],
//! [assembling][prim], and [rasterizing][raster] triangles, and for
//! [drawing][draw] their coverage into a [framebuffer][target] with a
//! color buffer, a [block-compressed stencil buffer][stencil], and a
//! [subsector visibility buffer][vis].
//!
//! Draw calls are not executed immediately. A [`Renderer`] copies their
//! vertices into a per-frame [arena][arena::VertexArena] and queues them as
//! commands, and [`Renderer::finish`] executes the queue on every core.

use alloc::vec::Vec;

use log::{debug, warn};

use crate::geom::Vertex;
use crate::{Error, Result};

use arena::VertexArena;
use queue::Command;
use target::PixelFormat;

pub use args::DrawArgs;
pub use blend::{BlendMode, Palette};
pub use ctx::Context;
pub use project::Viewport;
pub use stats::Stats;
pub use target::{Framebuf, Pixel};
pub use tex::Texture;

pub mod arena;
pub mod args;
pub mod blend;
pub mod clip;
pub mod ctx;
pub mod draw;
pub mod prim;
pub mod project;
pub mod raster;
pub mod shader;
pub mod stats;
pub mod stencil;
pub mod target;
pub mod tex;
pub mod vis;

mod queue;

/// Front end of the pipeline: queues draw calls for a frame and executes
/// them into a framebuffer.
///
/// # Examples
/// ```
/// use softpoly_core::prelude::*;
///
/// let mut fb = Framebuf::<u32>::new(64, 48);
/// let mut r = Renderer::new(Context::default());
/// r.set_viewport(Viewport::new(0, 0, 64, 48, fb.size()));
///
/// let tri = [
///     vertex([-1.0, -1.0, 0.0, 1.0], [0.0, 0.0]),
///     vertex([1.0, -1.0, 0.0, 1.0], [1.0, 0.0]),
///     vertex([0.0, 1.0, 0.0, 1.0], [0.5, 1.0]),
/// ];
/// r.draw(DrawArgs::new().color(0xFF_FF_00_00), &tri).unwrap();
///
/// let stats = r.finish(&mut fb).unwrap();
/// assert_eq!(stats.tris.i, 1);
/// assert_eq!(fb.color[[32, 40]], 0xFF_FF_00_00);
/// ```
#[derive(Debug)]
pub struct Renderer<'a, P> {
    ctx: Context,
    viewport: Option<Viewport>,
    mirror: bool,
    arena: VertexArena,
    queue: Vec<Command<'a, P>>,
    stats: Stats,
}

impl<'a, P: Pixel> Renderer<'a, P> {
    /// Returns a new renderer with the given context.
    pub fn new(ctx: Context) -> Self {
        Self {
            arena: VertexArena::new(ctx.arena_capacity),
            ctx,
            viewport: None,
            mirror: false,
            queue: Vec::new(),
            stats: Stats::new(),
        }
    }

    /// Returns the rendering context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Returns the current viewport, if any.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Returns whether mirroring is currently enabled.
    pub fn is_mirrored(&self) -> bool {
        self.mirror
    }

    /// Returns the statistics accumulated over every finished frame.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Sets the viewport of subsequent draw calls and turns mirroring off.
    ///
    /// Already queued draw calls keep the viewport they were submitted
    /// with.
    pub fn set_viewport(&mut self, vp: Viewport) {
        debug!(
            "viewport {}x{} at ({}, {}), canvas {:?}",
            vp.width,
            vp.height,
            vp.x,
            vp.y,
            vp.canvas_size()
        );
        self.viewport = Some(vp);
        self.mirror = false;
    }

    /// Toggles mirroring, which swaps the front-face winding of every
    /// subsequent draw call.
    pub fn toggle_mirror(&mut self) {
        self.mirror = !self.mirror;
    }

    /// Queues a draw call.
    ///
    /// The vertices are copied, so `verts` need not outlive the call.
    /// Fewer than three vertices is a no-op.
    ///
    /// # Errors
    /// * [`Error::NoViewport`] if no viewport has been set.
    /// * [`Error::MissingPalette`] if drawing to an indexed target with a
    ///   blend mode that needs a palette, without one.
    /// * [`Error::ArenaFull`] if the vertex arena cannot hold `verts`.
    ///
    /// The draw call is dropped in each case.
    pub fn draw(&mut self, args: DrawArgs<'a, P>, verts: &[Vertex]) -> Result<()> {
        if verts.len() < 3 {
            return Ok(());
        }
        let Some(viewport) = self.viewport else {
            warn!("draw call dropped: no viewport set");
            return Err(Error::NoViewport);
        };
        if P::FORMAT == PixelFormat::Indexed
            && args.palette.is_none()
            && args.blend.needs_palette()
        {
            warn!("draw call dropped: {:?} needs a palette", args.blend);
            return Err(Error::MissingPalette(args.blend));
        }
        let range = self.arena.push(verts).inspect_err(|e| {
            warn!("draw call dropped: {e}");
        })?;

        let args = if self.mirror {
            let winding = args.winding.flip();
            args.winding(winding)
        } else {
            args
        };
        self.queue.push(Command::Draw { args, verts: range, viewport });
        Ok(())
    }

    /// Queues setting every stencil value to `val`.
    pub fn clear_stencil(&mut self, val: u8) {
        self.queue.push(Command::ClearStencil(val));
    }

    /// Queues setting every subsector token to `token`.
    pub fn clear_subsector(&mut self, token: u32) {
        self.queue.push(Command::ClearSubsector(token));
    }

    /// Returns the number of queued commands.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Executes every queued command into `target` and starts a new frame.
    ///
    /// Returns the statistics of the frame, which are also added to the
    /// running total returned by [`stats`][Self::stats].
    ///
    /// # Errors
    /// [`Error::TargetMismatch`] if the size of `target` differs from the
    /// canvas of a queued draw call's viewport. Nothing is drawn and the
    /// queue is discarded in that case.
    pub fn finish(&mut self, target: &mut Framebuf<P>) -> Result<Stats> {
        let actual = target.size();
        let mismatch = self.queue.iter().find_map(|cmd| match cmd {
            Command::Draw { viewport, .. }
                if viewport.canvas_size() != actual =>
            {
                Some(viewport.canvas_size())
            }
            _ => None,
        });
        if let Some(expected) = mismatch {
            self.reset();
            return Err(Error::TargetMismatch { expected, actual });
        }

        let calls = self
            .queue
            .iter()
            .filter(|c| matches!(c, Command::Draw { .. }))
            .count();

        #[cfg(feature = "std")]
        let start = std::time::Instant::now();
        let targets = target.split(self.ctx.num_cores);
        let cmds = &self.queue[..];
        let verts = self.arena.as_slice();

        #[cfg(feature = "threaded")]
        let mut stats = if self.ctx.threaded && targets.len() > 1 {
            queue::run_threaded(targets, cmds, verts, &self.ctx)
        } else {
            queue::run_serial(targets, cmds, verts, &self.ctx)
        };
        #[cfg(not(feature = "threaded"))]
        let mut stats = queue::run_serial(targets, cmds, verts, &self.ctx);

        stats.calls = calls;
        stats.frames = 1;
        #[cfg(feature = "std")]
        {
            stats.time = start.elapsed();
        }

        debug!(
            "frame: {calls} calls, tris {}/{}, blocks {}/{}, frags {}",
            stats.tris.i,
            stats.tris.o,
            stats.blocks.i,
            stats.blocks.o,
            stats.frags.i
        );

        self.reset();
        self.stats += stats.clone();
        Ok(stats)
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.arena.reset();
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::geom::{Topology, Winding, vertex};

    use super::*;

    fn tri() -> [Vertex; 3] {
        [
            vertex([-1.0, -1.0, 0.0, 1.0], [0.0; 2]),
            vertex([1.0, -1.0, 0.0, 1.0], [0.0; 2]),
            vertex([0.0, 1.0, 0.0, 1.0], [0.0; 2]),
        ]
    }

    fn renderer<'a, P: Pixel>(w: usize, h: usize) -> Renderer<'a, P> {
        let mut r = Renderer::new(Context::default());
        r.set_viewport(Viewport::new(0, 0, w as i32, h as i32, (w, h)));
        r
    }

    #[test]
    fn draw_without_viewport_is_error() {
        let mut r = Renderer::<u32>::new(Context::default());
        assert_eq!(r.draw(DrawArgs::new(), &tri()), Err(Error::NoViewport));
        assert_eq!(r.queued(), 0);
    }

    #[test]
    fn too_few_verts_is_noop() {
        let mut r = Renderer::<u32>::new(Context::default());
        assert_eq!(r.draw(DrawArgs::new(), &tri()[..2]), Ok(()));
        assert_eq!(r.queued(), 0);
    }

    #[test]
    fn indexed_blend_without_palette_is_error() {
        let mut r = renderer::<u8>(8, 8);
        let args = DrawArgs::new().blend(BlendMode::Add);
        assert_eq!(
            r.draw(args, &tri()),
            Err(Error::MissingPalette(BlendMode::Add))
        );
        let args = DrawArgs::new().blend(BlendMode::AlphaBlend);
        assert_eq!(r.draw(args, &tri()), Ok(()));
    }

    #[test]
    fn arena_full_drops_draw() {
        let ctx = Context { arena_capacity: 4, ..Context::default() };
        let mut r = Renderer::<u32>::new(ctx);
        r.set_viewport(Viewport::new(0, 0, 8, 8, (8, 8)));
        r.draw(DrawArgs::new(), &tri()).unwrap();
        assert_eq!(
            r.draw(DrawArgs::new(), &tri()),
            Err(Error::ArenaFull { requested: 3, available: 1 })
        );
        assert_eq!(r.queued(), 1);
    }

    #[test]
    fn finish_resets_arena() {
        let ctx = Context { arena_capacity: 3, ..Context::default() };
        let mut r = Renderer::<u32>::new(ctx);
        let mut fb = Framebuf::new(8, 8);
        for _ in 0..3 {
            r.set_viewport(Viewport::new(0, 0, 8, 8, fb.size()));
            r.draw(DrawArgs::new(), &tri()).unwrap();
            r.finish(&mut fb).unwrap();
        }
        assert_eq!(r.stats().frames, 3);
        assert_eq!(r.stats().calls, 3);
    }

    #[test]
    fn target_mismatch_is_error() {
        let mut r = renderer::<u32>(8, 8);
        r.draw(DrawArgs::new(), &tri()).unwrap();
        let mut fb = Framebuf::new(16, 8);
        assert_eq!(
            r.finish(&mut fb).map(|_| ()),
            Err(Error::TargetMismatch { expected: (8, 8), actual: (16, 8) })
        );
        assert_eq!(r.queued(), 0);
    }

    #[test]
    fn mirror_flips_winding() {
        let mut fb = Framebuf::<u32>::new(8, 8);
        let mut r = renderer(8, 8);
        r.toggle_mirror();
        assert!(r.is_mirrored());
        // Front face is clockwise while mirrored
        r.draw(DrawArgs::new().color(1), &tri()).unwrap();
        let stats = r.finish(&mut fb).unwrap();
        assert_eq!(stats.frags.i, 0);

        r.draw(DrawArgs::new().winding(Winding::Cw).color(2), &tri())
            .unwrap();
        r.finish(&mut fb).unwrap();
        assert_eq!(fb.color[[4, 6]], 2);

        // New viewport turns mirroring off
        r.set_viewport(Viewport::new(0, 0, 8, 8, (8, 8)));
        assert!(!r.is_mirrored());
    }

    #[test]
    fn queued_draws_keep_their_viewport() {
        let mut fb = Framebuf::<u32>::new(16, 8);
        let mut r = Renderer::new(Context::default());
        let quad = vec![
            vertex([-1.0, -1.0, 0.0, 1.0], [0.0; 2]),
            vertex([1.0, -1.0, 0.0, 1.0], [0.0; 2]),
            vertex([1.0, 1.0, 0.0, 1.0], [0.0; 2]),
            vertex([-1.0, 1.0, 0.0, 1.0], [0.0; 2]),
        ];
        let fan = || DrawArgs::new().topology(Topology::Fan);

        r.set_viewport(Viewport::new(0, 0, 8, 8, fb.size()));
        r.draw(fan().color(1), &quad).unwrap();
        r.set_viewport(Viewport::new(8, 0, 8, 8, fb.size()));
        r.draw(fan().color(2), &quad).unwrap();
        r.finish(&mut fb).unwrap();

        for row in fb.color.rows() {
            assert!(row[..8].iter().all(|&c| c == 1));
            assert!(row[8..].iter().all(|&c| c == 2));
        }
    }
}
