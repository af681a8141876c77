//! Draw command execution.
//!
//! Queued commands are executed by one [`Worker`] per core. Every worker
//! runs the whole command queue in order, but only ever rasterizes and
//! writes the row bands owned by its core, so workers never share
//! pixels and need no synchronization while a frame is being drawn.

use alloc::vec::Vec;
use core::ops::Range;

use log::trace;

use crate::geom::{Tri, Vertex};

use super::args::DrawArgs;
use super::blend::BlendParams;
use super::clip::{ClipPoly, clip_tri};
use super::ctx::Context;
use super::draw::{self, Shading};
use super::prim::{assemble, fan};
use super::project::{Viewport, project};
use super::raster::{BLOCK, Coverage, SetupTest, setup};
use super::shader::shade_vertex;
use super::target::{CoreTarget, Pixel};
use super::Stats;

/// A unit of work executed by every core for its own bands.
#[derive(Clone, Debug)]
pub(crate) enum Command<'a, P> {
    /// Draws the vertices in an arena range.
    Draw {
        args: DrawArgs<'a, P>,
        verts: Range<usize>,
        viewport: Viewport,
    },
    /// Sets every stencil value to the given value.
    ClearStencil(u8),
    /// Sets every subsector token to the given token.
    ClearSubsector(u32),
}

/// Executes commands on the bands of one core.
#[derive(Debug)]
pub(crate) struct Worker<'t, P> {
    target: CoreTarget<'t, P>,
    rows: Range<usize>,
    setup_only: bool,
    poly: ClipPoly,
    cov: Coverage,
    stats: Stats,
}

impl<'t, P: Pixel> Worker<'t, P> {
    pub fn new(target: CoreTarget<'t, P>, ctx: &Context) -> Self {
        let rows = ctx.rows(target.height());
        Self {
            target,
            rows,
            setup_only: ctx.setup_only,
            poly: ClipPoly::new(),
            cov: Coverage::new(),
            stats: Stats::new(),
        }
    }

    /// Executes every command of `cmds` in order.
    pub fn run(mut self, cmds: &[Command<P>], arena: &[Vertex]) -> Stats {
        for cmd in cmds {
            self.execute(cmd, arena);
        }
        self.into_stats()
    }

    /// Returns the counts of every command executed so far.
    pub fn into_stats(self) -> Stats {
        let core = self.target.core();
        self.stats.by_core(core)
    }

    /// Executes `cmd`, reading vertices from `arena`.
    pub fn execute(&mut self, cmd: &Command<P>, arena: &[Vertex]) {
        match cmd {
            Command::Draw { args, verts, viewport } => {
                trace!(
                    "core {}: draw {:?}, {} verts",
                    self.target.core(),
                    args.topology,
                    verts.len()
                );
                self.draw(args, &arena[verts.clone()], viewport);
            }
            Command::ClearStencil(val) => self.clear_stencil(*val),
            Command::ClearSubsector(token) => self.clear_subsector(*token),
        }
    }

    fn is_full_height(&self) -> bool {
        self.rows == (0..self.target.height())
    }

    fn clear_stencil(&mut self, val: u8) {
        if self.setup_only {
            return;
        }
        if self.is_full_height() {
            return self.target.clear_stencil(val);
        }
        let (w, rows) = (self.target.width(), self.rows.clone());
        let first = rows.start & !(BLOCK - 1);
        for y in (first..rows.end).step_by(BLOCK) {
            if self.target.owns(y) {
                for x in (0..w).step_by(BLOCK) {
                    self.target.stencil_block_mut(x, y).fill(val);
                }
            }
        }
    }

    fn clear_subsector(&mut self, token: u32) {
        if self.setup_only {
            return;
        }
        if self.is_full_height() {
            return self.target.clear_vis(token);
        }
        for y in self.rows.clone() {
            if self.target.owns(y) {
                self.target.vis_row_mut(y).fill(token);
            }
        }
    }

    fn draw(&mut self, args: &DrawArgs<P>, verts: &[Vertex], vp: &Viewport) {
        let clip = vp.clip_rect().intersect_rows(&self.rows);
        let test = if args.subsector_test {
            SetupTest::Subsector {
                stencil: args.stencil_test,
                depth: args.subsector_depth,
            }
        } else {
            SetupTest::Normal { stencil: args.stencil_test }
        };
        let color_fn = (args.write_color && !self.setup_only)
            .then(|| draw::select::<P>(args.blend, args.texture.is_some()));
        let shading = Shading {
            texture: args.texture,
            translation: args.translation,
            color: args.color,
            light: args.light,
            blend: BlendParams {
                color: args.color.to_argb(args.palette),
                src_alpha: args.src_alpha,
                dest_alpha: args.dest_alpha,
                palette: args.palette,
            },
        };
        let writes_stencil = args.write_stencil && !self.setup_only;
        let writes_subsector = args.write_subsector && !self.setup_only;
        // Every core sees the same geometry; only count it once
        let counts_geometry = self.target.core() == 0;

        let Self { target, poly, cov, stats, .. } = self;
        let mut tri_count = 0;

        assemble(args.topology, args.winding, verts.len(), |Tri(idx), winding| {
            tri_count += 1;
            let tri = idx.map(|i| {
                shade_vertex(&args.transform, &args.clip_plane, &verts[i])
            });
            clip_tri(&tri, poly);
            if poly.len() < 3 {
                return;
            }
            if counts_geometry {
                stats.clipped.o += 1;
            }
            if clip.is_empty() {
                return;
            }
            project(poly.as_mut_slice(), vp);

            fan(poly.len(), winding, |Tri([a, b, c])| {
                let tri = [&poly[a], &poly[b], &poly[c]];
                if counts_geometry {
                    stats.tris.o += 1;
                }
                setup(tri, test, &clip, target, cov);
                stats.blocks.i += cov.blocks_visited();
                stats.blocks.o += cov.blocks_covered();
                if cov.is_empty() {
                    return;
                }
                let pixels = cov.pixel_count();
                stats.frags.i += pixels;

                if let Some(color) = color_fn {
                    color(&shading, tri, cov, target);
                    stats.frags.o += pixels;
                }
                if writes_stencil {
                    draw::stencil_pass(cov, args.stencil_write, target);
                }
                if writes_subsector {
                    draw::subsector_pass(cov, args.subsector_depth, target);
                }
            });
        });

        if counts_geometry {
            stats.tris.i += tri_count;
            stats.clipped.i += tri_count;
        }
    }
}

/// Executes `cmds` on every target in turn on the calling thread.
pub(crate) fn run_serial<P: Pixel>(
    targets: Vec<CoreTarget<P>>,
    cmds: &[Command<P>],
    arena: &[Vertex],
    ctx: &Context,
) -> Stats {
    let mut stats = Stats::new();
    for target in targets {
        stats += Worker::new(target, ctx).run(cmds, arena);
    }
    stats
}

/// Executes `cmds` on one scoped OS thread per target.
///
/// Commands are fed to the workers over channels as they are sent, so
/// every worker makes progress independently of the others.
#[cfg(feature = "threaded")]
pub(crate) fn run_threaded<P: Pixel>(
    targets: Vec<CoreTarget<P>>,
    cmds: &[Command<P>],
    arena: &[Vertex],
    ctx: &Context,
) -> Stats {
    use crossbeam_channel::unbounded;
    use log::debug;
    use std::{panic, thread};

    debug!("starting {} worker threads", targets.len());

    let stats = thread::scope(|s| {
        let mut senders = Vec::with_capacity(targets.len());
        let mut handles = Vec::with_capacity(targets.len());

        for target in targets {
            let (tx, rx) = unbounded::<&Command<P>>();
            let mut worker = Worker::new(target, ctx);
            senders.push(tx);
            handles.push(s.spawn(move || {
                for cmd in rx {
                    worker.execute(cmd, arena);
                }
                worker.into_stats()
            }));
        }

        for cmd in cmds {
            for tx in &senders {
                // A worker only hangs up by panicking, which is
                // propagated below
                let _ = tx.send(cmd);
            }
        }
        drop(senders);

        let mut stats = Stats::new();
        for h in handles {
            stats += h.join().unwrap_or_else(|e| panic::resume_unwind(e));
        }
        stats
    });

    debug!("worker threads stopped");
    stats
}
