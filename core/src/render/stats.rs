//! Pipeline statistics.
//!
//! Every worker counts what passes through its stages while executing a
//! frame, and the per-worker counts are merged when the frame finishes.
//! Besides the stage counters, [`Stats`] keeps the load of each core, which
//! shows how evenly the row bands split the work.

use alloc::{format, string::String, vec::Vec};
use core::fmt::{self, Display, Formatter};
use core::ops::AddAssign;
use core::time::Duration;

//
// Types
//

/// Counters and timing of one or more rendered frames.
///
/// Geometry counters (`tris`, `clipped`) are only counted by core 0, as
/// every core processes the same geometry. Raster counters (`blocks`,
/// `frags`) are summed over cores.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    /// Number of frames finished.
    pub frames: usize,
    /// Number of draw calls executed.
    pub calls: usize,
    /// Wall-clock time spent executing the frames. Zero without `std`.
    pub time: Duration,

    /// Triangles assembled / sent to setup after clipping and fanning.
    pub tris: Throughput,
    /// Triangles clipped / clip polygons left with at least 3 vertices.
    pub clipped: Throughput,
    /// Blocks visited by setup / blocks with any coverage.
    pub blocks: Throughput,
    /// Pixels covered / pixels passed to the color pass.
    pub frags: Throughput,

    /// Raster work done by each core, indexed by core.
    pub cores: Vec<CoreLoad>,
}

/// Number of items entering and leaving a pipeline stage.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Throughput {
    pub i: usize,
    pub o: usize,
}

/// Raster work done by one core.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CoreLoad {
    /// Blocks with any coverage.
    pub blocks: usize,
    /// Pixels covered.
    pub frags: usize,
}

//
// Inherent impls
//

impl Stats {
    /// Returns zeroed stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the raster counters of `self` as the load of `core`.
    ///
    /// Called by a worker on its own stats before they are merged.
    pub(crate) fn by_core(mut self, core: usize) -> Self {
        self.cores = alloc::vec![CoreLoad::default(); core + 1];
        self.cores[core] = CoreLoad {
            blocks: self.blocks.o,
            frags: self.frags.i,
        };
        self
    }

    /// Returns the average counts of a single frame.
    pub fn per_frame(&self) -> Self {
        let n = self.frames.max(1);
        let avg = |t: Throughput| Throughput { i: t.i / n, o: t.o / n };
        Self {
            frames: 1,
            calls: self.calls / n,
            time: self.time / n as u32,
            tris: avg(self.tris),
            clipped: avg(self.clipped),
            blocks: avg(self.blocks),
            frags: avg(self.frags),
            cores: self
                .cores
                .iter()
                .map(|c| CoreLoad { blocks: c.blocks / n, frags: c.frags / n })
                .collect(),
        }
    }

    /// Returns the ratio of the smallest to the largest per-core pixel
    /// count, or `None` if no core covered any pixels.
    ///
    /// 1.0 means the bands split the work evenly.
    pub fn balance(&self) -> Option<f32> {
        let frags = self.cores.iter().map(|c| c.frags);
        let max = frags.clone().max().filter(|&m| m > 0)?;
        let min = frags.min()?;
        Some(min as f32 / max as f32)
    }
}

impl Throughput {
    /// Returns the percentage of items output, or `None` if there was no
    /// input.
    pub fn percent(&self) -> Option<f32> {
        (self.i > 0).then(|| 100.0 * self.o as f32 / self.i as f32)
    }
}

//
// Trait impls
//

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.frames += other.frames;
        self.calls += other.calls;
        self.time += other.time;
        self.tris += other.tris;
        self.clipped += other.clipped;
        self.blocks += other.blocks;
        self.frags += other.frags;

        if self.cores.len() < other.cores.len() {
            self.cores.resize(other.cores.len(), CoreLoad::default());
        }
        for (c, o) in self.cores.iter_mut().zip(other.cores) {
            c.blocks += o.blocks;
            c.frags += o.frags;
        }
    }
}

impl AddAssign for Throughput {
    fn add_assign(&mut self, rhs: Self) {
        self.i += rhs.i;
        self.o += rhs.o;
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "frames {:6}  calls {:6}  time {}",
            self.frames,
            self.calls,
            millis(self.time)
        )?;
        writeln!(f, "{:<8}{:>10}{:>10}{:>8}", "stage", "in", "out", "out/in")?;
        let stages = [
            ("tris", self.tris),
            ("clip", self.clipped),
            ("blocks", self.blocks),
            ("frags", self.frags),
        ];
        for (label, t) in stages {
            let pct = t.percent().map_or("--".into(), |p| format!("{p:.1}%"));
            writeln!(f, "{label:<8}{:>10}{:>10}{pct:>8}", t.i, t.o)?;
        }
        if !self.cores.is_empty() {
            writeln!(f, "{:<8}{:>10}{:>10}", "core", "blocks", "frags")?;
            for (n, c) in self.cores.iter().enumerate() {
                writeln!(f, "{n:<8}{:>10}{:>10}", c.blocks, c.frags)?;
            }
        }
        Ok(())
    }
}

fn millis(d: Duration) -> String {
    let us = d.as_micros();
    format!("{}.{:02}ms", us / 1000, us % 1000 / 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Stats {
        Stats {
            frames: 2,
            calls: 6,
            time: Duration::from_micros(1250),
            tris: Throughput { i: 12, o: 10 },
            clipped: Throughput { i: 12, o: 10 },
            blocks: Throughput { i: 400, o: 120 },
            frags: Throughput { i: 7680, o: 0 },
            cores: alloc::vec![
                CoreLoad { blocks: 70, frags: 4000 },
                CoreLoad { blocks: 50, frags: 3680 },
            ],
        }
    }

    #[test]
    fn table_shows_stages_and_cores() {
        assert_eq!(
            format!("{}", frame()),
            "\
frames      2  calls      6  time 1.25ms
stage           in       out  out/in
tris            12        10   83.3%
clip            12        10   83.3%
blocks         400       120   30.0%
frags         7680         0    0.0%
core        blocks     frags
0               70      4000
1               50      3680
"
        );
    }

    #[test]
    fn empty_stage_has_no_percentage() {
        let s = format!("{}", Stats::new());
        assert!(s.contains("tris             0         0      --"));
        assert!(!s.contains("core"));
    }

    #[test]
    fn per_core_stats_merge() {
        // Three workers, as produced by a frame split three ways
        let mut total = Stats::new();
        for core in 0..3 {
            let worker = Stats {
                tris: Throughput { i: usize::from(core == 0) * 5, o: 0 },
                blocks: Throughput { i: 10, o: 4 + core },
                frags: Throughput { i: 64 * (4 + core), o: 0 },
                ..Stats::new()
            };
            total += worker.by_core(core);
        }
        assert_eq!(total.tris.i, 5);
        assert_eq!(total.blocks, Throughput { i: 30, o: 15 });
        assert_eq!(
            total.cores,
            [
                CoreLoad { blocks: 4, frags: 256 },
                CoreLoad { blocks: 5, frags: 320 },
                CoreLoad { blocks: 6, frags: 384 },
            ]
        );
        assert_eq!(total.balance(), Some(256.0 / 384.0));
    }

    #[test]
    fn balance_without_coverage() {
        assert_eq!(Stats::new().balance(), None);
        let idle = Stats::new().by_core(1);
        assert_eq!(idle.balance(), None);
    }

    #[test]
    fn per_frame_averages() {
        let avg = frame().per_frame();
        assert_eq!(avg.frames, 1);
        assert_eq!(avg.calls, 3);
        assert_eq!(avg.time, Duration::from_micros(625));
        assert_eq!(avg.blocks, Throughput { i: 200, o: 60 });
        assert_eq!(avg.cores[1], CoreLoad { blocks: 25, frags: 1840 });
    }
}
