//! Rendering context and parameters.

use core::ops::Range;

/// Context and parameters used by the renderer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Context {
    /// The number of worker cores rasterization is split between.
    ///
    /// Each core owns every `num_cores`th band of eight pixel rows. Zero
    /// is treated as one.
    pub num_cores: usize,

    /// Whether queued commands are executed on OS threads, one per core.
    ///
    /// Has no effect unless the `threaded` feature is enabled and
    /// `num_cores` is greater than one; otherwise the cores are run one
    /// after another on the calling thread, with identical results.
    pub threaded: bool,

    /// The maximum number of vertices that can be queued per frame.
    ///
    /// Draw calls that would exceed the limit are rejected with
    /// [`Error::ArenaFull`][crate::Error::ArenaFull].
    pub arena_capacity: usize,

    /// Whether to only compute coverage, skipping all buffer writes.
    ///
    /// Useful for profiling triangle setup separately from drawing.
    pub setup_only: bool,

    /// The rows rendering is restricted to, if any.
    ///
    /// Draws never touch pixels outside the range. Stencil clears apply
    /// to every block with a row in the range.
    pub rows: Option<Range<usize>>,
}

impl Context {
    /// Returns the default context with `num_cores` set to the available
    /// hardware parallelism.
    #[cfg(feature = "std")]
    pub fn with_available_cores() -> Self {
        let num_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { num_cores, ..Self::default() }
    }

    /// Returns the row range of a target of height `height`.
    pub(crate) fn rows(&self, height: usize) -> Range<usize> {
        match &self.rows {
            Some(r) => r.start.min(height)..r.end.min(height),
            None => 0..height,
        }
    }
}

impl Default for Context {
    /// Creates a rendering context with default settings.
    ///
    /// The default values are:
    /// * Cores:          1
    /// * Threaded:       Yes, if more than one core
    /// * Arena capacity: 256 Ki vertices
    /// * Setup only:     No
    /// * Rows:           All
    fn default() -> Self {
        Self {
            num_cores: 1,
            threaded: true,
            arena_capacity: 256 * 1024,
            setup_only: false,
            rows: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_range_is_clamped() {
        let ctx = Context::default();
        assert_eq!(ctx.rows(100), 0..100);

        let ctx = Context { rows: Some(40..200), ..Context::default() };
        assert_eq!(ctx.rows(100), 40..100);
    }

    #[cfg(feature = "std")]
    #[test]
    fn available_cores() {
        assert!(Context::with_available_cores().num_cores >= 1);
    }
}
