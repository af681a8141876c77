//! Errors reported by the renderer front end.
//!
//! Degenerate geometry is never an error: draw calls with too few
//! vertices, triangles that clip away entirely, and triangles whose
//! screen bounds are empty are silently skipped. Errors are reserved
//! for resource exhaustion and misconfigured draw calls.

use crate::render::BlendMode;

/// The error type of this crate.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The per-frame vertex arena cannot hold the submitted vertices.
    #[error("vertex arena full: requested {requested}, {available} available")]
    ArenaFull { requested: usize, available: usize },

    /// A draw was submitted before any viewport was set.
    #[error("no viewport set")]
    NoViewport,

    /// The target passed to `finish` differs in size from the canvas the
    /// viewport was established for.
    #[error(
        "target size {actual:?} does not match viewport canvas {expected:?}"
    )]
    TargetMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Texel data does not match the declared texture dimensions.
    #[error("texture {width}x{height} cannot be built from {len} texels")]
    TextureSize {
        width: usize,
        height: usize,
        len: usize,
    },

    /// A palette must have exactly 256 entries.
    #[error("palette must have 256 colors, got {len}")]
    InvalidPalette { len: usize },

    /// The blend mode needs a palette to blend palette-indexed pixels.
    #[error("blend mode {0:?} requires a palette on an indexed target")]
    MissingPalette(BlendMode),
}

/// Result type with [`Error`] as the default error.
pub type Result<T, E = Error> = core::result::Result<T, E>;
