//! Core of the `softpoly` software polygon renderer.
//!
//! Takes triangles in homogeneous clip space, clips them against the view
//! frustum and an extra user plane, projects them to the screen, and
//! rasterizes them in 8×8 pixel blocks. Besides the color buffer, the
//! rasterizer tests and updates a block-compressed stencil buffer and a
//! per-pixel "subsector" visibility buffer. Rows of blocks are partitioned
//! among worker cores so that no two cores ever touch the same pixel.
//!
//! # Crate features
//!
//! * `std`:
//!   Makes available items requiring timekeeping or floating-point
//!   functions not included in `core`.
//!
//!   If this feature is disabled, the crate only depends on `alloc`.
//!
//! * `libm`:
//!   Provides software implementations of floating-point functions via the
//!   [libm](https://crates.io/crates/libm) crate.
//!
//! * `mm`:
//!   Provides fast approximate implementations of floating-point functions
//!   via the [micromath](https://crates.io/crates/micromath) crate.
//!
//! * `threaded`:
//!   Executes queued draw commands on a pool of scoped worker threads fed
//!   through [crossbeam-channel](https://crates.io/crates/crossbeam-channel)
//!   queues. Implies `std`.
//!
//! The `std` and `threaded` features are enabled by default.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;
extern crate core;

pub mod error;
pub mod geom;
pub mod math;
pub mod render;
pub mod util;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::geom::{NUM_VARYING, Topology, Vertex, Winding, vertex};
    pub use crate::math::mat::Mat4;
    pub use crate::render::{
        BlendMode, Context, DrawArgs, Framebuf, Palette, Renderer, Stats,
        Texture, Viewport,
    };
    pub use crate::util::buf::Buf2;
}
