//! Utility types.

pub mod buf;
