//! Per-frame vertex storage.

use alloc::vec::Vec;
use core::ops::Range;

use crate::geom::Vertex;
use crate::{Error, Result};

/// A bump allocator for the vertices of queued draw calls.
///
/// Vertices are copied in at submission and referenced by index range
/// until the frame is finished, after which the arena is reset and its
/// memory reused by the next frame.
#[derive(Clone, Debug)]
pub struct VertexArena {
    verts: Vec<Vertex>,
    capacity: usize,
}

impl VertexArena {
    /// Returns an empty arena able to hold `capacity` vertices per frame.
    ///
    /// Memory is allocated as needed rather than up front.
    pub fn new(capacity: usize) -> Self {
        Self { verts: Vec::new(), capacity }
    }

    /// Copies `verts` into the arena and returns their index range.
    ///
    /// # Errors
    /// [`Error::ArenaFull`] if `verts` does not fit in the remaining
    /// space. Nothing is copied in that case.
    pub fn push(&mut self, verts: &[Vertex]) -> Result<Range<usize>> {
        let available = self.remaining();
        if verts.len() > available {
            return Err(Error::ArenaFull {
                requested: verts.len(),
                available,
            });
        }
        let start = self.verts.len();
        self.verts.extend_from_slice(verts);
        Ok(start..self.verts.len())
    }

    /// Returns the vertices in `range`.
    ///
    /// # Panics
    /// If `range` is out of bounds.
    pub fn get(&self, range: Range<usize>) -> &[Vertex] {
        &self.verts[range]
    }

    /// Returns every vertex in the arena.
    pub fn as_slice(&self) -> &[Vertex] {
        &self.verts
    }

    /// Frees every vertex while keeping the allocated memory.
    pub fn reset(&mut self) {
        self.verts.clear();
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Returns the number of vertices that can still be pushed.
    pub fn remaining(&self) -> usize {
        self.capacity - self.verts.len()
    }
}
