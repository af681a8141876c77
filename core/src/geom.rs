//! Vertices, triangles, and primitive topologies.

/// Number of varying (interpolated) attributes carried by each vertex.
///
/// Varyings 0 and 1 are the texture coordinates u and v.
pub const NUM_VARYING: usize = 2;

/// Vertex with a homogeneous position and a fixed set of varyings.
///
/// Submitted vertices are in object space. The same type also carries the
/// output of the clipper (clip space) and of the projector (screen space,
/// with `w` replaced by its reciprocal).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    /// Position (x, y, z, w).
    pub pos: [f32; 4],
    /// Attributes interpolated across the triangle.
    pub var: [f32; NUM_VARYING],
}

/// Triangle, defined by three vertices.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct Tri<V>(pub [V; 3]);

/// How a vertex stream is assembled into triangles.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Topology {
    /// Each three consecutive vertices form an independent triangle.
    #[default]
    List,
    /// Every triangle shares the first vertex:
    /// (0, 1, 2), (0, 2, 3), (0, 3, 4), …
    Fan,
    /// Every three consecutive vertices form a triangle, with the winding
    /// alternating: (0, 1, 2), (1, 2, 3)…
    Strip,
}

/// The winding order of front-facing triangles in clip space.
///
/// Clip space has y pointing up; a triangle whose vertices go
/// counter-clockwise there ends up with positive orientation after the
/// y flip of the viewport transform. Triangles whose winding does not
/// match are back faces and produce no coverage.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Winding {
    #[default]
    Ccw,
    Cw,
}

/// Returns a new vertex.
#[inline]
pub const fn vertex(pos: [f32; 4], var: [f32; NUM_VARYING]) -> Vertex {
    Vertex { pos, var }
}

impl Vertex {
    #[inline]
    pub const fn x(&self) -> f32 {
        self.pos[0]
    }
    #[inline]
    pub const fn y(&self) -> f32 {
        self.pos[1]
    }
    #[inline]
    pub const fn z(&self) -> f32 {
        self.pos[2]
    }
    #[inline]
    pub const fn w(&self) -> f32 {
        self.pos[3]
    }
}

impl Winding {
    /// Returns the opposite winding.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Ccw => Self::Cw,
            Self::Cw => Self::Ccw,
        }
    }
}
