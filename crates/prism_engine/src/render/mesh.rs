//! Geometry data for mesh creation
//!
//! The engine consumes geometry as a passive record produced by the host
//! application or an asset pipeline. It never generates or decodes geometry
//! itself; meshes are created from this record through the render device.

use crate::foundation::math::{Vec2, Vec3, Vec4};

/// Vertex attribute and index arrays for one mesh.
///
/// Channels other than positions and indices may be empty when the mesh
/// does not use them. Colors are one RGBA value per vertex.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Per-vertex RGBA colors
    pub colors: Vec<Vec4>,
    /// Vertex normals
    pub normals: Vec<Vec3>,
    /// Texture coordinates
    pub texcoords: Vec<Vec2>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create an empty geometry record
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indices to draw
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// True when the record carries vertex normals
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }
}

/// One vertex attribute channel with its replacement data.
///
/// Used to update a sub-range of an already-created mesh, such as
/// re-uploading colors after a material change or replacing the glyph
/// quads of baked text.
#[derive(Debug, Clone, Copy)]
pub enum ChannelData<'a> {
    /// Vertex positions
    Positions(&'a [Vec3]),
    /// Per-vertex RGBA colors
    Colors(&'a [Vec4]),
    /// Vertex normals
    Normals(&'a [Vec3]),
    /// Texture coordinates
    Texcoords(&'a [Vec2]),
    /// Triangle indices
    Indices(&'a [u32]),
}
