//! # umbra_mesh - Shadow-Casting Meshes
//!
//! Builds immutable triangle meshes for the shadow volume pipeline:
//!
//! - Coincident vertices merged through a quantized spatial hash
//! - Per-triangle edge records whose identity is the unordered vertex pair
//! - Precomputed unit normals and centroids
//! - Degenerate triangles flagged instead of silently accepted
//!
//! ## Example
//!
//! ```ignore
//! use umbra_mesh::prelude::*;
//!
//! let cube = Mesh::from_source(&CuboidShape::cube(1.0))?;
//! assert_eq!(cube.triangle_count(), 12);
//! assert!(cube.is_closed_manifold());
//! ```

pub mod error;
pub mod mesh;
pub mod builder;
pub mod shapes;

pub use error::{MeshError, MeshResult};
pub use mesh::{
    Edge, EdgeId, EdgeKey, Mesh, MeshStats, RenderGeometry, Triangle, TriangleId, VertexId,
};
pub use builder::{MeshBuilder, TexturedVertex, DEFAULT_RESOLUTION};
pub use shapes::{CuboidShape, MeshSource, PyramidShape, ShapeKind, StarShape};

pub mod prelude {
    pub use crate::builder::{MeshBuilder, TexturedVertex};
    pub use crate::mesh::{EdgeKey, Mesh, Triangle};
    pub use crate::shapes::{CuboidShape, MeshSource, PyramidShape, ShapeKind, StarShape};
    pub use crate::error::{MeshError, MeshResult};
}
