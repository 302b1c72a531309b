//! Mesh error types

use thiserror::Error;

use crate::mesh::{TriangleId, VertexId};

/// Mesh construction errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("Vertex position is not finite: ({x}, {y}, {z})")]
    NonFiniteVertex { x: f32, y: f32, z: f32 },

    #[error("Quantization resolution must be finite and positive, got {0}")]
    InvalidResolution(f32),

    #[error("Vertex {0:?} is out of range")]
    VertexOutOfRange(VertexId),

    #[error("Triangle {0:?} is out of range")]
    TriangleOutOfRange(TriangleId),

    #[error("Shape '{shape}' is invalid: {reason}")]
    InvalidShape { shape: String, reason: String },
}

/// Result type for mesh operations
pub type MeshResult<T> = Result<T, MeshError>;
