//! Scene error types

use thiserror::Error;
use umbra_mesh::MeshError;
use umbra_render::{BackendError, ShadowError};

/// Scene construction and rendering errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("Light position requested before the first update")]
    MissingLight,

    #[error("Instance refers to unknown shape {0}")]
    UnknownShape(usize),

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Shadow error: {0}")]
    Shadow(#[from] ShadowError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
