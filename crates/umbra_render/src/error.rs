//! Render error types

use thiserror::Error;

use crate::backend::BufferId;
use crate::shadow::GeneratorState;

/// Failures reported by a graphics backend
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("Buffer upload failed: {0}")]
    UploadFailed(String),

    #[error("Unknown buffer {0:?}")]
    UnknownBuffer(BufferId),

    #[error("Buffer {0:?} holds no data")]
    EmptyBuffer(BufferId),

    #[error("No {0} stream bound for draw")]
    MissingAttribute(&'static str),

    #[error("Index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },

    #[error("Draw failed: {0}")]
    DrawFailed(String),
}

/// Shadow generation and compositing errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShadowError {
    #[error("Light position is not finite: {0:?}")]
    InvalidLight([f32; 3]),

    #[error("Caster transform is not finite")]
    InvalidTransform,

    #[error("Shadow step out of order: expected state {expected:?}, found {found:?}")]
    OutOfOrder {
        expected: GeneratorState,
        found: GeneratorState,
    },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type for shadow operations
pub type ShadowResult<T> = Result<T, ShadowError>;
