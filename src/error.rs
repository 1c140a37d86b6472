//! Error types for the crate

use thiserror::Error;

use crate::render::buffer::{BufferHandle, BufferTarget};

/// Errors reported by the math helpers, the upload bridge and the backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller passed data that violates an operation's precondition
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The handle was never issued by this backend
    #[error("unknown buffer handle {0:?}")]
    UnknownHandle(BufferHandle),

    /// `buffer_data` was issued before any buffer was bound to the target
    #[error("no buffer bound to {0:?}")]
    NoBufferBound(BufferTarget),

    /// The backend could not allocate a buffer object
    #[error("buffer creation failed: {0}")]
    BufferCreationFailed(String),

    /// No graphics context, adapter or device could be obtained
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),

    /// Shader compilation or program linking failed
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
