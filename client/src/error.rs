//! Client error taxonomy.

use crate::TransportError;
use thiserror::Error;
use trellis_core::CoreError;

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the connection layer.
///
/// The client performs no local recovery: every failure from
/// serialization, the store, or the transport reaches the caller as one
/// of these kinds, and a rejected multi-record or bulk operation never
/// exposes partial success.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A typed accessor against an incompatible field, or a malformed
    /// stored date. A programmer/data error; not retried.
    #[error(transparent)]
    TypeMismatch(#[from] CoreError),

    /// A revision check failed. The caller may re-read and retry; the
    /// store never resolves the conflict silently.
    #[error("revision conflict: {message}")]
    Conflict { message: String },

    /// Any other rejection from the store, with its message.
    #[error("remote operation failed (status {status}): {message}")]
    Remote { status: u16, message: String },

    /// A network-level failure from the transport, passed through.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response or payload that does not match the wire contract.
    #[error("malformed wire data: {message}")]
    Wire { message: String },

    /// A local upload source could not be read.
    #[error("upload failed: {message}")]
    Upload { message: String },

    /// A result-set getter was called while the cursor is not on a record.
    #[error("cursor is not on a record (position {position})")]
    CursorOutOfRange { position: isize },
}

impl ApiError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn wire(message: impl Into<String>) -> Self {
        Self::Wire {
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }
}
