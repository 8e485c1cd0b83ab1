//! The transport collaborator: one authenticated request/response call.
//!
//! The client core never opens sockets itself. Credential acquisition,
//! session handling, proxies, retries and timeouts all belong to the
//! `Transport` implementation the caller supplies.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Well-known API paths of the store.
pub mod paths {
    /// Record collection endpoint (select/insert/update/delete).
    pub const RECORDS: &str = "records";
    /// Atomic multi-operation submission endpoint.
    pub const BULK: &str = "bulkRequest";
    /// File content endpoint.
    pub const FILE: &str = "file";
}

/// HTTP-like request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One request to the store.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// One response from the store.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// A successful response carrying a body.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// An error response carrying a message.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "message": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A network-level failure, surfaced as-is. Whether and how to retry is
/// the caller's decision, never this crate's.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("network failure: {message}")]
    Network { message: String },
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

/// Performs one authenticated call against the store.
///
/// A non-2xx status is a normal `ApiResponse`, not a `TransportError`;
/// only connectivity-level failures use the error channel.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request)
    }
}
