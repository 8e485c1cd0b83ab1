//! Trellis Client
//!
//! The connection layer of the Trellis client: the `Transport` trait the
//! caller supplies, the JSON row wire format, the `ResultSet` cursor over
//! query results, the `BulkRequest` accumulator, and the `Connection`
//! CRUD/query orchestration with optimistic concurrency control.

mod bulk;
mod connection;
mod error;
mod resultset;
mod transport;
pub mod wire;

pub use bulk::{BulkRequest, Operation};
pub use connection::Connection;
pub use error::{ApiError, ApiResult};
pub use resultset::ResultSet;
pub use transport::{paths, ApiRequest, ApiResponse, Method, Transport, TransportError};
