//! Trellis integration test support.
//!
//! `SimStore` is an in-process stand-in for the remote store: it speaks
//! the row wire format over the `Transport` trait, assigns record numbers
//! and revisions, evaluates queries, and applies bulk envelopes
//! atomically. The integration suites in `tests/` drive a real
//! `Connection` against it.


pub mod prelude {
    pub use crate::store::SimStore;
    pub use std::sync::Arc;
    pub use trellis_client::{ApiError, BulkRequest, Connection, ResultSet};
    pub use trellis_core::{AppId, Record, RecordId, Revision};
}
