//! Trellis Core Types
//!
//! This crate provides the foundational types of the Trellis client:
//! - Identity types (AppId, RecordId, Revision)
//! - The FieldValue enum with all field kinds and their payloads
//! - Field and Record structures
//! - Common error types

mod error;
mod field;
mod id;
mod record;
mod value;

pub use error::*;
pub use field::*;
pub use id::*;
pub use record::*;
pub use value::*;
