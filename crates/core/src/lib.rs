//! Core types for SAGE binary galaxy catalogs
//!
//! This crate defines the pieces every other crate agrees on:
//! - FieldId / FieldKind / FieldValue: typed field identification
//! - GalaxyRecord: one decoded galaxy
//! - RecordLayout: on-disk placement of every field, record size, codec
//! - Error: reader error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod field;
pub mod layout;

pub use error::{Error, Result};
pub use field::{FieldId, FieldKind, FieldValue, GalaxyRecord};
pub use layout::{FieldSpec, RecordLayout};
