//! Storage layer for SAGE binary galaxy catalogs
//!
//! This crate implements everything that touches catalog bytes:
//! - CatalogHeader: tree count, galaxy count, per-tree counts
//! - OffsetTable: absolute byte offset of every tree
//! - CatalogFile: random access through positioned reads
//! - SequentialCatalog: single forward pass over any `Read`
//! - TreeSource: the reader abstraction both implement
//! - CatalogWriter: placeholder-header-then-finalize writer
//!
//! The two readers are distinct types. A catalog is opened either for
//! random access or for one sequential pass, never both through the same
//! handle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod header;
pub mod offsets;
mod pread;
pub mod sequential;
pub mod source;
pub mod writer;

pub use catalog::{CatalogFile, CatalogSummary, ReadStats};
pub use header::{read_header, CatalogHeader, SizeCheck, HEADER_PREAMBLE_SIZE};
pub use offsets::{OffsetTable, TreeExtent};
pub use sequential::SequentialCatalog;
pub use source::{TreeBatch, TreeSource};
pub use writer::{encode_catalog, write_catalog, CatalogWriter};
