//! Field-by-field comparison of SAGE galaxy catalogs
//!
//! Walks two catalogs tree by tree: header counts first, then per-tree
//! counts, then every non-excluded field of every record, after aligning the
//! records of each tree by a stable identity key. Differences come back as a
//! [`ComparisonResult`]; reader failures come back as `Err`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod comparator;
pub mod config;
pub mod options;
pub mod report;
pub mod tolerance;

pub use comparator::{compare, compare_paths, Comparator};
pub use config::{parse_fields, CompareConfig};
pub use options::{CompareOptions, DEFAULT_MAX_REPORT_ENTRIES};
pub use report::{ComparisonResult, FieldMismatch, Mismatch, MismatchEntry, MismatchReport};
pub use tolerance::{Tolerance, DEFAULT_ATOL, DEFAULT_RTOL};
