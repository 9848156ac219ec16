//! sagediff - reader and comparator for SAGE binary galaxy catalogs
//!
//! A catalog is a header (tree count, galaxy count, galaxies per tree)
//! followed by every tree's fixed-size galaxy records, trees in index order.
//!
//! # Quick Start
//!
//! ```ignore
//! use sagediff::{compare_paths, CatalogFile, CompareOptions, FieldId};
//!
//! // Random access to one tree
//! let catalog = CatalogFile::open("model_z0.000_0")?;
//! let tree = catalog.read_tree(42)?;
//!
//! // Compare two runs, ignoring run-local indices
//! let options = CompareOptions::default()
//!     .exclude(FieldId::SageHaloIndex)
//!     .exclude(FieldId::SageTreeIndex);
//! let result = compare_paths("run_a/model_z0.000_0", "run_b/model_z0.000_0", &options)?;
//! assert!(result.is_equal());
//! ```
//!
//! # Architecture
//!
//! - `sage-core`: field identifiers, record layout and codec, errors
//! - `sage-storage`: header, offset table, random-access and sequential
//!   readers, writer
//! - `sage-compare`: tolerance, options, config file, comparator, reports

pub use sage_compare::*;
pub use sage_core::*;
pub use sage_storage::*;
