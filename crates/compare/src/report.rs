//! Comparison outcomes
//!
//! Differences between two valid catalogs are data, not errors. Reader
//! failures never show up here; they propagate as `sage_core::Error`.

use sage_core::{FieldId, FieldValue};
use serde::Serialize;
use std::fmt;

/// One record whose field differs beyond tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MismatchEntry {
    /// Record index within the first catalog's tree, in file order
    pub a_index: usize,
    /// Index of the aligned record within the second catalog's tree
    pub b_index: usize,
    /// Value in the first catalog
    pub a: FieldValue,
    /// Value in the second catalog
    pub b: FieldValue,
}

/// All differences of one field within one tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMismatch {
    /// Tree index
    pub tree: usize,
    /// Offending field
    pub field: FieldId,
    /// Number of differing records; exact when `exhaustive`
    pub count: usize,
    /// Whether every record of the tree was checked
    pub exhaustive: bool,
    /// Recorded differences, capped by `max_report_entries`
    pub entries: Vec<MismatchEntry>,
}

impl FieldMismatch {
    /// File-order indices of the differing records in the first catalog
    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.a_index).collect()
    }

    /// File-order indices of the differing records in the second catalog
    pub fn b_indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.b_index).collect()
    }
}

/// One structural or value difference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Different number of trees
    TreeCount {
        /// Trees in the first catalog
        a: usize,
        /// Trees in the second catalog
        b: usize,
    },
    /// Different total galaxy count
    GalaxyCount {
        /// Galaxies in the first catalog
        a: u64,
        /// Galaxies in the second catalog
        b: u64,
    },
    /// Different galaxy count for one tree
    TreeGalaxyCount {
        /// Tree index
        tree: usize,
        /// Galaxies in the first catalog's tree
        a: u32,
        /// Galaxies in the second catalog's tree
        b: u32,
    },
    /// Decoded batches of different length
    TreeShape {
        /// Tree index
        tree: usize,
        /// Records decoded from the first catalog
        a: usize,
        /// Records decoded from the second catalog
        b: usize,
    },
    /// Field values differ
    Field(FieldMismatch),
}

impl Mismatch {
    /// Tree the difference belongs to, if any
    pub fn tree(&self) -> Option<usize> {
        match self {
            Mismatch::TreeCount { .. } | Mismatch::GalaxyCount { .. } => None,
            Mismatch::TreeGalaxyCount { tree, .. } | Mismatch::TreeShape { tree, .. } => Some(*tree),
            Mismatch::Field(f) => Some(f.tree),
        }
    }

    /// Field the difference belongs to, if any
    pub fn field(&self) -> Option<FieldId> {
        match self {
            Mismatch::Field(f) => Some(f.field),
            _ => None,
        }
    }

    /// Whether this is a count or shape difference rather than a value one
    pub fn is_structural(&self) -> bool {
        !matches!(self, Mismatch::Field(_))
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::TreeCount { a, b } => {
                write!(f, "tree count differs: catalog1 has {} trees, catalog2 has {}", a, b)
            }
            Mismatch::GalaxyCount { a, b } => write!(
                f,
                "galaxy count differs: catalog1 has {} galaxies, catalog2 has {}",
                a, b
            ),
            Mismatch::TreeGalaxyCount { tree, a, b } => write!(
                f,
                "tree {}: catalog1 has {} galaxies, catalog2 has {}",
                tree, a, b
            ),
            Mismatch::TreeShape { tree, a, b } => write!(
                f,
                "tree {}: decoded {} records from catalog1 but {} from catalog2",
                tree, a, b
            ),
            Mismatch::Field(m) => {
                let qualifier = if m.exhaustive { "" } else { "at least " };
                write!(
                    f,
                    "tree {}: field `{}` differs in {}{} record(s)",
                    m.tree, m.field, qualifier, m.count
                )
            }
        }
    }
}

/// Every difference found, in tree order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MismatchReport {
    /// Differences in discovery order
    pub mismatches: Vec<Mismatch>,
    /// Trees whose records were compared
    pub trees_compared: usize,
    /// Comparison stopped before the last tree
    pub stopped_early: bool,
}

impl MismatchReport {
    /// Field-level differences only
    pub fn field_mismatches(&self) -> impl Iterator<Item = &FieldMismatch> {
        self.mismatches.iter().filter_map(|m| match m {
            Mismatch::Field(f) => Some(f),
            _ => None,
        })
    }

    /// Whether any count or shape difference was found
    pub fn has_structural(&self) -> bool {
        self.mismatches.iter().any(Mismatch::is_structural)
    }
}

/// Outcome of comparing two catalogs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ComparisonResult {
    /// Every tree matched
    Equal {
        /// Trees compared
        trees: usize,
        /// Galaxies compared
        galaxies: u64,
    },
    /// At least one difference
    Mismatch(MismatchReport),
}

impl ComparisonResult {
    /// Whether the catalogs matched
    pub fn is_equal(&self) -> bool {
        matches!(self, ComparisonResult::Equal { .. })
    }

    /// Differences; empty when equal
    pub fn mismatches(&self) -> &[Mismatch] {
        match self {
            ComparisonResult::Equal { .. } => &[],
            ComparisonResult::Mismatch(report) => &report.mismatches,
        }
    }

    /// The report, if the catalogs differ
    pub fn report(&self) -> Option<&MismatchReport> {
        match self {
            ComparisonResult::Equal { .. } => None,
            ComparisonResult::Mismatch(report) => Some(report),
        }
    }
}
