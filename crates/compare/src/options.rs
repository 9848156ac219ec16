//! Comparison options

use crate::tolerance::Tolerance;
use sage_core::FieldId;
use std::collections::BTreeSet;

/// Default cap on recorded record indices per field and tree
pub const DEFAULT_MAX_REPORT_ENTRIES: usize = 1000;

/// Knobs for [`Comparator`](crate::Comparator)
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Fields skipped entirely
    pub excluded: BTreeSet<FieldId>,
    /// Tolerance for float fields
    pub tolerance: Tolerance,
    /// Fields records are stably sorted by before comparison; empty keeps file order
    pub sort_keys: Vec<FieldId>,
    /// Record every offending record of a field, not just the first
    pub collect_all: bool,
    /// Stop after the first tree with any mismatch
    pub fail_fast: bool,
    /// Cap on recorded indices per field and tree; the count stays exact
    pub max_report_entries: usize,
    /// Compare trees on a thread pool (random-access catalogs only)
    pub parallel: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            excluded: BTreeSet::new(),
            tolerance: Tolerance::default(),
            sort_keys: vec![FieldId::SimulationHaloIndex],
            collect_all: true,
            fail_fast: false,
            max_report_entries: DEFAULT_MAX_REPORT_ENTRIES,
            parallel: false,
        }
    }
}

impl CompareOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip `field`
    pub fn exclude(mut self, field: FieldId) -> Self {
        self.excluded.insert(field);
        self
    }

    /// Skip every field in `fields`
    pub fn exclude_all<I: IntoIterator<Item = FieldId>>(mut self, fields: I) -> Self {
        self.excluded.extend(fields);
        self
    }

    /// Set the float tolerance
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the alignment sort keys
    pub fn sort_keys(mut self, keys: Vec<FieldId>) -> Self {
        self.sort_keys = keys;
        self
    }

    /// Set whether all offending records are collected
    pub fn collect_all(mut self, on: bool) -> Self {
        self.collect_all = on;
        self
    }

    /// Set whether to stop at the first mismatching tree
    pub fn fail_fast(mut self, on: bool) -> Self {
        self.fail_fast = on;
        self
    }

    /// Set the per-field report cap
    pub fn max_report_entries(mut self, n: usize) -> Self {
        self.max_report_entries = n;
        self
    }

    /// Set whether trees are compared in parallel
    pub fn parallel(mut self, on: bool) -> Self {
        self.parallel = on;
        self
    }

    /// Fields that take part in the comparison, in layout order
    pub fn compared_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        FieldId::ALL
            .iter()
            .copied()
            .filter(move |f| !self.excluded.contains(f))
    }
}
