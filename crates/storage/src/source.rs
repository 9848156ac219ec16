//! Decoded tree batches and the reader abstraction over them

use crate::header::CatalogHeader;
use sage_core::{GalaxyRecord, Result};
use std::ops::Deref;

/// Decoded records of one tree
///
/// Length always equals the tree's declared galaxy count; empty batches are
/// valid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeBatch {
    tree: usize,
    records: Vec<GalaxyRecord>,
}

impl TreeBatch {
    /// Wrap decoded records of `tree`
    pub fn new(tree: usize, records: Vec<GalaxyRecord>) -> Self {
        TreeBatch { tree, records }
    }

    /// Batch for a tree with no galaxies
    pub fn empty(tree: usize) -> Self {
        TreeBatch {
            tree,
            records: Vec::new(),
        }
    }

    /// Tree index
    pub fn tree(&self) -> usize {
        self.tree
    }

    /// Records in file order
    pub fn records(&self) -> &[GalaxyRecord] {
        &self.records
    }

    /// Mutable access, for in-place normalization
    pub fn records_mut(&mut self) -> &mut Vec<GalaxyRecord> {
        &mut self.records
    }

    /// Take the records
    pub fn into_records(self) -> Vec<GalaxyRecord> {
        self.records
    }
}

impl Deref for TreeBatch {
    type Target = [GalaxyRecord];

    fn deref(&self) -> &[GalaxyRecord] {
        &self.records
    }
}

/// Anything that can hand out decoded trees of a catalog.
///
/// Both the random-access [`CatalogFile`](crate::CatalogFile) and the
/// forward-only [`SequentialCatalog`](crate::SequentialCatalog) implement
/// this, so consumers that visit trees in index order work with either.
pub trait TreeSource {
    /// Catalog header
    fn header(&self) -> &CatalogHeader;

    /// Record size in bytes
    fn record_size(&self) -> usize;

    /// Where the catalog came from, for messages
    fn describe(&self) -> &str;

    /// Decode tree `index`.
    ///
    /// Forward-only sources accept only the next unread index.
    fn read_tree(&mut self, index: usize) -> Result<TreeBatch>;
}
