//! Tree offset table
//!
//! Turns per-tree galaxy counts into absolute byte offsets so any tree can be
//! read with one positioned read. Pure arithmetic; no I/O.
//!
//! Each tree starts where the previous tree's data ends:
//!
//! ```text
//! offset[0] = header_size
//! offset[i] = offset[i-1] + galaxies[i-1] * record_size
//! ```

use crate::header::CatalogHeader;

/// Location and size of one tree's data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeExtent {
    /// Absolute byte offset of the tree's first record
    pub offset: u64,
    /// Galaxies in the tree
    pub galaxies: u32,
    /// Bytes of record data
    pub byte_len: u64,
}

impl TreeExtent {
    /// One past the tree's last byte
    pub fn end(&self) -> u64 {
        self.offset + self.byte_len
    }

    /// Whether the tree has no galaxies
    pub fn is_empty(&self) -> bool {
        self.galaxies == 0
    }
}

/// Offsets of every tree in a catalog
///
/// Computed once from a header; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    extents: Vec<TreeExtent>,
    header_size: u64,
    record_size: usize,
}

impl OffsetTable {
    /// Build the table for `header` with records of `record_size` bytes
    pub fn new(header: &CatalogHeader, record_size: usize) -> Self {
        let header_size = header.header_size();
        let mut offset = header_size;
        let extents = header
            .galaxies_per_tree()
            .iter()
            .map(|&galaxies| {
                let byte_len = galaxies as u64 * record_size as u64;
                let extent = TreeExtent {
                    offset,
                    galaxies,
                    byte_len,
                };
                offset += byte_len;
                extent
            })
            .collect();

        OffsetTable {
            extents,
            header_size,
            record_size,
        }
    }

    /// Extent of `tree`, if it exists
    pub fn extent(&self, tree: usize) -> Option<TreeExtent> {
        self.extents.get(tree).copied()
    }

    /// Start offset of `tree`
    pub fn offset(&self, tree: usize) -> Option<u64> {
        self.extents.get(tree).map(|e| e.offset)
    }

    /// All extents in tree order
    pub fn extents(&self) -> &[TreeExtent] {
        &self.extents
    }

    /// Number of trees
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    /// Whether the catalog has no trees
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Offset of the first tree
    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    /// Record size the table was built for
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// One past the last byte of record data
    pub fn data_end(&self) -> u64 {
        self.extents
            .last()
            .map(|e| e.end())
            .unwrap_or(self.header_size)
    }
}
