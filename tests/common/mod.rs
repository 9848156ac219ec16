//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};
pub use sagediff::{
    CatalogFile, CatalogHeader, CompareOptions, Comparator, ComparisonResult, Error, FieldId,
    FieldValue, GalaxyRecord, Mismatch, SequentialCatalog, SizeCheck, TreeSource,
};
use tempfile::TempDir;

pub const RECORD_SIZE: u64 = 232;

// ============================================================================
// Records
// ============================================================================

/// A galaxy with every field set to something derived from `halo`, so that
/// no two galaxies share a field value by accident.
pub fn galaxy(halo: i64) -> GalaxyRecord {
    let mut g = GalaxyRecord::default();
    for (i, field) in FieldId::ALL.iter().enumerate() {
        let i = i as i64;
        let value = match field.kind() {
            sagediff::FieldKind::I32 => FieldValue::I32((halo * 100 + i) as i32),
            sagediff::FieldKind::I64 => FieldValue::I64(halo * 1_000_000 + i),
            sagediff::FieldKind::F32 => FieldValue::F32(halo as f32 * 1.5 + i as f32 * 0.01),
            sagediff::FieldKind::Vec3 => {
                let base = halo as f32 + i as f32 * 0.1;
                FieldValue::Vec3([base, base * 2.0, base * -3.0])
            }
        };
        g.set(*field, value).unwrap();
    }
    g.simulation_halo_index = halo;
    g
}

/// Trees with the given galaxy counts; halo indices increase across the catalog
pub fn trees(counts: &[usize]) -> Vec<Vec<GalaxyRecord>> {
    let mut next = 1;
    counts
        .iter()
        .map(|&n| {
            (0..n)
                .map(|_| {
                    next += 1;
                    galaxy(next)
                })
                .collect()
        })
        .collect()
}

// ============================================================================
// Files
// ============================================================================

/// Catalog files in a scratch directory
pub struct Scratch {
    pub dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Scratch {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `trees` as catalog `name`
    pub fn catalog(&self, name: &str, trees: &[Vec<GalaxyRecord>]) -> PathBuf {
        let path = self.path(name);
        sagediff::write_catalog(&path, trees).unwrap();
        path
    }

    /// Write raw bytes as file `name`
    pub fn raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

/// Header bytes from raw int32 values
pub fn header_bytes(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Truncate a file by `by` bytes
pub fn chop(path: &Path, by: usize) {
    let bytes = std::fs::read(path).unwrap();
    std::fs::write(path, &bytes[..bytes.len() - by]).unwrap();
}
