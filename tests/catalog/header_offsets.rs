//! Header parsing and offset arithmetic against hand-built files

use crate::common::*;
use sagediff::{read_header, OffsetTable};
use std::io::Cursor;

// ============================================================================
// Two-tree fixture: T=2, N=3, counts [3, 0]
// ============================================================================

#[test]
fn two_tree_fixture_offsets() {
    let s = Scratch::new();
    let path = s.catalog("fixture", &trees(&[3, 0]));

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..16], header_bytes(&[2, 3, 3, 0]).as_slice());

    let catalog = CatalogFile::open(&path).unwrap();
    let offsets: Vec<u64> = catalog.offsets().extents().iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![16, 16 + 3 * RECORD_SIZE]);

    let empty = catalog.read_tree(1).unwrap();
    assert!(empty.is_empty());
    assert_eq!(catalog.stats().bytes_read(), 0);
}

#[test]
fn offsets_are_shifted_prefix_sums() {
    let header = CatalogHeader::new(vec![2, 0, 5, 1]).unwrap();
    let table = OffsetTable::new(&header, RECORD_SIZE as usize);
    let offsets: Vec<u64> = table.extents().iter().map(|e| e.offset).collect();
    let h = 8 + 4 * 4;
    assert_eq!(
        offsets,
        vec![
            h,
            h + 2 * RECORD_SIZE,
            h + 2 * RECORD_SIZE,
            h + 7 * RECORD_SIZE
        ]
    );
    assert_eq!(table.data_end(), h + 8 * RECORD_SIZE);
}

// ============================================================================
// Corrupt and empty inputs
// ============================================================================

#[test]
fn empty_file_is_distinct_error() {
    let s = Scratch::new();
    let path = s.raw("empty", b"");
    assert!(matches!(CatalogFile::open(&path), Err(Error::EmptyFile(_))));
    assert!(matches!(
        SequentialCatalog::open(&path),
        Err(Error::EmptyFile(_))
    ));
}

#[test]
fn sum_mismatch_is_corrupt_header() {
    let s = Scratch::new();
    let path = s.raw("bad", &header_bytes(&[2, 5, 3, 0]));
    assert!(matches!(
        CatalogFile::open(&path),
        Err(Error::CorruptHeader(_))
    ));
}

#[test]
fn negative_counts_are_corrupt_header() {
    let bytes = header_bytes(&[1, -1, -1]);
    assert!(matches!(
        read_header(&mut Cursor::new(bytes)),
        Err(Error::CorruptHeader(_))
    ));
}

#[test]
fn galaxies_without_trees_is_corrupt_header() {
    let bytes = header_bytes(&[0, 4]);
    assert!(matches!(
        read_header(&mut Cursor::new(bytes)),
        Err(Error::CorruptHeader(_))
    ));
}

#[test]
fn short_tree_table_is_truncated() {
    let s = Scratch::new();
    let path = s.raw("short", &header_bytes(&[3, 3, 1]));
    assert!(matches!(
        CatalogFile::open(&path),
        Err(Error::TruncatedFile { .. })
    ));
}

#[test]
fn zero_tree_catalog_is_valid() {
    let s = Scratch::new();
    let path = s.raw("none", &header_bytes(&[0, 0]));
    let catalog = CatalogFile::open(&path).unwrap();
    assert_eq!(catalog.header().tree_count(), 0);
    assert!(catalog.offsets().is_empty());
    assert!(catalog.read_all().unwrap().is_empty());
}
