//! Random-access and sequential readers over the same files

use crate::common::*;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

// ============================================================================
// Equivalence
// ============================================================================

#[test]
fn random_and_sequential_decode_identically() {
    let s = Scratch::new();
    let path = s.catalog("cat", &trees(&[4, 0, 1, 0, 0, 7, 2]));

    let random = CatalogFile::open(&path).unwrap();
    let sequential = SequentialCatalog::open(&path).unwrap();
    let mut count = 0;
    for batch in sequential {
        let batch = batch.unwrap();
        assert_eq!(random.read_tree(batch.tree()).unwrap(), batch);
        count += 1;
    }
    assert_eq!(count, 7);
}

#[test]
fn written_records_read_back() {
    let s = Scratch::new();
    let written = trees(&[2, 0, 3]);
    let path = s.catalog("cat", &written);

    let catalog = CatalogFile::open(&path).unwrap();
    for (i, tree) in written.iter().enumerate() {
        assert_eq!(catalog.read_tree(i).unwrap().records(), tree.as_slice());
    }
    let flat: Vec<GalaxyRecord> = written.into_iter().flatten().collect();
    assert_eq!(catalog.read_all().unwrap(), flat);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn readers_agree_for_any_shape(counts in prop::collection::vec(0usize..5, 0..12)) {
        let s = Scratch::new();
        let path = s.catalog("cat", &trees(&counts));
        let random = CatalogFile::open(&path).unwrap();
        let mut sequential = SequentialCatalog::open(&path).unwrap();

        for i in 0..counts.len() {
            let a = random.read_tree(i).unwrap();
            let b = TreeSource::read_tree(&mut sequential, i).unwrap();
            prop_assert_eq!(a.len(), counts[i]);
            prop_assert_eq!(a, b);
        }
        prop_assert!(sequential.is_exhausted());
    }
}

// ============================================================================
// Independence of positioned reads
// ============================================================================

#[test]
fn concurrent_readers_share_one_handle() {
    let s = Scratch::new();
    let written = trees(&[3, 1, 4, 1, 5, 9, 2, 6]);
    let path = s.catalog("cat", &written);
    let catalog = Arc::new(CatalogFile::open(&path).unwrap());
    let written = Arc::new(written);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let catalog = Arc::clone(&catalog);
            let written = Arc::clone(&written);
            thread::spawn(move || {
                // each thread walks the trees in a different order
                for k in 0..written.len() {
                    let i = (k * 3 + t) % written.len();
                    assert_eq!(catalog.read_tree(i).unwrap().records(), written[i].as_slice());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn two_readers_on_one_file_are_independent() {
    let s = Scratch::new();
    let path = s.catalog("cat", &trees(&[2, 2, 2]));
    let a = CatalogFile::open(&path).unwrap();
    let mut b = SequentialCatalog::open(&path).unwrap();

    let first = b.next_tree().unwrap().unwrap();
    assert_eq!(a.read_tree(2).unwrap().len(), 2);
    let second = b.next_tree().unwrap().unwrap();
    assert_eq!(first, a.read_tree(0).unwrap());
    assert_eq!(second, a.read_tree(1).unwrap());
}

// ============================================================================
// Truncation
// ============================================================================

#[test]
fn truncated_last_tree_fails_instead_of_short_batch() {
    let s = Scratch::new();
    let path = s.catalog("cat", &trees(&[1, 0, 3]));
    chop(&path, 1);

    let catalog = CatalogFile::open(&path).unwrap();
    assert_eq!(catalog.size_check(), SizeCheck::Short(1));
    assert_eq!(catalog.read_tree(0).unwrap().len(), 1);
    assert!(catalog.read_tree(1).unwrap().is_empty());
    match catalog.read_tree(2) {
        Err(Error::TruncatedFile {
            expected,
            available,
            ..
        }) => {
            assert_eq!(expected, 3 * RECORD_SIZE);
            assert_eq!(available, 3 * RECORD_SIZE - 1);
        }
        other => panic!("expected TruncatedFile, got {:?}", other),
    }

    let mut sequential = SequentialCatalog::open(&path).unwrap();
    assert!(matches!(
        sequential.read_all(),
        Err(Error::TruncatedFile { .. })
    ));
}

#[test]
fn huge_declared_tree_on_tiny_file_is_truncated() {
    let s = Scratch::new();
    let mut bytes = header_bytes(&[1, i32::MAX, i32::MAX]);
    bytes.extend_from_slice(&[0u8; RECORD_SIZE as usize]);
    let path = s.raw("huge", &bytes);

    let catalog = CatalogFile::open(&path).unwrap();
    assert!(matches!(
        catalog.read_tree(0),
        Err(Error::TruncatedFile { available, .. }) if available == RECORD_SIZE
    ));
    let mut sequential = SequentialCatalog::open(&path).unwrap();
    assert!(matches!(
        sequential.next_tree(),
        Err(Error::TruncatedFile { .. })
    ));

    let other = s.raw("other", &bytes);
    for parallel in [false, true] {
        let options = CompareOptions::default().parallel(parallel);
        assert!(matches!(
            sagediff::compare_paths(&path, &other, &options),
            Err(Error::TruncatedFile { .. })
        ));
    }
}

#[test]
fn file_ending_in_header_table_region() {
    let s = Scratch::new();
    let path = s.catalog("cat", &trees(&[1, 1]));
    let bytes = std::fs::read(&path).unwrap();
    let path = s.raw("short", &bytes[..12]);
    assert!(matches!(
        CatalogFile::open(&path),
        Err(Error::TruncatedFile { .. })
    ));
}

#[test]
fn trailing_bytes_do_not_affect_trees() {
    let s = Scratch::new();
    let written = trees(&[2, 1]);
    let path = s.catalog("cat", &written);
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(&[0xFF; 40]);
    let path = s.raw("padded", &bytes);

    let catalog = CatalogFile::open(&path).unwrap();
    let summary = catalog.summary();
    assert_eq!(summary.file_size, summary.expected_size + 40);
    assert_eq!(catalog.read_tree(1).unwrap().records(), written[1].as_slice());

    assert_eq!(catalog.size_check(), SizeCheck::Trailing(40));

    let mut sequential = SequentialCatalog::open(&path).unwrap();
    assert_eq!(sequential.size_check(), Some(SizeCheck::Trailing(40)));
    sequential.read_all().unwrap();
    assert_eq!(sequential.trailing_bytes(64).unwrap(), 40);
}
