//! Whole-file comparison, serial and parallel

use crate::common::*;
use sagediff::{compare_paths, CompareConfig};

fn fixture(s: &Scratch) -> (std::path::PathBuf, std::path::PathBuf) {
    let base = trees(&[3, 0, 4, 1, 0, 2]);
    let mut other = base.clone();
    other[0][2].cold_gas += 100.0;
    other[2][0].len += 1;
    other[2][3].len += 1;
    other[5][1].vel[0] = -1.0;
    (s.catalog("a", &base), s.catalog("b", &other))
}

#[test]
fn parallel_matches_serial() {
    let s = Scratch::new();
    let (a, b) = fixture(&s);

    for fail_fast in [false, true] {
        let options = CompareOptions::default().fail_fast(fail_fast);
        let serial = compare_paths(&a, &b, &options).unwrap();
        let parallel = compare_paths(&a, &b, &options.clone().parallel(true)).unwrap();
        assert_eq!(serial, parallel, "fail_fast = {}", fail_fast);
    }
}

#[test]
fn report_lists_every_difference_in_tree_order() {
    let s = Scratch::new();
    let (a, b) = fixture(&s);
    let result = compare_paths(&a, &b, &CompareOptions::default()).unwrap();
    let report = result.report().unwrap();

    assert_eq!(report.trees_compared, 6);
    assert!(!report.stopped_early);
    let found: Vec<(Option<usize>, Option<FieldId>)> = report
        .mismatches
        .iter()
        .map(|m| (m.tree(), m.field()))
        .collect();
    assert_eq!(
        found,
        vec![
            (Some(0), Some(FieldId::ColdGas)),
            (Some(2), Some(FieldId::Len)),
            (Some(5), Some(FieldId::Vel)),
        ]
    );
    let len = report.field_mismatches().nth(1).unwrap();
    assert_eq!(len.indices(), vec![0, 3]);
}

#[test]
fn fail_fast_stops_at_first_differing_tree() {
    let s = Scratch::new();
    let (a, b) = fixture(&s);
    let options = CompareOptions::default().fail_fast(true);
    let result = compare_paths(&a, &b, &options).unwrap();
    let report = result.report().unwrap();
    assert!(report.stopped_early);
    assert_eq!(report.trees_compared, 1);
    assert_eq!(report.mismatches.len(), 1);
}

#[test]
fn structural_difference_is_data_not_error() {
    let s = Scratch::new();
    let a = s.catalog("a", &trees(&[2, 2]));
    let b = s.catalog("b", &trees(&[2, 2, 0]));
    let result = compare_paths(&a, &b, &CompareOptions::default()).unwrap();
    assert_eq!(result.mismatches(), &[Mismatch::TreeCount { a: 2, b: 3 }]);

    let c = s.catalog("c", &trees(&[3, 1]));
    let result = compare_paths(&a, &c, &CompareOptions::default().parallel(true)).unwrap();
    assert_eq!(
        result.mismatches(),
        &[
            Mismatch::TreeGalaxyCount { tree: 0, a: 2, b: 3 },
            Mismatch::TreeGalaxyCount { tree: 1, a: 2, b: 1 },
        ]
    );
}

#[test]
fn reader_errors_propagate() {
    let s = Scratch::new();
    let (a, b) = fixture(&s);
    chop(&b, 10);

    for parallel in [false, true] {
        let options = CompareOptions::default().parallel(parallel);
        assert!(matches!(
            compare_paths(&a, &b, &options),
            Err(Error::TruncatedFile { .. })
        ));
    }

    let empty = s.raw("empty", b"");
    assert!(matches!(
        compare_paths(&a, &empty, &CompareOptions::default()),
        Err(Error::EmptyFile(_))
    ));
}

#[test]
fn open_failures_name_the_file() {
    let s = Scratch::new();
    let (a, _) = fixture(&s);
    let bad = s.raw("bad", &header_bytes(&[2, 5, 3, 0]));

    for parallel in [false, true] {
        let options = CompareOptions::default().parallel(parallel);
        match compare_paths(&a, &bad, &options) {
            Err(err @ Error::Catalog { .. }) => {
                assert!(matches!(err.root(), Error::CorruptHeader(_)));
                assert!(err.to_string().starts_with(&bad.display().to_string()));
            }
            other => panic!("expected a labelled error, got {:?}", other),
        }
    }
}

#[test]
fn config_file_drives_comparison() {
    let s = Scratch::new();
    let (a, b) = fixture(&s);
    let config_path = s.raw(
        "sagediff.toml",
        br#"
exclude = ["ColdGas", "Len", "Vel"]
parallel = true
"#,
    );
    let options = CompareConfig::from_file(&config_path)
        .unwrap()
        .to_options()
        .unwrap();
    assert!(compare_paths(&a, &b, &options).unwrap().is_equal());
}
