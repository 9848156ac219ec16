//! Reflexivity, sensitivity and exclusion over on-disk catalogs

use crate::common::*;
use proptest::prelude::*;
use sagediff::{compare, Tolerance};
use std::collections::BTreeSet;

fn both(a: &std::path::Path, b: &std::path::Path, options: CompareOptions) -> ComparisonResult {
    let mut a = CatalogFile::open(a).unwrap();
    let mut b = CatalogFile::open(b).unwrap();
    Comparator::new(options).compare(&mut a, &mut b).unwrap()
}

// ============================================================================
// Reflexivity
// ============================================================================

#[test]
fn catalog_equals_itself() {
    let s = Scratch::new();
    let path = s.catalog("cat", &trees(&[3, 0, 2, 5]));
    let mut a = CatalogFile::open(&path).unwrap();
    let mut b = SequentialCatalog::open(&path).unwrap();
    let result = compare(&mut a, &mut b, &BTreeSet::new(), 0.0).unwrap();
    assert_eq!(result, ComparisonResult::Equal { trees: 4, galaxies: 10 });
}

#[test]
fn nan_fields_still_equal_themselves() {
    let s = Scratch::new();
    let mut t = trees(&[2]);
    t[0][1].cooling = f32::NAN;
    let path = s.catalog("cat", &t);
    assert!(both(&path, &path, CompareOptions::default()).is_equal());
}

// ============================================================================
// Sensitivity: every field, one record
// ============================================================================

fn perturb(g: &mut GalaxyRecord, field: FieldId) {
    let value = match g.get(field) {
        FieldValue::I32(v) => FieldValue::I32(v + 1),
        FieldValue::I64(v) => FieldValue::I64(v + 1),
        FieldValue::F32(v) => FieldValue::F32(v * 2.0 + 1.0),
        FieldValue::Vec3([x, y, z]) => FieldValue::Vec3([x, y, z + 10.0]),
    };
    g.set(field, value).unwrap();
}

#[test]
fn each_field_perturbation_is_reported_exactly() {
    let s = Scratch::new();
    let base = trees(&[2, 0, 3]);
    let base_path = s.catalog("base", &base);

    // the sort key itself would reorder the tree, so it is checked unsorted
    for &field in FieldId::ALL {
        let mut other = base.clone();
        perturb(&mut other[2][1], field);
        let other_path = s.catalog("other", &other);

        let options = if field == FieldId::SimulationHaloIndex {
            CompareOptions::default().sort_keys(vec![])
        } else {
            CompareOptions::default()
        };
        let result = both(&base_path, &other_path, options);
        let mismatches = result.mismatches();
        assert_eq!(mismatches.len(), 1, "field {}", field);
        match &mismatches[0] {
            Mismatch::Field(m) => {
                assert_eq!(m.field, field);
                assert_eq!(m.tree, 2);
                assert_eq!(m.indices(), vec![1]);
            }
            other => panic!("field {}: unexpected {:?}", field, other),
        }
    }
}

#[test]
fn excluding_the_perturbed_field_restores_equality() {
    let s = Scratch::new();
    let base = trees(&[4]);
    let mut other = base.clone();
    other[0][0].sage_halo_index = -5;
    other[0][3].sage_tree_index = 77;
    let a = s.catalog("a", &base);
    let b = s.catalog("b", &other);

    let excluded: BTreeSet<_> = [FieldId::SageHaloIndex, FieldId::SageTreeIndex]
        .into_iter()
        .collect();
    let mut ca = CatalogFile::open(&a).unwrap();
    let mut cb = CatalogFile::open(&b).unwrap();
    assert!(compare(&mut ca, &mut cb, &excluded, 1e-6).unwrap().is_equal());

    let partial = CompareOptions::default().exclude(FieldId::SageHaloIndex);
    let result = both(&a, &b, partial);
    assert_eq!(result.mismatches().len(), 1);
    assert_eq!(result.mismatches()[0].field(), Some(FieldId::SageTreeIndex));
}

// ============================================================================
// Alignment
// ============================================================================

#[test]
fn reordered_trees_align_by_halo_index() {
    let s = Scratch::new();
    let base = trees(&[5, 3]);
    let mut shuffled = base.clone();
    shuffled[0].swap(0, 4);
    shuffled[1].rotate_left(1);
    let a = s.catalog("a", &base);
    let b = s.catalog("b", &shuffled);

    assert!(both(&a, &b, CompareOptions::default()).is_equal());
    assert!(!both(&a, &b, CompareOptions::default().sort_keys(vec![])).is_equal());
}

// ============================================================================
// Tolerance
// ============================================================================

#[test]
fn tolerance_bounds_float_differences() {
    let s = Scratch::new();
    let base = trees(&[1]);
    let mut other = base.clone();
    other[0][0].stellar_mass *= 1.0 + 1e-4;
    let a = s.catalog("a", &base);
    let b = s.catalog("b", &other);

    assert!(!both(&a, &b, CompareOptions::default()).is_equal());
    let loose = CompareOptions::default().tolerance(Tolerance::relative(1e-3));
    assert!(both(&a, &b, loose).is_equal());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn single_perturbation_found_anywhere(
        counts in prop::collection::vec(1usize..4, 1..6),
        pick in any::<prop::sample::Index>(),
        field in prop::sample::select(FieldId::ALL.to_vec()),
    ) {
        prop_assume!(field != FieldId::SimulationHaloIndex);
        let s = Scratch::new();
        let base = trees(&counts);
        let flat: Vec<(usize, usize)> = counts
            .iter()
            .enumerate()
            .flat_map(|(t, &n)| (0..n).map(move |r| (t, r)))
            .collect();
        let (tree, record) = flat[pick.index(flat.len())];

        let mut other = base.clone();
        perturb(&mut other[tree][record], field);
        let result = both(&s.catalog("a", &base), &s.catalog("b", &other), CompareOptions::default());

        prop_assert_eq!(result.mismatches().len(), 1);
        prop_assert_eq!(result.mismatches()[0].tree(), Some(tree));
        prop_assert_eq!(result.mismatches()[0].field(), Some(field));
    }
}
