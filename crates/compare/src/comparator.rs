//! Tree-by-tree catalog comparison
//!
//! The walk has four steps:
//!
//! 1. Header counts: tree count and total galaxy count must agree, or the
//!    comparison ends right there.
//! 2. Per-tree counts: a tree whose galaxy count differs is reported and its
//!    records are not compared.
//! 3. Alignment: each tree's records are stably sorted by the sort keys, so
//!    catalogs that emit galaxies in a different order still line up.
//! 4. Fields: every non-excluded field is compared record by record, exact
//!    for integers and within tolerance for floats.
//!
//! Trees are always requested in index order, empty ones included, so a
//! forward-only source works as well as a random-access one.

use crate::options::CompareOptions;
use crate::report::{ComparisonResult, FieldMismatch, Mismatch, MismatchEntry, MismatchReport};
use crate::tolerance::Tolerance;
use rayon::prelude::*;
use sage_core::{Error, FieldId, FieldValue, GalaxyRecord, Result};
use sage_storage::{CatalogFile, CatalogHeader, SequentialCatalog, TreeSource};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Compares two catalogs under a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    /// Comparator with `options`
    pub fn new(options: CompareOptions) -> Self {
        Comparator { options }
    }

    /// Options in use
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two sources, visiting trees `0..T` in order.
    ///
    /// Reader errors abort the comparison and are returned as `Err`.
    pub fn compare<A, B>(&self, a: &mut A, b: &mut B) -> Result<ComparisonResult>
    where
        A: TreeSource + ?Sized,
        B: TreeSource + ?Sized,
    {
        check_record_sizes(a.record_size(), b.record_size())?;
        let (header_a, header_b) = (a.header().clone(), b.header().clone());
        if let Some(report) = self.check_headers(&header_a, &header_b) {
            return Ok(self.finish(report, &header_a));
        }

        let tree_count = header_a.tree_count();
        let mut report = MismatchReport::default();
        for tree in 0..tree_count {
            let batch_a = a.read_tree(tree)?;
            let batch_b = b.read_tree(tree)?;
            let found = self.compare_tree(
                tree,
                &header_a,
                &header_b,
                batch_a.into_records(),
                batch_b.into_records(),
            );
            if self.record_tree(&mut report, tree, tree_count, found) {
                break;
            }
        }
        Ok(self.finish(report, &header_a))
    }

    /// Compare two random-access catalogs with trees spread across the rayon
    /// pool.
    ///
    /// Per-tree results are merged in tree order, so the outcome is the same
    /// as [`compare`](Self::compare) on the same inputs.
    pub fn compare_parallel(&self, a: &CatalogFile, b: &CatalogFile) -> Result<ComparisonResult> {
        check_record_sizes(a.layout().record_size(), b.layout().record_size())?;
        let (header_a, header_b) = (a.header(), b.header());
        if let Some(report) = self.check_headers(header_a, header_b) {
            return Ok(self.finish(report, header_a));
        }

        let tree_count = header_a.tree_count();
        debug!(trees = tree_count, threads = rayon::current_num_threads(), "Comparing in parallel");
        let per_tree: Vec<Result<Vec<Mismatch>>> = (0..tree_count)
            .into_par_iter()
            .map(|tree| {
                let batch_a = a.read_tree(tree)?;
                let batch_b = b.read_tree(tree)?;
                Ok(self.compare_tree(
                    tree,
                    header_a,
                    header_b,
                    batch_a.into_records(),
                    batch_b.into_records(),
                ))
            })
            .collect();

        let mut report = MismatchReport::default();
        for (tree, found) in per_tree.into_iter().enumerate() {
            if self.record_tree(&mut report, tree, tree_count, found?) {
                break;
            }
        }
        Ok(self.finish(report, header_a))
    }

    /// Step 1, plus the per-tree counts when the totals already disagree.
    ///
    /// Returns a report when the catalogs cannot be compared tree by tree.
    fn check_headers(&self, a: &CatalogHeader, b: &CatalogHeader) -> Option<MismatchReport> {
        let mut mismatches = Vec::new();
        if a.tree_count() != b.tree_count() {
            mismatches.push(Mismatch::TreeCount {
                a: a.tree_count(),
                b: b.tree_count(),
            });
        }
        if a.total_galaxies() != b.total_galaxies() {
            mismatches.push(Mismatch::GalaxyCount {
                a: a.total_galaxies(),
                b: b.total_galaxies(),
            });
            if a.tree_count() == b.tree_count() {
                mismatches.extend(tree_count_mismatches(a, b));
            }
        }
        if mismatches.is_empty() {
            return None;
        }
        for m in &mismatches {
            warn!(mismatch = %m, "Catalog structure differs");
        }
        Some(MismatchReport {
            mismatches,
            trees_compared: 0,
            stopped_early: a.tree_count() > 0,
        })
    }

    /// Steps 2 to 4 for one tree
    fn compare_tree(
        &self,
        tree: usize,
        header_a: &CatalogHeader,
        header_b: &CatalogHeader,
        records_a: Vec<GalaxyRecord>,
        records_b: Vec<GalaxyRecord>,
    ) -> Vec<Mismatch> {
        let count_a = header_a.galaxies_in_tree(tree).unwrap_or(0);
        let count_b = header_b.galaxies_in_tree(tree).unwrap_or(0);
        if count_a != count_b {
            return vec![Mismatch::TreeGalaxyCount {
                tree,
                a: count_a,
                b: count_b,
            }];
        }
        if records_a.len() != records_b.len() {
            return vec![Mismatch::TreeShape {
                tree,
                a: records_a.len(),
                b: records_b.len(),
            }];
        }

        let aligned = Aligned {
            a: &records_a,
            b: &records_b,
            order_a: aligned_order(&records_a, &self.options.sort_keys),
            order_b: aligned_order(&records_b, &self.options.sort_keys),
        };

        self.options
            .compared_fields()
            .filter_map(|field| {
                compare_field(&aligned, field, &self.options).map(|(count, entries)| {
                    Mismatch::Field(FieldMismatch {
                        tree,
                        field,
                        count,
                        exhaustive: self.options.collect_all,
                        entries,
                    })
                })
            })
            .collect()
    }

    /// Fold one tree's mismatches into `report`; returns true to stop
    fn record_tree(
        &self,
        report: &mut MismatchReport,
        tree: usize,
        tree_count: usize,
        found: Vec<Mismatch>,
    ) -> bool {
        report.trees_compared += 1;
        if found.is_empty() {
            return false;
        }
        warn!(tree, mismatches = found.len(), "Tree differs");
        for m in &found {
            debug!(mismatch = %m, "Mismatch");
        }
        report.mismatches.extend(found);
        if self.options.fail_fast && tree + 1 < tree_count {
            report.stopped_early = true;
            return true;
        }
        false
    }

    fn finish(&self, report: MismatchReport, header: &CatalogHeader) -> ComparisonResult {
        if report.mismatches.is_empty() {
            info!(
                trees = report.trees_compared,
                galaxies = header.total_galaxies(),
                "Catalogs are equal"
            );
            ComparisonResult::Equal {
                trees: report.trees_compared,
                galaxies: header.total_galaxies(),
            }
        } else {
            info!(
                trees = report.trees_compared,
                mismatches = report.mismatches.len(),
                stopped_early = report.stopped_early,
                "Catalogs differ"
            );
            ComparisonResult::Mismatch(report)
        }
    }
}

/// Compare two sources with exclusions and a relative float tolerance.
///
/// Uses the default sort keys and collects every offending record.
pub fn compare<A, B>(
    a: &mut A,
    b: &mut B,
    excluded: &BTreeSet<FieldId>,
    tolerance: f64,
) -> Result<ComparisonResult>
where
    A: TreeSource + ?Sized,
    B: TreeSource + ?Sized,
{
    let options = CompareOptions::default()
        .exclude_all(excluded.iter().copied())
        .tolerance(Tolerance::new(tolerance, 0.0)?);
    Comparator::new(options).compare(a, b)
}

/// Open two catalog files and compare them.
///
/// Serial comparisons stream both files in one forward pass; parallel ones
/// open them for random access. Failures to open a file are labelled with
/// its path; see [`Error::in_catalog`].
pub fn compare_paths(
    path_a: impl AsRef<Path>,
    path_b: impl AsRef<Path>,
    options: &CompareOptions,
) -> Result<ComparisonResult> {
    let (path_a, path_b) = (path_a.as_ref(), path_b.as_ref());
    let comparator = Comparator::new(options.clone());
    debug!(
        catalog1 = %path_a.display(),
        catalog2 = %path_b.display(),
        parallel = options.parallel,
        "Comparing"
    );
    if options.parallel {
        let a = CatalogFile::open(path_a).map_err(label(path_a))?;
        let b = CatalogFile::open(path_b).map_err(label(path_b))?;
        comparator.compare_parallel(&a, &b)
    } else {
        let mut a = SequentialCatalog::open(path_a).map_err(label(path_a))?;
        let mut b = SequentialCatalog::open(path_b).map_err(label(path_b))?;
        comparator.compare(&mut a, &mut b)
    }
}

fn label(path: &Path) -> impl FnOnce(Error) -> Error + '_ {
    move |e| e.in_catalog(path.display().to_string())
}

fn check_record_sizes(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(Error::MalformedRecord {
            expected: a,
            actual: b,
        });
    }
    Ok(())
}

fn tree_count_mismatches<'h>(
    a: &'h CatalogHeader,
    b: &'h CatalogHeader,
) -> impl Iterator<Item = Mismatch> + 'h {
    a.galaxies_per_tree()
        .iter()
        .zip(b.galaxies_per_tree())
        .enumerate()
        .filter(|(_, (x, y))| x != y)
        .map(|(tree, (&a, &b))| Mismatch::TreeGalaxyCount { tree, a, b })
}

/// One tree from each catalog, paired record by record.
///
/// `order_a[i]` and `order_b[i]` are the file indices of the `i`-th pair.
struct Aligned<'r> {
    a: &'r [GalaxyRecord],
    b: &'r [GalaxyRecord],
    order_a: Vec<usize>,
    order_b: Vec<usize>,
}

/// Differing records of one field: total count and capped entries
fn compare_field(
    tree: &Aligned<'_>,
    field: FieldId,
    options: &CompareOptions,
) -> Option<(usize, Vec<MismatchEntry>)> {
    let mut count = 0;
    let mut entries = Vec::new();
    for (&a_index, &b_index) in tree.order_a.iter().zip(&tree.order_b) {
        let (va, vb) = (tree.a[a_index].get(field), tree.b[b_index].get(field));
        if options.tolerance.values_match(&va, &vb) {
            continue;
        }
        count += 1;
        if entries.len() < options.max_report_entries {
            entries.push(MismatchEntry {
                a_index,
                b_index,
                a: va,
                b: vb,
            });
        }
        if !options.collect_all {
            break;
        }
    }
    (count > 0).then_some((count, entries))
}

/// File indices of `records` stably sorted on the tuple of key values.
///
/// Ties keep file order; no keys leaves file order as is.
fn aligned_order(records: &[GalaxyRecord], keys: &[FieldId]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    if keys.is_empty() {
        return order;
    }
    order.sort_by(|&x, &y| {
        keys.iter()
            .map(|&k| cmp_values(&records[x].get(k), &records[y].get(k)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Total order over values of the same kind; floats by `total_cmp`
fn cmp_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::I32(x), FieldValue::I32(y)) => x.cmp(y),
        (FieldValue::I64(x), FieldValue::I64(y)) => x.cmp(y),
        (FieldValue::F32(x), FieldValue::F32(y)) => x.total_cmp(y),
        (FieldValue::Vec3(x), FieldValue::Vec3(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(p, q)| p.total_cmp(q))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal),
        _ => (a.kind() as u8).cmp(&(b.kind() as u8)),
    }
}
