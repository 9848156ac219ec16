//! Result → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one line per difference, with an
//!   `index1 / catalog1 / index2 / catalog2` table under each field difference
//! - **JSON** (`--json`): `serde_json::to_string_pretty` of the result

use sage_compare::{ComparisonResult, FieldMismatch, Mismatch, MismatchReport};
use sage_core::Error;
use sage_storage::CatalogSummary;
use std::fmt::Write;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a comparison outcome.
pub fn format_result(result: &ComparisonResult, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(result),
        OutputMode::Human => match result {
            ComparisonResult::Equal { trees, galaxies } => format!(
                "Catalogs are equal ({} trees, {} galaxies)",
                trees, galaxies
            ),
            ComparisonResult::Mismatch(report) => format_report(report),
        },
    }
}

/// Format the header summary of one catalog.
pub fn format_summary(summary: &CatalogSummary, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(summary),
        OutputMode::Human => {
            let mut out = String::new();
            let _ = writeln!(out, "{}", summary.path);
            let _ = writeln!(out, "  trees:         {}", summary.tree_count);
            let _ = writeln!(out, "  empty trees:   {}", summary.empty_trees);
            let _ = writeln!(out, "  galaxies:      {}", summary.total_galaxies);
            let _ = writeln!(out, "  record size:   {} bytes", summary.record_size);
            let _ = writeln!(out, "  header size:   {} bytes", summary.header_size);
            let _ = write!(
                out,
                "  file size:     {} bytes (expected {})",
                summary.file_size, summary.expected_size
            );
            if summary.is_truncated() {
                out.push_str(" TRUNCATED");
            } else if summary.file_size > summary.expected_size {
                let _ = write!(out, " +{} trailing", summary.file_size - summary.expected_size);
            }
            out
        }
    }
}

/// Format an error.
pub fn format_error(err: &Error, context: Option<&str>, mode: OutputMode) -> String {
    let msg = match context {
        Some(ctx) => format!("{}: {}", ctx, err),
        None => err.to_string(),
    };
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({ "error": msg }))
            .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", msg)),
        OutputMode::Human => format!("(error) {}", msg),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {}\"}}", e))
}

fn format_report(report: &MismatchReport) -> String {
    let mut out = format!(
        "Catalogs differ: {} difference(s) in {} tree(s) compared",
        report.mismatches.len(),
        report.trees_compared
    );
    for m in &report.mismatches {
        out.push('\n');
        out.push_str(&m.to_string());
        if let Mismatch::Field(field) = m {
            format_field_table(&mut out, field);
        }
    }
    if report.stopped_early {
        out.push_str("\n(stopped before the last tree)");
    }
    out
}

fn format_field_table(out: &mut String, m: &FieldMismatch) {
    let _ = write!(
        out,
        "\n  {:>8}  {:>24}  {:>8}  {:>24}",
        "index1", "catalog1", "index2", "catalog2"
    );
    for e in &m.entries {
        let _ = write!(
            out,
            "\n  {:>8}  {:>24}  {:>8}  {:>24}",
            e.a_index,
            e.a.to_string(),
            e.b_index,
            e.b.to_string()
        );
    }
    if m.count > m.entries.len() {
        let _ = write!(out, "\n  ... {} more", m.count - m.entries.len());
    }
}
