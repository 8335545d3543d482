//! Text report generation.
//!
//! Renders the report in insertion order. Scalar entries become
//! `key: value` followed by a blank line; sequence entries become a
//! `key:` header with one indented `- (…)` line per tuple, followed by a
//! blank line. The output is human-readable, not machine-parseable.

use crate::error::AuditError;
use crate::models::{Report, ReportValue, Scalar};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Render the complete report.
pub fn render_report(report: &Report) -> String {
    let mut output = String::new();

    for (key, value) in report.iter() {
        match value {
            ReportValue::Scalar(scalar) => {
                output.push_str(&format!("{}: {}\n\n", key, scalar));
            }
            ReportValue::Rows(rows) => {
                output.push_str(&format!("{}: \n", key));
                for row in rows {
                    output.push_str(&format!("  - {}\n", render_tuple(row)));
                }
                output.push('\n');
            }
        }
    }

    output
}

/// Render one result tuple as its literal ordered values, parenthesized
/// and comma-separated.
fn render_tuple(row: &[Scalar]) -> String {
    let cells: Vec<String> = row.iter().map(Scalar::to_string).collect();
    format!("({})", cells.join(", "))
}

/// Write the report to `path`, truncating any existing file.
///
/// The handle is flushed explicitly and closed when it leaves scope, on
/// success and on error alike.
pub fn write_report(report: &Report, path: &Path) -> Result<(), AuditError> {
    let content = render_report(report);

    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    info!("Report written to {}", path.display());
    Ok(())
}
