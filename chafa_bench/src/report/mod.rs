//! HTML report over persisted benchmark results.

pub mod chart;
mod html;


use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::results::ResultsDocument;

pub use html::{SpeedupRow, generate_report, shared_headline_modes, speedup_rows};

/// Loads the baseline document. Its absence is an error: a report has nothing to show
/// without it.
pub fn load_baseline(path: &Path) -> Result<ResultsDocument> {
    ResultsDocument::load_optional(path)?.ok_or_else(|| Error::MissingBaseline {
        path: path.to_path_buf(),
    })
}

/// Renders the report and writes it to `out`.
pub fn write_report(
    out: &Path,
    baseline: &ResultsDocument,
    candidate: Option<&ResultsDocument>,
) -> Result<()> {
    let html = generate_report(baseline, candidate);
    common::write_file(out, html).map_err(|e| Error::io(out, e))?;
    info!(path = %out.display(), with_candidate = candidate.is_some(), "Report written");
    Ok(())
}
