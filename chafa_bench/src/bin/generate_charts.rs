//! Renders `benchmark-results.html` from the persisted results.
//!
//! ```bash
//! cargo run --release -p chafa_bench --bin generate_charts
//! ```
//!
//! Baseline results are required. Candidate results are optional; without them the
//! report has no comparison sections.

use chafa_bench::prelude::*;

fn main() -> anyhow::Result<()> {
    common::setup_logging("info")?;

    let paths = HarnessPaths::from_env();

    let baseline = match report::load_baseline(&paths.results(BenchTarget::Baseline)) {
        Ok(doc) => doc,
        Err(err @ Error::MissingBaseline { .. }) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let candidate = ResultsDocument::load_optional(&paths.results(BenchTarget::Simd))?;
    if candidate.is_none() {
        println!("No candidate results found; generating a baseline-only report.");
    }

    let out = paths.report();
    report::write_report(&out, &baseline, candidate.as_ref())?;
    println!("Report written to {}", out.display());

    Ok(())
}
