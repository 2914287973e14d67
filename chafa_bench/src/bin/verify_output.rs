//! Checks that a candidate build renders byte-identical output to the baseline build.
//!
//! ```bash
//! CHAFA_BASELINE_LIB=/path/to/baseline/libchafa.so \
//! CHAFA_CANDIDATE_LIB=/path/to/simd/libchafa.so \
//!     cargo run --release -p chafa_bench --bin verify_output
//! ```
//!
//! Every rendered output is written to `output-samples/` for manual diffing.

use anyhow::Context;
use chafa_bench::config::{self, BASELINE_LIB_VAR, CANDIDATE_LIB_VAR};
use chafa_bench::prelude::*;
use chafa_bench::verify::VerificationRecord;

fn main() -> anyhow::Result<()> {
    common::setup_logging("info")?;

    let baseline_path = config::path_var(BASELINE_LIB_VAR)
        .with_context(|| format!("{BASELINE_LIB_VAR} must point at the baseline library"))?;
    let candidate_path = config::path_var(CANDIDATE_LIB_VAR)
        .with_context(|| format!("{CANDIDATE_LIB_VAR} must point at the candidate library"))?;
    let paths = HarnessPaths::from_env();
    let verify_config = VerifyConfig::default();

    let image = test_image::load_or_generate(&paths.test_image())
        .context("failed to load test image")?;

    // Either build failing to load ends the run.
    let baseline = Renderer::new(
        ChafaLibrary::load(&baseline_path).context("failed to load baseline library")?,
    );
    let candidate = Renderer::new(
        ChafaLibrary::load(&candidate_path).context("failed to load candidate library")?,
    );

    println!(
        "Rendering {image} at {} rows with {} modes\n",
        verify_config.height,
        verify_config.modes.len()
    );

    let report = verify::verify(&baseline, &candidate, &image, &verify_config)?;

    let samples = paths.output_samples();
    print_records(&samples, BenchTarget::Baseline, &report.baseline)?;
    print_records(&samples, BenchTarget::Simd, &report.candidate)?;

    println!("\nComparison:");
    for verdict in &report.verdicts {
        println!("  {verdict}");
    }

    if report.all_match() {
        println!("\nAll outputs match.");
    } else {
        println!(
            "\n{} of {} modes differ; compare the files in {}",
            report.mismatches().count(),
            report.verdicts.len(),
            samples.display()
        );
    }

    Ok(())
}

fn print_records(
    dir: &std::path::Path,
    target: BenchTarget,
    records: &[VerificationRecord],
) -> anyhow::Result<()> {
    let label = target.sample_prefix();
    let written = verify::write_samples(dir, label, records)?;

    println!("{}:", target.implementation_label());
    for (record, path) in records.iter().zip(&written) {
        println!(
            "  {:<12} {} ({} bytes) -> {}",
            record.mode,
            record.hash,
            record.output.len(),
            path.display()
        );
    }
    Ok(())
}
