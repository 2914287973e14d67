//! Benchmarks one build of the renderer across the full mode x height matrix.
//!
//! ```bash
//! CHAFA_LIB=/path/to/libchafa.so CHAFA_BENCH_TARGET=baseline \
//!     cargo run --release -p chafa_bench --bin benchmark
//! ```
//!
//! Results go to `results-<target>.json` in the artifact directory. When a candidate run
//! finds baseline results, the average FPS of each mode is compared against them.

use anyhow::Context;
use chafa_bench::config::{self, LIB_VAR};
use chafa_bench::prelude::*;
use chafa_bench::results::compare_average_fps;

fn main() -> anyhow::Result<()> {
    common::setup_logging("info")?;

    let lib_path = config::path_var(LIB_VAR)
        .with_context(|| format!("{LIB_VAR} must point at the renderer library to benchmark"))?;
    let target = BenchTarget::from_env();
    let paths = HarnessPaths::from_env();
    let bench_config = BenchmarkConfig::default();

    let image = test_image::load_or_generate(&paths.test_image())
        .context("failed to load test image")?;
    let renderer = Renderer::new(ChafaLibrary::load(&lib_path)?);

    println!("{}", target.implementation_label());
    println!("Library: {}", renderer.backend().path().display());
    println!(
        "Image: {image}, {} warmup + {} measured iterations\n",
        bench_config.warmup_iterations, bench_config.iterations
    );
    println!("{}", runner::table_header());

    let document = runner::run_benchmark(
        &renderer,
        &image,
        &bench_config,
        target.implementation_label(),
        |result| println!("{}", runner::table_row(result)),
    )?;

    let results_path = paths.results(target);
    document.save(&results_path)?;
    println!("\nResults saved to {}", results_path.display());

    println!("\nAverage FPS per mode:");
    for line in runner::summary_lines(&document) {
        println!("  {line}");
    }

    if target != BenchTarget::Baseline
        && let Some(baseline) = ResultsDocument::load_optional(&paths.results(BenchTarget::Baseline))?
    {
        println!("\nCompared to {}:", baseline.implementation);
        for line in runner::comparison_lines(&compare_average_fps(&baseline, &document)) {
            println!("  {line}");
        }
    }

    Ok(())
}
