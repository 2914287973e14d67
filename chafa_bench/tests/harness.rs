//! End-to-end runs of the harness against the in-process renderer double.

use chafa_bench::config::{BenchmarkConfig, HarnessPaths, VerifyConfig};
use chafa_bench::modes;
use chafa_bench::prelude::{BenchTarget, Renderer};
use chafa_bench::raster::test_image;
use chafa_bench::report;
use chafa_bench::results::ResultsDocument;
use chafa_bench::runner;
use chafa_bench::testing::CountingBackend;
use chafa_bench::verify;
use common::test_utils::{init_tracing, test_output_path};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn image() -> chafa_bench::raster::RasterImage {
    test_image::generate(&mut StdRng::seed_from_u64(42))
}

#[test]
fn ascii_at_24_rows() {
    init_tracing();
    let image = image();
    let renderer = Renderer::new(CountingBackend::new());
    let config = BenchmarkConfig {
        modes: vec![modes::ASCII],
        heights: vec![24],
        warmup_iterations: 3,
        iterations: 20,
    };

    let results = runner::run_matrix(&renderer, &image, &config, |_| {}).unwrap();

    assert_eq!(results.len(), 1);
    let r = &results[0];
    assert_eq!(r.mode, "ascii");
    assert_eq!(r.output_width, 64);
    assert_eq!(r.iterations, 20);
    assert!(r.fps > 0.0);
    assert!(r.min <= r.median && r.median <= r.max);
    assert!((r.fps - 1000.0 / r.median).abs() < 1e-6 * r.fps.max(1.0));
    assert_eq!(renderer.backend().renders(), 23);
    assert_eq!(renderer.backend().live_handles(), 0);
}

#[test]
fn default_matrix_widths() {
    let image = image();
    let config = BenchmarkConfig::default();

    for &height in &config.heights {
        let expected = (height as f64 * (640.0 / 480.0) * 2.0).round() as u32;
        assert_eq!(runner::output_width(&image, height), expected);
    }
}

#[test]
fn hashes_are_stable_across_runs_and_compatible_builds() {
    let image = image();
    let config = VerifyConfig::default();
    let a = Renderer::new(CountingBackend::new());
    let b = Renderer::new(CountingBackend::new());

    let first = verify::render_records(&a, &image, &config).unwrap();
    let second = verify::render_records(&a, &image, &config).unwrap();
    assert_eq!(first, second);

    let report = verify::verify(&a, &b, &image, &config).unwrap();
    let block = report.verdicts.iter().find(|v| v.mode == "block").unwrap();
    assert!(block.matches());
    assert!(report.all_match());
}

#[test]
fn benchmark_results_feed_the_report() {
    init_tracing();
    let paths = HarnessPaths::new(test_output_path("harness/report"));
    let image = image();
    let config = BenchmarkConfig {
        modes: vec![modes::BLOCK, modes::ASCII, modes::BRAILLE],
        heights: vec![12, 24],
        warmup_iterations: 1,
        iterations: 3,
    };

    let baseline = runner::run_benchmark(
        &Renderer::new(CountingBackend::new()),
        &image,
        &config,
        BenchTarget::Baseline.implementation_label(),
        |_| {},
    )
    .unwrap();
    baseline.save(&paths.results(BenchTarget::Baseline)).unwrap();
    let _ = std::fs::remove_file(paths.results(BenchTarget::Simd));

    // Baseline only.
    let loaded = report::load_baseline(&paths.results(BenchTarget::Baseline)).unwrap();
    assert_eq!(loaded, baseline);
    let candidate = ResultsDocument::load_optional(&paths.results(BenchTarget::Simd)).unwrap();
    assert!(candidate.is_none());

    report::write_report(&paths.report(), &loaded, candidate.as_ref()).unwrap();
    let html = std::fs::read_to_string(paths.report()).unwrap();
    assert!(!html.contains("id=\"comparison\""));

    // With a candidate.
    let simd = runner::run_benchmark(
        &Renderer::new(CountingBackend::new()),
        &image,
        &config,
        BenchTarget::Simd.implementation_label(),
        |_| {},
    )
    .unwrap();
    simd.save(&paths.results(BenchTarget::Simd)).unwrap();

    let candidate = ResultsDocument::load_optional(&paths.results(BenchTarget::Simd)).unwrap();
    let html = report::generate_report(&loaded, candidate.as_ref());

    assert!(html.contains("id=\"comparison\""));
    assert_eq!(html.matches("<div class=\"chart\">").count(), 3);
    assert_eq!(report::speedup_rows(&loaded, &simd).len(), 6);
}

#[test]
fn missing_baseline_is_reported() {
    let paths = HarnessPaths::new(test_output_path("harness/empty"));
    let _ = std::fs::remove_file(paths.results(BenchTarget::Baseline));

    let err = report::load_baseline(&paths.results(BenchTarget::Baseline)).unwrap_err();

    assert!(matches!(err, chafa_bench::Error::MissingBaseline { .. }));
    assert!(err.to_string().contains("results-baseline.json"));
}
