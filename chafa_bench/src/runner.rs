//! The {mode x height} benchmark matrix.

use bench::Bencher;
use tracing::{debug, info};

use crate::chafa::{ChafaBackend, Renderer};
use crate::config::BenchmarkConfig;
use crate::error::Result;
use crate::modes::RenderMode;
use crate::raster::RasterImage;
use crate::results::{BenchmarkResult, ImageInfo, ModeComparison, ResultsDocument};

/// Output columns for `height` rows of `image`.
///
/// Terminal cells are about twice as tall as wide, hence the factor 2.
pub fn output_width(image: &RasterImage, height: u32) -> u32 {
    (f64::from(height) * image.aspect_ratio() * 2.0).round() as u32
}

/// Benchmarks a single (mode, height) cell.
///
/// Every warmup and measured iteration is a full construct/render/release cycle.
pub fn run_cell<B: ChafaBackend>(
    renderer: &Renderer<B>,
    image: &RasterImage,
    mode: &RenderMode,
    height: u32,
    config: &BenchmarkConfig,
) -> Result<BenchmarkResult> {
    config.validate()?;
    let width = output_width(image, height);
    let bencher = Bencher::new(format!("{}@{height}", mode.name))
        .with_warmup_iters(config.warmup_iterations)
        .with_iters(config.iterations);

    let measurement = bencher.bench(|| renderer.render(image, mode, width, height))?;
    debug!(%measurement);

    Ok(BenchmarkResult::from_stats(
        mode.name,
        height,
        width,
        measurement.first_output.len(),
        &measurement.stats,
    ))
}

/// Runs the whole matrix: modes in declaration order, heights in declaration order within
/// each mode. `on_result` sees each result as soon as it is measured.
///
/// The first renderer failure aborts the run.
pub fn run_matrix<B: ChafaBackend>(
    renderer: &Renderer<B>,
    image: &RasterImage,
    config: &BenchmarkConfig,
    mut on_result: impl FnMut(&BenchmarkResult),
) -> Result<Vec<BenchmarkResult>> {
    config.validate()?;
    info!(
        modes = config.modes.len(),
        heights = config.heights.len(),
        warmup = config.warmup_iterations,
        iterations = config.iterations,
        "Running benchmark matrix"
    );

    let mut results = Vec::with_capacity(config.modes.len() * config.heights.len());
    for mode in &config.modes {
        for &height in &config.heights {
            let result = run_cell(renderer, image, mode, height, config)?;
            on_result(&result);
            results.push(result);
        }
    }
    Ok(results)
}

/// Runs the matrix and wraps the results in a document labelled `implementation`.
pub fn run_benchmark<B: ChafaBackend>(
    renderer: &Renderer<B>,
    image: &RasterImage,
    config: &BenchmarkConfig,
    implementation: &str,
    on_result: impl FnMut(&BenchmarkResult),
) -> Result<ResultsDocument> {
    let mut document = ResultsDocument::new(implementation, ImageInfo::from(image));
    document.benchmarks = run_matrix(renderer, image, config, on_result)?;
    Ok(document)
}

// Console table

pub fn table_header() -> String {
    format!(
        "{:<16} {:>6} {:>6} {:>10} {:>8} {:>9}",
        "Mode", "Height", "Width", "Median ms", "FPS", "Output KB"
    )
}

pub fn table_row(result: &BenchmarkResult) -> String {
    format!(
        "{:<16} {:>6} {:>6} {:>10.2} {:>8.1} {:>9.1}",
        result.mode,
        result.output_height,
        result.output_width,
        result.median,
        result.fps,
        result.output_size_kb()
    )
}

/// One `mode: avg FPS` line per mode, in first-appearance order.
pub fn summary_lines(document: &ResultsDocument) -> Vec<String> {
    document
        .modes()
        .into_iter()
        .filter_map(|mode| {
            let fps = document.average_fps(mode)?;
            Some(format!("{mode:<16} avg {fps:>8.1} FPS"))
        })
        .collect()
}

pub fn comparison_lines(comparisons: &[ModeComparison]) -> Vec<String> {
    comparisons
        .iter()
        .map(|c| {
            format!(
                "{:<16} {:>8.1} -> {:>8.1} FPS  ({:.2}x)",
                c.mode,
                c.baseline_fps,
                c.candidate_fps,
                c.speedup()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::modes;
    use crate::testing::{CountingBackend, FailurePoint};

    fn image(width: u32, height: u32) -> RasterImage {
        RasterImage::new(width, height, vec![128; (width * height * 4) as usize]).unwrap()
    }

    fn quick_config(modes: Vec<RenderMode>, heights: Vec<u32>) -> BenchmarkConfig {
        BenchmarkConfig {
            modes,
            heights,
            warmup_iterations: 1,
            iterations: 3,
        }
    }

    #[test]
    fn output_width_for_default_heights() {
        let img = image(640, 480);
        let widths: Vec<_> = [12, 24, 48, 96, 120]
            .iter()
            .map(|&h| output_width(&img, h))
            .collect();
        assert_eq!(widths, vec![32, 64, 128, 256, 320]);
    }

    #[test]
    fn output_width_rounds_to_nearest() {
        // 10 * (3/7) * 2 = 8.571...
        assert_eq!(output_width(&image(3, 7), 10), 9);
        // 5 * (1/4) * 2 = 2.5
        assert_eq!(output_width(&image(1, 4), 5), 3);
    }

    #[test]
    fn matrix_preserves_declaration_order() {
        let renderer = Renderer::new(CountingBackend::new());
        let config = quick_config(vec![modes::BRAILLE, modes::BLOCK], vec![24, 12]);

        let results = run_matrix(&renderer, &image(64, 48), &config, |_| {}).unwrap();

        let cells: Vec<_> = results
            .iter()
            .map(|r| (r.mode.as_str(), r.output_height))
            .collect();
        assert_eq!(
            cells,
            vec![("braille", 24), ("braille", 12), ("block", 24), ("block", 12)]
        );
    }

    #[test]
    fn every_iteration_is_a_full_cycle() {
        let renderer = Renderer::new(CountingBackend::new());
        let config = quick_config(vec![modes::ASCII], vec![12]);

        run_matrix(&renderer, &image(64, 48), &config, |_| {}).unwrap();

        let backend = renderer.backend();
        assert_eq!(backend.renders(), 4);
        assert_eq!(backend.acquired(), 4 * 4);
        assert_eq!(backend.live_handles(), 0);
    }

    #[test]
    fn output_size_is_byte_length_of_render() {
        let renderer = Renderer::new(CountingBackend::new());
        let img = image(64, 48);
        let config = quick_config(vec![modes::BLOCK], vec![12]);

        let results = run_matrix(&renderer, &img, &config, |_| {}).unwrap();
        let expected = renderer.render(&img, &modes::BLOCK, 32, 12).unwrap().len();

        assert_eq!(results[0].output_size, expected);
        assert_eq!(results[0].iterations, 3);
    }

    #[test]
    fn callback_sees_each_result() {
        let renderer = Renderer::new(CountingBackend::new());
        let config = quick_config(vec![modes::BLOCK, modes::ASCII], vec![12, 24]);

        let mut seen = Vec::new();
        run_matrix(&renderer, &image(64, 48), &config, |r| seen.push(r.clone())).unwrap();

        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn renderer_failure_aborts_the_run() {
        let renderer = Renderer::new(CountingBackend::new());
        renderer.backend().fail_at(FailurePoint::CanvasNew);
        let config = quick_config(vec![modes::BLOCK], vec![12]);

        let mut seen = 0;
        let result = run_matrix(&renderer, &image(64, 48), &config, |_| seen += 1);

        assert!(result.is_err());
        assert_eq!(seen, 0);
        assert_eq!(renderer.backend().live_handles(), 0);
    }

    #[test]
    fn zero_iterations_is_an_error_not_a_panic() {
        let renderer = Renderer::new(CountingBackend::new());
        let config = BenchmarkConfig {
            iterations: 0,
            ..quick_config(vec![modes::ASCII], vec![24])
        };

        let result = run_matrix(&renderer, &image(64, 48), &config, |_| {});

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert_eq!(renderer.backend().acquired(), 0);

        let cell = run_cell(&renderer, &image(64, 48), &modes::ASCII, 24, &config);
        assert!(matches!(cell, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn table_row_formatting() {
        let result = BenchmarkResult {
            mode: "block".into(),
            output_height: 24,
            output_width: 64,
            output_size: 2048,
            median: 1.234,
            min: 1.0,
            max: 2.0,
            mean: 1.3,
            fps: 810.37,
            iterations: 20,
        };
        let row = table_row(&result);
        assert!(row.starts_with("block "));
        assert!(row.contains(" 1.23 "));
        assert!(row.contains(" 810.4 "));
        assert!(row.ends_with(" 2.0"));
        assert_eq!(row.len(), table_header().len());
    }
}
