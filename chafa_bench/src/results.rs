//! Persisted benchmark results.
//!
//! A [`ResultsDocument`] is the only durable artifact of a benchmark run. It is written as
//! pretty-printed JSON with camelCase keys and read back by the report generator and by
//! later runs comparing against a baseline.

use std::fs;
use std::path::Path;

use bench::Stats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::raster::RasterImage;

/// Timing and output statistics of one (mode, height) cell of the matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub mode: String,
    pub output_height: u32,
    pub output_width: u32,
    /// Byte length of the first measured render.
    pub output_size: usize,
    /// Latencies in milliseconds.
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// `1000 / median`.
    pub fps: f64,
    pub iterations: usize,
}

impl BenchmarkResult {
    pub fn from_stats(
        mode: &str,
        output_height: u32,
        output_width: u32,
        output_size: usize,
        stats: &Stats,
    ) -> BenchmarkResult {
        BenchmarkResult {
            mode: mode.to_string(),
            output_height,
            output_width,
            output_size,
            median: stats.median_ms(),
            min: stats.min_ms(),
            max: stats.max_ms(),
            mean: stats.mean_ms(),
            fps: stats.fps(),
            iterations: stats.iterations,
        }
    }

    pub fn output_size_kb(&self) -> f64 {
        self.output_size as f64 / 1024.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl From<&RasterImage> for ImageInfo {
    fn from(image: &RasterImage) -> Self {
        ImageInfo {
            width: image.width(),
            height: image.height(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub timestamp: DateTime<Utc>,
    pub implementation: String,
    pub image: ImageInfo,
    pub benchmarks: Vec<BenchmarkResult>,
}

impl ResultsDocument {
    /// Empty document stamped with the current time.
    pub fn new(implementation: impl Into<String>, image: ImageInfo) -> ResultsDocument {
        ResultsDocument {
            timestamp: Utc::now(),
            implementation: implementation.into(),
            image,
            benchmarks: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<ResultsDocument> {
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&json).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Self::load`], but a missing file is `Ok(None)` rather than an error.
    pub fn load_optional(path: &Path) -> Result<Option<ResultsDocument>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        common::write_file(path, json).map_err(|e| Error::io(path, e))
    }

    /// Mode names in order of first appearance.
    pub fn modes(&self) -> Vec<&str> {
        let mut modes: Vec<&str> = Vec::new();
        for result in &self.benchmarks {
            if !modes.contains(&result.mode.as_str()) {
                modes.push(&result.mode);
            }
        }
        modes
    }

    pub fn has_mode(&self, mode: &str) -> bool {
        self.benchmarks.iter().any(|r| r.mode == mode)
    }

    pub fn results_for<'a>(&'a self, mode: &str) -> impl Iterator<Item = &'a BenchmarkResult> {
        self.benchmarks.iter().filter(move |r| r.mode == mode)
    }

    pub fn find(&self, mode: &str, output_height: u32) -> Option<&BenchmarkResult> {
        self.results_for(mode)
            .find(|r| r.output_height == output_height)
    }

    /// Mean FPS across all heights of `mode`. `None` if the mode is absent.
    pub fn average_fps(&self, mode: &str) -> Option<f64> {
        let (sum, count) = self
            .results_for(mode)
            .fold((0.0, 0usize), |(sum, count), r| (sum + r.fps, count + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Iteration count of the first result, used as the run-wide figure in reports.
    pub fn iterations(&self) -> Option<usize> {
        self.benchmarks.first().map(|r| r.iterations)
    }
}

/// Average-FPS comparison of one mode between two documents.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeComparison {
    pub mode: String,
    pub baseline_fps: f64,
    pub candidate_fps: f64,
}

impl ModeComparison {
    pub fn speedup(&self) -> f64 {
        self.candidate_fps / self.baseline_fps
    }
}

/// Compares average FPS per mode of `candidate`, for every mode both documents contain.
pub fn compare_average_fps(
    baseline: &ResultsDocument,
    candidate: &ResultsDocument,
) -> Vec<ModeComparison> {
    candidate
        .modes()
        .into_iter()
        .filter_map(|mode| {
            Some(ModeComparison {
                mode: mode.to_string(),
                baseline_fps: baseline.average_fps(mode)?,
                candidate_fps: candidate.average_fps(mode)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use common::test_utils::test_output_path;

    use super::*;

    fn result(mode: &str, height: u32, fps: f64) -> BenchmarkResult {
        BenchmarkResult {
            mode: mode.to_string(),
            output_height: height,
            output_width: height * 8 / 3,
            output_size: 2048,
            median: 1000.0 / fps,
            min: 1000.0 / fps,
            max: 1000.0 / fps,
            mean: 1000.0 / fps,
            fps,
            iterations: 20,
        }
    }

    fn document(results: Vec<BenchmarkResult>) -> ResultsDocument {
        let mut doc = ResultsDocument::new(
            "test",
            ImageInfo {
                width: 640,
                height: 480,
            },
        );
        doc.benchmarks = results;
        doc
    }

    #[test]
    fn from_stats_keeps_statistical_consistency() {
        let stats = Stats::from_samples(vec![
            Duration::from_micros(2500),
            Duration::from_micros(2000),
            Duration::from_micros(4000),
        ])
        .unwrap();

        let r = BenchmarkResult::from_stats("ascii", 24, 64, 1000, &stats);

        assert!(r.min <= r.median && r.median <= r.max);
        assert!((r.median - 2.5).abs() < 1e-9);
        assert!((r.fps - 1000.0 / r.median).abs() < 1e-9);
        assert_eq!(r.iterations, 3);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let doc = document(vec![result("block", 12, 100.0)]);
        let json = serde_json::to_value(&doc).unwrap();
        let first = &json["benchmarks"][0];

        assert_eq!(first["outputHeight"], 12);
        assert_eq!(first["outputWidth"], 32);
        assert_eq!(first["outputSize"], 2048);
        assert_eq!(json["image"]["width"], 640);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn reads_documents_written_by_other_tools() {
        let json = r#"{
            "timestamp": "2025-01-02T03:04:05.678Z",
            "implementation": "chafa-wasm (SIMD)",
            "image": { "width": 640, "height": 480 },
            "benchmarks": [{
                "mode": "ascii", "outputHeight": 24, "outputWidth": 64, "outputSize": 12345,
                "median": 2.5, "min": 2.0, "max": 4.0, "mean": 2.7, "fps": 400.0,
                "iterations": 20
            }]
        }"#;
        let doc: ResultsDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.benchmarks[0].output_width, 64);
        assert_eq!(doc.implementation, "chafa-wasm (SIMD)");
    }

    #[test]
    fn save_then_load() {
        let path = test_output_path("results/save_then_load.json");
        let doc = document(vec![result("block", 12, 100.0), result("ascii", 12, 50.0)]);

        doc.save(&path).unwrap();
        let loaded = ResultsDocument::load(&path).unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn save_then_load_keeps_every_float_bit() {
        let path = test_output_path("results/float_bits.json");
        // One ulp below 9.187853; the shortest decimal form is 9.187852999999999.
        let awkward = f64::from_bits(9.187853f64.to_bits() - 1);
        let mut r = result("block", 12, 1000.0 / awkward);
        r.max = awkward;
        r.mean = 0.1 + 0.2;
        let doc = document(vec![r]);

        doc.save(&path).unwrap();
        let loaded = ResultsDocument::load(&path).unwrap();

        assert_eq!(loaded.benchmarks[0].max.to_bits(), awkward.to_bits());
        assert_eq!(loaded, doc);
    }

    #[test]
    fn load_optional_missing_file_is_none() {
        let path = test_output_path("results/definitely_missing.json");
        let _ = fs::remove_file(&path);
        assert!(ResultsDocument::load_optional(&path).unwrap().is_none());
    }

    #[test]
    fn load_invalid_json_reports_path() {
        let path = test_output_path("results/invalid.json");
        common::write_file(&path, "{ not json").unwrap();
        let err = ResultsDocument::load(&path).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().contains("invalid.json"));
    }

    #[test]
    fn modes_keep_first_appearance_order() {
        let doc = document(vec![
            result("braille", 12, 10.0),
            result("block", 12, 10.0),
            result("braille", 24, 10.0),
        ]);
        assert_eq!(doc.modes(), vec!["braille", "block"]);
    }

    #[test]
    fn average_fps_and_comparison() {
        let baseline = document(vec![
            result("block", 12, 100.0),
            result("block", 24, 50.0),
            result("ascii", 12, 10.0),
        ]);
        let candidate = document(vec![
            result("block", 12, 150.0),
            result("block", 24, 75.0),
            result("braille", 12, 5.0),
        ]);

        assert_eq!(baseline.average_fps("block"), Some(75.0));
        assert_eq!(baseline.average_fps("braille"), None);

        let comparisons = compare_average_fps(&baseline, &candidate);
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].mode, "block");
        assert!((comparisons[0].speedup() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn find_matches_mode_and_height() {
        let doc = document(vec![result("block", 12, 100.0), result("block", 24, 50.0)]);
        assert_eq!(doc.find("block", 24).map(|r| r.fps), Some(50.0));
        assert!(doc.find("block", 48).is_none());
        assert!(doc.find("ascii", 12).is_none());
    }
}
