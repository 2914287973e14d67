//! Harness configuration: the benchmark matrix, verification settings and artifact paths.

use std::env;
use std::path::{Path, PathBuf};

use strum_macros::{Display, EnumString};

use crate::error::{Error, Result};
use crate::modes::{RENDER_MODES, RenderMode, VERIFY_MODES};
use crate::raster::test_image;

pub const DEFAULT_HEIGHTS: [u32; 5] = [12, 24, 48, 96, 120];
pub const DEFAULT_WARMUP_ITERATIONS: usize = 3;
pub const DEFAULT_ITERATIONS: usize = 20;
pub const VERIFY_HEIGHT: u32 = 48;

/// Environment variable naming the artifact directory.
pub const BENCH_DIR_VAR: &str = "CHAFA_BENCH_DIR";
/// Environment variable selecting which result set a benchmark run writes.
pub const BENCH_TARGET_VAR: &str = "CHAFA_BENCH_TARGET";
/// Library used by the benchmark binary.
pub const LIB_VAR: &str = "CHAFA_LIB";
pub const BASELINE_LIB_VAR: &str = "CHAFA_BASELINE_LIB";
pub const CANDIDATE_LIB_VAR: &str = "CHAFA_CANDIDATE_LIB";

/// The {mode x height} matrix and iteration counts of a benchmark run.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkConfig {
    /// Outer loop, in declaration order.
    pub modes: Vec<RenderMode>,
    /// Inner loop, in declaration order.
    pub heights: Vec<u32>,
    pub warmup_iterations: usize,
    pub iterations: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            modes: RENDER_MODES.to_vec(),
            heights: DEFAULT_HEIGHTS.to_vec(),
            warmup_iterations: DEFAULT_WARMUP_ITERATIONS,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl BenchmarkConfig {
    /// Rejects configurations that cannot produce a measurement.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig(
                "at least one measured iteration is required".to_string(),
            ));
        }
        if let Some(height) = self.heights.iter().find(|&&h| h == 0) {
            return Err(Error::InvalidConfig(format!(
                "output height must be positive, got {height}"
            )));
        }
        Ok(())
    }
}

/// Modes and the single output height compared between two library builds.
///
/// Only this height is checked; agreement at other heights is not implied.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifyConfig {
    pub modes: Vec<RenderMode>,
    pub height: u32,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            modes: VERIFY_MODES.to_vec(),
            height: VERIFY_HEIGHT,
        }
    }
}

/// Which result set a benchmark run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BenchTarget {
    Baseline,
    #[default]
    Simd,
}

impl BenchTarget {
    /// Reads [`BENCH_TARGET_VAR`]; unset or unrecognized values fall back to the default.
    pub fn from_env() -> BenchTarget {
        match env::var(BENCH_TARGET_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %value, "Unknown benchmark target, using default");
                BenchTarget::default()
            }),
            Err(_) => BenchTarget::default(),
        }
    }

    /// Label stored in the results document.
    pub fn implementation_label(self) -> &'static str {
        match self {
            BenchTarget::Baseline => "chafa (baseline)",
            BenchTarget::Simd => "chafa (SIMD)",
        }
    }

    /// Prefix of the raw output dumps written during verification.
    pub fn sample_prefix(self) -> &'static str {
        match self {
            BenchTarget::Baseline => "baseline",
            BenchTarget::Simd => "simd",
        }
    }
}

/// Locations of every artifact, relative to one working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessPaths {
    root: PathBuf,
}

impl HarnessPaths {
    pub const DEFAULT_DIR: &'static str = "benchmark";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses [`BENCH_DIR_VAR`] when set, otherwise [`Self::DEFAULT_DIR`].
    pub fn from_env() -> Self {
        let root = env::var_os(BENCH_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DIR));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn test_image(&self) -> PathBuf {
        self.root.join(test_image::FILE_NAME)
    }

    pub fn results(&self, target: BenchTarget) -> PathBuf {
        self.root.join(format!("results-{target}.json"))
    }

    pub fn report(&self) -> PathBuf {
        self.root.join("benchmark-results.html")
    }

    pub fn output_samples(&self) -> PathBuf {
        self.root.join("output-samples")
    }
}

/// Reads a path-valued environment variable; an empty value counts as unset.
pub fn path_var(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
