//! Commonly used types for the harness binaries.

pub use crate::chafa::{ChafaBackend, ChafaLibrary, Renderer};
pub use crate::config::{BenchTarget, BenchmarkConfig, HarnessPaths, VerifyConfig};
pub use crate::raster::{RasterImage, test_image};
pub use crate::results::{BenchmarkResult, ResultsDocument};
pub use crate::{Error, Result, report, runner, verify};
