//! chafa_bench - benchmark, verification and report harness for the chafa renderer.
//!
//! The harness drives a runtime-loaded build of the renderer over a synthetic test image:
//! - Benchmarking a {mode x output height} matrix with warmup and measured iterations
//! - Verifying that two builds produce byte-identical output
//! - Rendering persisted results as a self-contained HTML report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use chafa_bench::prelude::*;
//!
//! let image = test_image::load_or_generate(&paths.test_image())?;
//! let renderer = Renderer::new(ChafaLibrary::load("libchafa.so")?);
//! let doc = runner::run_benchmark(&renderer, &image, &BenchmarkConfig::default(), "chafa", |_| {})?;
//! doc.save(&paths.results(BenchTarget::Simd))?;
//! ```

pub mod chafa;
pub mod config;
mod error;
pub mod modes;
pub mod raster;
pub mod report;
pub mod results;
pub mod runner;
pub mod testing;
pub mod verify;

pub mod prelude;

pub use error::{Error, Result};
