//! Writes the synthetic 640x480 test image into the artifact directory.
//!
//! ```bash
//! cargo run --release -p chafa_bench --bin generate_test_image
//! ```

use anyhow::Context;
use chafa_bench::prelude::*;

fn main() -> anyhow::Result<()> {
    common::setup_logging("info")?;

    let paths = HarnessPaths::from_env();
    let path = paths.test_image();
    let image = test_image::write_test_image(&path)
        .with_context(|| format!("failed to write test image to {}", path.display()))?;

    println!("Generated {image} test image: {}", path.display());
    Ok(())
}
