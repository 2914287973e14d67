//! Output verification between two builds of the renderer.
//!
//! Both builds render the same image with the same modes at one fixed height. Outputs are
//! compared by MD5 digest; the raw text of every render is written out for manual diffing.

use std::fmt;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use tracing::{info, warn};

use crate::chafa::{ChafaBackend, Renderer};
use crate::config::VerifyConfig;
use crate::error::{Error, Result};
use crate::raster::RasterImage;
use crate::runner::output_width;

/// Rendered output of one mode on one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationRecord {
    pub mode: String,
    pub output: String,
    /// Lowercase hex MD5 of `output`.
    pub hash: String,
}

impl VerificationRecord {
    pub fn new(mode: impl Into<String>, output: String) -> Self {
        let hash = content_hash(&output);
        Self {
            mode: mode.into(),
            output,
            hash,
        }
    }
}

pub fn content_hash(text: &str) -> String {
    format!("{:x}", Md5::digest(text.as_bytes()))
}

/// Renders every configured mode once at the configured height.
pub fn render_records<B: ChafaBackend>(
    renderer: &Renderer<B>,
    image: &RasterImage,
    config: &VerifyConfig,
) -> Result<Vec<VerificationRecord>> {
    let width = output_width(image, config.height);
    config
        .modes
        .iter()
        .map(|mode| {
            let output = renderer.render(image, mode, width, config.height)?;
            Ok(VerificationRecord::new(mode.name, output))
        })
        .collect()
}

/// Path of the raw dump for `mode` rendered by the build labelled `label`.
pub fn sample_path(dir: &Path, label: &str, mode: &str) -> PathBuf {
    dir.join(format!("{label}-{mode}.txt"))
}

/// Writes each record's text to `dir` and returns the written paths in record order.
pub fn write_samples(
    dir: &Path,
    label: &str,
    records: &[VerificationRecord],
) -> Result<Vec<PathBuf>> {
    records
        .iter()
        .map(|record| {
            let path = sample_path(dir, label, &record.mode);
            common::write_file(&path, &record.output).map_err(|e| Error::io(&path, e))?;
            Ok(path)
        })
        .collect()
}

/// Hash comparison of one mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeVerdict {
    pub mode: String,
    pub baseline_hash: String,
    pub candidate_hash: String,
}

impl ModeVerdict {
    pub fn matches(&self) -> bool {
        self.baseline_hash == self.candidate_hash
    }
}

impl fmt::Display for ModeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches() {
            write!(f, "MATCH   {}", self.mode)
        } else {
            write!(
                f,
                "DIFFER  {} (baseline {}, candidate {})",
                self.mode, self.baseline_hash, self.candidate_hash
            )
        }
    }
}

/// Pairs records by mode. Modes missing from `candidate` are skipped.
pub fn compare(
    baseline: &[VerificationRecord],
    candidate: &[VerificationRecord],
) -> Vec<ModeVerdict> {
    baseline
        .iter()
        .filter_map(|base| {
            let cand = candidate.iter().find(|c| c.mode == base.mode)?;
            Some(ModeVerdict {
                mode: base.mode.clone(),
                baseline_hash: base.hash.clone(),
                candidate_hash: cand.hash.clone(),
            })
        })
        .collect()
}

/// Outcome of a full verification run. Mismatches are data, not errors.
#[derive(Clone, Debug)]
pub struct VerificationReport {
    pub baseline: Vec<VerificationRecord>,
    pub candidate: Vec<VerificationRecord>,
    pub verdicts: Vec<ModeVerdict>,
}

impl VerificationReport {
    pub fn all_match(&self) -> bool {
        self.verdicts.iter().all(ModeVerdict::matches)
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ModeVerdict> {
        self.verdicts.iter().filter(|v| !v.matches())
    }
}

/// Renders with both builds and compares the outputs.
///
/// Renderer failures abort the run; differing outputs are reported in the result.
pub fn verify<A: ChafaBackend, B: ChafaBackend>(
    baseline: &Renderer<A>,
    candidate: &Renderer<B>,
    image: &RasterImage,
    config: &VerifyConfig,
) -> Result<VerificationReport> {
    info!(
        modes = config.modes.len(),
        height = config.height,
        "Verifying output"
    );

    let baseline = render_records(baseline, image, config)?;
    let candidate = render_records(candidate, image, config)?;
    let verdicts = compare(&baseline, &candidate);

    for verdict in verdicts.iter().filter(|v| !v.matches()) {
        warn!(
            mode = %verdict.mode,
            baseline = %verdict.baseline_hash,
            candidate = %verdict.candidate_hash,
            "Output differs"
        );
    }

    Ok(VerificationReport {
        baseline,
        candidate,
        verdicts,
    })
}

#[cfg(test)]
mod tests {
    use common::test_utils::test_output_path;

    use super::*;
    use crate::testing::{CountingBackend, FailurePoint};

    fn image() -> RasterImage {
        let pixels = (0..64 * 48 * 4).map(|i| (i % 251) as u8).collect();
        RasterImage::new(64, 48, pixels).unwrap()
    }

    #[test]
    fn md5_hex_of_known_inputs() {
        assert_eq!(content_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(content_hash("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn compatible_builds_match() {
        let baseline = Renderer::new(CountingBackend::new());
        let candidate = Renderer::new(CountingBackend::new());

        let report = verify(&baseline, &candidate, &image(), &VerifyConfig::default()).unwrap();

        assert_eq!(report.verdicts.len(), 3);
        assert!(report.all_match());
        assert_eq!(report.verdicts[0].mode, "block");
    }

    #[test]
    fn incompatible_builds_differ_without_failing() {
        let baseline = Renderer::new(CountingBackend::with_salt(1));
        let candidate = Renderer::new(CountingBackend::with_salt(2));

        let report = verify(&baseline, &candidate, &image(), &VerifyConfig::default()).unwrap();

        assert!(!report.all_match());
        let first = report.mismatches().next().unwrap();
        assert_ne!(first.baseline_hash, first.candidate_hash);
        assert!(first.to_string().starts_with("DIFFER"));
        assert!(first.to_string().contains(&first.candidate_hash));
    }

    #[test]
    fn renders_at_configured_height() {
        let renderer = Renderer::new(CountingBackend::new());
        let config = VerifyConfig::default();

        let records = render_records(&renderer, &image(), &config).unwrap();

        for record in &records {
            assert_eq!(record.output.lines().count(), 48);
            assert_eq!(record.hash, content_hash(&record.output));
        }
    }

    #[test]
    fn candidate_failure_is_fatal() {
        let baseline = Renderer::new(CountingBackend::new());
        let candidate = Renderer::new(CountingBackend::new());
        candidate.backend().fail_at(FailurePoint::BuildAnsi);

        let result = verify(&baseline, &candidate, &image(), &VerifyConfig::default());

        assert!(result.is_err());
        assert_eq!(candidate.backend().live_handles(), 0);
    }

    #[test]
    fn samples_are_written_per_label_and_mode() {
        let dir = test_output_path("verify/samples");
        let records = vec![
            VerificationRecord::new("block", "A".repeat(10)),
            VerificationRecord::new("braille", "B".repeat(5)),
        ];

        let paths = write_samples(&dir, "simd", &records).unwrap();

        assert_eq!(paths[0], dir.join("simd-block.txt"));
        assert_eq!(std::fs::read_to_string(&paths[1]).unwrap(), "BBBBB");
    }
}
