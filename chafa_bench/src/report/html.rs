use std::fmt::Write as _;

use htmlize::escape_text;

use super::chart::{comparison_chart, overview_chart};
use crate::modes::HEADLINE_MODES;
use crate::results::{BenchmarkResult, ResultsDocument};

const STYLE: &str = r#"
body { background: #0f0f1a; color: #e0e0e0; font-family: system-ui, sans-serif; margin: 2em; }
h1, h2 { font-weight: 500; }
.meta { color: #999; }
.grid { display: flex; flex-wrap: wrap; gap: 1em; }
table { border-collapse: collapse; margin: 1em 0; }
th, td { border: 1px solid #333; padding: 4px 10px; text-align: right; }
th { background: #1a1a2e; }
td.mode { text-align: left; }
.faster { color: #4CAF50; }
.slower { color: #f44336; }
"#;

/// A speedup row: the same (mode, height) cell in both documents.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedupRow<'a> {
    pub baseline: &'a BenchmarkResult,
    pub candidate: &'a BenchmarkResult,
}

impl SpeedupRow<'_> {
    pub fn speedup(&self) -> f64 {
        self.candidate.fps / self.baseline.fps
    }
}

/// Every (mode, height) pair present in both documents, in baseline order.
pub fn speedup_rows<'a>(
    baseline: &'a ResultsDocument,
    candidate: &'a ResultsDocument,
) -> Vec<SpeedupRow<'a>> {
    baseline
        .benchmarks
        .iter()
        .filter_map(|base| {
            let cand = candidate.find(&base.mode, base.output_height)?;
            Some(SpeedupRow {
                baseline: base,
                candidate: cand,
            })
        })
        .collect()
}

/// Headline modes both documents contain.
pub fn shared_headline_modes(
    baseline: &ResultsDocument,
    candidate: &ResultsDocument,
) -> Vec<&'static str> {
    HEADLINE_MODES
        .iter()
        .copied()
        .filter(|mode| baseline.has_mode(mode) && candidate.has_mode(mode))
        .collect()
}

/// Self-contained HTML report. Comparison sections appear only with a candidate.
pub fn generate_report(baseline: &ResultsDocument, candidate: Option<&ResultsDocument>) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>chafa benchmark results</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>\n</head>\n<body>");

    write_header(&mut html, baseline, candidate);

    html.push_str("<section id=\"overview\">\n<h2>Overview</h2>\n");
    html.push_str(&overview_chart(baseline).to_svg());
    html.push_str("</section>\n");

    if let Some(candidate) = candidate {
        write_comparison(&mut html, baseline, candidate);
    }

    write_raw_table(&mut html, baseline);

    html.push_str("</body>\n</html>\n");
    html
}

fn write_header(html: &mut String, baseline: &ResultsDocument, candidate: Option<&ResultsDocument>) {
    html.push_str("<h1>chafa benchmark results</h1>\n");
    let _ = writeln!(
        html,
        "<p class=\"meta\">Image {}x{} &middot; {} iterations per cell &middot; recorded {}</p>",
        baseline.image.width,
        baseline.image.height,
        baseline.iterations().unwrap_or(0),
        baseline.timestamp.to_rfc3339(),
    );
    let _ = writeln!(
        html,
        "<p class=\"meta\">Baseline: {}</p>",
        escape_text(baseline.implementation.as_str())
    );
    if let Some(candidate) = candidate {
        let _ = writeln!(
            html,
            "<p class=\"meta\">Candidate: {}</p>",
            escape_text(candidate.implementation.as_str())
        );
    }
}

fn write_comparison(html: &mut String, baseline: &ResultsDocument, candidate: &ResultsDocument) {
    html.push_str("<section id=\"comparison\">\n<h2>Baseline vs candidate</h2>\n<div class=\"grid\">\n");
    for mode in shared_headline_modes(baseline, candidate) {
        if let Some(chart) = comparison_chart(baseline, candidate, mode) {
            html.push_str("<div class=\"chart\">\n");
            html.push_str(&chart.to_svg());
            html.push_str("</div>\n");
        }
    }
    html.push_str("</div>\n</section>\n");

    html.push_str("<section id=\"speedup\">\n<h2>Speedup</h2>\n<table>\n");
    html.push_str(
        "<tr><th>Mode</th><th>Height</th><th>Baseline FPS</th><th>Candidate FPS</th><th>Speedup</th></tr>\n",
    );
    for row in speedup_rows(baseline, candidate) {
        let speedup = row.speedup();
        let class = if speedup >= 1.0 { "faster" } else { "slower" };
        let _ = writeln!(
            html,
            "<tr><td class=\"mode\">{}</td><td>{}</td><td>{:.1}</td><td>{:.1}</td><td class=\"{class}\">{speedup:.2}x</td></tr>",
            escape_text(row.baseline.mode.as_str()),
            row.baseline.output_height,
            row.baseline.fps,
            row.candidate.fps,
        );
    }
    html.push_str("</table>\n</section>\n");
}

fn write_raw_table(html: &mut String, baseline: &ResultsDocument) {
    html.push_str("<section id=\"raw\">\n<h2>Raw data</h2>\n<table>\n");
    html.push_str(
        "<tr><th>Mode</th><th>Height</th><th>Width</th><th>Median ms</th><th>Min ms</th>\
         <th>Max ms</th><th>Mean ms</th><th>FPS</th><th>Output KB</th></tr>\n",
    );
    for r in &baseline.benchmarks {
        let _ = writeln!(
            html,
            "<tr><td class=\"mode\">{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td>\
             <td>{:.2}</td><td>{:.2}</td><td>{:.1}</td><td>{:.1}</td></tr>",
            escape_text(r.mode.as_str()),
            r.output_height,
            r.output_width,
            r.median,
            r.min,
            r.max,
            r.mean,
            r.fps,
            r.output_size_kb(),
        );
    }
    html.push_str("</table>\n</section>\n");
}
