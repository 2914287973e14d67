//! Inline SVG line charts of FPS against output height.
//!
//! The horizontal axis is ordinal: points are spaced by the index of their height in the
//! chart's height list, not by the height's value. The vertical axis spans 0 to 110% of
//! the largest FPS in the chart.

use std::fmt::Write as _;

use htmlize::escape_text;

use crate::results::{BenchmarkResult, ResultsDocument};

pub const DEFAULT_WIDTH: u32 = 600;
pub const DEFAULT_HEIGHT: u32 = 400;
pub const MARKER_RADIUS: f64 = 4.0;
/// Intervals between horizontal gridlines; one line is drawn at each end.
pub const GRID_DIVISIONS: usize = 5;
pub const HEADROOM: f64 = 1.1;

pub const BACKGROUND: &str = "#1a1a2e";
pub const BASELINE_COLOR: &str = "#f44336";
pub const CANDIDATE_COLOR: &str = "#4CAF50";
pub const FALLBACK_COLOR: &str = "#fff";

const LEGEND_STEP: f64 = 20.0;
const LEGEND_SWATCH: f64 = 12.0;

/// Line color of a mode in the overview chart.
pub fn mode_color(mode: &str) -> &'static str {
    match mode {
        "block" => "#4CAF50",
        "ascii" => "#2196F3",
        "braille" => "#FF9800",
        "braille-dither" => "#9C27B0",
        _ => FALLBACK_COLOR,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const OVERVIEW: Margin = Margin {
        top: 40.0,
        right: 120.0,
        bottom: 60.0,
        left: 60.0,
    };
    pub const COMPARISON: Margin = Margin {
        right: 100.0,
        ..Margin::OVERVIEW
    };
}

/// One polyline. Points are `(height index, fps)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: String,
    pub points: Vec<(usize, f64)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub heights: Vec<u32>,
    pub series: Vec<Series>,
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
}

impl LineChart {
    pub fn new(title: impl Into<String>, heights: Vec<u32>, margin: Margin) -> Self {
        Self {
            title: title.into(),
            heights,
            series: Vec::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            margin,
        }
    }

    fn plot_width(&self) -> f64 {
        f64::from(self.width) - self.margin.left - self.margin.right
    }

    fn plot_height(&self) -> f64 {
        f64::from(self.height) - self.margin.top - self.margin.bottom
    }

    /// Upper bound of the vertical axis.
    pub fn y_max(&self) -> f64 {
        let max = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, fps)| fps))
            .fold(0.0_f64, f64::max);
        if max > 0.0 { max * HEADROOM } else { 1.0 }
    }

    /// Horizontal position of the `index`-th height. A lone height sits on the left edge.
    pub fn x_at(&self, index: usize) -> f64 {
        if self.heights.len() <= 1 {
            return self.margin.left;
        }
        self.margin.left + index as f64 / (self.heights.len() - 1) as f64 * self.plot_width()
    }

    pub fn y_at(&self, fps: f64) -> f64 {
        self.margin.top + self.plot_height() - fps / self.y_max() * self.plot_height()
    }

    /// `(y, label)` of each gridline, top to bottom.
    pub fn gridlines(&self) -> Vec<(f64, i64)> {
        let y_max = self.y_max();
        (0..=GRID_DIVISIONS)
            .map(|i| {
                let frac = i as f64 / GRID_DIVISIONS as f64;
                let y = self.margin.top + self.plot_height() * frac;
                (y, (y_max * (1.0 - frac)).round() as i64)
            })
            .collect()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let m = self.margin;

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        let _ = writeln!(
            svg,
            r#"<rect width="{}" height="{}" fill="{BACKGROUND}"/>"#,
            self.width, self.height
        );
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="24" fill="#fff" font-size="16" text-anchor="middle">{}</text>"##,
            w / 2.0,
            escape_text(self.title.as_str())
        );

        for (y, label) in self.gridlines() {
            let _ = writeln!(
                svg,
                r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#333" stroke-width="1"/>"##,
                m.left,
                w - m.right
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" fill="#aaa" font-size="11" text-anchor="end">{label}</text>"##,
                m.left - 8.0,
                y + 4.0
            );
        }

        for (i, height) in self.heights.iter().enumerate() {
            let _ = writeln!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" fill="#aaa" font-size="11" text-anchor="middle">{height}</text>"##,
                self.x_at(i),
                h - m.bottom + 20.0
            );
        }
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" fill="#ccc" font-size="12" text-anchor="middle">Output height (rows)</text>"##,
            m.left + self.plot_width() / 2.0,
            h - 15.0
        );
        let _ = writeln!(
            svg,
            r##"<text x="15" y="{:.1}" fill="#ccc" font-size="12" text-anchor="middle" transform="rotate(-90 15 {:.1})">FPS</text>"##,
            m.top + self.plot_height() / 2.0,
            m.top + self.plot_height() / 2.0
        );

        for series in &self.series {
            self.write_series(&mut svg, series);
        }

        for (i, series) in self.series.iter().enumerate() {
            let x = w - m.right + 10.0;
            let y = m.top + 10.0 + i as f64 * LEGEND_STEP;
            let _ = writeln!(
                svg,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{LEGEND_SWATCH}" height="{LEGEND_SWATCH}" fill="{}"/>"#,
                series.color
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" fill="#ccc" font-size="11">{}</text>"##,
                w - m.right + 28.0,
                y + 10.0,
                escape_text(series.label.as_str())
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn write_series(&self, svg: &mut String, series: &Series) {
        if series.points.is_empty() {
            return;
        }

        let path: Vec<String> = series
            .points
            .iter()
            .enumerate()
            .map(|(i, &(index, fps))| {
                let cmd = if i == 0 { 'M' } else { 'L' };
                format!("{cmd}{:.1},{:.1}", self.x_at(index), self.y_at(fps))
            })
            .collect();
        let _ = writeln!(
            svg,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
            path.join(" "),
            series.color
        );

        for &(index, fps) in &series.points {
            let _ = writeln!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="{MARKER_RADIUS}" fill="{}"/>"#,
                self.x_at(index),
                self.y_at(fps),
                series.color
            );
        }
    }
}

/// Distinct output heights of `doc`, ascending.
pub fn heights_of(doc: &ResultsDocument) -> Vec<u32> {
    sorted_heights(doc.benchmarks.iter())
}

fn sorted_heights<'a>(results: impl Iterator<Item = &'a BenchmarkResult>) -> Vec<u32> {
    let mut heights: Vec<u32> = results.map(|r| r.output_height).collect();
    heights.sort_unstable();
    heights.dedup();
    heights
}

/// Points of `mode` in `doc`, placed on `heights` and ordered along the axis. Heights not
/// on the axis are dropped.
fn points(doc: &ResultsDocument, mode: &str, heights: &[u32]) -> Vec<(usize, f64)> {
    let mut points: Vec<(usize, f64)> = doc
        .results_for(mode)
        .filter_map(|r| {
            let index = heights.iter().position(|&h| h == r.output_height)?;
            Some((index, r.fps))
        })
        .collect();
    points.sort_by_key(|&(index, _)| index);
    points
}

/// FPS of every mode in `doc`, one line per mode.
pub fn overview_chart(doc: &ResultsDocument) -> LineChart {
    let heights = heights_of(doc);
    let mut chart = LineChart::new("FPS by output height", heights.clone(), Margin::OVERVIEW);
    chart.series = doc
        .modes()
        .into_iter()
        .map(|mode| Series {
            label: mode.to_string(),
            color: mode_color(mode).to_string(),
            points: points(doc, mode, &heights),
        })
        .collect();
    chart
}

/// Baseline and candidate FPS of `mode` on the axis of heights the baseline measured for
/// that mode.
///
/// `None` unless both documents contain the mode.
pub fn comparison_chart(
    baseline: &ResultsDocument,
    candidate: &ResultsDocument,
    mode: &str,
) -> Option<LineChart> {
    if !baseline.has_mode(mode) || !candidate.has_mode(mode) {
        return None;
    }

    let heights = sorted_heights(baseline.results_for(mode));
    let mut chart = LineChart::new(mode, heights.clone(), Margin::COMPARISON);
    chart.series = vec![
        Series {
            label: "Baseline".to_string(),
            color: BASELINE_COLOR.to_string(),
            points: points(baseline, mode, &heights),
        },
        Series {
            label: "Candidate".to_string(),
            color: CANDIDATE_COLOR.to_string(),
            points: points(candidate, mode, &heights),
        },
    ];
    Some(chart)
}
