use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A self-contained chart specification. Grid cells carry one of these as an
/// opaque value; only the graph widget interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub series: Vec<Series>,
    pub layout: FigureLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    Line,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    pub title: Option<String>,
    pub y_title: Option<String>,
    pub axes_visible: bool,
    /// Horizontal reference line, drawn dotted.
    pub baseline: Option<f64>,
    /// Extra data units added on each side of the x range.
    pub x_pad: f64,
}

impl Default for FigureLayout {
    fn default() -> Self {
        FigureLayout {
            title: None,
            y_title: None,
            axes_visible: false,
            baseline: None,
            x_pad: 0.0,
        }
    }
}

impl Figure {
    /// Data-space x range covering every series, padded by `x_pad`.
    /// Degenerate ranges are widened so bounds are always usable.
    pub fn x_bounds(&self) -> [f64; 2] {
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for series in &self.series {
            for &(x, _) in &series.points {
                min = min.min(x);
                max = max.max(x);
            }
        }
        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }
        min -= self.layout.x_pad;
        max += self.layout.x_pad;
        if min == max {
            return [min - 1.0, max + 1.0];
        }
        [min, max]
    }

    /// Data-space y range covering every series and the baseline.
    pub fn y_bounds(&self) -> [f64; 2] {
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for series in &self.series {
            for &(_, y) in &series.points {
                min = min.min(y);
                max = max.max(y);
            }
        }
        if let Some(baseline) = self.layout.baseline {
            min = min.min(baseline);
            max = max.max(baseline);
        }
        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }
        if min == max {
            return [min - 1.0, max + 1.0];
        }
        // Small headroom so extremes are not glued to the cell border
        let pad = (max - min) * 0.05;
        [min - pad, max + pad]
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Compact trend chart for a grid cell: grey price line, green marker on the
/// maximum, red marker on the minimum, dotted baseline at the first value.
/// Axes stay hidden and the x range gets a week of padding on each side.
pub fn sparkline_figure(name: &str, points: &[(f64, f64)]) -> Figure {
    let line = Series {
        name: name.to_string(),
        kind: SeriesKind::Line,
        color: Color::Gray,
        points: points.to_vec(),
    };

    let mut series = vec![line];
    if let Some(max) = extreme_point(points, |a, b| a > b) {
        series.push(Series {
            name: name.to_string(),
            kind: SeriesKind::Scatter,
            color: Color::Green,
            points: vec![max],
        });
    }
    if let Some(min) = extreme_point(points, |a, b| a < b) {
        series.push(Series {
            name: name.to_string(),
            kind: SeriesKind::Scatter,
            color: Color::Red,
            points: vec![min],
        });
    }

    Figure {
        series,
        layout: FigureLayout {
            baseline: points.first().map(|&(_, y)| y),
            x_pad: 7.0,
            ..FigureLayout::default()
        },
    }
}

/// Full price history for the detail view: visible axes, titled, cyan line
/// with the same min/max markers as the cell sparkline.
pub fn price_history_figure(name: &str, unit: &str, points: &[(f64, f64)]) -> Figure {
    let line = Series {
        name: name.to_string(),
        kind: SeriesKind::Line,
        color: Color::Cyan,
        points: points.to_vec(),
    };

    let mut series = vec![line];
    if let Some(max) = extreme_point(points, |a, b| a > b) {
        series.push(Series {
            name: name.to_string(),
            kind: SeriesKind::Scatter,
            color: Color::Green,
            points: vec![max],
        });
    }
    if let Some(min) = extreme_point(points, |a, b| a < b) {
        series.push(Series {
            name: name.to_string(),
            kind: SeriesKind::Scatter,
            color: Color::Red,
            points: vec![min],
        });
    }

    Figure {
        series,
        layout: FigureLayout {
            title: Some(format!("Monthly Price of {}", name)),
            y_title: Some(unit.to_string()),
            axes_visible: true,
            x_pad: 0.0,
            ..FigureLayout::default()
        },
    }
}

fn extreme_point(points: &[(f64, f64)], better: fn(f64, f64) -> bool) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    for &(x, y) in points {
        match best {
            Some((_, by)) if !better(y, by) => {}
            _ => best = Some((x, y)),
        }
    }
    best
}
