//! Render-independent description of the output figure.
//!
//! All series, bounds and text are computed here once, so the terminal, SVG
//! and interactive renderers only draw.

use crate::data::linspace;
use crate::domain::{CURVE_SAMPLES, FitRequest, PlotStyle};
use crate::fit::FitOutcome;
use crate::report::{FitReport, annotation_lines};

/// One measured point with its error bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorPoint {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ErrorPoint>,
    /// Best-fit curve sampled over `[min x, max x]`.
    pub curve: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Annotation block, drawn bottom-right inside the plot area.
    pub annotation: Vec<String>,
    pub style: PlotStyle,
}

impl Figure {
    pub fn new(request: &FitRequest, outcome: &FitOutcome, report: &FitReport) -> Self {
        let samples = &request.samples;
        let points: Vec<ErrorPoint> = (0..samples.len())
            .map(|i| ErrorPoint {
                x: samples.x[i],
                y: samples.y[i],
                dx: samples.dx[i].abs(),
                dy: samples.dy[i].abs(),
            })
            .collect();

        let params = outcome.values();
        let (x_min, x_max) = samples.x_range();
        let curve: Vec<(f64, f64)> = linspace(x_min, x_max, CURVE_SAMPLES)
            .into_iter()
            .map(|x| (x, request.model.eval(x, &params)))
            .filter(|(_, y)| y.is_finite())
            .collect();

        let (x_bounds, y_bounds) = bounds(&points, &curve);

        Self {
            title: request.labels.title.clone(),
            x_label: request.labels.x_label.clone(),
            y_label: request.labels.y_label.clone(),
            points,
            curve,
            x_bounds,
            y_bounds,
            annotation: annotation_lines(report),
            style: request.style,
        }
    }
}

/// Padded axis bounds covering error bars and the curve.
fn bounds(points: &[ErrorPoint], curve: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        x = (x.0.min(p.x - p.dx), x.1.max(p.x + p.dx));
        y = (y.0.min(p.y - p.dy), y.1.max(p.y + p.dy));
    }
    for &(cx, cy) in curve {
        x = (x.0.min(cx), x.1.max(cx));
        y = (y.0.min(cy), y.1.max(cy));
    }
    let (x0, x1) = pad_range(x.0, x.1, 0.05);
    let (y0, y1) = pad_range(y.0, y.1, 0.05);
    ([x0, x1], [y0, y1])
}

/// Widen `[min, max]` by `frac` of its span on each side.
///
/// A collapsed or non-finite range becomes a unit-wide window so every
/// renderer always gets a drawable, non-empty interval.
pub fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 1e-12 * min.abs().max(max.abs()).max(1.0) {
        return (min - 0.5, max + 0.5);
    }
    let pad = span * frac;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_range_widens_and_handles_degenerate() {
        assert_eq!(pad_range(0.0, 10.0, 0.05), (-0.5, 10.5));
        assert_eq!(pad_range(3.0, 3.0, 0.05), (2.5, 3.5));
        assert_eq!(pad_range(f64::INFINITY, f64::NEG_INFINITY, 0.05), (0.0, 1.0));
    }

    #[test]
    fn bounds_include_error_bars() {
        let points = [ErrorPoint { x: 1.0, y: 1.0, dx: 1.0, dy: 2.0 }];
        let curve = [(0.0, 0.0), (4.0, 2.0)];
        let (xb, yb) = bounds(&points, &curve);
        // x ∈ [0, 4] padded by 0.2; y ∈ [-1, 3] padded by 0.2.
        assert!((xb[0] + 0.2).abs() < 1e-12 && (xb[1] - 4.2).abs() < 1e-12);
        assert!((yb[0] + 1.2).abs() < 1e-12 && (yb[1] - 3.2).abs() < 1e-12);
    }
}
