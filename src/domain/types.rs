//! Shared domain types.
//!
//! Everything here is built once per run and never mutated afterwards:
//!
//! - the measurement set (`Samples`)
//! - user-facing labels and plot styles (`Labels`, `PlotStyle`)
//! - the initial-guess mapping (`InitialGuesses`)
//! - the request value that flows through the pipeline (`FitRequest`)

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::style::StyleSpec;
use crate::error::AppError;
use crate::models::ModelFn;

/// Placeholder title. Deliberately loud so an unset label is noticed.
pub const PLACEHOLDER_TITLE: &str = "INSERT TITLE";
pub const PLACEHOLDER_X_LABEL: &str = "INSERT X LABEL";
pub const PLACEHOLDER_Y_LABEL: &str = "INSERT Y LABEL";

/// Number of points used to draw the best-fit curve.
pub const CURVE_SAMPLES: usize = 50;

/// An ordered set of measurements with per-sample absolute uncertainties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Samples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
}

impl Samples {
    /// Build a measurement set, rejecting empty, ragged, or non-finite arrays.
    pub fn new(x: Vec<f64>, y: Vec<f64>, dx: Vec<f64>, dy: Vec<f64>) -> Result<Self, AppError> {
        let n = x.len();
        if n == 0 {
            return Err(AppError::data("No measurements supplied."));
        }
        for (name, len) in [("y", y.len()), ("dx", dx.len()), ("dy", dy.len())] {
            if len != n {
                return Err(AppError::data(format!(
                    "Array length mismatch: x has {n} values but {name} has {len}."
                )));
            }
        }
        for (name, values) in [("x", &x), ("y", &y), ("dx", &dx), ("dy", &dy)] {
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(AppError::data(format!(
                    "Non-finite value in {name} at index {i}."
                )));
            }
        }
        Ok(Self { x, y, dx, dy })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(min x, max x)` of the measurements.
    pub fn x_range(&self) -> (f64, f64) {
        let min = self.x.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    /// Reorder all four arrays consistently (`order[i]` is the source index).
    pub fn reordered(&self, order: &[usize]) -> Self {
        let pick = |v: &[f64]| order.iter().map(|&i| v[i]).collect::<Vec<_>>();
        Self {
            x: pick(&self.x),
            y: pick(&self.y),
            dx: pick(&self.dx),
            dy: pick(&self.dy),
        }
    }
}

/// Expand an uncertainty list to `n` entries.
///
/// A single value is broadcast to every sample (the usual case for a lab
/// instrument with a fixed resolution); otherwise the list is taken as-is and
/// length checking is left to [`Samples::new`].
pub fn broadcast(values: &[f64], n: usize) -> Vec<f64> {
    if values.len() == 1 {
        vec![values[0]; n]
    } else {
        values.to_vec()
    }
}

/// Title, axis labels, and the formula shown in the annotation block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub formula: String,
}

impl Labels {
    /// Placeholder labels with the given formula line.
    pub fn placeholders(formula: impl Into<String>) -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            x_label: PLACEHOLDER_X_LABEL.to_string(),
            y_label: PLACEHOLDER_Y_LABEL.to_string(),
            formula: formula.into(),
        }
    }
}

/// Styles for the measured points and for the fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotStyle {
    pub points: StyleSpec,
    pub curve: StyleSpec,
}

impl Default for PlotStyle {
    fn default() -> Self {
        // Blue circles, red line.
        Self {
            points: StyleSpec::parse("bo").unwrap_or_default(),
            curve: StyleSpec::parse("r").unwrap_or_default(),
        }
    }
}

/// User-supplied starting values, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialGuesses {
    values: BTreeMap<String, f64>,
}

impl InitialGuesses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one entry.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Parse `name=value` pairs. A repeated name is a usage error.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, AppError> {
        let mut values = BTreeMap::new();
        for raw in pairs {
            let raw = raw.as_ref();
            let Some((name, value)) = raw.split_once('=') else {
                return Err(AppError::usage(format!(
                    "Initial guess '{raw}' must look like name=value."
                )));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::usage(format!("Initial guess '{raw}' has an empty name.")));
            }
            let value: f64 = value.trim().parse().map_err(|_| {
                AppError::usage(format!("Initial guess '{raw}' has a non-numeric value."))
            })?;
            if values.insert(name.to_string(), value).is_some() {
                return Err(AppError::usage(format!("Initial guess for '{name}' given twice.")));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything one run needs, assembled once and passed through the stages.
#[derive(Debug, Clone)]
pub struct FitRequest {
    pub samples: Samples,
    pub model: ModelFn,
    pub guesses: InitialGuesses,
    pub labels: Labels,
    pub style: PlotStyle,
}

/// Parameters of the synthetic measurement generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub points: usize,
    pub seed: u64,
    pub x_min: f64,
    pub x_max: f64,
    pub slope: f64,
    pub noise: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            points: 10,
            seed: 42,
            x_min: 2.0,
            x_max: 9.0,
            slope: 0.5,
            noise: 0.1,
            sigma_x: 0.1,
            sigma_y: 0.1,
        }
    }
}

/// Console output flavour for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Presentation options that do not affect the fit itself.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub svg_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn samples_reject_length_mismatch() {
        let err = Samples::new(vec![1.0, 2.0], vec![1.0], vec![0.1, 0.1], vec![0.1, 0.1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(err.message().contains("y has 1"));
    }

    #[test]
    fn samples_reject_empty_and_non_finite() {
        assert!(Samples::new(vec![], vec![], vec![], vec![]).is_err());
        let err = Samples::new(vec![1.0, f64::NAN], vec![1.0, 2.0], vec![0.1; 2], vec![0.1; 2]).unwrap_err();
        assert!(err.message().contains("x at index 1"));
    }

    #[test]
    fn broadcast_single_value() {
        assert_eq!(broadcast(&[0.1], 3), vec![0.1, 0.1, 0.1]);
        assert_eq!(broadcast(&[0.1, 0.2], 3), vec![0.1, 0.2]);
    }

    #[test]
    fn parse_guess_pairs() {
        let g = InitialGuesses::parse_pairs(&["a=1.2", " b = 0.03 "]).unwrap();
        assert_eq!(g.get("a"), Some(1.2));
        assert_eq!(g.get("b"), Some(0.03));
        assert_eq!(g.len(), 2);

        assert!(InitialGuesses::parse_pairs(&["a"]).is_err());
        assert!(InitialGuesses::parse_pairs(&["a=x"]).is_err());
        assert!(InitialGuesses::parse_pairs(&["a=1", "a=2"]).is_err());
    }

    #[test]
    fn reordered_keeps_rows_together() {
        let s = Samples::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6])
            .unwrap();
        let r = s.reordered(&[2, 0, 1]);
        assert_eq!(r.x, vec![3.0, 1.0, 2.0]);
        assert_eq!(r.y, vec![6.0, 4.0, 5.0]);
        assert_eq!(r.dx, vec![0.3, 0.1, 0.2]);
        assert_eq!(r.dy, vec![0.6, 0.4, 0.5]);
    }
}
