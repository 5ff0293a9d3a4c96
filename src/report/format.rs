//! Console and annotation text.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays free of presentation concerns
//! - the console report and the in-plot annotation cannot drift apart

use crate::error::AppError;
use crate::report::FitReport;
use crate::uncertain::fmt_exp;

/// Significant digits of each reported estimate and uncertainty.
pub const ESTIMATE_DIGITS: usize = 2;

/// Mantissa decimals of the residual score.
pub const SCORE_PRECISION: usize = 2;

/// `name = value±uncertainty`, one line per parameter.
pub fn parameter_lines(report: &FitReport) -> Vec<String> {
    report
        .parameters
        .iter()
        .map(|p| format!("{} = {}", p.name, p.estimate.to_sig_string(ESTIMATE_DIGITS)))
        .collect()
}

/// The console report: parameter lines followed by the score line.
pub fn format_report(report: &FitReport) -> String {
    let mut out = String::new();
    for line in parameter_lines(report) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!("Score chi: {}\n", fmt_exp(report.chi, SCORE_PRECISION)));
    if report.covariance_singular {
        out.push_str("warning: covariance is singular; uncertainties are undefined\n");
    }
    out
}

/// The report as pretty-printed JSON.
pub fn format_report_json(report: &FitReport) -> Result<String, AppError> {
    serde_json::to_string_pretty(report).map_err(|e| AppError::render(format!("Failed to serialize report: {e}")))
}

/// Text block drawn inside the figure: formula, parameters, score.
pub fn annotation_lines(report: &FitReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.parameters.len() + 2);
    lines.push(report.formula.clone());
    lines.extend(parameter_lines(report));
    lines.push(format!("chi= {}", fmt_exp(report.chi, SCORE_PRECISION)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ParameterReport;
    use crate::uncertain::Measured;

    fn report(chi: f64, b_err: f64) -> FitReport {
        FitReport {
            model: "linear".to_string(),
            formula: "y = a*x + b".to_string(),
            n_samples: 10,
            parameters: vec![
                ParameterReport {
                    name: "a".to_string(),
                    estimate: Measured::new(0.5012, 0.0347),
                },
                ParameterReport {
                    name: "b".to_string(),
                    estimate: Measured::new(-0.031, b_err),
                },
            ],
            chi,
            reduced_chi2: 1.0,
            covariance_singular: b_err.is_nan(),
            iterations: 4,
        }
    }

    #[test]
    fn report_golden() {
        let txt = format_report(&report(0.2871, 0.12));
        let expected = concat!(
            "a = 5.0e-01±3.5e-02\n",
            "b = -3.1e-02±1.2e-01\n",
            "Score chi: 2.87e-01\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn nan_uncertainty_prints_nan() {
        let txt = format_report(&report(0.0, f64::NAN));
        assert!(txt.contains("b = -3.1e-02±nan\n"));
        assert!(txt.contains("singular"));
    }

    #[test]
    fn annotation_has_formula_params_and_chi() {
        let lines = annotation_lines(&report(0.2871, 0.12));
        assert_eq!(lines.first().map(String::as_str), Some("y = a*x + b"));
        assert_eq!(lines.last().map(String::as_str), Some("chi= 2.87e-01"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn json_carries_value_and_std_dev() {
        let json = format_report_json(&report(0.5, 0.25)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["parameters"][1]["name"], "b");
        assert_eq!(v["parameters"][1]["std_dev"], 0.25);
        assert_eq!(v["chi"], 0.5);
    }
}
