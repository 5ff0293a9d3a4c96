//! One complete fit: names → guesses → optimizer → packaged estimates → score.

use nalgebra::DMatrix;
use tracing::info;

use crate::domain::FitRequest;
use crate::error::AppError;
use crate::fit::{FitOptions, bind_initial_guesses, least_squares, package_estimates, reduced_chi_square, residual_score};
use crate::uncertain::Measured;

/// Fitted parameters with uncertainties plus fit-quality figures.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    /// Parameter names in model order.
    pub names: Vec<String>,
    /// One `value ± standard error` per parameter, same order as `names`.
    pub estimates: Vec<Measured>,
    pub covariance: DMatrix<f64>,
    pub covariance_singular: bool,
    /// Root of the unweighted sum of squared residuals (the "chi" score).
    pub chi: f64,
    /// Conventional reduced chi-square, reported alongside for reference.
    pub reduced_chi2: f64,
    pub iterations: usize,
}

impl FitOutcome {
    /// Nominal parameter values in model order.
    pub fn values(&self) -> Vec<f64> {
        self.estimates.iter().map(Measured::nominal).collect()
    }

    /// Look up one estimate by parameter name.
    pub fn estimate(&self, name: &str) -> Option<&Measured> {
        self.names.iter().position(|n| n == name).map(|i| &self.estimates[i])
    }
}

/// Run the fit described by `request`.
///
/// Guess binding happens first, so a mapping that does not match the model's
/// parameters fails before any model evaluation.
pub fn fit_request(request: &FitRequest, opts: &FitOptions) -> Result<FitOutcome, AppError> {
    let names = request.model.parameter_names()?;
    let p0 = bind_initial_guesses(&names, &request.guesses)?;

    let raw = least_squares(&request.model, &request.samples, &p0, opts)?;
    let estimates = package_estimates(&raw.params, &raw.covariance);
    let chi = residual_score(&request.model, &request.samples, &raw.params);
    let reduced_chi2 = reduced_chi_square(&request.model, &request.samples, &raw.params);

    info!(
        model = request.model.name,
        iterations = raw.iterations,
        chi,
        reduced_chi2,
        "fit complete"
    );

    Ok(FitOutcome {
        names,
        estimates,
        covariance: raw.covariance,
        covariance_singular: raw.covariance_singular,
        chi,
        reduced_chi2,
        iterations: raw.iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InitialGuesses, Labels, PlotStyle, Samples};
    use crate::error::ErrorKind;
    use crate::models::{ModelFn, find_model};

    fn request(guesses: InitialGuesses) -> FitRequest {
        let model = find_model("linear").unwrap();
        let x: Vec<f64> = (1..=8).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
        FitRequest {
            samples: Samples::new(x, y, vec![0.1; 8], vec![1e-3; 8]).unwrap(),
            model,
            guesses,
            labels: Labels::placeholders(model.formula),
            style: PlotStyle::default(),
        }
    }

    #[test]
    fn noiseless_line_fits_with_zero_score() {
        let req = request(InitialGuesses::new().with("a", 1.2).with("b", 0.03));
        let out = fit_request(&req, &FitOptions::default()).unwrap();
        assert_eq!(out.names, vec!["a", "b"]);
        assert!((out.estimate("a").unwrap().nominal() - 2.0).abs() < 1e-6);
        assert!((out.estimate("b").unwrap().nominal() - 3.0).abs() < 1e-6);
        assert!(out.chi < 1e-6, "chi = {}", out.chi);
    }

    #[test]
    fn missing_guess_fails_before_model_runs() {
        fn must_not_run(_x: f64, _p: &[f64]) -> f64 {
            panic!("model evaluated despite invalid guesses");
        }
        let mut req = request(InitialGuesses::new().with("a", 1.2));
        req.model = ModelFn::new("tripwire", &["x", "a", "b"], "y = ?", must_not_run);
        let err = fit_request(&req, &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn model_without_parameters_is_rejected() {
        fn constant(_x: f64, _p: &[f64]) -> f64 {
            0.0
        }
        let mut req = request(InitialGuesses::new());
        req.model = ModelFn::new("bare", &["x"], "y = 0", constant);
        assert!(fit_request(&req, &FitOptions::default()).is_err());
    }
}
