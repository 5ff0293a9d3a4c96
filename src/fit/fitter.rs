//! Weighted nonlinear least squares (Levenberg–Marquardt).
//!
//! Given:
//! - samples `(x_i, y_i)` with absolute uncertainties `σ_i = δy_i`
//! - a model `f(x; p)` and a starting vector `p0`
//!
//! we minimise
//!
//! ```text
//! Σ ((f(x_i; p) − y_i) / σ_i)²
//! ```
//!
//! and report the covariance `(JᵀJ)⁻¹` of the weighted Jacobian at the
//! optimum. The σ are taken as true standard deviations (absolute sigma), so
//! the covariance is not rescaled by the residual variance.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace, warn};

use crate::domain::Samples;
use crate::error::AppError;
use crate::math::{all_finite, covariance_from_jacobian, solve_damped_step, weighted_jacobian, weighted_residuals};
use crate::models::ModelFn;

/// Damping beyond this means no downhill step exists at working precision.
const LAMBDA_MAX: f64 = 1e16;
const LAMBDA_MIN: f64 = 1e-15;

/// Optimizer settings.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Budget of step attempts (accepted or rejected). `None` means `200·(n+1)`.
    pub max_iterations: Option<usize>,
    /// Stop when an accepted step reduces the cost by less than this fraction.
    pub ftol: f64,
    /// Stop when the proposed step is this small relative to the parameters.
    pub xtol: f64,
    /// Starting Marquardt damping.
    pub initial_lambda: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: None,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            initial_lambda: 1e-3,
        }
    }
}

/// Optimizer output before uncertainty packaging.
#[derive(Debug, Clone)]
pub struct RawFit {
    pub params: Vec<f64>,
    /// `n × n`; every entry is NaN when the Jacobian is rank deficient.
    pub covariance: DMatrix<f64>,
    pub covariance_singular: bool,
    pub iterations: usize,
}

/// Fit `model` to `samples` starting from `p0`.
pub fn least_squares(model: &ModelFn, samples: &Samples, p0: &[f64], opts: &FitOptions) -> Result<RawFit, AppError> {
    let n = p0.len();
    let m = samples.len();

    if n != model.arity() {
        return Err(AppError::usage(format!(
            "Model '{}' takes {} parameter(s) but {n} starting value(s) were given.",
            model.name,
            model.arity()
        )));
    }
    if n == 0 {
        return Err(AppError::usage(format!("Model '{}' has no parameters to fit.", model.name)));
    }
    if m < n {
        return Err(AppError::usage(format!(
            "Need at least as many samples as parameters ({m} < {n})."
        )));
    }
    if let Some(i) = samples.dy.iter().position(|&s| !(s.is_finite() && s > 0.0)) {
        return Err(AppError::usage(format!(
            "Uncertainty dy[{i}] = {} must be positive; it is used as a weight.",
            samples.dy[i]
        )));
    }

    let (x, y, sigma) = (&samples.x, &samples.y, &samples.dy);
    let max_iterations = opts.max_iterations.unwrap_or(200 * (n + 1));

    let mut p = p0.to_vec();
    let mut r = weighted_residuals(model, x, y, sigma, &p);
    if r.iter().any(|v| !v.is_finite()) {
        return Err(AppError::fit(format!(
            "Model '{}' is not finite at the initial guess; choose different starting values.",
            model.name
        )));
    }
    let mut cost = sum_squares(&r);
    let mut jac = weighted_jacobian(model, x, sigma, &p);
    if !all_finite(jac.as_slice()) {
        return Err(AppError::fit(format!(
            "Model '{}' has a non-finite derivative at the initial guess; choose different starting values.",
            model.name
        )));
    }
    let mut lambda = opts.initial_lambda;
    let mut converged = false;
    let mut iterations = 0;

    debug!(model = model.name, n_samples = m, n_params = n, cost, "starting least squares");

    while iterations < max_iterations {
        iterations += 1;
        if cost == 0.0 {
            converged = true;
            break;
        }

        let jtj = jac.tr_mul(&jac);
        let jtr = jac.tr_mul(&DVector::from_column_slice(&r));
        let scale = DVector::from_iterator(n, jtj.diagonal().iter().map(|&d| if d > 0.0 { d } else { 1.0 }));

        let Some(step) = solve_damped_step(&jtj, &jtr, &scale, lambda) else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                break;
            }
            continue;
        };

        let p_norm = p.iter().map(|v| v * v).sum::<f64>().sqrt();
        if step.norm() <= opts.xtol * (p_norm + opts.xtol) {
            converged = true;
            break;
        }

        let trial: Vec<f64> = p.iter().zip(step.iter()).map(|(a, b)| a + b).collect();
        let r_trial = weighted_residuals(model, x, y, sigma, &trial);
        let cost_trial = sum_squares(&r_trial);

        // A step is only taken where the Jacobian is finite as well.
        let jac_trial = (cost_trial.is_finite() && cost_trial < cost)
            .then(|| weighted_jacobian(model, x, sigma, &trial))
            .filter(|j| all_finite(j.as_slice()));

        if let Some(jac_trial) = jac_trial {
            let reduction = (cost - cost_trial) / cost;
            p = trial;
            r = r_trial;
            cost = cost_trial;
            jac = jac_trial;
            lambda = (lambda / 10.0).max(LAMBDA_MIN);
            trace!(iterations, cost, lambda, "accepted step");
            if reduction <= opts.ftol {
                converged = true;
                break;
            }
        } else {
            lambda *= 10.0;
            trace!(iterations, cost_trial, lambda, "rejected step");
            if lambda > LAMBDA_MAX {
                break;
            }
        }
    }

    if !converged {
        return Err(AppError::fit(format!(
            "Fit of model '{}' did not converge after {iterations} iteration(s) (weighted SSE {cost:.6e}).",
            model.name
        )));
    }

    let (covariance, covariance_singular) = match covariance_from_jacobian(&jac) {
        Some(c) => (c, false),
        None => {
            warn!(model = model.name, "covariance is singular; standard errors are undefined");
            (DMatrix::from_element(n, n, f64::NAN), true)
        }
    };

    debug!(iterations, weighted_sse = cost, "least squares converged");

    Ok(RawFit {
        params: p,
        covariance,
        covariance_singular,
        iterations,
    })
}

fn sum_squares(v: &[f64]) -> f64 {
    v.iter().map(|r| r * r).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::find_model;

    fn line_samples(sigma: f64) -> Samples {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
        Samples::new(x, y, vec![0.1; 10], vec![sigma; 10]).unwrap()
    }

    #[test]
    fn recovers_noiseless_line() {
        let model = find_model("linear").unwrap();
        let fit = least_squares(&model, &line_samples(1e-3), &[1.2, 0.03], &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-6, "a = {}", fit.params[0]);
        assert!((fit.params[1] - 3.0).abs() < 1e-6, "b = {}", fit.params[1]);
        assert!(!fit.covariance_singular);
    }

    #[test]
    fn covariance_uses_absolute_sigma() {
        // For a straight line the covariance does not depend on y at all:
        // var(a) = σ² / Σ(x − x̄)².
        let model = find_model("linear").unwrap();
        let fit = least_squares(&model, &line_samples(0.5), &[1.0, 1.0], &FitOptions::default()).unwrap();
        let sxx: f64 = (0..10).map(|i| (i as f64 - 4.5).powi(2)).sum();
        let expected = 0.25 / sxx;
        assert!((fit.covariance[(0, 0)] - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn recovers_exponential_from_rough_guess() {
        let model = find_model("exponential").unwrap();
        let x: Vec<f64> = (0..12).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.5 * (0.8 * v).exp()).collect();
        let samples = Samples::new(x, y, vec![0.0; 12], vec![0.01; 12]).unwrap();
        let fit = least_squares(&model, &samples, &[1.0, 0.5], &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 1.5).abs() < 1e-6);
        assert!((fit.params[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn unused_parameter_gives_nan_covariance() {
        fn ignores_b(x: f64, p: &[f64]) -> f64 {
            p[0] * x
        }
        let model = ModelFn::new("ignores-b", &["x", "a", "b"], "y = a*x", ignores_b);
        let fit = least_squares(&model, &line_samples(0.1), &[1.0, 1.0], &FitOptions::default()).unwrap();
        assert!(fit.covariance_singular);
        assert!(fit.covariance.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn non_positive_sigma_is_usage_error() {
        let model = find_model("linear").unwrap();
        let mut samples = line_samples(0.1);
        samples.dy[3] = 0.0;
        let err = least_squares(&model, &samples, &[1.0, 1.0], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.message().contains("dy[3]"));
    }

    #[test]
    fn too_few_samples_is_usage_error() {
        let model = find_model("quadratic").unwrap();
        let samples = Samples::new(vec![1.0, 2.0], vec![1.0, 2.0], vec![0.1; 2], vec![0.1; 2]).unwrap();
        let err = least_squares(&model, &samples, &[1.0, 1.0, 1.0], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn non_finite_start_is_fit_error() {
        let model = find_model("power").unwrap();
        let samples = Samples::new(vec![-1.0, -2.0], vec![1.0, 2.0], vec![0.1; 2], vec![0.1; 2]).unwrap();
        // (-1)^0.5 is NaN.
        let err = least_squares(&model, &samples, &[1.0, 0.5], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fit);
    }

    #[test]
    fn non_finite_derivative_is_fit_error_not_panic() {
        // x^n is finite at n = 2 for negative x, but not at n = 2 ± h.
        let model = find_model("power").unwrap();
        let x = vec![-2.0, -1.0, 0.5, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let samples = Samples::new(x, y, vec![0.0; 6], vec![0.1; 6]).unwrap();
        let err = least_squares(&model, &samples, &[1.5, 2.0], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fit);
        assert!(err.message().contains("non-finite derivative"), "{}", err.message());
    }

    #[test]
    fn exhausted_budget_is_fit_error() {
        let model = find_model("exponential").unwrap();
        let x: Vec<f64> = (0..12).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.5 * (0.8 * v).exp()).collect();
        let samples = Samples::new(x, y, vec![0.0; 12], vec![0.01; 12]).unwrap();
        let opts = FitOptions {
            max_iterations: Some(1),
            ..FitOptions::default()
        };
        let err = least_squares(&model, &samples, &[10.0, -1.0], &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fit);
        assert!(err.message().contains("did not converge"));
    }
}
