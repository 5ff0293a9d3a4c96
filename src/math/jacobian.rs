//! Central-difference Jacobian of weighted residuals.

use nalgebra::DMatrix;

use crate::models::ModelFn;

/// Relative step for central differences (≈ cube root of machine epsilon).
const REL_STEP: f64 = 6.055_454_452_393_343e-6;

/// Weighted residual `(f(x_i, p) − y_i) / σ_i` for every sample.
pub fn weighted_residuals(model: &ModelFn, x: &[f64], y: &[f64], sigma: &[f64], params: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(y)
        .zip(sigma)
        .map(|((&xi, &yi), &si)| (model.eval(xi, params) - yi) / si)
        .collect()
}

/// `J[i][j] = ∂r_i/∂p_j` for the weighted residuals, by central differences.
///
/// A parameter the model does not depend on yields an exactly-zero column,
/// which the covariance step later reports as rank deficiency.
pub fn weighted_jacobian(model: &ModelFn, x: &[f64], sigma: &[f64], params: &[f64]) -> DMatrix<f64> {
    let m = x.len();
    let n = params.len();
    let mut jac = DMatrix::<f64>::zeros(m, n);
    let mut p = params.to_vec();

    for j in 0..n {
        let pj = params[j];
        let h = REL_STEP * pj.abs().max(1.0);
        p[j] = pj + h;
        let up: Vec<f64> = x.iter().map(|&xi| model.eval(xi, &p)).collect();
        p[j] = pj - h;
        let down: Vec<f64> = x.iter().map(|&xi| model.eval(xi, &p)).collect();
        p[j] = pj;

        // Divide by the actually representable step to limit rounding error.
        let span = (pj + h) - (pj - h);
        for i in 0..m {
            jac[(i, j)] = (up[i] - down[i]) / span / sigma[i];
        }
    }

    jac
}
