//! The residual score printed as "chi".

use crate::domain::Samples;
use crate::models::ModelFn;

/// `sqrt(Σ (f(x_i; p) − y_i)²)`.
///
/// This is the root of the plain sum of squared residuals. Despite the "chi"
/// label it is *not* a chi-square: there is no division by `δy` and no
/// normalisation by the degrees of freedom. The formula is kept as-is so
/// reports stay comparable with earlier lab results.
pub fn residual_score(model: &ModelFn, samples: &Samples, params: &[f64]) -> f64 {
    samples
        .x
        .iter()
        .zip(&samples.y)
        .map(|(&x, &y)| {
            let r = model.eval(x, params) - y;
            r * r
        })
        .sum::<f64>()
        .sqrt()
}

/// Conventional reduced chi-square `Σ((f − y)/δy)² / (m − n)`, for comparison.
///
/// Returns NaN when there are no degrees of freedom left.
pub fn reduced_chi_square(model: &ModelFn, samples: &Samples, params: &[f64]) -> f64 {
    let dof = samples.len() as f64 - params.len() as f64;
    if dof <= 0.0 {
        return f64::NAN;
    }
    let chi2: f64 = samples
        .x
        .iter()
        .zip(&samples.y)
        .zip(&samples.dy)
        .map(|((&x, &y), &s)| {
            let r = (model.eval(x, params) - y) / s;
            r * r
        })
        .sum();
    chi2 / dof
}
