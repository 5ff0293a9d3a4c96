//! Turning estimates and their covariance into `Measured` values.

use nalgebra::DMatrix;

use crate::uncertain::Measured;

/// Pair each estimate with `sqrt(cov[i][i])`.
///
/// A diagonal entry that is zero, negative, or non-finite has no meaningful
/// standard error and is packaged as NaN rather than as an exact value.
pub fn package_estimates(estimates: &[f64], covariance: &DMatrix<f64>) -> Vec<Measured> {
    estimates
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let var = if i < covariance.nrows() && i < covariance.ncols() {
                covariance[(i, i)]
            } else {
                f64::NAN
            };
            let std_err = if var.is_finite() && var > 0.0 { var.sqrt() } else { f64::NAN };
            Measured::new(value, std_err)
        })
        .collect()
}
