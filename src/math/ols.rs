//! Linear-algebra kernels for the Levenberg–Marquardt fitter.
//!
//! Each iteration solves a small damped normal system
//!
//! ```text
//! (JᵀJ + λ·D) δ = −Jᵀr
//! ```
//!
//! and, once converged, the parameter covariance `(JᵀJ)⁻¹` is read off the
//! SVD of the weighted Jacobian.
//!
//! Implementation choices:
//! - Cholesky first: the damped matrix is symmetric positive definite whenever
//!   `λ > 0` and the scaling diagonal is positive.
//! - SVD least squares as fallback, with progressively looser tolerances, for
//!   the rare cases where rounding breaks positive definiteness.
//! - Covariance via SVD so rank deficiency is detected explicitly instead of
//!   producing a huge-but-finite inverse.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly, or
/// holds a non-finite entry (nalgebra's SVD panics on NaN).
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if !(all_finite(x.as_slice()) && all_finite(y.as_slice())) {
        return None;
    }
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve the damped normal equations for one Levenberg–Marquardt step.
///
/// `jtj` and `jtr` are `JᵀJ` and `Jᵀr`; `scale` is the Marquardt diagonal.
pub fn solve_damped_step(
    jtj: &DMatrix<f64>,
    jtr: &DVector<f64>,
    scale: &DVector<f64>,
    lambda: f64,
) -> Option<DVector<f64>> {
    if !(all_finite(jtj.as_slice()) && all_finite(jtr.as_slice())) {
        return None;
    }
    let mut a = jtj.clone();
    for j in 0..a.nrows() {
        a[(j, j)] += lambda * scale[j];
    }
    let rhs = -jtr;

    if let Some(chol) = a.clone().cholesky() {
        let step = chol.solve(&rhs);
        if step.iter().all(|v| v.is_finite()) {
            return Some(step);
        }
    }
    solve_least_squares(&a, &rhs)
}

/// Covariance `(JᵀJ)⁻¹` of a weighted Jacobian.
///
/// Returns `None` when `J` is rank deficient: a singular value at or below
/// `ε · max(m, n) · s_max`, the same cut-off LAPACK-style pseudo-inverses use.
pub fn covariance_from_jacobian(jac: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (m, n) = jac.shape();
    if m < n || n == 0 || !all_finite(jac.as_slice()) {
        return None;
    }

    let svd = jac.clone().svd(false, true);
    let v_t = svd.v_t.as_ref()?;
    let s = &svd.singular_values;
    let s_max = s.iter().copied().fold(0.0_f64, f64::max);
    let threshold = f64::EPSILON * m.max(n) as f64 * s_max;
    if s_max <= 0.0 || s.iter().any(|&si| si <= threshold) {
        return None;
    }

    // JᵀJ = V S² Vᵀ  ⇒  (JᵀJ)⁻¹ = V S⁻² Vᵀ
    let mut cov = DMatrix::<f64>::zeros(n, n);
    for k in 0..s.len() {
        let inv_s2 = 1.0 / (s[k] * s[k]);
        for i in 0..n {
            for j in 0..n {
                cov[(i, j)] += v_t[(k, i)] * v_t[(k, j)] * inv_s2;
            }
        }
    }
    Some(cov)
}

pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn non_finite_systems_are_rejected_not_decomposed() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, 0.0, 1.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0]);
        assert!(solve_least_squares(&x, &y).is_none());

        let jtj = DMatrix::from_row_slice(2, 2, &[f64::INFINITY, 0.0, 0.0, 1.0]);
        let jtr = DVector::from_row_slice(&[1.0, 1.0]);
        let scale = DVector::from_element(2, 1.0);
        assert!(solve_damped_step(&jtj, &jtr, &scale, 1e-3).is_none());
    }

    #[test]
    fn damped_step_without_damping_is_gauss_newton() {
        let jtj = DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 0.0, 1.0]);
        let jtr = DVector::from_row_slice(&[8.0, -3.0]);
        let scale = DVector::from_element(2, 1.0);
        let step = solve_damped_step(&jtj, &jtr, &scale, 0.0).unwrap();
        assert!((step[0] + 2.0).abs() < 1e-12);
        assert!((step[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn covariance_of_straight_line_design() {
        // J = [1 x] with unit sigma; (JᵀJ)⁻¹ for x = 0,1,2 is [[5/6, -1/2], [-1/2, 1/2]].
        let jac = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let cov = covariance_from_jacobian(&jac).unwrap();
        assert!((cov[(0, 0)] - 5.0 / 6.0).abs() < 1e-12);
        assert!((cov[(0, 1)] + 0.5).abs() < 1e-12);
        assert!((cov[(1, 1)] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn covariance_detects_rank_deficiency() {
        let jac = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        assert!(covariance_from_jacobian(&jac).is_none());
    }
}
