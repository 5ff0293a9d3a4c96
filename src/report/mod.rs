//! Reporting: the serializable fit summary and its console renderings.

use serde::Serialize;

use crate::domain::FitRequest;
use crate::fit::FitOutcome;
use crate::uncertain::Measured;

pub mod format;

pub use format::*;

/// One fitted parameter as it appears in a report.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterReport {
    pub name: String,
    #[serde(flatten)]
    pub estimate: Measured,
}

/// Everything printed about a run.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub model: String,
    pub formula: String,
    pub n_samples: usize,
    pub parameters: Vec<ParameterReport>,
    /// Root of the unweighted sum of squared residuals.
    pub chi: f64,
    pub reduced_chi2: f64,
    pub covariance_singular: bool,
    pub iterations: usize,
}

impl FitReport {
    pub fn new(request: &FitRequest, outcome: &FitOutcome) -> Self {
        let parameters = outcome
            .names
            .iter()
            .zip(&outcome.estimates)
            .map(|(name, estimate)| ParameterReport {
                name: name.clone(),
                estimate: estimate.clone(),
            })
            .collect();
        Self {
            model: request.model.name.to_string(),
            formula: request.labels.formula.clone(),
            n_samples: request.samples.len(),
            parameters,
            chi: outcome.chi,
            reduced_chi2: outcome.reduced_chi2,
            covariance_singular: outcome.covariance_singular,
            iterations: outcome.iterations,
        }
    }
}
