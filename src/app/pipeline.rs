//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! request -> bind guesses -> weighted fit -> packaged estimates -> report -> figure
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::debug;

use crate::domain::FitRequest;
use crate::error::AppError;
use crate::fit::{FitOptions, FitOutcome, fit_request};
use crate::plot::Figure;
use crate::report::FitReport;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub request: FitRequest,
    pub outcome: FitOutcome,
    pub report: FitReport,
    pub figure: Figure,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(request: FitRequest, opts: &FitOptions) -> Result<RunOutput, AppError> {
    let outcome = fit_request(&request, opts)?;
    let report = FitReport::new(&request, &outcome);
    let figure = Figure::new(&request, &outcome, &report);
    debug!(
        curve_samples = figure.curve.len(),
        annotation_lines = figure.annotation.len(),
        "figure prepared"
    );

    Ok(RunOutput {
        request,
        outcome,
        report,
        figure,
    })
}
