//! Command-line parsing for the lab-report curve fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting and rendering code; `app` turns these structs into a `FitRequest`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::OutputFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tpfit", version, about = "Weighted least-squares curve fitting for lab reports")]
pub struct Cli {
    /// Log more to stderr (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the model, print the report and the terminal plot, optionally write an SVG.
    Fit(FitArgs),
    /// Fit the model and open the interactive viewer.
    Show(FitArgs),
    /// List the built-in models.
    Models,
}

/// Options shared by `fit` and `show`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Model to fit (see `tpfit models`).
    #[arg(short = 'm', long, default_value = "linear")]
    pub model: String,

    /// Initial guess for one parameter; repeat for each parameter.
    #[arg(short = 'g', long = "guess", value_name = "NAME=VALUE")]
    pub guesses: Vec<String>,

    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub labels: LabelArgs,

    /// Optimizer budget (step attempts). Defaults to 200·(n+1).
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Report format on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the figure to this SVG file.
    #[arg(short = 'o', long, value_name = "SVG")]
    pub output: Option<PathBuf>,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Terminal plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Terminal plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

/// Measured arrays, or the synthetic generator used when none are given.
#[derive(Debug, Parser, Clone)]
pub struct DataArgs {
    /// Measured x values (comma separated).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, allow_hyphen_values = true)]
    pub x: Vec<f64>,

    /// Measured y values (comma separated).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, allow_hyphen_values = true)]
    pub y: Vec<f64>,

    /// Uncertainty on x: one value per sample, or a single value for all.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, allow_hyphen_values = true)]
    pub dx: Vec<f64>,

    /// Uncertainty on y: one value per sample, or a single value for all.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, allow_hyphen_values = true)]
    pub dy: Vec<f64>,

    /// Synthetic sample count.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub points: usize,

    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub x_min: f64,

    #[arg(long, default_value_t = 9.0, allow_negative_numbers = true)]
    pub x_max: f64,

    /// Slope of the synthetic line.
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub slope: f64,

    /// Standard deviation of the noise added to x and y.
    #[arg(long, default_value_t = 0.1)]
    pub noise: f64,

    /// Reported uncertainty on every synthetic x.
    #[arg(long, default_value_t = 0.1)]
    pub sigma_x: f64,

    /// Reported uncertainty on every synthetic y.
    #[arg(long, default_value_t = 0.1)]
    pub sigma_y: f64,
}

/// Figure text and styles. Each may also come from the environment or `.env`.
#[derive(Debug, Parser, Clone)]
pub struct LabelArgs {
    #[arg(long, env = "TPFIT_TITLE")]
    pub title: Option<String>,

    #[arg(long, env = "TPFIT_X_LABEL")]
    pub x_label: Option<String>,

    #[arg(long, env = "TPFIT_Y_LABEL")]
    pub y_label: Option<String>,

    /// Formula line of the annotation (defaults to the model's formula).
    #[arg(long, env = "TPFIT_FORMULA")]
    pub formula: Option<String>,

    /// Point style code: colour letter plus marker, e.g. `bo`, `k^`.
    #[arg(long, env = "TPFIT_POINT_STYLE", default_value = "bo")]
    pub point_style: String,

    /// Curve style code: colour letter, optionally `-` or a marker, e.g. `r`, `g-`.
    #[arg(long, env = "TPFIT_CURVE_STYLE", default_value = "r")]
    pub curve_style: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_guesses_and_comma_lists() {
        let cli = Cli::parse_from([
            "tpfit", "fit", "--guess", "a=1", "-g", "b=-2", "--x", "1,2,3", "--y", "-1,0.5,2", "--dy", "0.1",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.guesses, vec!["a=1", "b=-2"]);
        assert_eq!(args.data.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(args.data.y, vec![-1.0, 0.5, 2.0]);
        assert_eq!(args.data.dy, vec![0.1]);
        assert!(args.data.dx.is_empty());
    }

    #[test]
    fn verbose_counts_and_is_global() {
        let cli = Cli::parse_from(["tpfit", "show", "-vv", "--model", "power"]);
        assert_eq!(cli.verbose, 2);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.model, "power");
        assert_eq!(args.format, OutputFormat::Text);
    }
}
