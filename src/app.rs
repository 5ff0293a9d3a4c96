//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the stderr log subscriber
//! - builds the fit request (measured arrays or a synthetic sample)
//! - runs the pipeline and prints the report, plot and optional SVG

use clap::Parser;
use tracing::{Level, debug, warn};

use crate::cli::{Command, DataArgs, FitArgs, LabelArgs};
use crate::data::{generate_sample, samples_from_arrays};
use crate::domain::{
    FitRequest, InitialGuesses, Labels, OutputConfig, OutputFormat, PLACEHOLDER_TITLE, PLACEHOLDER_X_LABEL,
    PLACEHOLDER_Y_LABEL, PlotStyle, SampleConfig, Samples, StyleSpec,
};
use crate::error::AppError;
use crate::fit::FitOptions;
use crate::models::{BUILTIN_MODELS, ModelFn, find_model};

pub mod pipeline;

/// Entry point for the `tpfit` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal.
    dotenvy::dotenv().ok();

    // `tpfit` and `tpfit --guess a=1 ...` behave like `tpfit fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Show(args) => handle_show(args),
        Command::Models => {
            print!("{}", format_models(&BUILTIN_MODELS));
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // Stdout carries the report; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let output = output_config_from_args(&args);
    let request = fit_request_from_args(&args)?;
    let run = pipeline::run_fit(request, &fit_options_from_args(&args))?;

    match output.format {
        OutputFormat::Text => print!("{}", crate::report::format_report(&run.report)),
        OutputFormat::Json => println!("{}", crate::report::format_report_json(&run.report)?),
    }

    if output.plot && output.format == OutputFormat::Text {
        println!();
        print!(
            "{}",
            crate::plot::render_ascii_plot(&run.figure, output.plot_width, output.plot_height)
        );
    }

    if let Some(path) = &output.svg_path {
        crate::plot::write_svg(&run.figure, path)?;
    }

    Ok(())
}

fn handle_show(args: FitArgs) -> Result<(), AppError> {
    let request = fit_request_from_args(&args)?;
    let run = pipeline::run_fit(request, &fit_options_from_args(&args))?;
    if let Some(path) = &args.output {
        crate::plot::write_svg(&run.figure, path)?;
    }
    crate::tui::run(run)
}

/// Assemble the single request value every stage reads from.
pub fn fit_request_from_args(args: &FitArgs) -> Result<FitRequest, AppError> {
    let model = find_model(&args.model)?;
    let samples = samples_from_args(&args.data)?;

    let guesses = if args.guesses.is_empty() {
        debug!(model = model.name, "no --guess given; using the model's default guesses");
        default_guesses(&model)
    } else {
        InitialGuesses::parse_pairs(&args.guesses)?
    };

    Ok(FitRequest {
        samples,
        model,
        guesses,
        labels: labels_from_args(&args.labels, &model),
        style: style_from_args(&args.labels)?,
    })
}

/// Measured arrays when `--x` is given, otherwise the seeded synthetic sample.
pub fn samples_from_args(data: &DataArgs) -> Result<Samples, AppError> {
    if data.x.is_empty() && data.y.is_empty() {
        if !data.dx.is_empty() || !data.dy.is_empty() {
            warn!("--dx/--dy ignored without --x/--y; using the synthetic sample");
        }
        return generate_sample(&SampleConfig {
            points: data.points,
            seed: data.seed,
            x_min: data.x_min,
            x_max: data.x_max,
            slope: data.slope,
            noise: data.noise,
            sigma_x: data.sigma_x,
            sigma_y: data.sigma_y,
        });
    }
    samples_from_arrays(&data.x, &data.y, &data.dx, &data.dy)
}

/// Starting values used when no `--guess` is given.
///
/// Only the default linear model has them; for any other model the empty
/// mapping makes binding report the first missing parameter.
pub fn default_guesses(model: &ModelFn) -> InitialGuesses {
    if model.name == "linear" {
        InitialGuesses::new().with("a", 1.2).with("b", 0.03)
    } else {
        InitialGuesses::new()
    }
}

pub fn labels_from_args(args: &LabelArgs, model: &ModelFn) -> Labels {
    Labels {
        title: args.title.clone().unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
        x_label: args.x_label.clone().unwrap_or_else(|| PLACEHOLDER_X_LABEL.to_string()),
        y_label: args.y_label.clone().unwrap_or_else(|| PLACEHOLDER_Y_LABEL.to_string()),
        formula: args.formula.clone().unwrap_or_else(|| model.formula.to_string()),
    }
}

pub fn style_from_args(args: &LabelArgs) -> Result<PlotStyle, AppError> {
    Ok(PlotStyle {
        points: StyleSpec::parse(&args.point_style)?,
        curve: StyleSpec::parse(&args.curve_style)?,
    })
}

pub fn fit_options_from_args(args: &FitArgs) -> FitOptions {
    FitOptions {
        max_iterations: args.max_iterations,
        ..FitOptions::default()
    }
}

pub fn output_config_from_args(args: &FitArgs) -> OutputConfig {
    OutputConfig {
        format: args.format,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        svg_path: args.output.clone(),
    }
}

/// The `tpfit models` listing: name, declared arguments, formula.
pub fn format_models(models: &[ModelFn]) -> String {
    let width = models.iter().map(|m| m.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for m in models {
        out.push_str(&format!(
            "{:<width$}  ({})  {}\n",
            m.name,
            m.args.join(", "),
            m.formula
        ));
    }
    out
}

/// Rewrite argv so `tpfit` defaults to `tpfit fit`.
///
/// Rules:
/// - `tpfit`                        -> `tpfit fit`
/// - `tpfit --model power ...`      -> `tpfit fit --model power ...`
/// - `tpfit --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "show" | "models");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn args(extra: &[&str]) -> FitArgs {
        let mut argv = vec!["tpfit", "fit"];
        argv.extend_from_slice(extra);
        match crate::cli::Cli::parse_from(argv).command {
            Command::Fit(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rewrite_defaults_to_fit() {
        assert_eq!(rewrite_args(strings(&["tpfit"])), strings(&["tpfit", "fit"]));
        assert_eq!(
            rewrite_args(strings(&["tpfit", "-m", "power"])),
            strings(&["tpfit", "fit", "-m", "power"])
        );
        assert_eq!(rewrite_args(strings(&["tpfit", "show"])), strings(&["tpfit", "show"]));
        assert_eq!(rewrite_args(strings(&["tpfit", "--help"])), strings(&["tpfit", "--help"]));
    }

    #[test]
    fn default_request_is_linear_with_lab_guesses() {
        // Styles given explicitly so TPFIT_* variables in the shell cannot interfere.
        let request = fit_request_from_args(&args(&["--point-style", "bo", "--curve-style", "r"])).unwrap();
        assert_eq!(request.model.name, "linear");
        assert_eq!(request.guesses.get("a"), Some(1.2));
        assert_eq!(request.guesses.get("b"), Some(0.03));
        assert_eq!(request.samples.len(), 10);
    }

    #[test]
    fn unset_labels_fall_back_to_placeholders_and_model_formula() {
        let label_args = LabelArgs {
            title: None,
            x_label: Some("t (s)".to_string()),
            y_label: None,
            formula: None,
            point_style: "bo".to_string(),
            curve_style: "r".to_string(),
        };
        let labels = labels_from_args(&label_args, &find_model("linear").unwrap());
        assert_eq!(labels.title, PLACEHOLDER_TITLE);
        assert_eq!(labels.x_label, "t (s)");
        assert_eq!(labels.y_label, PLACEHOLDER_Y_LABEL);
        assert_eq!(labels.formula, "y = a*x + b");
    }

    #[test]
    fn measured_arrays_take_precedence_over_synthetic() {
        let request = fit_request_from_args(&args(&["--x", "1,2,3", "--y", "2,4,6", "--dx", "0", "--dy", "0.1"])).unwrap();
        assert_eq!(request.samples.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(request.samples.dy, vec![0.1, 0.1, 0.1]);
    }

    #[test]
    fn bad_style_is_usage_error() {
        let err = fit_request_from_args(&args(&["--point-style", "zz"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn non_default_model_without_guesses_has_empty_mapping() {
        let model = find_model("power").unwrap();
        assert!(default_guesses(&model).is_empty());
    }

    #[test]
    fn models_listing_shows_args_and_formula() {
        let txt = format_models(&BUILTIN_MODELS[..1]);
        assert_eq!(txt, "linear  (x, a, b)  y = a*x + b\n");
    }
}
