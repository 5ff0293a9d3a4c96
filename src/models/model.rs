//! Model functions and their declared argument lists.
//!
//! A model is a plain `fn(x, params) -> y` plus the ordered list of argument
//! names it was written against. The first declared argument is the
//! independent variable; the rest name the fit parameters, in the order the
//! `params` slice is indexed.

use crate::error::AppError;

/// Signature every model evaluator implements.
pub type EvalFn = fn(f64, &[f64]) -> f64;

/// A parametric model `y = f(x; p1, ..., pn)`.
#[derive(Debug, Clone, Copy)]
pub struct ModelFn {
    pub name: &'static str,
    /// Declared arguments, independent variable first (e.g. `["x", "a", "b"]`).
    pub args: &'static [&'static str],
    /// Human-readable formula for annotations.
    pub formula: &'static str,
    eval: EvalFn,
}

impl ModelFn {
    pub const fn new(
        name: &'static str,
        args: &'static [&'static str],
        formula: &'static str,
        eval: EvalFn,
    ) -> Self {
        Self {
            name,
            args,
            formula,
            eval,
        }
    }

    /// Ordered fit-parameter names: the declared arguments minus the first.
    ///
    /// Fails when the model declares nothing beyond the independent variable,
    /// since there would be nothing to fit.
    pub fn parameter_names(&self) -> Result<Vec<String>, AppError> {
        if self.args.len() < 2 {
            return Err(AppError::usage(format!(
                "Model '{}' declares {} argument(s); need the independent variable plus at least one parameter.",
                self.name,
                self.args.len()
            )));
        }
        Ok(self.args[1..].iter().map(|s| s.to_string()).collect())
    }

    /// Number of fit parameters (zero for a degenerate declaration).
    pub fn arity(&self) -> usize {
        self.args.len().saturating_sub(1)
    }

    /// Evaluate the model. `params` must be in `parameter_names()` order.
    pub fn eval(&self, x: f64, params: &[f64]) -> f64 {
        debug_assert_eq!(params.len(), self.arity(), "parameter count mismatch for {}", self.name);
        (self.eval)(x, params)
    }
}

fn linear(x: f64, p: &[f64]) -> f64 {
    p[0] * x + p[1]
}

fn proportional(x: f64, p: &[f64]) -> f64 {
    p[0] * x
}

fn quadratic(x: f64, p: &[f64]) -> f64 {
    p[0] * x * x + p[1] * x + p[2]
}

fn exponential(x: f64, p: &[f64]) -> f64 {
    p[0] * (p[1] * x).exp()
}

fn exp_decay(x: f64, p: &[f64]) -> f64 {
    p[0] * (-x / p[1]).exp() + p[2]
}

fn power(x: f64, p: &[f64]) -> f64 {
    p[0] * x.powf(p[1])
}

fn sine(x: f64, p: &[f64]) -> f64 {
    p[0] * (p[1] * x + p[2]).sin()
}

/// Models available from the command line.
pub const BUILTIN_MODELS: [ModelFn; 7] = [
    ModelFn::new("linear", &["x", "a", "b"], "y = a*x + b", linear),
    ModelFn::new("proportional", &["x", "a"], "y = a*x", proportional),
    ModelFn::new("quadratic", &["x", "a", "b", "c"], "y = a*x^2 + b*x + c", quadratic),
    ModelFn::new("exponential", &["x", "a", "k"], "y = a*exp(k*x)", exponential),
    ModelFn::new("exp-decay", &["x", "a", "tau", "c"], "y = a*exp(-x/tau) + c", exp_decay),
    ModelFn::new("power", &["x", "a", "n"], "y = a*x^n", power),
    ModelFn::new("sine", &["x", "a", "w", "phi"], "y = a*sin(w*x + phi)", sine),
];

/// Look up a built-in model by name.
pub fn find_model(name: &str) -> Result<ModelFn, AppError> {
    BUILTIN_MODELS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
        .copied()
        .ok_or_else(|| {
            let known: Vec<&str> = BUILTIN_MODELS.iter().map(|m| m.name).collect();
            AppError::usage(format!("Unknown model '{name}'. Known models: {}.", known.join(", ")))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_names_skip_independent_variable() {
        let m = find_model("linear").unwrap();
        assert_eq!(m.parameter_names().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn parameter_names_fail_without_parameters() {
        fn constant(_x: f64, _p: &[f64]) -> f64 {
            1.0
        }
        let m = ModelFn::new("bare", &["x"], "y = 1", constant);
        assert!(m.parameter_names().is_err());
        assert_eq!(m.arity(), 0);
    }

    #[test]
    fn builtins_evaluate_finite() {
        for m in BUILTIN_MODELS {
            let params = vec![1.0; m.arity()];
            let y = m.eval(2.0, &params);
            assert!(y.is_finite(), "{} gave {y}", m.name);
        }
    }

    #[test]
    fn unknown_model_lists_known_ones() {
        let err = find_model("cubic").unwrap_err();
        assert!(err.message().contains("linear"));
    }
}
