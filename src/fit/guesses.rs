//! Binding a name→value guess mapping onto the model's parameter order.

use crate::domain::InitialGuesses;
use crate::error::AppError;

/// Build the initial parameter vector in `names` order.
///
/// Every name must have a guess and every guess must name a parameter. A
/// missing key is never filled with zero: the mismatch is reported before any
/// fit work happens.
pub fn bind_initial_guesses(names: &[String], guesses: &InitialGuesses) -> Result<Vec<f64>, AppError> {
    if let Some(extra) = guesses.names().find(|g| !names.iter().any(|n| n == g)) {
        return Err(AppError::usage(format!(
            "Initial guess '{extra}' does not match any model parameter ({}).",
            names.join(", ")
        )));
    }

    names
        .iter()
        .map(|name| {
            let value = guesses
                .get(name)
                .ok_or_else(|| AppError::usage(format!("No initial guess for parameter '{name}'.")))?;
            if !value.is_finite() {
                return Err(AppError::usage(format!("Initial guess for '{name}' is not finite.")));
            }
            Ok(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn binds_in_declared_order() {
        // BTreeMap order (a, b, c) differs from declared order (c, a, b).
        let g = InitialGuesses::new().with("a", 1.0).with("b", 2.0).with("c", 3.0);
        let p0 = bind_initial_guesses(&names(&["c", "a", "b"]), &g).unwrap();
        assert_eq!(p0, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_key_is_a_lookup_error() {
        let g = InitialGuesses::new().with("a", 1.2);
        let err = bind_initial_guesses(&names(&["a", "b"]), &g).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.message().contains("'b'"));
    }

    #[test]
    fn extra_key_is_rejected() {
        let g = InitialGuesses::new().with("a", 1.2).with("b", 0.03).with("c", 9.0);
        let err = bind_initial_guesses(&names(&["a", "b"]), &g).unwrap_err();
        assert!(err.message().contains("'c'"));
    }

    #[test]
    fn non_finite_guess_is_rejected() {
        let g = InitialGuesses::new().with("a", f64::INFINITY);
        assert!(bind_initial_guesses(&names(&["a"]), &g).is_err());
    }
}
