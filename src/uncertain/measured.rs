//! A value carrying a first-order Gaussian uncertainty.
//!
//! `Measured` is a linear form: a nominal value plus one uncertainty component
//! per independent source variable it depends on. Arithmetic applies the
//! chain rule to every component, and the standard deviation is the quadrature
//! sum of the merged components. Keeping components per source (rather than a
//! single sigma) is what makes `a - a` exactly certain while two independent
//! measurements still add in quadrature.

use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;

static NEXT_SOURCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq)]
pub struct Measured {
    value: f64,
    /// `(source id, ∂self/∂source · σ_source)`, sorted by id, ids unique.
    components: Vec<(u64, f64)>,
}

impl Measured {
    /// A new independent quantity `value ± std_dev`.
    pub fn new(value: f64, std_dev: f64) -> Self {
        let id = NEXT_SOURCE.fetch_add(1, Ordering::Relaxed);
        Self {
            value,
            components: vec![(id, std_dev)],
        }
    }

    /// A quantity with no uncertainty.
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            components: Vec::new(),
        }
    }

    pub fn nominal(&self) -> f64 {
        self.value
    }

    pub fn std_dev(&self) -> f64 {
        match self.components.as_slice() {
            [] => 0.0,
            // Single source: return the stored sigma untouched (no sqrt of a square).
            [(_, c)] => c.abs(),
            many => many.iter().map(|(_, c)| c * c).sum::<f64>().sqrt(),
        }
    }

    /// Format as `value±std_dev`, each rounded to `digits` significant
    /// digits in exponential notation: `5.0e-01±3.5e-02`.
    pub fn to_sig_string(&self, digits: usize) -> String {
        let precision = digits.max(1) - 1;
        format!(
            "{}±{}",
            fmt_exp(self.value, precision),
            fmt_exp(self.std_dev(), precision)
        )
    }

    /// `f(self)` given `f(value)` and `f'(value)`.
    fn map(&self, value: f64, derivative: f64) -> Self {
        Self {
            value,
            components: self.components.iter().map(|&(id, c)| (id, derivative * c)).collect(),
        }
    }

    /// `f(a, b)` given `f(a, b)`, `∂f/∂a` and `∂f/∂b`.
    fn combine(a: &Self, da: f64, b: &Self, db: f64, value: f64) -> Self {
        let mut components = Vec::with_capacity(a.components.len() + b.components.len());
        let (mut i, mut j) = (0, 0);
        while i < a.components.len() || j < b.components.len() {
            match (a.components.get(i), b.components.get(j)) {
                (Some(&(ia, ca)), Some(&(ib, cb))) if ia == ib => {
                    components.push((ia, da * ca + db * cb));
                    i += 1;
                    j += 1;
                }
                (Some(&(ia, ca)), Some(&(ib, _))) if ia < ib => {
                    components.push((ia, da * ca));
                    i += 1;
                }
                (Some(&(ia, ca)), None) => {
                    components.push((ia, da * ca));
                    i += 1;
                }
                (_, Some(&(ib, cb))) => {
                    components.push((ib, db * cb));
                    j += 1;
                }
                (None, None) => unreachable!(),
            }
        }
        Self { value, components }
    }

    pub fn powi(&self, n: i32) -> Self {
        let v = self.value;
        self.map(v.powi(n), f64::from(n) * v.powi(n - 1))
    }

    pub fn powf(&self, n: f64) -> Self {
        let v = self.value;
        self.map(v.powf(n), n * v.powf(n - 1.0))
    }

    pub fn sqrt(&self) -> Self {
        let r = self.value.sqrt();
        self.map(r, 0.5 / r)
    }

    pub fn exp(&self) -> Self {
        let e = self.value.exp();
        self.map(e, e)
    }

    pub fn ln(&self) -> Self {
        self.map(self.value.ln(), 1.0 / self.value)
    }

    pub fn sin(&self) -> Self {
        self.map(self.value.sin(), self.value.cos())
    }

    pub fn cos(&self) -> Self {
        self.map(self.value.cos(), -self.value.sin())
    }
}

/// Exponential notation with `precision` mantissa decimals and a signed,
/// two-digit exponent (`2.87e-01`, `1.50e+03`). Non-finite values print as
/// `nan` / `inf` / `-inf`.
pub fn fmt_exp(v: f64, precision: usize) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let raw = format!("{v:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

impl std::fmt::Display for Measured {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `{:.N}` selects N significant digits.
        write!(f, "{}", self.to_sig_string(f.precision().unwrap_or(2)))
    }
}

impl Serialize for Measured {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Measured", 2)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("std_dev", &self.std_dev())?;
        s.end()
    }
}

impl Neg for &Measured {
    type Output = Measured;
    fn neg(self) -> Measured {
        self.map(-self.value, -1.0)
    }
}

impl Neg for Measured {
    type Output = Measured;
    fn neg(self) -> Measured {
        -&self
    }
}

fn add(a: &Measured, b: &Measured) -> Measured {
    Measured::combine(a, 1.0, b, 1.0, a.value + b.value)
}

fn sub(a: &Measured, b: &Measured) -> Measured {
    Measured::combine(a, 1.0, b, -1.0, a.value - b.value)
}

fn mul(a: &Measured, b: &Measured) -> Measured {
    Measured::combine(a, b.value, b, a.value, a.value * b.value)
}

fn div(a: &Measured, b: &Measured) -> Measured {
    let q = a.value / b.value;
    Measured::combine(a, 1.0 / b.value, b, -q / b.value, q)
}

macro_rules! impl_binary {
    ($trait:ident, $method:ident, $f:ident) => {
        impl $trait<&Measured> for &Measured {
            type Output = Measured;
            fn $method(self, rhs: &Measured) -> Measured {
                $f(self, rhs)
            }
        }
        impl $trait<Measured> for Measured {
            type Output = Measured;
            fn $method(self, rhs: Measured) -> Measured {
                $f(&self, &rhs)
            }
        }
        impl $trait<&Measured> for Measured {
            type Output = Measured;
            fn $method(self, rhs: &Measured) -> Measured {
                $f(&self, rhs)
            }
        }
        impl $trait<Measured> for &Measured {
            type Output = Measured;
            fn $method(self, rhs: Measured) -> Measured {
                $f(self, &rhs)
            }
        }
        impl $trait<f64> for Measured {
            type Output = Measured;
            fn $method(self, rhs: f64) -> Measured {
                $f(&self, &Measured::exact(rhs))
            }
        }
        impl $trait<f64> for &Measured {
            type Output = Measured;
            fn $method(self, rhs: f64) -> Measured {
                $f(self, &Measured::exact(rhs))
            }
        }
        impl $trait<Measured> for f64 {
            type Output = Measured;
            fn $method(self, rhs: Measured) -> Measured {
                $f(&Measured::exact(self), &rhs)
            }
        }
        impl $trait<&Measured> for f64 {
            type Output = Measured;
            fn $method(self, rhs: &Measured) -> Measured {
                $f(&Measured::exact(self), rhs)
            }
        }
    };
}

impl_binary!(Add, add, add);
impl_binary!(Sub, sub, sub);
impl_binary!(Mul, mul, mul);
impl_binary!(Div, div, div);
