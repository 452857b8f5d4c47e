use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite {
            what: what.to_string(),
            value: v,
        })
    }
}

/// Arithmetic mean, summed in slice order. `None` for an empty slice.
pub fn mean(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    let sum: Real = values.iter().sum();
    Some(sum / values.len() as Real)
}

/// Fixed-point rendering used for summary files (`{:.3}` by default).
///
/// Values that round to zero are printed without a sign so `-0.0001`
/// does not show up as `-0.000`.
pub fn format_fixed(v: Real, precision: usize) -> String {
    let half_ulp = 0.5 * 10f64.powi(-(precision as i32));
    let v = if v.abs() < half_ulp { 0.0 } else { v };
    format!("{:.*}", precision, v)
}

/// Natural rendering for identifying parameters: integral values print
/// without a decimal point (`2`), everything else uses the shortest
/// round-trip form (`0.3`).
pub fn format_param(v: Real) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
