use crate::CxError;

/// Absolute/relative tolerance pair used for float comparisons (symmetry checks of
/// interaction matrices, mostly).
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CxError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CxError::NonFinite { what, value: v })
    }
}

/// Reject anything but a strictly positive, finite value.
pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, CxError> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(CxError::InvalidArg {
            what: format!("{what} must be positive and finite, got {v}"),
        })
    }
}

/// Check every entry of a slice, reporting the first non-finite one.
pub fn ensure_all_finite(values: &[f64], what: &'static str) -> Result<(), CxError> {
    for &v in values {
        ensure_finite(v, what)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_nan() {
        assert_eq!(ensure_positive(1e-12, "tol").unwrap(), 1e-12);
        assert!(ensure_positive(0.0, "tol").is_err());
        assert!(ensure_positive(f64::NAN, "tol").is_err());
        let msg = ensure_positive(-1.0, "tol").unwrap_err().to_string();
        assert!(msg.contains("tol must be positive"));
    }

    #[test]
    fn ensure_all_finite_reports_infinity() {
        assert!(ensure_all_finite(&[0.1, 0.2], "phi").is_ok());
        let err = ensure_all_finite(&[0.1, f64::INFINITY], "phi").unwrap_err();
        assert!(matches!(err, CxError::NonFinite { what: "phi", .. }));
    }
}
