//! Numeric tolerance for float fields
//!
//! Catalogs store single-precision floats; the same quantity computed along
//! two code paths can differ in the last bits. Float fields therefore match
//! when
//!
//! ```text
//! |a - b| <= atol + rtol * max(|a|, |b|)
//! ```
//!
//! evaluated in f64. Integer fields always require exact equality.

use sage_core::{FieldValue, Error, Result};
use serde::Serialize;

/// Default relative tolerance: a few f32 ulps
pub const DEFAULT_RTOL: f64 = 1e-6;

/// Default absolute tolerance
pub const DEFAULT_ATOL: f64 = 0.0;

/// Relative plus absolute tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerance {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl Tolerance {
    /// Build a tolerance; both parts must be finite and non-negative
    pub fn new(rtol: f64, atol: f64) -> Result<Self> {
        for (name, v) in [("rtol", rtol), ("atol", atol)] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::config(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, v
                )));
            }
        }
        Ok(Tolerance { rtol, atol })
    }

    /// Bitwise-equal floats only (NaNs still match NaNs)
    pub const fn exact() -> Self {
        Tolerance {
            rtol: 0.0,
            atol: 0.0,
        }
    }

    /// Purely relative tolerance
    pub const fn relative(rtol: f64) -> Self {
        Tolerance { rtol, atol: 0.0 }
    }

    /// Whether two floats match.
    ///
    /// Two NaNs match; infinities match only an identical infinity.
    pub fn floats_match(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        if a.is_infinite() || b.is_infinite() {
            return false;
        }
        (a - b).abs() <= self.atol + self.rtol * a.abs().max(b.abs())
    }

    /// Whether two field values match: exact for integers, tolerant for floats
    pub fn values_match(&self, a: &FieldValue, b: &FieldValue) -> bool {
        match (a, b) {
            (FieldValue::I32(x), FieldValue::I32(y)) => x == y,
            (FieldValue::I64(x), FieldValue::I64(y)) => x == y,
            (FieldValue::F32(x), FieldValue::F32(y)) => self.floats_match(*x as f64, *y as f64),
            (FieldValue::Vec3(x), FieldValue::Vec3(y)) => x
                .iter()
                .zip(y.iter())
                .all(|(p, q)| self.floats_match(*p as f64, *q as f64)),
            _ => false,
        }
    }
}
