//! Lenient numeric coercion for template fields.
//!
//! Alert sources encode sample values inconsistently: integers, floats,
//! decimal strings, or `null` when a query returned nothing. Templates only
//! ever need a float, so everything is coerced and nothing here can fail.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric-like value as it appears in an alert's `values` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    /// A JSON integer.
    Integer(i64),
    /// A JSON floating-point number (also integers outside the `i64` range).
    Float(f64),
    /// A decimal number carried as text, e.g. `"3.5"`.
    Text(String),
    /// Any other JSON shape (`null`, booleans, arrays, objects).
    Other(serde_json::Value),
}

impl NumericValue {
    /// Coerces the value to a float.
    ///
    /// Text that does not parse as a decimal and every non-numeric shape
    /// map to `0.0`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Integer(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Self::Other(_) => 0.0,
        }
    }
}

impl Default for NumericValue {
    fn default() -> Self {
        Self::Other(serde_json::Value::Null)
    }
}

impl From<i64> for NumericValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for NumericValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for NumericValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

/// Divides a numeric-like value by `denominator`.
///
/// Returns `0.0` when the denominator is zero instead of producing an
/// infinity or NaN.
#[must_use]
pub fn safe_divide(numerator: &NumericValue, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator.as_f64() / denominator
}
