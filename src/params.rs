//! Parameter metadata for tunable pattern detectors
//!
//! Single-bar rules are driven by shape thresholds (body share of the range, shadow
//! multiples of the body). Their defaults are the thresholds the detectors ship with; this
//! module describes them so callers can:
//! - Sweep thresholds in a grid search
//! - Document what each knob does
//! - Rebuild a detector from a loosely-typed map (e.g. a JSON settings blob)
//!
//! # Example
//!
//! ```rust
//! use candlewise::params::{ParamMeta, ParamType, ParameterizedDetector};
//! use candlewise::prelude::*;
//!
//! for param in HammerDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{PatternError, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Share of the candle range, 0.0..=1.0
  Ratio,
  /// Positive multiple of the candle body (e.g. "shadow at least 2x the body")
  Multiple,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "max_body_ratio")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn multiple(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Multiple, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    if step <= 0.0 {
      return values;
    }
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    if !value.is_finite() {
      return Err(PatternError::InvalidValue("Parameter must be finite"));
    }
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Multiple => {
        if value < 0.0 {
          return Err(PatternError::InvalidValue("Multiple must be non-negative"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors whose thresholds can be tuned
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values. Unknown keys are ignored.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Returns the rule name (e.g. "HAMMER", "MARUBOZU")
  fn detector_name() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a non-negative body multiple from params with default fallback
pub fn get_multiple(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !value.is_finite() {
    return Err(PatternError::InvalidValue("Multiple cannot be NaN or infinite"));
  }
  if value < 0.0 {
    return Err(PatternError::OutOfRange { field: "Multiple", value, min: 0.0, max: f64::MAX });
  }
  Ok(value)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_meta_ratio() {
    let meta = ParamMeta::ratio("max_body_ratio", 0.1, (0.05, 0.2, 0.05), "Doji body share");

    assert_eq!(meta.name, "max_body_ratio");
    assert_eq!(meta.param_type, ParamType::Ratio);
    assert_eq!(meta.default, 0.1);
  }

  #[test]
  fn test_param_meta_multiple() {
    let meta = ParamMeta::multiple("shadow_multiple", 2.0, (1.5, 3.0, 0.5), "Shadow vs body");

    assert_eq!(meta.param_type, ParamType::Multiple);
    assert_eq!(meta.default, 2.0);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.2), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 3);
    assert!((grid[0] - 0.3).abs() < f64::EPSILON);
    assert!((grid[1] - 0.5).abs() < f64::EPSILON);
    assert!((grid[2] - 0.7).abs() < f64::EPSILON);
  }

  #[test]
  fn test_generate_grid_rejects_zero_step() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.0), "Test");
    assert!(meta.generate_grid().is_empty());
  }

  #[test]
  fn test_validate_ratio() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.1), "Test");

    assert!(meta.validate(0.5).is_ok());
    assert!(meta.validate(0.3).is_ok());
    assert!(meta.validate(0.7).is_ok());
    assert!(meta.validate(0.2).is_err());
    assert!(meta.validate(0.8).is_err());
    assert!(meta.validate(f64::NAN).is_err());
  }

  #[test]
  fn test_validate_multiple() {
    let meta = ParamMeta::multiple("test", 2.0, (1.0, 4.0, 0.5), "Test");

    assert!(meta.validate(2.0).is_ok());
    assert!(meta.validate(4.0).is_ok());
    assert!(meta.validate(0.5).is_err());
    assert!(meta.validate(f64::INFINITY).is_err());
  }

  #[test]
  fn test_get_ratio_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 0.8);

    assert!((get_ratio(&params, "key1", 0.5).unwrap().get() - 0.8).abs() < f64::EPSILON);
    assert!((get_ratio(&params, "key2", 0.5).unwrap().get() - 0.5).abs() < f64::EPSILON);

    params.insert("key3", 1.5);
    assert!(get_ratio(&params, "key3", 0.5).is_err());
  }

  #[test]
  fn test_get_multiple_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 3.0);

    assert_eq!(get_multiple(&params, "key1", 2.0).unwrap(), 3.0);
    assert_eq!(get_multiple(&params, "key2", 2.0).unwrap(), 2.0);

    params.insert("key3", -1.0);
    assert!(get_multiple(&params, "key3", 2.0).is_err());
  }
}
