// src/settings.rs

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};
use crate::fixed::{Rounding, Wad};

/// Basis points in `1.0`.
pub const BASIS_POINTS: u64 = 10_000;

/// Solver and rounding configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Largest accepted `|x(t) - target|` when inverting a Bezier segment.
    /// Default: 1e-9
    pub tolerance: Wad,

    /// Iteration budget for Newton-Raphson, and again for the bisection
    /// fallback.
    /// Default: 64
    pub max_iterations: u32,

    /// Growth per edition for Exponential curves whose base price is zero.
    /// Default: 500 (5%)
    pub default_growth_bps: u64,

    /// Conversion of fixed-point prices to smallest units.
    /// Default: Floor
    pub rounding: Rounding,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            tolerance: Wad::from_raw(1_000_000_000),
            max_iterations: 64,
            default_growth_bps: 500,
            rounding: Rounding::Floor,
        }
    }
}

impl PricingSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: PricingSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tolerance <= Wad::ZERO {
            return Err(CurveError::InvalidSettings(
                "tolerance must be greater than zero".to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(CurveError::InvalidSettings(
                "max_iterations must be greater than zero".to_string(),
            ));
        }

        if self.default_growth_bps == 0 {
            return Err(CurveError::InvalidSettings(
                "default_growth_bps must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PricingSettings::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let settings = PricingSettings::from_json(r#"{"rounding":"half_up"}"#).unwrap();
        assert_eq!(settings.rounding, Rounding::HalfUp);
        assert_eq!(settings.max_iterations, 64);
    }

    #[test]
    fn test_from_json_rejects_zero_iterations() {
        let err = PricingSettings::from_json(r#"{"max_iterations":0}"#).unwrap_err();
        assert!(matches!(err, CurveError::InvalidSettings(_)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = PricingSettings::from_json("not json").unwrap_err();
        assert!(matches!(err, CurveError::Serialization(_)));
    }

    #[test]
    fn test_rejects_zero_tolerance() {
        let settings = PricingSettings {
            tolerance: Wad::ZERO,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
