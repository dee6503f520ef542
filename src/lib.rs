// src/lib.rs

//! Bonding curve pricing for limited NFT editions.
//!
//! ```
//! use editioncurve::{price_at, validate, BezierCurveData, BondingCurveConfig};
//!
//! let linear = BondingCurveConfig::linear(100, 10, 5);
//! assert_eq!(price_at(&linear, 4)?, 140);
//!
//! let s_curve = BondingCurveConfig::bezier(BezierCurveData::s_curve(1, 10), 101);
//! assert!(validate(&s_curve).is_valid());
//! assert_eq!(price_at(&s_curve, 100)?, 10);
//! # Ok::<(), editioncurve::CurveError>(())
//! ```

// Core curve math (no wasm, pure Rust).
mod bezier;
mod curve;
mod error;
mod fixed;
mod path;
mod price;
mod quote;
mod sample;
mod settings;
mod validate;

mod wasm;

pub use crate::bezier::{
    derivative_x_at, point_at, solve_t_for_x, FixedPoint, FixedSegment, DERIVATIVE_EPSILON,
};
pub use crate::curve::{BezierCurveData, BezierSegment, BondingCurveConfig, ControlPoint, CurveKind};
pub use crate::error::{CurveError, Result};
pub use crate::fixed::{Rounding, Wad, WAD};
pub use crate::path::{CurvePath, Handle};
pub use crate::price::{price_at, price_at_with, PriceCalculator};
pub use crate::quote::{
    cumulative_cost, cumulative_cost_with, quote_range, quote_range_with, total_raise, RangeQuote,
};
pub use crate::sample::{
    sample, sample_calculator, sample_calculator_parallel, sample_parallel, sample_supplies,
    sample_with, CurvePoint,
};
pub use crate::settings::{PricingSettings, BASIS_POINTS};
pub use crate::validate::{
    ensure_valid, validate, validate_bezier, validate_with, ValidationReport, ValidationResult,
    Violation,
};
pub use crate::wasm::{default_s_curve, WasmCurve};
