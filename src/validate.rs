// src/validate.rs

//! Checks run before a configuration is priced or deployed. Nothing is repaired.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bezier::FixedSegment;
use crate::curve::{BezierCurveData, BondingCurveConfig, CurveKind};
use crate::error::{CurveError, Result};
use crate::fixed::Wad;
use crate::price::PriceCalculator;
use crate::settings::PricingSettings;

/// One broken rule. Segment indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    ZeroMaxSupply,
    MissingBezierData,
    UnexpectedBezierData,
    EmptySegments,
    /// `point` is 0..=3 for `p0..p3`.
    PointOutOfRange { segment: usize, point: usize },
    DoesNotStartAtZero,
    DoesNotEndAtOne,
    /// `segments[segment].p3 != segments[segment + 1].p0`.
    Discontinuous { segment: usize },
    /// x decreases somewhere inside the segment.
    NonMonotonicX { segment: usize },
    /// Segment has zero width in x.
    DegenerateSegment { segment: usize },
    PriceRangeInverted,
    /// The last edition's price does not fit in `u64`.
    PriceOverflow,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ZeroMaxSupply => write!(f, "max supply must be positive"),
            Violation::MissingBezierData => write!(f, "bezier curve has no segment data"),
            Violation::UnexpectedBezierData => {
                write!(f, "segment data given for a non-bezier curve")
            }
            Violation::EmptySegments => write!(f, "curve has no segments"),
            Violation::PointOutOfRange { segment, point } => {
                write!(f, "segment {} p{} lies outside [0,1]", segment, point)
            }
            Violation::DoesNotStartAtZero => write!(f, "first segment does not start at x = 0"),
            Violation::DoesNotEndAtOne => write!(f, "last segment does not end at x = 1"),
            Violation::Discontinuous { segment } => write!(
                f,
                "segments {} and {} do not share an endpoint",
                segment,
                segment + 1
            ),
            Violation::NonMonotonicX { segment } => {
                write!(f, "segment {} is not a function of x", segment)
            }
            Violation::DegenerateSegment { segment } => {
                write!(f, "segment {} has zero width", segment)
            }
            Violation::PriceRangeInverted => write!(f, "max price must exceed min price"),
            Violation::PriceOverflow => write!(f, "price of the last edition overflows"),
        }
    }
}

/// Every rule a configuration broke, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationReport),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(report) => &report.violations,
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(report) => Err(CurveError::Invalid(report)),
        }
    }
}

/// Check every invariant that applies to `config` under default settings.
pub fn validate(config: &BondingCurveConfig) -> ValidationResult {
    validate_with(config, &PricingSettings::default())
}

/// Analytic kinds need a positive `max_supply` and a last edition whose
/// price fits; prices and increments are unsigned, so their non-negativity
/// holds by construction. Analytic prices never decrease, so the last
/// edition is the most expensive one.
pub fn validate_with(config: &BondingCurveConfig, settings: &PricingSettings) -> ValidationResult {
    let mut violations = Vec::new();

    match config.max_supply().checked_sub(1) {
        None => violations.push(Violation::ZeroMaxSupply),
        Some(last) if config.kind().is_analytic() => {
            let priced = PriceCalculator::build(config, *settings)
                .and_then(|calculator| calculator.price_at(last as u64));
            if let Err(CurveError::Overflow) = priced {
                violations.push(Violation::PriceOverflow);
            }
        }
        Some(_) => {}
    }

    match (config.kind(), config.bezier_data()) {
        (CurveKind::Bezier, Some(data)) => violations.extend(validate_bezier(data)),
        (CurveKind::Bezier, None) => violations.push(Violation::MissingBezierData),
        (_, Some(_)) => violations.push(Violation::UnexpectedBezierData),
        (_, None) => {}
    }

    if violations.is_empty() {
        ValidationResult::Valid
    } else {
        warn!(kind = %config.kind(), count = violations.len(), "curve configuration rejected");
        ValidationResult::Invalid(ValidationReport { violations })
    }
}

/// [`validate`] as a `Result`, for callers that refuse invalid curves.
pub fn ensure_valid(config: &BondingCurveConfig) -> Result<()> {
    validate(config).into_result()
}

/// Invariants of the piecewise Bezier description alone.
pub fn validate_bezier(data: &BezierCurveData) -> Vec<Violation> {
    let mut violations = Vec::new();

    if data.max_price <= data.min_price {
        violations.push(Violation::PriceRangeInverted);
    }

    if data.segments.is_empty() {
        violations.push(Violation::EmptySegments);
        return violations;
    }

    for (i, segment) in data.segments.iter().enumerate() {
        for (j, point) in segment.points().iter().enumerate() {
            if !point.is_in_unit_square() {
                violations.push(Violation::PointOutOfRange {
                    segment: i,
                    point: j,
                });
            }
        }
    }

    // Comparisons below run on quantized coordinates, never on raw floats.
    let fixed: Vec<Option<FixedSegment>> =
        data.segments.iter().map(FixedSegment::from_segment).collect();

    if let Some(Some(first)) = fixed.first() {
        if first.p0.x != Wad::ZERO {
            violations.push(Violation::DoesNotStartAtZero);
        }
    }
    if let Some(Some(last)) = fixed.last() {
        if last.p3.x != Wad::ONE {
            violations.push(Violation::DoesNotEndAtOne);
        }
    }

    for (i, pair) in fixed.windows(2).enumerate() {
        if let (Some(left), Some(right)) = (&pair[0], &pair[1]) {
            if left.p3 != right.p0 {
                violations.push(Violation::Discontinuous { segment: i });
            }
        }
    }

    for (i, segment) in fixed.iter().enumerate() {
        if let Some(segment) = segment {
            if let Some(violation) = check_x_shape(i, segment) {
                violations.push(violation);
            }
        }
    }

    violations
}

/// `x'(t)` is a Bernstein quadratic with coefficients `a, b, c` (the handle
/// deltas). It is non-negative on `[0, 1]` iff `a >= 0`, `c >= 0` and either
/// `b >= 0` or `b² <= ac`.
fn check_x_shape(index: usize, segment: &FixedSegment) -> Option<Violation> {
    let x0 = segment.p0.x.raw();
    let x1 = segment.p1.x.raw();
    let x2 = segment.p2.x.raw();
    let x3 = segment.p3.x.raw();

    if x3 == x0 {
        return Some(Violation::DegenerateSegment { segment: index });
    }

    let a = x1 - x0;
    let b = x2 - x1;
    let c = x3 - x2;

    let monotonic = a >= 0
        && c >= 0
        && (b >= 0 || b.saturating_mul(b) <= a.saturating_mul(c));

    if monotonic {
        None
    } else {
        Some(Violation::NonMonotonicX { segment: index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{BezierSegment, ControlPoint};

    fn pt(x: f64, y: f64) -> ControlPoint {
        ControlPoint::new(x, y)
    }

    fn two_segments(join_left: ControlPoint, join_right: ControlPoint) -> BezierCurveData {
        BezierCurveData::new(
            vec![
                BezierSegment::new(pt(0.0, 0.0), pt(0.2, 0.1), pt(0.3, 0.4), join_left),
                BezierSegment::new(join_right, pt(0.7, 0.6), pt(0.8, 0.9), pt(1.0, 1.0)),
            ],
            0,
            1_000,
        )
    }

    #[test]
    fn test_analytic_kinds_only_check_supply() {
        assert!(validate(&BondingCurveConfig::linear(0, 0, 1)).is_valid());
        assert!(validate(&BondingCurveConfig::exponential(100, 5, 10)).is_valid());

        let result = validate(&BondingCurveConfig::logarithmic(100, 50, 0));
        assert_eq!(result.violations(), &[Violation::ZeroMaxSupply]);
    }

    #[test]
    fn test_overflowing_analytic_curves_are_rejected() {
        for config in [
            BondingCurveConfig::linear(u64::MAX, 1, 5),
            BondingCurveConfig::exponential(1, 1_000_000, 1_000),
            BondingCurveConfig::logarithmic(u64::MAX, 1, 3),
        ] {
            assert_eq!(validate(&config).violations(), &[Violation::PriceOverflow]);
        }

        assert!(validate(&BondingCurveConfig::linear(u64::MAX - 4, 1, 5)).is_valid());
        assert!(validate(&BondingCurveConfig::linear(u64::MAX, 1, 1)).is_valid());
    }

    #[test]
    fn test_overflow_depends_on_rounding() {
        // 50 × ln 2 = 34.66: floor fits exactly, ceil is one past u64::MAX.
        let config = BondingCurveConfig::logarithmic(u64::MAX - 34, 50, 2);
        assert!(validate(&config).is_valid());

        let ceil = PricingSettings {
            rounding: crate::fixed::Rounding::Ceil,
            ..Default::default()
        };
        assert_eq!(
            validate_with(&config, &ceil).violations(),
            &[Violation::PriceOverflow]
        );
    }

    #[test]
    fn test_default_s_curve_is_valid() {
        let config = BondingCurveConfig::bezier(BezierCurveData::s_curve(1, 10), 101);
        assert_eq!(validate(&config), ValidationResult::Valid);
        assert!(ensure_valid(&config).is_ok());
    }

    #[test]
    fn test_continuous_two_segment_curve_is_valid() {
        let data = two_segments(pt(0.5, 0.5), pt(0.5, 0.5));
        assert!(validate_bezier(&data).is_empty());
    }

    #[test]
    fn test_discontinuity_is_reported() {
        let data = two_segments(pt(0.5, 0.5), pt(0.5, 0.6));
        let result = validate(&BondingCurveConfig::bezier(data, 100));
        assert_eq!(result.violations(), &[Violation::Discontinuous { segment: 0 }]);
    }

    #[test]
    fn test_domain_must_span_zero_to_one() {
        let data = BezierCurveData::new(
            vec![BezierSegment::straight(pt(0.1, 0.0), pt(0.9, 1.0))],
            0,
            10,
        );
        let violations = validate_bezier(&data);
        assert!(violations.contains(&Violation::DoesNotStartAtZero));
        assert!(violations.contains(&Violation::DoesNotEndAtOne));
    }

    #[test]
    fn test_out_of_range_and_nan_points() {
        let data = BezierCurveData::new(
            vec![BezierSegment::new(
                pt(0.0, 0.0),
                pt(0.3, 1.2),
                pt(f64::NAN, 0.5),
                pt(1.0, 1.0),
            )],
            0,
            10,
        );
        let violations = validate_bezier(&data);
        assert!(violations.contains(&Violation::PointOutOfRange { segment: 0, point: 1 }));
        assert!(violations.contains(&Violation::PointOutOfRange { segment: 0, point: 2 }));
    }

    #[test]
    fn test_non_monotonic_segment_is_rejected() {
        // The leading handle pulls x backwards past the start.
        let data = BezierCurveData::new(
            vec![
                BezierSegment::straight(pt(0.0, 0.0), pt(0.5, 0.5)),
                BezierSegment::new(pt(0.5, 0.5), pt(0.2, 0.6), pt(0.9, 0.9), pt(1.0, 1.0)),
            ],
            0,
            10,
        );
        assert_eq!(
            validate_bezier(&data),
            vec![Violation::NonMonotonicX { segment: 1 }]
        );
    }

    #[test]
    fn test_crossed_handles_inside_unit_span_are_monotonic() {
        let data = BezierCurveData::new(
            vec![BezierSegment::new(pt(0.0, 0.0), pt(1.0, 0.2), pt(0.0, 0.8), pt(1.0, 1.0))],
            0,
            10,
        );
        assert!(validate_bezier(&data).is_empty());
    }

    #[test]
    fn test_degenerate_segment_is_rejected() {
        let data = BezierCurveData::new(
            vec![
                BezierSegment::straight(pt(0.0, 0.0), pt(0.5, 0.2)),
                BezierSegment::straight(pt(0.5, 0.2), pt(0.5, 0.8)),
                BezierSegment::straight(pt(0.5, 0.8), pt(1.0, 1.0)),
            ],
            0,
            10,
        );
        assert_eq!(
            validate_bezier(&data),
            vec![Violation::DegenerateSegment { segment: 1 }]
        );
    }

    #[test]
    fn test_price_range_and_empty_segments() {
        let data = BezierCurveData::new(Vec::new(), 10, 10);
        assert_eq!(
            validate_bezier(&data),
            vec![Violation::PriceRangeInverted, Violation::EmptySegments]
        );
    }

    #[test]
    fn test_bezier_data_must_match_kind() {
        let json = r#"{"kind":"bezier","basePrice":1,"priceIncrement":0,"maxSupply":10}"#;
        let config = BondingCurveConfig::from_json(json).unwrap();
        assert_eq!(validate(&config).violations(), &[Violation::MissingBezierData]);

        let json = r#"{"kind":"linear","basePrice":1,"priceIncrement":0,"maxSupply":10,
            "bezier":{"segments":[],"minPrice":0,"maxPrice":1}}"#;
        let config = BondingCurveConfig::from_json(json).unwrap();
        assert_eq!(
            validate(&config).violations(),
            &[Violation::UnexpectedBezierData]
        );
    }

    #[test]
    fn test_invalid_result_converts_to_error() {
        let err = ensure_valid(&BondingCurveConfig::linear(1, 1, 0)).unwrap_err();
        match err {
            CurveError::Invalid(report) => assert!(report.contains(&Violation::ZeroMaxSupply)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_report_display_joins_reasons() {
        let report = ValidationReport {
            violations: vec![Violation::ZeroMaxSupply, Violation::EmptySegments],
        };
        assert_eq!(
            report.to_string(),
            "max supply must be positive; curve has no segments"
        );
    }
}
