// src/curve.rs

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};

/// How price grows with minted supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// price = base_price + supply × price_increment
    Linear,
    /// price = base_price × (1 + price_increment / base_price)^supply
    Exponential,
    /// price = base_price + price_increment × ln(1 + supply)
    Logarithmic,
    /// Piecewise cubic Bezier authored in normalized space.
    Bezier,
}

impl CurveKind {
    /// Tag stored in the on-chain `curve_type` byte.
    pub const fn tag(self) -> u8 {
        match self {
            CurveKind::Linear => 0,
            CurveKind::Exponential => 1,
            CurveKind::Logarithmic => 2,
            CurveKind::Bezier => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(CurveKind::Linear),
            1 => Ok(CurveKind::Exponential),
            2 => Ok(CurveKind::Logarithmic),
            3 => Ok(CurveKind::Bezier),
            other => Err(CurveError::UnknownCurveType(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CurveKind::Linear => "linear",
            CurveKind::Exponential => "exponential",
            CurveKind::Logarithmic => "logarithmic",
            CurveKind::Bezier => "bezier",
        }
    }

    pub fn is_analytic(&self) -> bool {
        !matches!(self, CurveKind::Bezier)
    }
}

impl TryFrom<u8> for CurveKind {
    type Error = CurveError;

    fn try_from(tag: u8) -> Result<Self> {
        CurveKind::from_tag(tag)
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point in normalized (supply fraction, price fraction) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_in_unit_square(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Pull both coordinates into `[0, 1]`; NaN becomes `0`.
    pub fn clamped(self) -> Self {
        let unit = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::new(unit(self.x), unit(self.y))
    }

    pub(crate) fn lerp(self, other: ControlPoint, t: f64) -> ControlPoint {
        ControlPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// One cubic segment. The curve passes through `p0` and `p3`; `p1` and `p2`
/// are handles that only shape it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierSegment {
    pub p0: ControlPoint,
    pub p1: ControlPoint,
    pub p2: ControlPoint,
    pub p3: ControlPoint,
}

impl BezierSegment {
    pub const fn new(p0: ControlPoint, p1: ControlPoint, p2: ControlPoint, p3: ControlPoint) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Straight segment with handles at one and two thirds.
    pub fn straight(from: ControlPoint, to: ControlPoint) -> Self {
        Self::new(from, from.lerp(to, 1.0 / 3.0), from.lerp(to, 2.0 / 3.0), to)
    }

    pub fn points(&self) -> [ControlPoint; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }
}

/// Piecewise Bezier description, traversed in increasing x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BezierCurveData {
    pub segments: Vec<BezierSegment>,
    pub min_price: u64,
    pub max_price: u64,
}

impl BezierCurveData {
    pub fn new(segments: Vec<BezierSegment>, min_price: u64, max_price: u64) -> Self {
        Self {
            segments,
            min_price,
            max_price,
        }
    }

    /// The editor's default slow-start S-curve.
    pub fn s_curve(min_price: u64, max_price: u64) -> Self {
        Self::new(
            vec![BezierSegment::new(
                ControlPoint::new(0.0, 0.0),
                ControlPoint::new(0.2, 0.0),
                ControlPoint::new(0.8, 1.0),
                ControlPoint::new(1.0, 1.0),
            )],
            min_price,
            max_price,
        )
    }
}

/// Full pricing configuration for one edition series.
///
/// `bezier` is present exactly when `kind` is [`CurveKind::Bezier`]; the
/// constructors guarantee it, deserialized values are checked by
/// [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondingCurveConfig {
    kind: CurveKind,
    base_price: u64,
    price_increment: u64,
    max_supply: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bezier: Option<BezierCurveData>,
}

impl BondingCurveConfig {
    fn analytic(kind: CurveKind, base_price: u64, price_increment: u64, max_supply: u32) -> Self {
        Self {
            kind,
            base_price,
            price_increment,
            max_supply,
            bezier: None,
        }
    }

    pub fn linear(base_price: u64, price_increment: u64, max_supply: u32) -> Self {
        Self::analytic(CurveKind::Linear, base_price, price_increment, max_supply)
    }

    pub fn exponential(base_price: u64, price_increment: u64, max_supply: u32) -> Self {
        Self::analytic(CurveKind::Exponential, base_price, price_increment, max_supply)
    }

    pub fn logarithmic(base_price: u64, price_increment: u64, max_supply: u32) -> Self {
        Self::analytic(CurveKind::Logarithmic, base_price, price_increment, max_supply)
    }

    /// Bezier curves take their price range from `data`; `base_price`
    /// mirrors `min_price` and `price_increment` is unused.
    pub fn bezier(data: BezierCurveData, max_supply: u32) -> Self {
        Self {
            kind: CurveKind::Bezier,
            base_price: data.min_price,
            price_increment: 0,
            max_supply,
            bezier: Some(data),
        }
    }

    /// Rebuild from the fields of an on-chain curve account.
    pub fn from_onchain(
        curve_type: u8,
        base_price: u64,
        price_increment: u64,
        max_supply: u32,
    ) -> Result<Self> {
        match CurveKind::from_tag(curve_type)? {
            CurveKind::Bezier => Err(CurveError::KindMismatch {
                expected: CurveKind::Linear,
                found: CurveKind::Bezier,
            }),
            kind => Ok(Self::analytic(kind, base_price, price_increment, max_supply)),
        }
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn base_price(&self) -> u64 {
        self.base_price
    }

    pub fn price_increment(&self) -> u64 {
        self.price_increment
    }

    pub fn max_supply(&self) -> u32 {
        self.max_supply
    }

    pub fn bezier_data(&self) -> Option<&BezierCurveData> {
        self.bezier.as_ref()
    }

    pub fn with_base_price(self, base_price: u64) -> Self {
        Self { base_price, ..self }
    }

    pub fn with_price_increment(self, price_increment: u64) -> Self {
        Self {
            price_increment,
            ..self
        }
    }

    pub fn with_max_supply(self, max_supply: u32) -> Self {
        Self { max_supply, ..self }
    }

    /// Replace the curve shape. Only Bezier configurations carry one.
    pub fn with_bezier_data(self, data: BezierCurveData) -> Result<Self> {
        if self.kind != CurveKind::Bezier {
            return Err(CurveError::KindMismatch {
                expected: CurveKind::Bezier,
                found: self.kind,
            });
        }
        Ok(Self::bezier(data, self.max_supply))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
