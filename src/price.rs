// src/price.rs

//! Exponential: `price = base_price × (1 + price_increment / base_price)^supply`.
//! A zero base price compounds at the default growth rate instead:
//! `price = price_increment × (growth^supply − 1)`.
//!
//! Logarithmic: `price = base_price + price_increment × ln(1 + supply)`.

use tracing::debug;

use crate::bezier::{point_at, solve_t_for_x, FixedSegment};
use crate::curve::{BezierCurveData, BondingCurveConfig, CurveKind};
use crate::error::{CurveError, Result};
use crate::fixed::{ln_wad, narrow_u64, pow_wad, Wad, WAD};
use crate::settings::{PricingSettings, BASIS_POINTS};
use crate::validate::{validate_bezier, validate_with, ValidationReport, Violation};

/// Price of edition `supply` under default settings.
pub fn price_at(config: &BondingCurveConfig, supply: u64) -> Result<u64> {
    price_at_with(config, supply, &PricingSettings::default())
}

pub fn price_at_with(
    config: &BondingCurveConfig,
    supply: u64,
    settings: &PricingSettings,
) -> Result<u64> {
    PriceCalculator::new(config, *settings)?.price_at(supply)
}

/// Bezier data quantized once, so repeated pricing skips the float boundary.
#[derive(Debug, Clone)]
struct CompiledBezier {
    segments: Vec<FixedSegment>,
    min_price: u64,
    span: u64,
}

impl CompiledBezier {
    /// `None` if the data cannot be priced at all; [`validate_bezier`] says why.
    fn compile(data: &BezierCurveData) -> Option<Self> {
        let segments = data
            .segments
            .iter()
            .map(FixedSegment::from_segment)
            .collect::<Option<Vec<_>>>()?;
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            segments,
            min_price: data.min_price,
            span: data.max_price.checked_sub(data.min_price)?,
        })
    }

    /// Segment owning `x`. A boundary x belongs to the segment it ends.
    fn segment_for(&self, x: Wad) -> &FixedSegment {
        let index = self
            .segments
            .partition_point(|segment| segment.p3.x < x)
            .min(self.segments.len() - 1);
        &self.segments[index]
    }
}

/// Prices editions of one configuration.
///
/// Owns everything it needs and holds no mutable state, so a single
/// calculator can be shared across threads.
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    kind: CurveKind,
    base_price: u64,
    price_increment: u64,
    max_supply: u32,
    bezier: Option<CompiledBezier>,
    settings: PricingSettings,
}

impl PriceCalculator {
    /// Fails with [`CurveError::Invalid`] unless `config` passes
    /// [`validate_with`] under `settings`.
    pub fn new(config: &BondingCurveConfig, settings: PricingSettings) -> Result<Self> {
        settings.validate()?;
        validate_with(config, &settings).into_result()?;

        let calculator = Self::build(config, settings)?;
        debug!(
            kind = %config.kind(),
            max_supply = config.max_supply(),
            "price calculator ready"
        );
        Ok(calculator)
    }

    /// Calculator for a configuration that has not been validated.
    pub(crate) fn build(config: &BondingCurveConfig, settings: PricingSettings) -> Result<Self> {
        let bezier = match (config.kind(), config.bezier_data()) {
            (CurveKind::Bezier, Some(data)) => {
                Some(CompiledBezier::compile(data).ok_or_else(|| {
                    CurveError::Invalid(ValidationReport {
                        violations: validate_bezier(data),
                    })
                })?)
            }
            (CurveKind::Bezier, None) => {
                return Err(CurveError::Invalid(ValidationReport {
                    violations: vec![Violation::MissingBezierData],
                }))
            }
            _ => None,
        };

        Ok(Self {
            kind: config.kind(),
            base_price: config.base_price(),
            price_increment: config.price_increment(),
            max_supply: config.max_supply(),
            bezier,
            settings,
        })
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

    /// Price of the edition with zero-based index `supply`.
    pub fn price_at(&self, supply: u64) -> Result<u64> {
        if supply >= self.max_supply as u64 {
            return Err(CurveError::SupplyOutOfRange {
                supply,
                max_supply: self.max_supply,
            });
        }

        match (self.kind, &self.bezier) {
            (CurveKind::Linear, _) => self.linear(supply),
            (CurveKind::Exponential, _) => self.exponential(supply),
            (CurveKind::Logarithmic, _) => self.logarithmic(supply),
            (CurveKind::Bezier, Some(bezier)) => self.bezier(bezier, supply),
            (CurveKind::Bezier, None) => Err(CurveError::Invalid(ValidationReport {
                violations: vec![Violation::MissingBezierData],
            })),
        }
    }

    fn linear(&self, supply: u64) -> Result<u64> {
        supply
            .checked_mul(self.price_increment)
            .and_then(|step| step.checked_add(self.base_price))
            .ok_or(CurveError::Overflow)
    }

    fn exponential(&self, supply: u64) -> Result<u64> {
        let rounding = self.settings.rounding;

        if self.base_price == 0 {
            let growth = WAD as u128
                + (self.settings.default_growth_bps as u128 * WAD as u128) / BASIS_POINTS as u128;
            let factor = pow_wad(growth, supply)?;
            let gained = factor - WAD as u128;
            return narrow_u64(rounding.scale(self.price_increment, gained)?);
        }

        let growth = WAD as u128
            + (self.price_increment as u128 * WAD as u128) / self.base_price as u128;
        let factor = pow_wad(growth, supply)?;
        narrow_u64(rounding.scale(self.base_price, factor)?)
    }

    fn logarithmic(&self, supply: u64) -> Result<u64> {
        let ln = ln_wad(supply.checked_add(1).ok_or(CurveError::Overflow)?)?;
        let gained = narrow_u64(self.settings.rounding.scale(self.price_increment, ln.raw() as u128)?)?;
        self.base_price
            .checked_add(gained)
            .ok_or(CurveError::Overflow)
    }

    fn bezier(&self, bezier: &CompiledBezier, supply: u64) -> Result<u64> {
        let x = if self.max_supply <= 1 {
            Wad::ZERO
        } else {
            Wad::from_ratio(supply, self.max_supply as u64 - 1)?.clamp_unit()
        };

        let segment = bezier.segment_for(x);
        let t = solve_t_for_x(
            segment,
            x,
            self.settings.tolerance,
            self.settings.max_iterations,
        )?;
        let y = point_at(segment, t).y.clamp_unit();

        let gained = narrow_u64(self.settings.rounding.scale(bezier.span, y.raw() as u128)?)?;
        bezier
            .min_price
            .checked_add(gained)
            .ok_or(CurveError::Overflow)
    }
}
