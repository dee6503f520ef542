// src/quote.rs

use serde::{Deserialize, Serialize};

use crate::curve::{BondingCurveConfig, CurveKind};
use crate::error::{CurveError, Result};
use crate::price::PriceCalculator;
use crate::settings::PricingSettings;

/// Prices for a run of consecutive editions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuote {
    pub first_edition: u64,
    pub prices: Vec<u64>,
    pub total: u64,
}

impl RangeQuote {
    /// Supply after the whole range is minted.
    pub fn next_supply(&self) -> u64 {
        self.first_edition + self.prices.len() as u64
    }
}

/// Total paid for editions `0..supply`.
pub fn cumulative_cost(config: &BondingCurveConfig, supply: u64) -> Result<u64> {
    let calculator = PriceCalculator::new(config, PricingSettings::default())?;
    cumulative_cost_with(&calculator, supply)
}

pub fn cumulative_cost_with(calculator: &PriceCalculator, supply: u64) -> Result<u64> {
    if supply > calculator.max_supply() as u64 {
        return Err(CurveError::SupplyOutOfRange {
            supply,
            max_supply: calculator.max_supply(),
        });
    }
    if supply == 0 {
        return Ok(0);
    }

    if calculator.kind() == CurveKind::Linear {
        // n × base + increment × n(n - 1) / 2
        let n = supply as u128;
        let base = calculator.base_price() as u128;
        let increment = calculator.price_increment() as u128;
        let total = (n * base)
            .checked_add((n * (n - 1) / 2).checked_mul(increment).ok_or(CurveError::Overflow)?)
            .ok_or(CurveError::Overflow)?;
        return u64::try_from(total).map_err(|_| CurveError::Overflow);
    }

    let mut total = 0u64;
    for edition in 0..supply {
        total = total
            .checked_add(calculator.price_at(edition)?)
            .ok_or(CurveError::Overflow)?;
    }
    Ok(total)
}

/// Quote `count` editions starting at `first_edition`.
///
/// Fails with [`CurveError::SupplyOutOfRange`] when the range would run past
/// the last edition.
pub fn quote_range(config: &BondingCurveConfig, first_edition: u64, count: u64) -> Result<RangeQuote> {
    let calculator = PriceCalculator::new(config, PricingSettings::default())?;
    quote_range_with(&calculator, first_edition, count)
}

pub fn quote_range_with(
    calculator: &PriceCalculator,
    first_edition: u64,
    count: u64,
) -> Result<RangeQuote> {
    let end = first_edition
        .checked_add(count)
        .ok_or(CurveError::Overflow)?;
    if end > calculator.max_supply() as u64 {
        return Err(CurveError::SupplyOutOfRange {
            supply: end - 1,
            max_supply: calculator.max_supply(),
        });
    }

    let mut prices = Vec::with_capacity(count as usize);
    let mut total = 0u64;
    for edition in first_edition..end {
        let price = calculator.price_at(edition)?;
        total = total.checked_add(price).ok_or(CurveError::Overflow)?;
        prices.push(price);
    }

    Ok(RangeQuote {
        first_edition,
        prices,
        total,
    })
}

/// Everything the curve raises if every edition sells.
pub fn total_raise(config: &BondingCurveConfig) -> Result<u64> {
    cumulative_cost(config, config.max_supply() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::BezierCurveData;

    #[test]
    fn test_linear_cumulative_cost_closed_form() {
        let config = BondingCurveConfig::linear(100, 10, 5);
        assert_eq!(cumulative_cost(&config, 0).unwrap(), 0);
        assert_eq!(cumulative_cost(&config, 1).unwrap(), 100);
        assert_eq!(cumulative_cost(&config, 3).unwrap(), 330);
        assert_eq!(total_raise(&config).unwrap(), 600);
    }

    #[test]
    fn test_cumulative_cost_matches_quote_range() {
        let config = BondingCurveConfig::logarithmic(1_000, 250, 40);
        let quote = quote_range(&config, 0, 40).unwrap();
        assert_eq!(quote.total, total_raise(&config).unwrap());
        assert_eq!(quote.next_supply(), 40);
    }

    #[test]
    fn test_quote_range_from_middle() {
        let config = BondingCurveConfig::linear(100, 10, 5);
        let quote = quote_range(&config, 2, 3).unwrap();
        assert_eq!(quote.prices, vec![120, 130, 140]);
        assert_eq!(quote.total, 390);
        assert_eq!(quote.next_supply(), 5);

        let empty = quote_range(&config, 5, 0).unwrap();
        assert!(empty.prices.is_empty());
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn test_quote_range_past_max_supply() {
        let config = BondingCurveConfig::linear(100, 10, 5);
        assert_eq!(
            quote_range(&config, 3, 3),
            Err(CurveError::SupplyOutOfRange {
                supply: 5,
                max_supply: 5,
            })
        );
    }

    #[test]
    fn test_cumulative_cost_past_max_supply() {
        let config = BondingCurveConfig::exponential(100, 10, 5);
        assert!(matches!(
            cumulative_cost(&config, 6),
            Err(CurveError::SupplyOutOfRange { .. })
        ));
    }

    #[test]
    fn test_bezier_total_raise_between_bounds() {
        let config = BondingCurveConfig::bezier(BezierCurveData::s_curve(1, 10), 101);
        let total = total_raise(&config).unwrap();
        assert!(total > 101 && total < 1_010);
    }

    #[test]
    fn test_linear_cumulative_overflow() {
        let config = BondingCurveConfig::linear(u64::MAX / 2, 0, 3);
        assert_eq!(cumulative_cost(&config, 3), Err(CurveError::Overflow));
    }
}
