// src/sample.rs

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::curve::BondingCurveConfig;
use crate::error::Result;
use crate::price::PriceCalculator;
use crate::settings::PricingSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub supply: u64,
    pub price: u64,
}

/// Up to `count` distinct supplies from `0` to `max_supply - 1` inclusive,
/// ascending and as evenly spaced as integer indices allow.
pub fn sample_supplies(max_supply: u32, count: usize) -> Vec<u64> {
    let last = match (max_supply as u64).checked_sub(1) {
        Some(last) => last,
        None => return Vec::new(),
    };
    let n = (count as u64).min(max_supply as u64);

    match n {
        0 => Vec::new(),
        1 => vec![0],
        _ => (0..n)
            .map(|i| (i as u128 * last as u128 / (n - 1) as u128) as u64)
            .collect(),
    }
}

pub fn sample(config: &BondingCurveConfig, count: usize) -> Result<Vec<CurvePoint>> {
    sample_with(config, count, &PricingSettings::default())
}

pub fn sample_with(
    config: &BondingCurveConfig,
    count: usize,
    settings: &PricingSettings,
) -> Result<Vec<CurvePoint>> {
    let calculator = PriceCalculator::new(config, *settings)?;
    sample_calculator(&calculator, count)
}

pub fn sample_calculator(calculator: &PriceCalculator, count: usize) -> Result<Vec<CurvePoint>> {
    let supplies = sample_supplies(calculator.max_supply(), count);
    price_points(calculator, &supplies)
}

/// Same points as [`sample`], priced on up to `workers` scoped threads.
pub fn sample_parallel(
    config: &BondingCurveConfig,
    count: usize,
    workers: usize,
) -> Result<Vec<CurvePoint>> {
    let calculator = PriceCalculator::new(config, PricingSettings::default())?;
    sample_calculator_parallel(&calculator, count, workers)
}

pub fn sample_calculator_parallel(
    calculator: &PriceCalculator,
    count: usize,
    workers: usize,
) -> Result<Vec<CurvePoint>> {
    let supplies = sample_supplies(calculator.max_supply(), count);
    if supplies.is_empty() {
        return Ok(Vec::new());
    }

    let workers = workers.clamp(1, supplies.len());
    let chunk_len = supplies.len().div_ceil(workers);

    let chunks: Vec<Result<Vec<CurvePoint>>> = thread::scope(|scope| {
        let handles: Vec<_> = supplies
            .chunks(chunk_len)
            .map(|chunk| scope.spawn(move || price_points(calculator, chunk)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    let mut points = Vec::with_capacity(supplies.len());
    for chunk in chunks {
        points.extend(chunk?);
    }
    Ok(points)
}

fn price_points(calculator: &PriceCalculator, supplies: &[u64]) -> Result<Vec<CurvePoint>> {
    supplies
        .iter()
        .map(|&supply| {
            let price = calculator.price_at(supply)?;
            trace!(supply, price, "sampled");
            Ok(CurvePoint { supply, price })
        })
        .collect()
}
