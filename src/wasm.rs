// src/wasm.rs

//! WebAssembly bindings for the curve editor. Configurations cross as JSON.

use wasm_bindgen::prelude::*;

use crate::curve::{BezierCurveData, BondingCurveConfig};
use crate::error::CurveError;
use crate::price::PriceCalculator;
use crate::quote::{cumulative_cost_with, quote_range_with};
use crate::sample::sample_calculator;
use crate::settings::PricingSettings;
use crate::validate::validate;

fn js_err(err: CurveError) -> JsError {
    JsError::new(&err.to_string())
}

/// A configuration plus the settings it is priced under.
#[wasm_bindgen]
pub struct WasmCurve {
    config: BondingCurveConfig,
    // An unpriceable configuration still loads so the editor can show its
    // validation report.
    calculator: Result<PriceCalculator, CurveError>,
}

impl WasmCurve {
    fn build(config: BondingCurveConfig, settings: PricingSettings) -> Self {
        let calculator = PriceCalculator::new(&config, settings);
        Self { config, calculator }
    }

    fn calculator(&self) -> Result<&PriceCalculator, JsError> {
        self.calculator.as_ref().map_err(|err| js_err(err.clone()))
    }
}

#[wasm_bindgen]
impl WasmCurve {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmCurve, JsError> {
        let config = BondingCurveConfig::from_json(config_json).map_err(js_err)?;
        Ok(Self::build(config, PricingSettings::default()))
    }

    /// Same curve priced under settings loaded from JSON.
    #[wasm_bindgen(js_name = withSettings)]
    pub fn with_settings(&self, settings_json: &str) -> Result<WasmCurve, JsError> {
        let settings = PricingSettings::from_json(settings_json).map_err(js_err)?;
        Ok(Self::build(self.config.clone(), settings))
    }

    /// `{"status":"valid"}` or `{"status":"invalid","report":{...}}`.
    pub fn validate(&self) -> Result<String, JsError> {
        serde_json::to_string(&validate(&self.config)).map_err(|e| js_err(e.into()))
    }

    #[wasm_bindgen(js_name = priceAt)]
    pub fn price_at(&self, supply: u64) -> Result<u64, JsError> {
        self.calculator()?.price_at(supply).map_err(js_err)
    }

    /// Flattened `[supply, price, supply, price, ...]`.
    pub fn sample(&self, count: usize) -> Result<Vec<u64>, JsError> {
        let points = sample_calculator(self.calculator()?, count).map_err(js_err)?;
        Ok(points
            .into_iter()
            .flat_map(|point| [point.supply, point.price])
            .collect())
    }

    #[wasm_bindgen(js_name = cumulativeCost)]
    pub fn cumulative_cost(&self, supply: u64) -> Result<u64, JsError> {
        cumulative_cost_with(self.calculator()?, supply).map_err(js_err)
    }

    /// Prices of `count` editions from `first_edition`.
    #[wasm_bindgen(js_name = quoteRange)]
    pub fn quote_range(&self, first_edition: u64, count: u64) -> Result<Vec<u64>, JsError> {
        quote_range_with(self.calculator()?, first_edition, count)
            .map(|quote| quote.prices)
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        self.config.to_json().map_err(js_err)
    }
}

/// JSON for a fresh Bezier configuration using the default S-curve.
#[wasm_bindgen(js_name = defaultSCurve)]
pub fn default_s_curve(min_price: u64, max_price: u64, max_supply: u32) -> Result<String, JsError> {
    BondingCurveConfig::bezier(BezierCurveData::s_curve(min_price, max_price), max_supply)
        .to_json()
        .map_err(js_err)
}
