//! End-to-end pricing scenarios: author a curve, validate it, price and
//! sample it the way the editor and the mint flow do.

use editioncurve::{
    cumulative_cost, price_at, price_at_with, quote_range, sample, validate, BezierCurveData,
    BezierSegment, BondingCurveConfig, ControlPoint, CurveError, CurvePath, Handle,
    PricingSettings, Rounding, Violation,
};

fn pt(x: f64, y: f64) -> ControlPoint {
    ControlPoint::new(x, y)
}

/// Two segments meeting at (0.5, 0.5) with matching slopes either side.
fn two_segment_curve(max_supply: u32) -> BondingCurveConfig {
    let data = BezierCurveData::new(
        vec![
            BezierSegment::new(pt(0.0, 0.0), pt(0.2, 0.1), pt(0.3, 0.4), pt(0.5, 0.5)),
            BezierSegment::new(pt(0.5, 0.5), pt(0.7, 0.6), pt(0.8, 0.9), pt(1.0, 1.0)),
        ],
        0,
        1_000_000,
    );
    BondingCurveConfig::bezier(data, max_supply)
}

#[test]
fn test_linear_scenario() {
    let config = BondingCurveConfig::linear(100, 10, 5);
    assert!(validate(&config).is_valid());

    let prices: Vec<u64> = (0..5).map(|s| price_at(&config, s).unwrap()).collect();
    assert_eq!(prices, vec![100, 110, 120, 130, 140]);
}

#[test]
fn test_logarithmic_first_edition_is_base_price() {
    let config = BondingCurveConfig::logarithmic(100, 50, 10);
    assert_eq!(price_at(&config, 0).unwrap(), 100);
}

#[test]
fn test_default_s_curve_scenario() {
    let config = BondingCurveConfig::bezier(BezierCurveData::s_curve(1, 10), 101);
    assert!(validate(&config).is_valid());

    assert_eq!(price_at(&config, 0).unwrap(), 1);
    assert_eq!(price_at(&config, 100).unwrap(), 10);

    let mid = price_at(&config, 50).unwrap();
    assert!(mid > 1 && mid < 10, "{}", mid);
    assert!((mid as f64) < 5.5, "{}", mid);
}

#[test]
fn test_discontinuous_curve_is_invalid() {
    let data = BezierCurveData::new(
        vec![
            BezierSegment::new(pt(0.0, 0.0), pt(0.2, 0.1), pt(0.3, 0.4), pt(0.5, 0.5)),
            BezierSegment::new(pt(0.5, 0.55), pt(0.7, 0.6), pt(0.8, 0.9), pt(1.0, 1.0)),
        ],
        0,
        1_000,
    );
    let result = validate(&BondingCurveConfig::bezier(data, 100));
    assert!(!result.is_valid());
    assert!(result
        .violations()
        .contains(&Violation::Discontinuous { segment: 0 }));
}

#[test]
fn test_one_past_last_edition_is_out_of_range() {
    let configs = [
        BondingCurveConfig::linear(100, 10, 5),
        BondingCurveConfig::exponential(100, 10, 5),
        BondingCurveConfig::logarithmic(100, 10, 5),
        BondingCurveConfig::bezier(BezierCurveData::s_curve(1, 10), 5),
    ];
    for config in configs {
        assert_eq!(
            price_at(&config, 5),
            Err(CurveError::SupplyOutOfRange {
                supply: 5,
                max_supply: 5,
            })
        );
    }
}

#[test]
fn test_prices_are_continuous_across_segment_boundary() {
    let config = two_segment_curve(1_001);
    assert!(validate(&config).is_valid());

    let before = price_at(&config, 499).unwrap() as i64;
    let at = price_at(&config, 500).unwrap() as i64;
    let after = price_at(&config, 501).unwrap() as i64;

    assert!((499_999..=500_000).contains(&at), "{}", at);
    assert!((at - before).abs() <= 1_000, "{} -> {}", before, at);
    assert!((after - at).abs() <= 1_000, "{} -> {}", at, after);
}

#[test]
fn test_editor_session() {
    // Author a curve the way the editor does: start straight, insert a knot,
    // drag it and bend a handle.
    let mut path = CurvePath::new(0.0, 1.0);
    path.split_segment(0, 0.5).unwrap();
    path.move_knot(1, pt(0.6, 0.3)).unwrap();
    path.move_handle(1, Handle::Trailing, pt(0.9, 1.0)).unwrap();

    let config = BondingCurveConfig::bezier(path.into_curve_data(500, 20_000), 250);
    assert!(validate(&config).is_valid(), "{:?}", validate(&config));

    let points = sample(&config, 25).unwrap();
    assert_eq!(points.len(), 25);
    assert_eq!(points.first().unwrap().price, 500);
    assert_eq!(points.last().unwrap().supply, 249);
    assert_eq!(points.last().unwrap().price, 20_000);
    assert!(points.windows(2).all(|w| w[0].price <= w[1].price));
}

#[test]
fn test_persisted_config_round_trip_prices_identically() {
    let config = two_segment_curve(300);
    let restored = BondingCurveConfig::from_json(&config.to_json().unwrap()).unwrap();
    for supply in 0..300 {
        assert_eq!(
            price_at(&config, supply).unwrap(),
            price_at(&restored, supply).unwrap()
        );
    }
}

#[test]
fn test_mint_flow_totals() {
    let config = BondingCurveConfig::exponential(1_000, 50, 20);
    let mut volume = 0u64;
    for supply in 0..20 {
        volume += price_at(&config, supply).unwrap();
        assert_eq!(cumulative_cost(&config, supply + 1).unwrap(), volume);
    }

    let quote = quote_range(&config, 5, 10).unwrap();
    assert_eq!(
        quote.total,
        cumulative_cost(&config, 15).unwrap() - cumulative_cost(&config, 5).unwrap()
    );
}

#[test]
fn test_rounding_setting_changes_only_fractional_prices() {
    let config = BondingCurveConfig::logarithmic(100, 50, 10);
    let ceil = PricingSettings {
        rounding: Rounding::Ceil,
        ..Default::default()
    };
    assert_eq!(price_at_with(&config, 0, &ceil).unwrap(), 100);
    assert_eq!(
        price_at_with(&config, 1, &ceil).unwrap(),
        price_at(&config, 1).unwrap() + 1
    );
}
