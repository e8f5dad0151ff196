// =============================================================================
// Market Data Module
// =============================================================================
//
// Turns raw timestamped series (supplied by the price/TVL/market-cap
// fetchers) into the named percentage-change signals the scorer consumes.
// Every function here is pure; missing or degenerate data produces `None`
// rather than an error.

pub mod relative_strength;
pub mod series;

pub use series::SeriesPoint;

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::types::{Signals, RELATIVE_STRENGTH_30D, STABLE_30D, TVL_30D};

/// Trailing window for the flow signals, in days.
pub const SIGNAL_WINDOW_DAYS: i64 = 30;
/// Number of ratio observations averaged for relative strength.
pub const RELATIVE_STRENGTH_AVG_POINTS: usize = 30;

/// Maximum timestamp distance when aligning two series.
pub fn merge_tolerance() -> Duration {
    Duration::hours(1)
}

/// Raw series used to derive the scoring signals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesInputs {
    /// Chain TVL history.
    #[serde(default)]
    pub tvl: Vec<SeriesPoint>,
    /// One market-cap history per stablecoin (e.g. USDT, USDC, DAI).
    #[serde(default)]
    pub stablecoin_caps: Vec<Vec<SeriesPoint>>,
    /// Price history of the asset being measured (SOL).
    #[serde(default)]
    pub base_prices: Vec<SeriesPoint>,
    /// Price history of the benchmark (ETH).
    #[serde(default)]
    pub benchmark_prices: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSignals {
    pub signals: Signals,
    pub tvl_latest: Option<f64>,
    /// TVL change since the start of the latest point's calendar year.
    pub tvl_ytd_pct: Option<f64>,
    pub ratio_latest: Option<f64>,
}

/// Derive `tvl_30d`, `stable_30d` and `relative_strength_30d` from raw series.
pub fn derive_signals(inputs: &SeriesInputs) -> DerivedSignals {
    let tvl_30d = series::pct_change_over_window(&inputs.tvl, SIGNAL_WINDOW_DAYS);
    let tvl_clean = series::clean(&inputs.tvl);
    let tvl_latest = tvl_clean.last().map(|p| p.value);
    let tvl_ytd_pct = tvl_clean
        .last()
        .and_then(|p| series::ytd_change(&tvl_clean, p.at.year()));

    let stable_total = series::sum_series(&inputs.stablecoin_caps, merge_tolerance());
    let stable_30d = series::pct_change_over_window(&stable_total, SIGNAL_WINDOW_DAYS);

    let strength = relative_strength::relative_strength(
        &inputs.base_prices,
        &inputs.benchmark_prices,
        RELATIVE_STRENGTH_AVG_POINTS,
        merge_tolerance(),
    );

    let mut signals = Signals::new();
    signals.insert(TVL_30D.to_string(), tvl_30d);
    signals.insert(STABLE_30D.to_string(), stable_30d);
    signals.insert(
        RELATIVE_STRENGTH_30D.to_string(),
        strength.and_then(|s| s.deviation_pct),
    );

    DerivedSignals {
        signals,
        tvl_latest,
        tvl_ytd_pct,
        ratio_latest: strength.map(|s| s.ratio_latest),
    }
}

#[cfg(test)]
mod tests {
    use super::series::day;
    use super::*;
    use crate::types::signal;

    #[test]
    fn empty_inputs_derive_absent_signals() {
        let derived = derive_signals(&SeriesInputs::default());
        assert_eq!(derived.signals.len(), 3);
        assert!(derived.signals.values().all(|v| v.is_none()));
        assert_eq!(derived.tvl_latest, None);
        assert_eq!(derived.tvl_ytd_pct, None);
        assert_eq!(derived.ratio_latest, None);
    }

    #[test]
    fn derives_all_three_signals() {
        let flat = |v: f64| -> Vec<SeriesPoint> { (0..=30).map(|d| SeriesPoint::new(day(d), v)).collect() };
        let tvl: Vec<SeriesPoint> = (0..=30).map(|d| SeriesPoint::new(day(d), 100.0 - d as f64 * 0.4)).collect();

        let inputs = SeriesInputs {
            tvl,
            stablecoin_caps: vec![flat(60.0), flat(40.0)],
            base_prices: flat(150.0),
            benchmark_prices: flat(3000.0),
        };
        let derived = derive_signals(&inputs);

        assert!((signal(&derived.signals, TVL_30D).unwrap() - -12.0).abs() < 1e-9);
        assert!(signal(&derived.signals, STABLE_30D).unwrap().abs() < 1e-9);
        assert!(signal(&derived.signals, RELATIVE_STRENGTH_30D).unwrap().abs() < 1e-9);
        assert!((derived.tvl_latest.unwrap() - 88.0).abs() < 1e-9);
        assert!((derived.tvl_ytd_pct.unwrap() - -12.0).abs() < 1e-9);
        assert!((derived.ratio_latest.unwrap() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn earliest_representable_timestamp_derives_flat_tvl() {
        let inputs: SeriesInputs =
            serde_json::from_str(r#"{ "tvl": [[-8334601228800000, 100.0]] }"#).unwrap();
        let derived = derive_signals(&inputs);
        assert_eq!(signal(&derived.signals, TVL_30D), Some(0.0));
        assert_eq!(derived.tvl_latest, Some(100.0));
    }

    #[test]
    fn deserialises_request_shape() {
        let inputs: SeriesInputs = serde_json::from_str(
            r#"{ "tvl": [[1735689600000, 5.0]], "stablecoin_caps": [[[1735689600000, 1.0]]] }"#,
        )
        .unwrap();
        assert_eq!(inputs.tvl.len(), 1);
        assert_eq!(inputs.stablecoin_caps[0].len(), 1);
        assert!(inputs.base_prices.is_empty());
    }
}
