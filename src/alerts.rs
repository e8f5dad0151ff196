// =============================================================================
// Threshold Alerts — Literal risk flags over the 30-day signals and macro
// =============================================================================
//
// Predicates are evaluated in a fixed order and are independent of each
// other:
//   1. TVL 30d               <= tvl_drawdown_pct
//   2. Stablecoin cap 30d    <= stablecoin_drawdown_pct
//   3. SOL/ETH vs 30d avg    <= relative_weakness_pct
//   4. VIX                   >= vix_elevated
//   5. Yield curve (10y-2y)  <  yield_curve_inversion
//
// An absent input never fires its alert.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::{signal, MacroReadings, Signals, RELATIVE_STRENGTH_30D, STABLE_30D, TVL_30D};

fn default_tvl_drawdown_pct() -> f64 {
    -10.0
}

fn default_stablecoin_drawdown_pct() -> f64 {
    -10.0
}

fn default_relative_weakness_pct() -> f64 {
    -5.0
}

fn default_vix_elevated() -> f64 {
    25.0
}

fn default_yield_curve_inversion() -> f64 {
    0.0
}

/// Trigger levels for each alert predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default = "default_tvl_drawdown_pct")]
    pub tvl_drawdown_pct: f64,

    #[serde(default = "default_stablecoin_drawdown_pct")]
    pub stablecoin_drawdown_pct: f64,

    #[serde(default = "default_relative_weakness_pct")]
    pub relative_weakness_pct: f64,

    #[serde(default = "default_vix_elevated")]
    pub vix_elevated: f64,

    /// Spread below which the curve counts as inverted.
    #[serde(default = "default_yield_curve_inversion")]
    pub yield_curve_inversion: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            tvl_drawdown_pct: default_tvl_drawdown_pct(),
            stablecoin_drawdown_pct: default_stablecoin_drawdown_pct(),
            relative_weakness_pct: default_relative_weakness_pct(),
            vix_elevated: default_vix_elevated(),
            yield_curve_inversion: default_yield_curve_inversion(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TvlDrawdown,
    StablecoinDrawdown,
    RelativeWeakness,
    ElevatedVolatility,
    InvertedYieldCurve,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    fn new(kind: AlertKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// Evaluate every predicate and collect the ones that fire, in fixed order.
pub fn evaluate_alerts(
    signals: &Signals,
    macro_readings: &MacroReadings,
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(tvl) = signal(signals, TVL_30D).filter(|v| *v <= thresholds.tvl_drawdown_pct) {
        alerts.push(Alert::new(
            AlertKind::TvlDrawdown,
            format!(
                "Solana TVL 30d is {tvl:.1}% (≤ {}%).",
                thresholds.tvl_drawdown_pct
            ),
        ));
    }

    if let Some(stable) =
        signal(signals, STABLE_30D).filter(|v| *v <= thresholds.stablecoin_drawdown_pct)
    {
        alerts.push(Alert::new(
            AlertKind::StablecoinDrawdown,
            format!(
                "Stablecoin cap proxy 30d is {stable:.1}% (≤ {}%).",
                thresholds.stablecoin_drawdown_pct
            ),
        ));
    }

    if let Some(rel) =
        signal(signals, RELATIVE_STRENGTH_30D).filter(|v| *v <= thresholds.relative_weakness_pct)
    {
        alerts.push(Alert::new(
            AlertKind::RelativeWeakness,
            format!(
                "SOL/ETH vs 30d avg is {rel:.1}% (≤ {}%).",
                thresholds.relative_weakness_pct
            ),
        ));
    }

    if let Some(vix) = macro_readings.vix.filter(|v| *v >= thresholds.vix_elevated) {
        alerts.push(Alert::new(
            AlertKind::ElevatedVolatility,
            format!(
                "VIX is {vix:.1} (≥ {}), macro risk elevated.",
                thresholds.vix_elevated
            ),
        ));
    }

    if let Some(spread) = macro_readings
        .yield_curve_spread
        .filter(|v| *v < thresholds.yield_curve_inversion)
    {
        alerts.push(Alert::new(
            AlertKind::InvertedYieldCurve,
            format!("Yield curve (10y-2y) is inverted at {spread:.2}%."),
        ));
    }

    alerts
}
