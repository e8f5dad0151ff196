// =============================================================================
// Shared types used across the Macro Pulse backend
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Solana TVL change over the trailing 30 days, in percent.
pub const TVL_30D: &str = "tvl_30d";
/// Summed stablecoin market-cap change over the trailing 30 days, in percent.
pub const STABLE_30D: &str = "stable_30d";
/// SOL/ETH ratio deviation from its 30-day average, in percent.
pub const RELATIVE_STRENGTH_30D: &str = "relative_strength_30d";

/// Named percentage-change observations. A missing key and an explicit
/// `null` both mean "unavailable".
pub type Signals = HashMap<String, Option<f64>>;

/// Look up a signal, flattening "missing" and "null" into `None`.
pub fn signal(signals: &Signals, name: &str) -> Option<f64> {
    signals.get(name).copied().flatten()
}

/// Traffic-light classification of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLight {
    High,
    Medium,
    Low,
}

impl RiskLight {
    /// Classify a composite score: `>= 70` high, `>= 40` medium, else low.
    pub fn classify(score: f64) -> Self {
        if score >= 70.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Macro readings supplied alongside the crypto signals. Both are optional;
/// an absent reading never triggers its alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroReadings {
    /// 10-year minus 2-year Treasury yield, in percentage points.
    #[serde(default)]
    pub yield_curve_spread: Option<f64>,
    /// CBOE volatility index level.
    #[serde(default)]
    pub vix: Option<f64>,
}

/// Latest raw levels shown next to the percentage signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    #[serde(default)]
    pub tvl_latest: Option<f64>,
    #[serde(default)]
    pub ratio_latest: Option<f64>,
}
