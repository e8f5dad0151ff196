// =============================================================================
// Dashboard Summary — Snapshot payload and deterministic local read-out
// =============================================================================
//
// The snapshot is the compact JSON a commentary model would be handed.  The
// local summary is the read-out shown when no model is configured: a TL;DR
// line followed by one bullet per available metric.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{signal, MacroReadings, Signals, RELATIVE_STRENGTH_30D, STABLE_30D, TVL_30D};

const DASH: &str = "—";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TvlSnapshot {
    pub latest: Option<f64>,
    pub chg_30d_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StablecoinSnapshot {
    pub chg_30d_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelativeStrengthSnapshot {
    pub ratio_latest: Option<f64>,
    pub vs_30d_avg_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacroSnapshot {
    pub yield_curve_10y_minus_2y: Option<f64>,
    pub vix: Option<f64>,
}

/// Everything the dashboard knows at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub timestamp_utc: String,
    pub tvl: TvlSnapshot,
    pub stablecoins: StablecoinSnapshot,
    pub relative_strength: RelativeStrengthSnapshot,
    #[serde(rename = "macro")]
    pub macro_: MacroSnapshot,
    pub bullishness_score: Option<f64>,
}

impl DashboardSnapshot {
    pub fn new(
        at: DateTime<Utc>,
        signals: &Signals,
        macro_readings: &MacroReadings,
        score: Option<f64>,
    ) -> Self {
        Self {
            timestamp_utc: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            tvl: TvlSnapshot {
                latest: None,
                chg_30d_pct: signal(signals, TVL_30D),
            },
            stablecoins: StablecoinSnapshot {
                chg_30d_pct: signal(signals, STABLE_30D),
            },
            relative_strength: RelativeStrengthSnapshot {
                ratio_latest: None,
                vs_30d_avg_pct: signal(signals, RELATIVE_STRENGTH_30D),
            },
            macro_: MacroSnapshot {
                yield_curve_10y_minus_2y: macro_readings.yield_curve_spread,
                vix: macro_readings.vix,
            },
            bullishness_score: score,
        }
    }

    pub fn with_levels(mut self, tvl_latest: Option<f64>, ratio_latest: Option<f64>) -> Self {
        self.tvl.latest = tvl_latest;
        self.relative_strength.ratio_latest = ratio_latest;
        self
    }
}

/// Render the local bullet summary, one markdown line per available metric.
pub fn local_summary(snapshot: &DashboardSnapshot, vix_elevated: f64) -> String {
    let mut lines = Vec::new();

    let score = snapshot
        .bullishness_score
        .map(|s| format!("{s:.0}"))
        .unwrap_or_else(|| DASH.to_string());
    let macro_tone = match snapshot.macro_.vix {
        Some(vix) if vix >= vix_elevated => "elevated risk",
        _ => "neutral",
    };
    lines.push(format!("**TL;DR:** Score {score}/100; macro {macro_tone}."));

    if snapshot.bullishness_score.is_none() {
        lines.push("- Not enough data yet to compute a score.".to_string());
    }
    if let Some(rel) = snapshot.relative_strength.vs_30d_avg_pct {
        lines.push(format!("- SOL/ETH vs 30d avg: {}.", pct_fmt(Some(rel))));
    }
    if let Some(tvl) = snapshot.tvl.chg_30d_pct {
        match snapshot.tvl.latest {
            Some(latest) => lines.push(format!(
                "- Solana TVL 30d: {} (now {}).",
                pct_fmt(Some(tvl)),
                usd_big(Some(latest))
            )),
            None => lines.push(format!("- Solana TVL 30d: {}.", pct_fmt(Some(tvl)))),
        }
    }
    if let Some(stable) = snapshot.stablecoins.chg_30d_pct {
        lines.push(format!("- Stablecoins 30d: {}.", pct_fmt(Some(stable))));
    }
    if let Some(vix) = snapshot.macro_.vix {
        lines.push(format!("- VIX: {vix:.1}."));
    }
    if let Some(yc) = snapshot.macro_.yield_curve_10y_minus_2y {
        let shape = if yc < 0.0 { "inverted" } else { "normal" };
        lines.push(format!("- Yield curve (10y-2y): {yc:.2}% ({shape})."));
    }
    lines.push("- Watch next: sustain TVL uptick; SOL/ETH above 30d average.".to_string());

    lines.join("\n")
}

/// `+1.2%` style, or a dash when unavailable.
pub fn pct_fmt(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{v:+.1}%"),
        None => DASH.to_string(),
    }
}

/// Compact dollar figure: `$1.23T`, `$4.5B`, `$12M`, `$950`.
pub fn usd_big(x: Option<f64>) -> String {
    let Some(x) = x.filter(|v| v.is_finite()) else {
        return DASH.to_string();
    };
    if x >= 1e12 {
        format!("${}T", group_thousands(x / 1e12, 2))
    } else if x >= 1e9 {
        format!("${}B", group_thousands(x / 1e9, 1))
    } else if x >= 1e6 {
        format!("${}M", group_thousands(x / 1e6, 0))
    } else {
        format!("${}", group_thousands(x, 0))
    }
}

fn group_thousands(v: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
