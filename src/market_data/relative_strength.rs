// =============================================================================
// Relative Strength — price ratio versus its trailing average
// =============================================================================
//
//   ratio_t   = price_a(t) / price_b(t)      (as-of merged, nearest, 1h)
//   deviation = (ratio_latest / mean(last N ratios) - 1) * 100
//
// A positive deviation means asset A is outperforming B relative to its own
// recent norm.

use chrono::Duration;
use serde::Serialize;

use super::series::{merge_asof_nearest, SeriesPoint};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelativeStrength {
    pub ratio_latest: f64,
    pub ratio_average: f64,
    /// `None` when the trailing average is zero.
    pub deviation_pct: Option<f64>,
}

/// Ratio series of `numerator / denominator` on the numerator's time base.
/// Rows with a zero denominator are dropped.
pub fn ratio_series(
    numerator: &[SeriesPoint],
    denominator: &[SeriesPoint],
    tolerance: Duration,
) -> Vec<SeriesPoint> {
    merge_asof_nearest(numerator, denominator, tolerance)
        .into_iter()
        .filter(|m| m.right != 0.0)
        .map(|m| SeriesPoint::new(m.at, m.left / m.right))
        .collect()
}

/// Latest ratio and its deviation from the mean of the last `avg_window`
/// ratios. `None` if the two series never overlap.
pub fn relative_strength(
    numerator: &[SeriesPoint],
    denominator: &[SeriesPoint],
    avg_window: usize,
    tolerance: Duration,
) -> Option<RelativeStrength> {
    let ratios = ratio_series(numerator, denominator, tolerance);
    let latest = ratios.last()?.value;

    let window = avg_window.max(1).min(ratios.len());
    let tail = &ratios[ratios.len() - window..];
    let average = tail.iter().map(|p| p.value).sum::<f64>() / window as f64;

    let deviation_pct = if average == 0.0 {
        None
    } else {
        Some((latest / average - 1.0) * 100.0)
    };

    Some(RelativeStrength {
        ratio_latest: latest,
        ratio_average: average,
        deviation_pct,
    })
}
