// =============================================================================
// Series Helpers — window changes and as-of merging
// =============================================================================
//
// Timestamped observations as delivered by the price, TVL and market-cap
// sources.  Nothing here fails: degenerate input yields `None` or an empty
// series.
// =============================================================================

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single timestamped observation (price, TVL, market cap, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub at: DateTime<Utc>,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(at: DateTime<Utc>, value: f64) -> Self {
        Self { at, value }
    }

    /// Build from an epoch-millisecond timestamp. Out-of-range timestamps
    /// yield `None`.
    pub fn from_millis(ts_ms: i64, value: f64) -> Option<Self> {
        Utc.timestamp_millis_opt(ts_ms)
            .single()
            .map(|at| Self { at, value })
    }
}

/// Series arrive as `[[epoch_millis, value], ...]`, the shape CoinGecko's
/// `market_chart` and DeFiLlama's chart endpoints return.
impl<'de> Deserialize<'de> for SeriesPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (ts, value) = <(f64, Option<f64>)>::deserialize(deserializer)?;
        let value = value.unwrap_or(f64::NAN);
        SeriesPoint::from_millis(ts as i64, value)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {ts}")))
    }
}

/// Sort by time and drop non-finite values.
pub fn clean(series: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let mut out: Vec<SeriesPoint> = series
        .iter()
        .copied()
        .filter(|p| p.value.is_finite())
        .collect();
    out.sort_by_key(|p| p.at);
    out
}

fn pct_change(base: f64, last: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    Some((last / base - 1.0) * 100.0)
}

// ---------------------------------------------------------------------------
// Window changes
// ---------------------------------------------------------------------------

/// Percentage change from the first point inside the trailing window to the
/// latest point.
///
/// The window is anchored on the latest timestamp, not on "now", so a stale
/// series still produces a change over its own last `window_days`.
pub fn pct_change_over_window(series: &[SeriesPoint], window_days: i64) -> Option<f64> {
    let series = clean(series);
    let last = series.last()?;
    // A cutoff before the representable range means the whole series is inside.
    let base = last
        .at
        .checked_sub_signed(Duration::days(window_days))
        .and_then(|cutoff| series.iter().find(|p| p.at >= cutoff))
        .unwrap_or(&series[0]);

    pct_change(base.value, last.value)
}

/// Change since the first observation of `year`.
pub fn ytd_change(series: &[SeriesPoint], year: i32) -> Option<f64> {
    let series = clean(series);
    let mut in_year = series.iter().filter(|p| p.at.year() >= year);
    let first = in_year.next()?;
    let last = in_year.last().unwrap_or(first);
    pct_change(first.value, last.value)
}

// ---------------------------------------------------------------------------
// As-of merging
// ---------------------------------------------------------------------------

/// A left point together with its nearest right neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedPoint {
    pub at: DateTime<Utc>,
    pub left: f64,
    pub right: f64,
}

/// Index of the point in sorted `series` nearest to `at`, if within
/// `tolerance`. Ties go to the earlier point.
fn nearest_within(series: &[SeriesPoint], at: DateTime<Utc>, tolerance: Duration) -> Option<usize> {
    let idx = series.partition_point(|p| p.at < at);

    let before = idx.checked_sub(1).map(|i| (i, at - series[i].at));
    let after = series.get(idx).map(|p| (idx, p.at - at));

    let (best, distance) = match (before, after) {
        (Some(b), Some(a)) => {
            if a.1 < b.1 {
                a
            } else {
                b
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    (distance <= tolerance).then_some(best)
}

/// Nearest-timestamp as-of merge. Left points without a right neighbour
/// inside `tolerance` are dropped.
pub fn merge_asof_nearest(
    left: &[SeriesPoint],
    right: &[SeriesPoint],
    tolerance: Duration,
) -> Vec<MergedPoint> {
    let left = clean(left);
    let right = clean(right);

    left.iter()
        .filter_map(|l| {
            nearest_within(&right, l.at, tolerance).map(|i| MergedPoint {
                at: l.at,
                left: l.value,
                right: right[i].value,
            })
        })
        .collect()
}

/// Sum several series onto the time base of the first non-empty one.
///
/// Each row totals whatever values matched on that row; rows where nothing
/// matched do not occur because the base series always contributes.
pub fn sum_series(series_list: &[Vec<SeriesPoint>], tolerance: Duration) -> Vec<SeriesPoint> {
    let cleaned: Vec<Vec<SeriesPoint>> = series_list
        .iter()
        .map(|s| clean(s))
        .filter(|s| !s.is_empty())
        .collect();

    let Some((base, others)) = cleaned.split_first() else {
        return Vec::new();
    };

    base.iter()
        .map(|p| {
            let extra: f64 = others
                .iter()
                .filter_map(|s| nearest_within(s, p.at, tolerance).map(|i| s[i].value))
                .sum();
            SeriesPoint::new(p.at, p.value + extra)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}
