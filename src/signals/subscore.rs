// =============================================================================
// Sub-score mapping — percentage change to a 0–100 score
// =============================================================================
//
// Piecewise-linear around the neutral point:
//   pct == 0    =>  50
//   pct == pos  =>  100   (and anything above saturates)
//   pct == neg  =>  0     (and anything below saturates)
//
// The two halves use independent bounds so that noisy signals can saturate
// earlier than coarse capital-flow signals.

/// Map an optional percentage change into an optional sub-score in `[0, 100]`.
///
/// `pos` is used as the denominator for non-negative changes and `|neg|` for
/// negative ones.  A zero or non-finite denominator yields `None` instead of
/// dividing by zero; validated [`ScoreMapping`](super::mapping::ScoreMapping)
/// bounds never hit that path.  `NaN` inputs are treated as unavailable.
pub fn percentage_to_subscore(pct: Option<f64>, pos: f64, neg: f64) -> Option<f64> {
    let pct = pct.filter(|p| !p.is_nan())?;

    let denominator = if pct >= 0.0 { pos } else { neg.abs() };
    if !denominator.is_finite() || denominator <= 0.0 {
        return None;
    }

    let raw = 50.0 + (pct / denominator) * 50.0;
    Some(raw.clamp(0.0, 100.0))
}
