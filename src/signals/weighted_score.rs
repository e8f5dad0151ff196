// =============================================================================
// Weighted Scorer — Bullishness score from percentage-change signals
// =============================================================================
//
// Each configured signal is mapped to a 0–100 sub-score, the present
// sub-scores are averaged by weight, and the result is compared against the
// session's previous score.  Absent signals drop out of both the numerator
// and the denominator, so the score degrades as sources go missing instead
// of being dragged toward zero.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::mapping::{ScoreMapping, ScoringConfigError, SignalConfig};
use super::score_history::{score_with_delta_and_light_at, ScoreHistory};
use crate::types::{signal, RiskLight, Signals};

/// Weighted average of the present sub-scores.
///
/// Returns `None` when no pair has both a sub-score and a positive total
/// weight ("not enough data yet").
pub fn aggregate_score<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, f64)>,
{
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (sub_score, weight) in pairs {
        if let Some(s) = sub_score {
            numerator += s * weight;
            denominator += weight;
        }
    }

    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// The contribution of a single signal to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalContribution {
    pub signal: String,
    pub pct_change: Option<f64>,
    pub sub_score: Option<f64>,
    pub weight: f64,
}

/// Result of one scoring invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub score: Option<f64>,
    pub delta: Option<f64>,
    pub classification: Option<RiskLight>,
    /// One entry per configured signal, in configuration order.
    pub breakdown: Vec<SignalContribution>,
}

impl ScoreReport {
    pub fn sub_score(&self, signal: &str) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|c| c.signal == signal)
            .and_then(|c| c.sub_score)
    }
}

#[derive(Debug, Clone)]
struct ConfiguredSignal {
    name: String,
    mapping: ScoreMapping,
}

/// The scoring engine. Holds validated mappings only; per-session state is
/// passed in explicitly.
#[derive(Debug, Clone)]
pub struct SignalScorer {
    signals: Vec<ConfiguredSignal>,
}

impl SignalScorer {
    /// Validate `configs` and build a scorer. Order is preserved in reports.
    pub fn from_configs(configs: &[SignalConfig]) -> Result<Self, ScoringConfigError> {
        if configs.is_empty() {
            return Err(ScoringConfigError::NoSignals);
        }

        let mut seen = HashSet::new();
        let mut signals = Vec::with_capacity(configs.len());
        for cfg in configs {
            let name = cfg.name.trim();
            if name.is_empty() {
                return Err(ScoringConfigError::EmptyName);
            }
            if !seen.insert(name.to_string()) {
                return Err(ScoringConfigError::DuplicateSignal(name.to_string()));
            }
            signals.push(ConfiguredSignal {
                name: name.to_string(),
                mapping: ScoreMapping::new(name, cfg.pos_bound, cfg.neg_bound, cfg.weight)?,
            });
        }

        Ok(Self { signals })
    }

    /// Names of the configured signals, in order.
    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.signals.iter().map(|s| s.name.as_str())
    }

    /// Per-signal breakdown and composite score, without touching any history.
    pub fn evaluate(&self, signals: &Signals) -> (Option<f64>, Vec<SignalContribution>) {
        for key in signals.keys() {
            if !self.signals.iter().any(|s| &s.name == key) {
                debug!(signal = %key, "ignoring unconfigured signal");
            }
        }

        let breakdown: Vec<SignalContribution> = self
            .signals
            .iter()
            .map(|s| {
                let pct_change = signal(signals, &s.name);
                SignalContribution {
                    signal: s.name.clone(),
                    pct_change,
                    sub_score: s.mapping.subscore(pct_change),
                    weight: s.mapping.weight(),
                }
            })
            .collect();

        let score = aggregate_score(breakdown.iter().map(|c| (c.sub_score, c.weight)));
        (score, breakdown)
    }

    /// Score `signals` against the caller's history and advance it.
    pub fn compute(&self, signals: &Signals, history: &mut ScoreHistory) -> ScoreReport {
        self.compute_at(signals, history, Utc::now())
    }

    pub fn compute_at(
        &self,
        signals: &Signals,
        history: &mut ScoreHistory,
        at: DateTime<Utc>,
    ) -> ScoreReport {
        let (score, breakdown) = self.evaluate(signals);
        let outcome = score_with_delta_and_light_at(score, history, at);

        debug!(
            score = ?score,
            delta = ?outcome.delta,
            classification = ?outcome.classification,
            "bullishness score computed"
        );

        ScoreReport {
            score,
            delta: outcome.delta,
            classification: outcome.classification,
            breakdown,
        }
    }

    /// Score without a session: the delta is always absent.
    pub fn preview(&self, signals: &Signals) -> ScoreReport {
        let mut scratch = ScoreHistory::Empty;
        self.compute(signals, &mut scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::mapping::default_signal_configs;
    use crate::types::{RELATIVE_STRENGTH_30D, STABLE_30D, TVL_30D};

    const EPS: f64 = 1e-9;

    fn default_scorer() -> SignalScorer {
        SignalScorer::from_configs(&default_signal_configs()).unwrap()
    }

    fn signals(pairs: &[(&str, Option<f64>)]) -> Signals {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn aggregate_empty_is_absent() {
        assert_eq!(aggregate_score(Vec::<(Option<f64>, f64)>::new()), None);
    }

    #[test]
    fn aggregate_single_returns_itself() {
        for w in [0.01, 0.25, 1.0, 7.0] {
            assert!((aggregate_score([(Some(63.0), w)]).unwrap() - 63.0).abs() < EPS);
        }
    }

    #[test]
    fn aggregate_is_weighted_average() {
        assert!((aggregate_score([(Some(80.0), 1.0), (Some(20.0), 1.0)]).unwrap() - 50.0).abs() < EPS);
        assert!((aggregate_score([(Some(100.0), 3.0), (Some(0.0), 1.0)]).unwrap() - 75.0).abs() < EPS);
    }

    #[test]
    fn aggregate_excludes_absent_instead_of_zero_filling() {
        assert!((aggregate_score([(Some(80.0), 0.5), (None, 0.5)]).unwrap() - 80.0).abs() < EPS);
    }

    #[test]
    fn aggregate_all_absent_or_zero_weight_is_absent() {
        assert_eq!(aggregate_score([(None, 0.4), (None, 0.6)]), None);
        assert_eq!(aggregate_score([(Some(70.0), 0.0)]), None);
    }

    #[test]
    fn end_to_end_bearish_scenario() {
        let scorer = default_scorer();
        let mut history = ScoreHistory::Empty;
        let report = scorer.compute(
            &signals(&[
                (TVL_30D, Some(-12.0)),
                (STABLE_30D, Some(-11.0)),
                (RELATIVE_STRENGTH_30D, Some(-6.0)),
            ]),
            &mut history,
        );

        assert!((report.sub_score(TVL_30D).unwrap() - 20.0).abs() < EPS);
        assert!((report.sub_score(STABLE_30D).unwrap() - 22.5).abs() < EPS);
        assert!((report.sub_score(RELATIVE_STRENGTH_30D).unwrap() - 30.0).abs() < EPS);
        assert!((report.score.unwrap() - 23.375).abs() < EPS);
        assert_eq!(report.classification, Some(RiskLight::Low));
        assert_eq!(report.delta, None);
        assert!((history.previous().unwrap() - 23.375).abs() < EPS);
    }

    #[test]
    fn missing_signal_renormalises_weights() {
        let scorer = default_scorer();
        // tvl=+10 => 75 (w .40), rel=+7.5 => 75 (w .25); stable missing.
        let report = scorer.preview(&signals(&[
            (TVL_30D, Some(10.0)),
            (RELATIVE_STRENGTH_30D, Some(7.5)),
        ]));
        assert!((report.score.unwrap() - 75.0).abs() < EPS);
        assert_eq!(report.sub_score(STABLE_30D), None);
        assert_eq!(report.breakdown.len(), 3);
        assert_eq!(report.breakdown[1].pct_change, None);
    }

    #[test]
    fn no_signals_means_no_score_and_history_untouched() {
        let scorer = default_scorer();
        let mut history = ScoreHistory::Empty;
        scorer.compute(&signals(&[(TVL_30D, Some(0.0))]), &mut history);
        assert_eq!(history.previous(), Some(50.0));

        let report = scorer.compute(&Signals::new(), &mut history);
        assert_eq!(report.score, None);
        assert_eq!(report.classification, None);
        assert_eq!(report.delta, None);
        assert_eq!(history.previous(), Some(50.0));
    }

    #[test]
    fn delta_tracks_the_explicit_history() {
        let scorer = default_scorer();
        let mut history = ScoreHistory::Empty;
        scorer.compute(&signals(&[(TVL_30D, Some(20.0))]), &mut history);
        let report = scorer.compute(&signals(&[(TVL_30D, Some(-20.0))]), &mut history);
        assert!((report.delta.unwrap() - -100.0).abs() < EPS);
    }

    #[test]
    fn separate_histories_do_not_interfere() {
        let scorer = default_scorer();
        let mut a = ScoreHistory::Empty;
        let mut b = ScoreHistory::Empty;
        scorer.compute(&signals(&[(TVL_30D, Some(20.0))]), &mut a);
        let report = scorer.compute(&signals(&[(TVL_30D, Some(0.0))]), &mut b);
        assert_eq!(report.delta, None);
        assert_eq!(a.previous(), Some(100.0));
        assert_eq!(b.previous(), Some(50.0));
    }

    #[test]
    fn configured_signal_set_drives_the_breakdown() {
        let scorer = SignalScorer::from_configs(&[
            SignalConfig::new(TVL_30D, 20.0, -20.0, 0.6),
            SignalConfig::new(RELATIVE_STRENGTH_30D, 15.0, -15.0, 0.4),
        ])
        .unwrap();
        let report = scorer.preview(&signals(&[
            (TVL_30D, Some(0.0)),
            (STABLE_30D, Some(-50.0)),
            (RELATIVE_STRENGTH_30D, Some(15.0)),
        ]));
        // stable_30d is not configured and has no effect.
        assert!((report.score.unwrap() - 70.0).abs() < EPS);
        assert_eq!(report.classification, Some(RiskLight::High));
        let names: Vec<&str> = scorer.signal_names().collect();
        assert_eq!(names, vec![TVL_30D, RELATIVE_STRENGTH_30D]);
    }

    #[test]
    fn from_configs_rejects_bad_sets() {
        assert_eq!(SignalScorer::from_configs(&[]).unwrap_err(), ScoringConfigError::NoSignals);

        let mut dup = default_signal_configs();
        dup.push(SignalConfig::new(TVL_30D, 10.0, -10.0, 0.1));
        assert_eq!(
            SignalScorer::from_configs(&dup).unwrap_err(),
            ScoringConfigError::DuplicateSignal(TVL_30D.into())
        );

        let blank = [SignalConfig::new("  ", 10.0, -10.0, 0.1)];
        assert_eq!(SignalScorer::from_configs(&blank).unwrap_err(), ScoringConfigError::EmptyName);

        let zero = [SignalConfig::new(TVL_30D, 20.0, 0.0, 0.4)];
        assert!(matches!(
            SignalScorer::from_configs(&zero),
            Err(ScoringConfigError::InvalidNegativeBound { .. })
        ));
    }

    #[test]
    fn score_stays_in_range_for_extreme_inputs() {
        let scorer = default_scorer();
        for v in [-1e9, -50.0, -0.1, 0.0, 0.1, 50.0, 1e9] {
            let report = scorer.preview(&signals(&[
                (TVL_30D, Some(v)),
                (STABLE_30D, Some(-v)),
                (RELATIVE_STRENGTH_30D, Some(v / 2.0)),
            ]));
            let s = report.score.unwrap();
            assert!((0.0..=100.0).contains(&s));
        }
    }
}
