// =============================================================================
// Score Mapping — Per-signal saturation bounds and weights
// =============================================================================
//
// A mapping is validated once, when the scorer is built.  After that the
// bounds are fixed for every computation that uses them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{RELATIVE_STRENGTH_30D, STABLE_30D, TVL_30D};

/// Rejections raised while building a scorer from configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringConfigError {
    #[error("signal name must not be empty")]
    EmptyName,

    #[error("signal '{0}' is configured more than once")]
    DuplicateSignal(String),

    #[error("no signals configured")]
    NoSignals,

    #[error("signal '{name}': positive bound must be finite and > 0 (got {value})")]
    InvalidPositiveBound { name: String, value: f64 },

    #[error("signal '{name}': negative bound must be finite and < 0 (got {value})")]
    InvalidNegativeBound { name: String, value: f64 },

    #[error("signal '{name}': weight must lie in [0, 1] (got {value})")]
    InvalidWeight { name: String, value: f64 },
}

/// Serialisable configuration entry for one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub name: String,
    /// Percentage at which the sub-score saturates to 100.
    pub pos_bound: f64,
    /// Percentage at which the sub-score saturates to 0.
    pub neg_bound: f64,
    pub weight: f64,
}

impl SignalConfig {
    pub fn new(name: impl Into<String>, pos_bound: f64, neg_bound: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            pos_bound,
            neg_bound,
            weight,
        }
    }
}

/// The signal set observed in practice: two capital-flow signals at ±20 and
/// the noisier relative-strength deviation at ±15.
pub fn default_signal_configs() -> Vec<SignalConfig> {
    vec![
        SignalConfig::new(TVL_30D, 20.0, -20.0, 0.40),
        SignalConfig::new(STABLE_30D, 20.0, -20.0, 0.35),
        SignalConfig::new(RELATIVE_STRENGTH_30D, 15.0, -15.0, 0.25),
    ]
}

/// A validated per-signal mapping. Construct through [`ScoreMapping::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreMapping {
    pos: f64,
    neg: f64,
    weight: f64,
}

impl ScoreMapping {
    pub fn new(name: &str, pos: f64, neg: f64, weight: f64) -> Result<Self, ScoringConfigError> {
        if !pos.is_finite() || pos <= 0.0 {
            return Err(ScoringConfigError::InvalidPositiveBound {
                name: name.to_string(),
                value: pos,
            });
        }
        if !neg.is_finite() || neg >= 0.0 {
            return Err(ScoringConfigError::InvalidNegativeBound {
                name: name.to_string(),
                value: neg,
            });
        }
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(ScoringConfigError::InvalidWeight {
                name: name.to_string(),
                value: weight,
            });
        }
        Ok(Self { pos, neg, weight })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Map a percentage change through this signal's bounds.
    pub fn subscore(&self, pct: Option<f64>) -> Option<f64> {
        super::subscore::percentage_to_subscore(pct, self.pos, self.neg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_default_configs() {
        for cfg in default_signal_configs() {
            assert!(ScoreMapping::new(&cfg.name, cfg.pos_bound, cfg.neg_bound, cfg.weight).is_ok());
        }
    }

    #[test]
    fn rejects_zero_bounds() {
        assert_eq!(
            ScoreMapping::new("tvl_30d", 0.0, -20.0, 0.4),
            Err(ScoringConfigError::InvalidPositiveBound {
                name: "tvl_30d".into(),
                value: 0.0
            })
        );
        assert!(matches!(
            ScoreMapping::new("tvl_30d", 20.0, 0.0, 0.4),
            Err(ScoringConfigError::InvalidNegativeBound { .. })
        ));
    }

    #[test]
    fn rejects_wrong_sign_and_non_finite_bounds() {
        assert!(ScoreMapping::new("x", -5.0, -20.0, 0.4).is_err());
        assert!(ScoreMapping::new("x", 20.0, 20.0, 0.4).is_err());
        assert!(ScoreMapping::new("x", f64::NAN, -20.0, 0.4).is_err());
        assert!(ScoreMapping::new("x", 20.0, f64::NEG_INFINITY, 0.4).is_err());
    }

    #[test]
    fn rejects_weight_outside_unit_interval() {
        assert!(matches!(
            ScoreMapping::new("x", 20.0, -20.0, 1.5),
            Err(ScoringConfigError::InvalidWeight { .. })
        ));
        assert!(ScoreMapping::new("x", 20.0, -20.0, -0.1).is_err());
        assert!(ScoreMapping::new("x", 20.0, -20.0, 0.0).is_ok());
        assert!(ScoreMapping::new("x", 20.0, -20.0, 1.0).is_ok());
    }

    #[test]
    fn error_messages_name_the_signal() {
        let err = ScoreMapping::new("stable_30d", 0.0, -20.0, 0.35).unwrap_err();
        assert!(err.to_string().contains("stable_30d"));
    }
}
