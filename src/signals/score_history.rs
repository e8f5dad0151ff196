// =============================================================================
// Score History — the single previously computed score of a session
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::RiskLight;

/// Last composite score held by one session.
///
/// `Empty --record(Some)--> Holding`, `Holding --record(Some)--> Holding`
/// (overwritten), `Holding --record(None)--> Holding` (unchanged).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScoreHistory {
    #[default]
    Empty,
    Holding {
        value: f64,
        computed_at: DateTime<Utc>,
    },
}

impl ScoreHistory {
    pub fn previous(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Holding { value, .. } => Some(*value),
        }
    }

    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Empty => None,
            Self::Holding { computed_at, .. } => Some(*computed_at),
        }
    }

    /// Overwrite with `current` when present; a data gap keeps the last score.
    pub fn record(&mut self, current: Option<f64>, at: DateTime<Utc>) {
        if let Some(value) = current {
            *self = Self::Holding {
                value,
                computed_at: at,
            };
        }
    }
}

/// Delta against the previous score plus the traffic light of the current one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub delta: Option<f64>,
    pub classification: Option<RiskLight>,
}

/// Compute the delta and classification for `current`, then advance `history`.
pub fn score_with_delta_and_light(current: Option<f64>, history: &mut ScoreHistory) -> ScoreOutcome {
    score_with_delta_and_light_at(current, history, Utc::now())
}

pub(crate) fn score_with_delta_and_light_at(
    current: Option<f64>,
    history: &mut ScoreHistory,
    at: DateTime<Utc>,
) -> ScoreOutcome {
    let delta = match (current, history.previous()) {
        (Some(cur), Some(prev)) => Some(cur - prev),
        _ => None,
    };
    let classification = current.map(RiskLight::classify);

    history.record(current, at);

    ScoreOutcome {
        delta,
        classification,
    }
}
