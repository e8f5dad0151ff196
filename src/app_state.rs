// =============================================================================
// Central Application State — Macro Pulse
// =============================================================================
//
// Ties together the validated scorer, the alert configuration and the
// per-session score histories.  Shared across handlers via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock inside the session store.
//   - The scorer and thresholds are immutable after startup.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alerts::{evaluate_alerts, Alert, AlertThresholds};
use crate::runtime_config::RuntimeConfig;
use crate::session::SessionStore;
use crate::signals::{ScoreReport, ScoringConfigError, SignalScorer};
use crate::summary::{local_summary, DashboardSnapshot};
use crate::types::{Levels, MacroReadings, Signals};

/// Everything returned for one scoring request.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub report: ScoreReport,
    pub alerts: Vec<Alert>,
    pub summary: String,
    pub snapshot: DashboardSnapshot,
    pub computed_at: String,
}

pub struct AppState {
    /// Incremented on every successful session mutation.
    pub state_version: AtomicU64,

    pub config: RuntimeConfig,
    pub scorer: SignalScorer,
    pub alert_thresholds: AlertThresholds,
    pub sessions: SessionStore,

    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build state from `config`; fails if the signal mappings are invalid.
    pub fn new(config: RuntimeConfig) -> Result<Self, ScoringConfigError> {
        let scorer = config.build_scorer()?;
        Ok(Self {
            state_version: AtomicU64::new(1),
            alert_thresholds: config.alert_thresholds,
            scorer,
            config,
            sessions: SessionStore::new(),
            start_time: std::time::Instant::now(),
        })
    }

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    /// Score against a session's history. `None` if the session is unknown.
    pub fn score_session(
        &self,
        session_id: &uuid::Uuid,
        signals: &Signals,
        macro_readings: &MacroReadings,
        levels: Levels,
    ) -> Option<ScoreResponse> {
        let now = Utc::now();
        let report = self
            .sessions
            .with_history(session_id, |history| self.scorer.compute_at(signals, history, now))?;
        self.increment_version();
        Some(self.respond(report, signals, macro_readings, levels, now))
    }

    /// Score without any session history.
    pub fn score_preview(
        &self,
        signals: &Signals,
        macro_readings: &MacroReadings,
        levels: Levels,
    ) -> ScoreResponse {
        let report = self.scorer.preview(signals);
        self.respond(report, signals, macro_readings, levels, Utc::now())
    }

    fn respond(
        &self,
        report: ScoreReport,
        signals: &Signals,
        macro_readings: &MacroReadings,
        levels: Levels,
        at: DateTime<Utc>,
    ) -> ScoreResponse {
        let alerts = evaluate_alerts(signals, macro_readings, &self.alert_thresholds);
        let snapshot = DashboardSnapshot::new(at, signals, macro_readings, report.score)
            .with_levels(levels.tvl_latest, levels.ratio_latest);
        let summary = local_summary(&snapshot, self.alert_thresholds.vix_elevated);

        ScoreResponse {
            report,
            alerts,
            summary,
            snapshot,
            computed_at: at.to_rfc3339(),
        }
    }
}
