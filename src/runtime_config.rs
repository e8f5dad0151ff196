// =============================================================================
// Runtime Configuration — Scoring, alert and service settings
// =============================================================================
//
// Loaded once at startup from a JSON file.  All fields carry
// `#[serde(default)]` so that a partial (or empty) file still produces a
// usable configuration.  Signal mappings are only validated when the scorer
// is built from them.
// =============================================================================

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alerts::AlertThresholds;
use crate::signals::{default_signal_configs, ScoringConfigError, SignalConfig, SignalScorer};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_session_idle_timeout_secs() -> u64 {
    6 * 60 * 60
}

fn default_prune_interval_secs() -> u64 {
    60
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the REST API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Signals that feed the bullishness score, in display order.
    #[serde(default = "default_signal_configs")]
    pub signals: Vec<SignalConfig>,

    #[serde(default)]
    pub alert_thresholds: AlertThresholds,

    /// Sessions without activity for this long are dropped.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,

    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            signals: default_signal_configs(),
            alert_thresholds: AlertThresholds::default(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            signals = config.signals.len(),
            bind_addr = %config.bind_addr,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `PULSE_BIND_ADDR` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("PULSE_BIND_ADDR") {
            let addr = addr.trim();
            if !addr.is_empty() {
                self.bind_addr = addr.to_string();
            }
        }
    }

    /// Idle timeout as a chrono duration; errors if it does not fit.
    pub fn session_idle_timeout(&self) -> Result<chrono::Duration> {
        i64::try_from(self.session_idle_timeout_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                anyhow!(
                    "session_idle_timeout_secs {} is out of range",
                    self.session_idle_timeout_secs
                )
            })
    }

    /// Validate the signal mappings and build the scorer.
    pub fn build_scorer(&self) -> std::result::Result<SignalScorer, ScoringConfigError> {
        SignalScorer::from_configs(&self.signals)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RELATIVE_STRENGTH_30D, STABLE_30D, TVL_30D};

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.signals.len(), 3);
        assert_eq!(cfg.signals[0].name, TVL_30D);
        assert_eq!(cfg.signals[1].name, STABLE_30D);
        assert_eq!(cfg.signals[2].name, RELATIVE_STRENGTH_30D);
        assert!((cfg.signals[0].weight - 0.40).abs() < f64::EPSILON);
        assert!((cfg.signals[1].weight - 0.35).abs() < f64::EPSILON);
        assert!((cfg.signals[2].pos_bound - 15.0).abs() < f64::EPSILON);
        assert!((cfg.alert_thresholds.vix_elevated - 25.0).abs() < f64::EPSILON);
        assert!(cfg.build_scorer().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.signals, default_signal_configs());
        assert_eq!(cfg.session_idle_timeout_secs, 21_600);
        assert_eq!(cfg.prune_interval_secs, 60);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "signals": [
                { "name": "tvl_30d", "pos_bound": 25.0, "neg_bound": -25.0, "weight": 0.6 },
                { "name": "relative_strength_30d", "pos_bound": 15.0, "neg_bound": -15.0, "weight": 0.4 }
            ],
            "alert_thresholds": { "relative_weakness_pct": -7.5 }
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.signals.len(), 2);
        assert!((cfg.alert_thresholds.relative_weakness_pct - -7.5).abs() < f64::EPSILON);
        assert!((cfg.alert_thresholds.tvl_drawdown_pct - -10.0).abs() < f64::EPSILON);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");

        let scorer = cfg.build_scorer().unwrap();
        assert_eq!(scorer.signal_names().count(), 2);
    }

    #[test]
    fn zero_bound_is_rejected_when_building_scorer() {
        let json = r#"{ "signals": [ { "name": "tvl_30d", "pos_bound": 0.0, "neg_bound": -20.0, "weight": 0.4 } ] }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            cfg.build_scorer(),
            Err(ScoringConfigError::InvalidPositiveBound { .. })
        ));
    }

    #[test]
    fn idle_timeout_rejects_out_of_range_values() {
        let mut cfg = RuntimeConfig::default();
        assert_eq!(cfg.session_idle_timeout().unwrap(), chrono::Duration::hours(6));

        cfg.session_idle_timeout_secs = u64::try_from(i64::MAX / 1000 + 1).unwrap();
        assert!(cfg.session_idle_timeout().is_err());

        cfg.session_idle_timeout_secs = u64::MAX;
        assert!(cfg.session_idle_timeout().is_err());
    }

    #[test]
    fn load_reads_file_and_reports_missing() {
        let dir = std::env::temp_dir().join(format!("pulse-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pulse_config.json");

        assert!(RuntimeConfig::load(&path).is_err());

        std::fs::write(&path, r#"{ "bind_addr": "127.0.0.1:9000" }"#).unwrap();
        let cfg = RuntimeConfig::load(&path).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
