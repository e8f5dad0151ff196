// =============================================================================
// Signals Module
// =============================================================================
//
// Bullishness scoring pipeline:
// - Per-signal mapping configuration (saturation bounds + weight)
// - Percentage change to 0–100 sub-score
// - Weighted composite with renormalisation over present signals
// - Per-session score history for deltas and the traffic light

pub mod mapping;
pub mod score_history;
pub mod subscore;
pub mod weighted_score;

pub use mapping::{default_signal_configs, ScoringConfigError, SignalConfig};
pub use score_history::ScoreHistory;
pub use weighted_score::{ScoreReport, SignalScorer};
