use serde::{Deserialize, Serialize};

use crate::events::UpdateEvent;

/// Per-seat aggregates accumulated over a match, for the external
/// persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatStats {
    pub name: String,
    pub model_name: String,
    pub latency_ms_sum: f64,
    pub total_tokens: u64,
    pub invalid_moves: u32,
}

impl SeatStats {
    pub fn new(name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_name: model_name.into(),
            latency_ms_sum: 0.0,
            total_tokens: 0,
            invalid_moves: 0,
        }
    }
}

/// Everything the persistence collaborator receives once a match ends:
/// final winner, per-seat aggregates, and the full ordered event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub match_id: String,
    pub winner: Option<String>,
    pub winner_index: Option<usize>,
    pub error_by: Option<String>,
    pub turns: u32,
    pub seats: Vec<SeatStats>,
    pub events: Vec<UpdateEvent>,
    /// RFC3339 timestamp taken when the loop exited.
    pub finished_at: String,
}
