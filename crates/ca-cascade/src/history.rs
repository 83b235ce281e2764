//! Terminal result record for the external history store
//!
//! Emitted exactly once when a session finishes; the core never reads it
//! back. Field names are a stable contract with the persistence
//! collaborator.

use serde::{Deserialize, Serialize};

/// The game type tag under which results are filed
pub const GAME_TYPE: &str = "slotCascade";

/// One participant's final standing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    pub name: String,
    pub score: u64,
    /// 1-based final placement
    pub rank: usize,
}

/// The terminal session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_type: String,
    pub participants: Vec<ParticipantRecord>,
    pub winners: Vec<ParticipantRecord>,
    /// Snapshot of the session config, as an opaque blob
    pub game_config: serde_json::Value,
    /// Unix epoch milliseconds
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub duration_ms: u64,
}

/// Current unix epoch milliseconds; 0 if the clock is before the epoch
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_field_names_stable() {
        let result = GameResult {
            game_type: GAME_TYPE.to_string(),
            participants: vec![ParticipantRecord {
                id: "p1".into(),
                name: "Mika".into(),
                score: 1200,
                rank: 1,
            }],
            winners: vec![],
            game_config: serde_json::json!({ "grid_size": 3 }),
            started_at_ms: 1_000,
            ended_at_ms: 181_000,
            duration_ms: 180_000,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["game_type"], "slotCascade");
        assert_eq!(json["participants"][0]["rank"], 1);
        assert!(json.get("winners").is_some());
        assert_eq!(json["duration_ms"], 180_000);
    }
}
