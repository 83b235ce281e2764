//! Session configuration and fail-fast validation

use serde::{Deserialize, Serialize};

use crate::cascade::DEFAULT_MULTIPLIERS;

/// Static per-session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Side length of every player's grid
    pub grid_size: usize,
    /// Session duration in seconds
    pub duration_secs: u32,
    /// Spins available to each player
    pub max_spins_per_player: u32,
    /// Per-depth cascade score multipliers
    pub cascade_multipliers: Vec<f64>,
    /// How many top players count as winners
    pub winner_count: usize,
    /// Enable the betting overlay
    pub betting_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            duration_secs: 180,
            max_spins_per_player: 10,
            cascade_multipliers: DEFAULT_MULTIPLIERS.to_vec(),
            winner_count: 1,
            betting_enabled: false,
        }
    }
}

impl SessionConfig {
    /// Validate at session-init time; a bad config is a programmer error,
    /// not a runtime condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            // A 3-length run cannot exist on a smaller grid
            return Err(ConfigError::GridTooSmall {
                size: self.grid_size,
            });
        }
        if self.duration_secs == 0 {
            return Err(ConfigError::InvalidDuration);
        }
        if self.max_spins_per_player == 0 {
            return Err(ConfigError::InvalidSpinCount);
        }
        if self.cascade_multipliers.is_empty() {
            return Err(ConfigError::EmptyMultiplierTable);
        }
        if self.winner_count == 0 {
            return Err(ConfigError::InvalidWinnerCount);
        }
        Ok(())
    }
}

/// Session initialization error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size {size} cannot hold a 3-length match")]
    GridTooSmall { size: usize },

    #[error("session duration must be positive")]
    InvalidDuration,

    #[error("max spins per player must be positive")]
    InvalidSpinCount,

    #[error("cascade multiplier table must not be empty")]
    EmptyMultiplierTable,

    #[error("winner count must be positive")]
    InvalidWinnerCount,

    #[error("session requires at least one participant")]
    NoParticipants,
}
