//! Timing profiles for stage event generation
//!
//! The simulation resolves synchronously; these timestamps exist so a
//! renderer can replay a spin at a human pace without the core sleeping.

use serde::{Deserialize, Serialize};

/// Timing profile for stage events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// Instant, for tests and batch simulation
    Studio,
}

/// Detailed timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Delay from spin start to grid reveal (ms)
    pub reveal_delay_ms: f64,

    /// Match highlight duration before removal (ms)
    pub highlight_duration_ms: f64,

    /// Symbol removal animation window (ms)
    pub removal_duration_ms: f64,

    /// Fall time per row of drop distance (ms)
    pub fall_per_row_ms: f64,

    /// Refill pop-in window (ms)
    pub refill_duration_ms: f64,

    /// Pause between cascade steps (ms)
    pub cascade_pause_ms: f64,

    /// Minimum spacing between consecutive stage events (ms)
    pub min_event_interval_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            reveal_delay_ms: 1000.0,
            highlight_duration_ms: 250.0,
            removal_duration_ms: 300.0,
            fall_per_row_ms: 120.0,
            refill_duration_ms: 200.0,
            cascade_pause_ms: 400.0,
            min_event_interval_ms: 16.0,
        }
    }

    /// Turbo timing (roughly 2.5x faster)
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            reveal_delay_ms: 400.0,
            highlight_duration_ms: 100.0,
            removal_duration_ms: 120.0,
            fall_per_row_ms: 50.0,
            refill_duration_ms: 80.0,
            cascade_pause_ms: 150.0,
            min_event_interval_ms: 8.0,
        }
    }

    /// Studio timing - everything instant
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            reveal_delay_ms: 0.0,
            highlight_duration_ms: 0.0,
            removal_duration_ms: 0.0,
            fall_per_row_ms: 0.0,
            refill_duration_ms: 0.0,
            cascade_pause_ms: 0.0,
            min_event_interval_ms: 0.0,
        }
    }

    /// Config for a profile
    pub fn for_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Generates monotonically advancing timestamps for one spin's stage events
#[derive(Debug, Clone)]
pub struct TimestampGenerator {
    config: TimingConfig,
    cursor_ms: f64,
}

impl TimestampGenerator {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config,
            cursor_ms: 0.0,
        }
    }

    /// Current cursor position
    pub fn current(&self) -> f64 {
        self.cursor_ms
    }

    /// Reset to the start of a new spin
    pub fn reset(&mut self) {
        self.cursor_ms = 0.0;
    }

    /// Advance the cursor by an arbitrary delay and return the new position
    pub fn advance(&mut self, delay_ms: f64) -> f64 {
        let delay = delay_ms.max(self.config.min_event_interval_ms);
        self.cursor_ms += delay;
        self.cursor_ms
    }

    /// Timestamp for the grid reveal
    pub fn reveal(&mut self) -> f64 {
        self.advance(self.config.reveal_delay_ms)
    }

    /// Timestamp for a match highlight
    pub fn highlight(&mut self) -> f64 {
        self.advance(self.config.highlight_duration_ms)
    }

    /// Timestamp for a removal window
    pub fn removal(&mut self) -> f64 {
        self.advance(self.config.removal_duration_ms)
    }

    /// Timestamp after symbols fell, scaled by the deepest drop
    pub fn fall(&mut self, max_distance: u8) -> f64 {
        self.advance(self.config.fall_per_row_ms * f64::from(max_distance.max(1)))
    }

    /// Timestamp for the refill pop-in
    pub fn refill(&mut self) -> f64 {
        self.advance(self.config.refill_duration_ms)
    }

    /// Timestamp for the pause between cascade steps
    pub fn cascade_pause(&mut self) -> f64 {
        self.advance(self.config.cascade_pause_ms)
    }
}
