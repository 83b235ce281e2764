//! Timed global events and their probabilistic scheduler

use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Minimum seconds between events
pub const MIN_EVENT_INTERVAL_SECS: u32 = 20;

/// The compressed interval inside the final countdown
pub const FINAL_EVENT_INTERVAL_SECS: u32 = 5;

/// Window before session end with doubled chances and forced climaxes
pub const FINAL_COUNTDOWN_SECS: u32 = 30;

/// Top/bottom gap required for an organic reversal chance
pub const REVERSAL_GAP_THRESHOLD: u64 = 50_000;

/// Gap above which the forced final event becomes a reversal chance
pub const FORCED_REVERSAL_GAP: u64 = 30_000;

/// Cascade iterations guaranteed while mega time is live
pub const MEGA_TIME_MIN_CASCADES: u32 = 10;

/// The closed set of global timed events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    /// Global x3 score multiplier
    GoldenRush,
    /// Grids generate special symbols only
    SymbolRain,
    /// Bottom-3 scorers get a guaranteed mega jackpot planted
    ReversalChance,
    /// Every spin resolves with at least 10 forced cascades
    MegaTime,
}

/// All event types, in gating order
pub const EVENT_TYPES: [EventType; 4] = [
    EventType::GoldenRush,
    EventType::SymbolRain,
    EventType::ReversalChance,
    EventType::MegaTime,
];

impl EventType {
    /// How long the event's effects last
    pub fn duration_secs(&self) -> u32 {
        match self {
            EventType::GoldenRush => 15,
            EventType::SymbolRain => 20,
            EventType::ReversalChance => 15,
            EventType::MegaTime => 10,
        }
    }

    /// Global score multiplier while live
    pub fn score_multiplier(&self) -> f64 {
        match self {
            EventType::GoldenRush => 3.0,
            _ => 1.0,
        }
    }

    /// Earliest session second at which the event may fire
    pub fn min_elapsed_secs(&self) -> u32 {
        match self {
            EventType::GoldenRush => 30,
            EventType::SymbolRain => 45,
            EventType::ReversalChance => 60,
            EventType::MegaTime => 90,
        }
    }

    /// Base trigger probability (doubled in the final countdown)
    pub fn trigger_chance(&self) -> f64 {
        match self {
            EventType::GoldenRush => 0.30,
            EventType::SymbolRain => 0.25,
            EventType::ReversalChance => 0.40,
            EventType::MegaTime => 0.20,
        }
    }

    /// Stable camelCase name for the renderer boundary
    pub fn kind_name(&self) -> &'static str {
        match self {
            EventType::GoldenRush => "goldenRush",
            EventType::SymbolRain => "symbolRain",
            EventType::ReversalChance => "reversalChance",
            EventType::MegaTime => "megaTime",
        }
    }
}

/// The single live event; its side effects revert when it expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event: EventType,
    /// Session-elapsed second the event started
    pub started_at_elapsed: u32,
    pub duration_secs: u32,
}

impl ActiveEvent {
    pub fn new(event: EventType, elapsed: u32) -> Self {
        Self {
            event,
            started_at_elapsed: elapsed,
            duration_secs: event.duration_secs(),
        }
    }

    /// Seconds left at the given session-elapsed time
    pub fn remaining(&self, elapsed: u32) -> u32 {
        (self.started_at_elapsed + self.duration_secs).saturating_sub(elapsed)
    }

    pub fn is_expired(&self, elapsed: u32) -> bool {
        self.remaining(elapsed) == 0
    }
}

/// Probabilistic trigger of timed events, gated by interval and score spread
pub struct EventScheduler {
    rng: StdRng,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Decide whether a new event fires at this tick.
    ///
    /// The interval gate takes precedence over all probability rolls. The
    /// caller must ensure no event is currently active.
    pub fn maybe_trigger(
        &mut self,
        elapsed: u32,
        scores: &[u64],
        last_event_time: u32,
        remaining: u32,
    ) -> Option<EventType> {
        let final_countdown = remaining <= FINAL_COUNTDOWN_SECS;
        let min_interval = if final_countdown {
            FINAL_EVENT_INTERVAL_SECS
        } else {
            MIN_EVENT_INTERVAL_SECS
        };
        if elapsed.saturating_sub(last_event_time) < min_interval {
            return None;
        }

        let gap = score_gap(scores);
        let mut candidates = Vec::new();

        for event in EVENT_TYPES {
            if elapsed < event.min_elapsed_secs() {
                continue;
            }
            if event == EventType::ReversalChance && gap < REVERSAL_GAP_THRESHOLD {
                continue;
            }
            let chance = if final_countdown {
                event.trigger_chance() * 2.0
            } else {
                event.trigger_chance()
            };
            if self.rng.random::<f64>() < chance {
                candidates.push(event);
            }
        }

        // The final countdown always climaxes: force a dramatic event when
        // nothing fired organically.
        if final_countdown && candidates.is_empty() {
            if gap > FORCED_REVERSAL_GAP {
                candidates.push(EventType::ReversalChance);
            } else {
                candidates.push(EventType::GoldenRush);
                candidates.push(EventType::MegaTime);
            }
        }

        if candidates.is_empty() {
            None
        } else {
            Some(candidates[self.rng.random_range(0..candidates.len())])
        }
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-to-bottom score spread, 0 for fewer than two players
pub fn score_gap(scores: &[u64]) -> u64 {
    match (scores.iter().max(), scores.iter().min()) {
        (Some(&max), Some(&min)) if scores.len() > 1 => max - min,
        _ => 0,
    }
}

/// Ids of the lowest `count` scorers, worst first
pub fn bottom_scorers(standings: &[(String, u64)], count: usize) -> Vec<String> {
    let mut sorted: Vec<_> = standings.to_vec();
    sorted.sort_by_key(|(_, score)| *score);
    sorted.into_iter().take(count).map(|(id, _)| id).collect()
}
