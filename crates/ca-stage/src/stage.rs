//! Stage — The core enum defining all canonical game phases

use serde::{Deserialize, Serialize};

/// A single cell coordinate on a player's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u8,
    pub col: u8,
}

impl CellPos {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// A symbol falling during gravity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallMove {
    /// Original row before gravity
    pub row: u8,
    pub col: u8,
    /// How many rows the symbol fell
    pub distance: u8,
}

/// Canonical game stage — the universal language of cascade game flow
///
/// Every renderer, sound bank, or telemetry sink responds to stages,
/// never to simulation internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════
    /// Spin accepted, grid about to be replaced
    SpinStart,

    /// Fresh grid revealed (symbol kind names, row-major)
    GridReveal {
        grid: Vec<Vec<String>>,
    },

    /// Grid scanned for matches
    EvaluateMatches,

    /// Spin complete, player idle again
    SpinEnd,

    // ═══════════════════════════════════════════════════════════════════
    // CASCADE LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════
    /// First match of the spin found, cascade chain begins
    CascadeStart,

    /// A matched run to highlight before removal
    MatchHighlight {
        positions: Vec<CellPos>,
        /// Kind name of the matched symbol
        symbol: String,
    },

    /// A special symbol fired (bomb blast, star cross, ...)
    SpecialTrigger {
        kind: String,
        origin: CellPos,
        affected: Vec<CellPos>,
    },

    /// Cells cleared from the grid
    SymbolsRemoved {
        positions: Vec<CellPos>,
    },

    /// Surviving symbols falling under gravity
    SymbolsFall {
        drops: Vec<FallMove>,
    },

    /// New symbols filling the emptied cells
    SymbolsRefill {
        positions: Vec<CellPos>,
    },

    /// One cascade step settled
    CascadeStep {
        step_index: u32,
        multiplier: f64,
    },

    /// Cascade chain exhausted
    CascadeEnd {
        total_steps: u32,
        total_win: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // SESSION LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════
    /// A global timed event activated
    EventStart {
        event: String,
        duration_secs: u32,
    },

    /// The active global event expired
    EventEnd {
        event: String,
    },

    /// One second elapsed on the session clock
    CountdownTick {
        remaining_secs: u32,
    },

    /// Session over, winners ranked
    SessionFinished {
        winners: Vec<String>,
    },
}

impl Stage {
    /// Stable SCREAMING_SNAKE identifier for routing/filtering
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::SpinStart => "SPIN_START",
            Stage::GridReveal { .. } => "GRID_REVEAL",
            Stage::EvaluateMatches => "EVALUATE_MATCHES",
            Stage::SpinEnd => "SPIN_END",
            Stage::CascadeStart => "CASCADE_START",
            Stage::MatchHighlight { .. } => "MATCH_HIGHLIGHT",
            Stage::SpecialTrigger { .. } => "SPECIAL_TRIGGER",
            Stage::SymbolsRemoved { .. } => "SYMBOLS_REMOVED",
            Stage::SymbolsFall { .. } => "SYMBOLS_FALL",
            Stage::SymbolsRefill { .. } => "SYMBOLS_REFILL",
            Stage::CascadeStep { .. } => "CASCADE_STEP",
            Stage::CascadeEnd { .. } => "CASCADE_END",
            Stage::EventStart { .. } => "EVENT_START",
            Stage::EventEnd { .. } => "EVENT_END",
            Stage::CountdownTick { .. } => "COUNTDOWN_TICK",
            Stage::SessionFinished { .. } => "SESSION_FINISHED",
        }
    }
}
