//! # ca-cascade — CascadeArena Match-3 Engine
//!
//! A multiplayer match-3 cascade simulation core: per-player spins resolve
//! through grid generation, run matching, special-symbol effects, gravity
//! and refill, chained until no matches remain. A session controller owns
//! all player state, drives the one-second countdown, schedules timed global
//! events, and settles optional side bets into final placements.
//!
//! The core never renders, never sleeps, and never persists: each spin
//! returns a complete [`session::SpinReport`] of intermediate grids and
//! effects that a renderer animates at its own pace (see `ca-stage`), and
//! the session emits a single terminal [`history::GameResult`] record for an
//! external store.
//!
//! ## Architecture
//!
//! ```text
//! SessionController
//!     │
//!     ├── GridGenerator (seeded RNG, special-symbol rarity)
//!     ├── find_matches → apply_effects → check_chain_effects
//!     ├── resolve (gravity + refill) ──loop──┘
//!     ├── scoring (cascade multipliers, underdog boost)
//!     ├── EventScheduler (timed global modifiers)
//!     └── BettingState (optional settlement overlay)
//! ```

pub mod betting;
pub mod cascade;
pub mod config;
pub mod effects;
pub mod events;
pub mod grid;
pub mod history;
pub mod matching;
pub mod scoring;
pub mod session;
pub mod symbols;
pub mod timer;

pub use betting::*;
pub use cascade::*;
pub use config::*;
pub use effects::*;
pub use events::*;
pub use grid::*;
pub use history::*;
pub use matching::*;
pub use scoring::*;
pub use session::*;
pub use symbols::*;
pub use timer::*;
