//! # ca-stage — CascadeArena Stage System
//!
//! The canonical vocabulary of game moments emitted by the cascade
//! simulation for renderers, sound, and telemetry subscribers.
//!
//! A Stage is NOT an animation and NOT an engine internal. A Stage is the
//! SEMANTIC MEANING of a moment in the game flow: "symbols were removed",
//! "a cascade step resolved", "the session finished". Presentation layers
//! decide what a stage looks or sounds like; the simulation only says what
//! happened and when, relative to the start of the spin.
//!
//! ## Architecture
//!
//! ```text
//! SessionController (ca-cascade)
//!     │
//!     ├── SpinReport ──────────► Vec<StageEvent>
//!     │                              │
//!     └── TimestampGenerator ────────┘ (presentation pacing only)
//! ```

pub mod event;
pub mod stage;
pub mod timing;

pub use event::*;
pub use stage::*;
pub use timing::*;
