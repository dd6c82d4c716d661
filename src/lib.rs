//! Deterministic core engine for the Dreamtides card game.
//!
//! The engine owns trigger resolution and zone transitions for a
//! two-player duel: cards move between deck, hand, stack, battlefield,
//! void, and the banished zone; triggered abilities fire off a breadth-
//! correct event dispatcher; the Judgment phase scores each turn's spark
//! margin. Everything is deterministic: a `GameConfig` (including the
//! shuffle seed) plus the recorded action sequence reproduces a game
//! bit-for-bit, which the replay module verifies by digest.
//!
//! # Example
//!
//! ```no_run
//! use dreamtides::api::{Action, GameEngine};
//! use dreamtides::cards::registry::CardRegistry;
//! use dreamtides::core::state::GameConfig;
//!
//! # fn main() -> Result<(), dreamtides::core::error::EngineError> {
//! let registry = CardRegistry::new();
//! let mut engine = GameEngine::new(GameConfig::default(), registry)?;
//! let player = engine.state().active_player();
//! engine.submit(player, Action::EndTurn)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cards;
pub mod core;
pub mod costs;
pub mod dispatch;
pub mod effects;
pub mod judgment;
pub mod zones;

pub use crate::api::{Action, ActionRecord, EngineStatus, GameEngine};
pub use crate::core::error::{EngineError, EngineResult};
pub use crate::core::ids::{ActionId, EventId, InstanceId};
pub use crate::core::player::{PlayerId, PlayerMap};
pub use crate::core::state::{GameConfig, GameState};
pub use crate::dispatch::event::{Cause, EventKind, GameEvent};
pub use crate::zones::zone::Zone;
