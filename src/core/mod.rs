//! Foundation types: ids, players, errors, seeded randomness, game state.

pub mod error;
pub mod ids;
pub mod player;
pub mod rng;
pub mod state;

pub use error::{EngineError, EngineResult};
pub use ids::{ActionId, EventId, InstanceId};
pub use player::{PlayerId, PlayerMap};
pub use state::{GameConfig, GameState};
