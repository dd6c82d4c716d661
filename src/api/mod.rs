//! The engine's public boundary: actions, the game engine, and replay.

pub mod action;
pub mod engine;
pub mod replay;

pub use action::{Action, ActionRecord};
pub use engine::{EngineStatus, GameEngine};
pub use replay::{replay, verify_determinism};
