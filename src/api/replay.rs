//! Deterministic replay.
//!
//! A `GameConfig` plus a recorded action sequence fully determines a game.
//! `replay` reconstructs the engine by re-submitting every record;
//! `verify_determinism` replays twice and compares state digests, which is
//! how simulation harnesses catch nondeterminism regressions (map
//! iteration order leaks, unseeded randomness) early.

use tracing::debug;

use crate::api::action::ActionRecord;
use crate::api::engine::GameEngine;
use crate::cards::registry::CardRegistry;
use crate::core::error::{EngineError, EngineResult};
use crate::core::state::GameConfig;

/// Reconstruct a game from its config and action record.
///
/// `InfiniteLoopDetected` aborts are part of the record (their committed
/// moves stand), so they are re-absorbed here rather than propagated.
pub fn replay(
    config: GameConfig,
    registry: CardRegistry,
    actions: &[ActionRecord],
) -> EngineResult<GameEngine> {
    let mut engine = GameEngine::new(config, registry)?;
    for record in actions {
        match engine.submit(record.player, record.action) {
            Ok(_) | Err(EngineError::InfiniteLoopDetected { .. }) => {}
            Err(err) => return Err(err),
        }
    }
    debug!(actions = actions.len(), "replay complete");
    Ok(engine)
}

/// Replay the game twice and compare final state digests. Returns the
/// digest on success.
pub fn verify_determinism(
    config: &GameConfig,
    registry: &CardRegistry,
    actions: &[ActionRecord],
) -> EngineResult<u64> {
    let first = replay(config.clone(), registry.clone(), actions)?.state().digest()?;
    let second = replay(config.clone(), registry.clone(), actions)?.state().digest()?;
    if first != second {
        return Err(EngineError::NonDeterminismDetected { first, second });
    }
    Ok(first)
}
