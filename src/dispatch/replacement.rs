//! The replacement / Prevent interceptor.
//!
//! Replacements get first right of refusal on an in-flight event, before
//! its primary effect resolves. Applying one fully cancels the original
//! resolution; the `Prevented` event that records the cancellation is
//! itself dispatched, so "when you prevent a card" reactions still fire.
//!
//! Two shapes exist: Prevent cards (Fast events held in hand, offered to
//! the opponent of a just-played card through the `AwaitingResponse`
//! window, at most one applied per play) and battlefield "would be
//! dissolved" abilities (applied automatically, leftmost applicable source
//! first, once per dissolve).

use crate::cards::ability::{AbilitySpec, ReplacementPattern};
use crate::core::ids::InstanceId;
use crate::costs;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::zones::zone::Zone;

/// Prevent sources `responder` could apply to a just-played card: event
/// cards in hand with a `CardPlayed` replacement, affordable at their
/// final cost (cost statics and modifiers included) with current energy.
#[must_use]
pub fn applicable_prevents(state: &GameState, responder: PlayerId) -> Vec<InstanceId> {
    let energy = state.players[responder].energy;
    state
        .zones
        .cards_in(responder, Zone::Hand)
        .iter()
        .copied()
        .filter(|&instance| {
            prevent_index(state, instance).is_some()
                && costs::final_cost(state, responder, instance, Zone::Hand)
                    .map_or(false, |cost| cost <= energy)
        })
        .collect()
}

/// The index of a card's `CardPlayed` replacement ability, if any.
#[must_use]
pub fn prevent_index(state: &GameState, instance: InstanceId) -> Option<usize> {
    replacement_index(state, instance, ReplacementPattern::CardPlayed)
}

/// The first battlefield source with an applicable "would be dissolved"
/// replacement for `dissolving`, searched active player first, then
/// leftmost first. A replacement source applies to characters its
/// controller owns, itself included.
#[must_use]
pub fn dissolve_replacement(
    state: &GameState,
    dissolving: InstanceId,
) -> Option<(InstanceId, usize)> {
    let owner = state.cards.get(&dissolving)?.owner;
    let active = state.active_player();
    for player in [active, active.opponent()] {
        if player != owner {
            continue;
        }
        for &source in state.zones.battlefield(player) {
            if let Some(index) = replacement_index(state, source, ReplacementPattern::WouldDissolve)
            {
                return Some((source, index));
            }
        }
    }
    None
}

fn replacement_index(
    state: &GameState,
    instance: InstanceId,
    pattern: ReplacementPattern,
) -> Option<usize> {
    let card = state.cards.get(&instance)?;
    let def = state.registry.get(card.card_id)?;
    def.abilities.iter().position(
        |ability| matches!(ability, AbilitySpec::Replacement { pattern: p, .. } if *p == pattern),
    )
}
