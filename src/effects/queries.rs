//! The numeric query engine.
//!
//! Dynamic quantities (variable spark, "N entered void this turn", hand
//! size) are never stored; every read recomputes from current state and
//! the replay log. Queries are idempotent: two reads with no intervening
//! event return the same value.
//!
//! Threshold conditions inside a resolution frame pass the frame's log
//! snapshot as `log_limit`, which truncates log scans to events strictly
//! before the triggering event. The triggering event never counts toward
//! its own threshold.

use serde::{Deserialize, Serialize};

use crate::cards::definition::CardType;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::dispatch::event::EventKind;
use crate::effects::layers::{self, CycleGuard};
use crate::zones::zone::Zone;

/// A recomputable quantity, scoped to the querying player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    /// Cards in the player's void.
    CardsInVoid,
    /// Event cards in the player's void.
    EventCardsInVoid,
    /// Cards that entered the player's void this turn.
    CardsEnteredVoidThisTurn,
    /// Cards in the player's hand.
    HandSize,
    /// The player's battlefield characters with current spark <= n.
    AlliesWithSparkAtMost(u32),
    /// All zone transitions this turn, either player.
    ZoneTransitionsThisTurn,
    /// Characters on the player's battlefield.
    BattlefieldSize,
}

/// A numeric threshold over a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// The query result is at least `n`.
    QueryAtLeast(QueryKind, u32),
    /// The query result is at most `n`.
    QueryAtMost(QueryKind, u32),
}

/// Evaluate a query against the current state.
///
/// `log_limit` truncates log-backed queries to the first `limit` events;
/// `None` scans the whole log.
#[must_use]
pub fn evaluate(
    state: &GameState,
    player: PlayerId,
    kind: QueryKind,
    log_limit: Option<usize>,
) -> u32 {
    let mut guard = CycleGuard::default();
    evaluate_guarded(state, player, kind, log_limit, &mut guard)
}

/// Query evaluation with an explicit cycle guard, for use from inside
/// spark computation (variable spark may itself issue queries).
#[must_use]
pub fn evaluate_guarded(
    state: &GameState,
    player: PlayerId,
    kind: QueryKind,
    log_limit: Option<usize>,
    guard: &mut CycleGuard,
) -> u32 {
    match kind {
        QueryKind::CardsInVoid => state.zones.zone_size(player, Zone::Void) as u32,
        QueryKind::EventCardsInVoid => state
            .zones
            .cards_in(player, Zone::Void)
            .iter()
            .filter(|&&instance| {
                state
                    .cards
                    .get(&instance)
                    .and_then(|card| state.registry.get(card.card_id))
                    .is_some_and(|def| def.card_type == CardType::Event)
            })
            .count() as u32,
        QueryKind::CardsEnteredVoidThisTurn => scan_log(state, log_limit, |kind| {
            matches!(
                kind,
                EventKind::ZoneChanged { instance, to: Zone::Void, .. }
                    if state.cards.get(instance).is_some_and(|c| c.owner == player)
            )
        }),
        QueryKind::HandSize => state.zones.zone_size(player, Zone::Hand) as u32,
        QueryKind::AlliesWithSparkAtMost(n) => state
            .zones
            .battlefield(player)
            .iter()
            .filter(|&&ally| layers::current_spark_guarded(state, ally, guard) <= n)
            .count() as u32,
        QueryKind::ZoneTransitionsThisTurn => {
            scan_log(state, log_limit, |kind| matches!(kind, EventKind::ZoneChanged { .. }))
        }
        QueryKind::BattlefieldSize => state.zones.battlefield(player).len() as u32,
    }
}

/// Check a threshold condition, truncating log scans to `log_limit`.
#[must_use]
pub fn check(
    state: &GameState,
    player: PlayerId,
    condition: Condition,
    log_limit: Option<usize>,
) -> bool {
    match condition {
        Condition::QueryAtLeast(kind, n) => evaluate(state, player, kind, log_limit) >= n,
        Condition::QueryAtMost(kind, n) => evaluate(state, player, kind, log_limit) <= n,
    }
}

fn scan_log(
    state: &GameState,
    log_limit: Option<usize>,
    predicate: impl Fn(&EventKind) -> bool,
) -> u32 {
    let limit = log_limit.unwrap_or(state.log.len());
    state
        .log
        .iter_until(limit)
        .filter(|event| event.turn == state.turn.number && predicate(&event.kind))
        .count() as u32
}
