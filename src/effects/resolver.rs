//! Effect execution.
//!
//! `execute` runs one effect against game state within an `EffectContext`
//! (the resolution frame's view: source, controller, triggering instance,
//! fixed modal choice, log snapshot). Every event produced is appended to
//! the replay log immediately and pushed onto the caller's queue for
//! trigger dispatch.

use tracing::debug;

use crate::cards::ability::AbilitySpec;
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::dispatch::event::{Cause, EventKind, GameEvent};
use crate::dispatch::replacement;
use crate::effects::effect::{Effect, EffectTarget, PlayerSel};
use crate::effects::queries;
use crate::zones::zone::{Placement, Zone};

/// The fixed view a resolving effect sees.
#[derive(Clone, Copy, Debug)]
pub struct EffectContext {
    /// The instance whose ability is resolving.
    pub source: InstanceId,
    /// Its controller.
    pub controller: PlayerId,
    /// Causal tag stamped on every produced event.
    pub cause: Cause,
    /// The instance named by the triggering event, if any.
    pub triggering: Option<InstanceId>,
    /// Modal choice, fixed at action submission.
    pub mode: Option<usize>,
    /// Log length at trigger registration; threshold conditions evaluate
    /// against the log truncated here.
    pub log_snapshot: usize,
    /// Resolution chain depth of the owning frame.
    pub depth: u32,
}

/// Execute one effect. Produced events are pushed onto `queue` in
/// emission order for subsequent dispatch.
pub fn execute(
    state: &mut GameState,
    ctx: &EffectContext,
    effect: &Effect,
    queue: &mut Vec<GameEvent>,
) -> EngineResult<()> {
    match effect {
        Effect::MoveTo { target, zone } => {
            for instance in resolve_targets(state, ctx, *target) {
                let Some((_, from)) = state.zones.location(instance) else { continue };
                if from == *zone {
                    continue;
                }
                let event =
                    state.move_card(instance, from, *zone, Placement::default(), ctx.cause)?;
                queue.push(event);
            }
        }
        Effect::Dissolve { target } => {
            for instance in resolve_targets(state, ctx, *target) {
                dissolve(state, ctx, instance, queue)?;
            }
        }
        Effect::Abandon { target } => {
            for instance in resolve_targets(state, ctx, *target) {
                if !on_battlefield(state, instance) {
                    continue;
                }
                queue.push(state.emit(ctx.cause, EventKind::CharacterAbandoned { instance }));
                let moved = state.move_card(
                    instance,
                    Zone::Battlefield,
                    Zone::Void,
                    Placement::default(),
                    ctx.cause,
                )?;
                queue.push(moved);
            }
        }
        Effect::Banish { target } => {
            for instance in resolve_targets(state, ctx, *target) {
                let Some((_, from)) = state.zones.location(instance) else { continue };
                if from == Zone::Banished {
                    continue;
                }
                let event =
                    state.move_card(instance, from, Zone::Banished, Placement::default(), ctx.cause)?;
                queue.push(event);
            }
        }
        Effect::FlickerReturn { target } => {
            for instance in resolve_targets(state, ctx, *target) {
                if !on_battlefield(state, instance) {
                    continue;
                }
                let out = state.move_card(
                    instance,
                    Zone::Battlefield,
                    Zone::Banished,
                    Placement::default(),
                    ctx.cause,
                )?;
                queue.push(out);
                // The return re-enters at the rightmost position and
                // re-triggers Materialized.
                let back = state.move_card(
                    instance,
                    Zone::Banished,
                    Zone::Battlefield,
                    Placement::default(),
                    ctx.cause,
                )?;
                queue.push(back);
            }
        }
        Effect::Draw { player, count } => {
            let player = select_player(ctx, *player);
            for _ in 0..*count {
                queue.extend(state.draw_one(player, ctx.cause)?);
            }
        }
        Effect::Mill { player, count } => {
            let player = select_player(ctx, *player);
            let mut milled = 0u32;
            for _ in 0..*count {
                let Some(top) = state.zones.top_of_deck(player) else { break };
                let event =
                    state.move_card(top, Zone::Deck, Zone::Void, Placement::default(), ctx.cause)?;
                queue.push(event);
                milled += 1;
            }
            if milled > 0 {
                queue.push(state.emit(ctx.cause, EventKind::CardsMilled { player, count: milled }));
            }
        }
        Effect::Discard { player, count } => {
            let player = select_player(ctx, *player);
            for _ in 0..*count {
                let Some(&front) = state.zones.cards_in(player, Zone::Hand).first() else { break };
                let moved =
                    state.move_card(front, Zone::Hand, Zone::Void, Placement::default(), ctx.cause)?;
                queue.push(moved);
                queue.push(
                    state.emit(ctx.cause, EventKind::CardDiscarded { player, instance: front }),
                );
            }
        }
        Effect::GainEnergy { player, amount } => {
            let player = select_player(ctx, *player);
            queue.push(state.gain_energy(player, *amount, ctx.cause));
        }
        Effect::GainPoints { player, amount } => {
            let player = select_player(ctx, *player);
            queue.push(state.score_points(player, *amount, ctx.cause));
        }
        Effect::Kindle { amount } => {
            let Some(target) = state.zones.leftmost(ctx.controller) else {
                return Ok(());
            };
            let stamp = state.bump_timestamp();
            state.card_mut(target)?.add_modifier(
                crate::cards::instance::ModifierKind::AddSpark(*amount as i32),
                crate::cards::instance::ModifierExpiry::Permanent,
                stamp,
            );
            queue.push(state.emit(ctx.cause, EventKind::KindleApplied { target, amount: *amount }));
        }
        Effect::ApplyModifier { target, kind, expiry } => {
            for instance in resolve_targets(state, ctx, *target) {
                let stamp = state.bump_timestamp();
                state.card_mut(instance)?.add_modifier(*kind, *expiry, stamp);
            }
        }
        Effect::ChooseMode(modes) => {
            // Mode is fixed at submission; default to the first for
            // trigger-sourced modal effects with no stored choice.
            let index = ctx.mode.unwrap_or(0).min(modes.len().saturating_sub(1));
            let mode = modes
                .get(index)
                .ok_or_else(|| EngineError::illegal("modal effect with no modes"))?
                .clone();
            execute(state, ctx, &mode, queue)?;
        }
        Effect::Sequence(steps) => {
            for step in steps {
                execute(state, ctx, step, queue)?;
            }
        }
        Effect::Conditional { condition, then } => {
            if queries::check(state, ctx.controller, *condition, Some(ctx.log_snapshot)) {
                execute(state, ctx, then, queue)?;
            }
        }
        Effect::AdditionalJudgment => {
            state.turn.extra_judgments += 1;
        }
    }
    Ok(())
}

/// Dissolve one character, offering battlefield replacements first.
fn dissolve(
    state: &mut GameState,
    ctx: &EffectContext,
    instance: InstanceId,
    queue: &mut Vec<GameEvent>,
) -> EngineResult<()> {
    if !on_battlefield(state, instance) {
        return Ok(());
    }
    if let Some((source, index)) = replacement::dissolve_replacement(state, instance) {
        debug!(%instance, %source, "dissolve replaced");
        queue.push(state.emit(ctx.cause, EventKind::Prevented {
            original: Box::new(EventKind::CharacterDissolved { instance }),
            source,
        }));
        let rider = replacement_rider(state, source, index)?;
        let rider_ctx =
            EffectContext { source, controller: state.card(source)?.owner, ..*ctx };
        execute(state, &rider_ctx, &rider, queue)?;
        return Ok(());
    }

    queue.push(state.emit(ctx.cause, EventKind::CharacterDissolved { instance }));
    let moved =
        state.move_card(instance, Zone::Battlefield, Zone::Void, Placement::default(), ctx.cause)?;
    queue.push(moved);
    Ok(())
}

/// Clone out a replacement ability's rider effect.
pub fn replacement_rider(
    state: &GameState,
    source: InstanceId,
    index: usize,
) -> EngineResult<Effect> {
    let def = state.definition_of(source)?;
    match def.abilities.get(index) {
        Some(AbilitySpec::Replacement { effect, .. }) => Ok(effect.clone()),
        _ => Err(EngineError::illegal(format!("{source} has no replacement ability {index}"))),
    }
}

fn select_player(ctx: &EffectContext, sel: PlayerSel) -> PlayerId {
    match sel {
        PlayerSel::Controller => ctx.controller,
        PlayerSel::Opponent => ctx.controller.opponent(),
    }
}

fn on_battlefield(state: &GameState, instance: InstanceId) -> bool {
    matches!(state.zones.location(instance), Some((_, Zone::Battlefield)))
}

fn resolve_targets(
    state: &GameState,
    ctx: &EffectContext,
    target: EffectTarget,
) -> Vec<InstanceId> {
    match target {
        EffectTarget::This => vec![ctx.source],
        EffectTarget::Triggering => ctx.triggering.into_iter().collect(),
        EffectTarget::LeftmostAlly => state.zones.leftmost(ctx.controller).into_iter().collect(),
        EffectTarget::EachAlly => state.zones.battlefield(ctx.controller).to_vec(),
        EffectTarget::EachEnemy => {
            state.zones.battlefield(ctx.controller.opponent()).to_vec()
        }
        EffectTarget::OldestInVoid => {
            state.zones.cards_in(ctx.controller, Zone::Void).first().copied().into_iter().collect()
        }
        EffectTarget::OldestEventInVoid => state
            .zones
            .cards_in(ctx.controller, Zone::Void)
            .iter()
            .copied()
            .find(|&instance| {
                state
                    .cards
                    .get(&instance)
                    .and_then(|card| state.registry.get(card.card_id))
                    .is_some_and(|def| !def.is_character())
            })
            .into_iter()
            .collect(),
    }
}
