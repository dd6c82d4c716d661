//! The trigger dispatcher.
//!
//! A breadth-correct, depth-bounded event queue. Each popped event is
//! matched against every currently-listening triggered ability; matches
//! are ordered (active player's first, then battlefield position leftmost
//! first, then instance id) and resolved one frame at a time. A frame's
//! effect may move cards and emit further events, which join the back of
//! the queue at the frame's depth; triggers matching those events resolve
//! at depth + 1.
//!
//! Exceeding the depth bound aborts the chain with `InfiniteLoopDetected`.
//! Zone moves the chain already committed stay committed; each had an
//! independent, valid cause. Event ids are unique and each id is popped at
//! most once, so a chain can only run away by producing new events, which
//! is exactly what the depth bound measures.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::cards::ability::{AbilitySpec, EventPattern, TriggeredAbility};
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::dispatch::event::{Cause, EventKind, GameEvent};
use crate::effects::effect::Effect;
use crate::effects::queries;
use crate::effects::resolver::{self, EffectContext};
use crate::zones::zone::Zone;

/// One matched trigger awaiting resolution.
#[derive(Clone, Debug)]
struct TriggerMatch {
    source: InstanceId,
    controller: PlayerId,
    ability: TriggeredAbility,
}

/// Resolves trigger chains against a depth bound.
#[derive(Clone, Copy, Debug)]
pub struct Dispatcher {
    max_depth: u32,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

impl Dispatcher {
    /// Create a dispatcher with the given resolution depth bound.
    #[must_use]
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    /// Dispatch a batch of already-logged events until the queue drains.
    pub fn run(&self, state: &mut GameState, initial: Vec<GameEvent>) -> EngineResult<()> {
        self.run_with_depth(state, initial, 0)
    }

    /// Execute an effect in `ctx`, then dispatch everything it produced.
    /// The Judgment controller uses this to resolve each Judgment ability
    /// to completion before the next begins.
    pub fn execute_and_drain(
        &self,
        state: &mut GameState,
        ctx: &EffectContext,
        effect: &Effect,
    ) -> EngineResult<()> {
        let mut produced = Vec::new();
        resolver::execute(state, ctx, effect, &mut produced)?;
        self.run_with_depth(state, produced, ctx.depth)
    }

    fn run_with_depth(
        &self,
        state: &mut GameState,
        initial: Vec<GameEvent>,
        depth: u32,
    ) -> EngineResult<()> {
        let mut queue: VecDeque<(GameEvent, u32)> =
            initial.into_iter().map(|event| (event, depth)).collect();

        while let Some((event, depth)) = queue.pop_front() {
            trace!(event = ?event.kind, depth, "dispatching");
            let matches = collect_matches(state, &event);
            if matches.is_empty() {
                continue;
            }

            let frame_depth = depth + 1;
            if frame_depth > self.max_depth {
                debug!(limit = self.max_depth, "resolution chain aborted");
                return Err(EngineError::InfiniteLoopDetected { limit: self.max_depth });
            }

            // The snapshot is the triggering event's log position: threshold
            // conditions count only events strictly before it.
            let snapshot = event.id.raw() as usize;
            for matched in matches {
                if let Some(condition) = matched.ability.condition {
                    if !queries::check(state, matched.controller, condition, Some(snapshot)) {
                        continue;
                    }
                }
                let ctx = EffectContext {
                    source: matched.source,
                    controller: matched.controller,
                    cause: Cause::Trigger { source: matched.source, event: event.id },
                    triggering: subject_of(&event.kind),
                    mode: None,
                    log_snapshot: snapshot,
                    depth: frame_depth,
                };
                let mut produced = Vec::new();
                resolver::execute(state, &ctx, &matched.ability.effect, &mut produced)?;
                queue.extend(produced.into_iter().map(|e| (e, frame_depth)));
            }
        }
        Ok(())
    }
}

/// All triggered abilities matching an event, in resolution order: active
/// player before non-active (APNAP), battlefield position leftmost first,
/// then instance id for listeners off the battlefield.
fn collect_matches(state: &GameState, event: &GameEvent) -> Vec<TriggerMatch> {
    let active = state.active_player();
    let mut matches = Vec::new();

    for player in [active, active.opponent()] {
        for &source in state.zones.battlefield(player) {
            push_matches(state, event, source, player, &mut matches);
        }
        // A dissolved character has already left the battlefield by the
        // time its departure event is dispatched, but its Dissolved
        // triggers still fire for that event.
        if let EventKind::CharacterDissolved { instance } = event.kind {
            let departed = state
                .cards
                .get(&instance)
                .is_some_and(|card| card.owner == player)
                && !state.zones.contains(player, instance, Zone::Battlefield);
            if departed {
                push_matches(state, event, instance, player, &mut matches);
            }
        }
    }
    matches
}

fn push_matches(
    state: &GameState,
    event: &GameEvent,
    source: InstanceId,
    controller: PlayerId,
    matches: &mut Vec<TriggerMatch>,
) {
    let Some(card) = state.cards.get(&source) else { return };
    let Some(def) = state.registry.get(card.card_id) else { return };
    for ability in &def.abilities {
        let AbilitySpec::Triggered(trigger) = ability else { continue };
        if pattern_matches(state, trigger.pattern, &event.kind, source, controller) {
            matches.push(TriggerMatch { source, controller, ability: trigger.clone() });
        }
    }
}

fn pattern_matches(
    state: &GameState,
    pattern: EventPattern,
    kind: &EventKind,
    source: InstanceId,
    controller: PlayerId,
) -> bool {
    let owned_by_controller = |instance: &InstanceId| {
        state.cards.get(instance).is_some_and(|card| card.owner == controller)
    };
    match pattern {
        EventPattern::Materialized => matches!(
            kind,
            EventKind::ZoneChanged { instance, to: Zone::Battlefield, .. } if *instance == source
        ),
        EventPattern::Dissolved => {
            matches!(kind, EventKind::CharacterDissolved { instance } if *instance == source)
        }
        EventPattern::EntersVoid => matches!(
            kind,
            EventKind::ZoneChanged { instance, to: Zone::Void, .. }
                if owned_by_controller(instance)
        ),
        EventPattern::Drawn => {
            matches!(kind, EventKind::CardDrawn { player, .. } if *player == controller)
        }
        EventPattern::Played => {
            matches!(kind, EventKind::CardPlayed { player, .. } if *player == controller)
        }
        // Judgment abilities are driven by the Judgment controller, never
        // by generic event matching.
        EventPattern::Judgment => false,
        EventPattern::TurnEnded => matches!(kind, EventKind::TurnEnded { .. }),
        EventPattern::Prevented => {
            matches!(kind, EventKind::Prevented { source: s, .. } if owned_by_controller(s))
        }
        EventPattern::EnergyGained => {
            matches!(kind, EventKind::EnergyGained { player, .. } if *player == controller)
        }
    }
}

/// The instance an event is "about", for `EffectTarget::Triggering`.
fn subject_of(kind: &EventKind) -> Option<InstanceId> {
    match kind {
        EventKind::CardPlayed { instance, .. }
        | EventKind::ZoneChanged { instance, .. }
        | EventKind::CharacterDissolved { instance }
        | EventKind::CharacterAbandoned { instance }
        | EventKind::CardDrawn { instance, .. }
        | EventKind::CardDiscarded { instance, .. } => Some(*instance),
        EventKind::KindleApplied { target, .. } => Some(*target),
        EventKind::Prevented { source, .. } => Some(*source),
        _ => None,
    }
}
