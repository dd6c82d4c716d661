//! The continuous effect layer system.
//!
//! Derived characteristics (current spark, current cost) are computed, not
//! stored. `current_spark` applies, in order: the printed base, "set"
//! effects in the timestamp order they were established, additive
//! modifiers summed, then clamps (floor at zero, explicit caps). The fixed
//! order is what makes a spark-setting aura and a later +1 modifier
//! compose predictably regardless of resolution order.
//!
//! Variable base spark re-queries the numeric engine on every read. A
//! `CycleGuard` breaks self-referential chains (a variable-spark character
//! whose query inspects other characters' spark): a re-entered instance
//! contributes its floor value of zero instead of recursing.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::definition::{CardType, Spark};
use crate::cards::instance::ModifierKind;
use crate::core::ids::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::effects::effect::PlayerSel;
use crate::effects::queries;
use crate::zones::zone::Zone;

/// An always-on effect from a battlefield character's `Static` ability.
///
/// Spark statics affect the source's controller's battlefield characters
/// (the source included) and are timestamped by the source's battlefield
/// entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuousEffect {
    /// Allies' spark becomes this value (layer 2).
    SetSparkAllies { value: u32 },
    /// Allies' spark is adjusted by this delta (layer 3).
    ModifySparkAllies { delta: i32 },
    /// Plays matching the filter cost `delta` more (or less, negative).
    CostDelta { filter: CostFilter, delta: i32 },
}

/// Which plays a `CostDelta` static applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostFilter {
    /// Whose plays are affected, relative to the static's controller.
    pub applies_to: PlayerSel,
    /// Restrict to one card type, or all.
    pub card_type: Option<CardType>,
    /// Restrict to plays from one zone (e.g. the void, for Reclaim
    /// discounts), or all.
    pub from_zone: Option<Zone>,
}

impl CostFilter {
    /// Whether a play matches this filter.
    #[must_use]
    pub fn matches(
        &self,
        static_controller: PlayerId,
        playing_player: PlayerId,
        card_type: CardType,
        from_zone: Zone,
    ) -> bool {
        let player_ok = match self.applies_to {
            PlayerSel::Controller => static_controller == playing_player,
            PlayerSel::Opponent => static_controller.opponent() == playing_player,
        };
        player_ok
            && self.card_type.map_or(true, |t| t == card_type)
            && self.from_zone.map_or(true, |z| z == from_zone)
    }
}

/// Tracks in-progress spark computations to break query cycles.
#[derive(Debug, Default)]
pub struct CycleGuard {
    in_progress: FxHashSet<InstanceId>,
}

impl CycleGuard {
    fn enter(&mut self, instance: InstanceId) -> bool {
        self.in_progress.insert(instance)
    }

    fn exit(&mut self, instance: InstanceId) {
        self.in_progress.remove(&instance);
    }
}

/// The current spark of an instance.
#[must_use]
pub fn current_spark(state: &GameState, instance: InstanceId) -> u32 {
    let mut guard = CycleGuard::default();
    current_spark_guarded(state, instance, &mut guard)
}

/// Spark computation with an explicit cycle guard.
#[must_use]
pub fn current_spark_guarded(
    state: &GameState,
    instance: InstanceId,
    guard: &mut CycleGuard,
) -> u32 {
    if !guard.enter(instance) {
        // Cycle: this instance's spark is already being computed above us.
        return 0;
    }
    let value = spark_layers(state, instance, guard);
    guard.exit(instance);
    value
}

fn spark_layers(state: &GameState, instance: InstanceId, guard: &mut CycleGuard) -> u32 {
    let Some(card) = state.cards.get(&instance) else { return 0 };
    let Some(def) = state.registry.get(card.card_id) else { return 0 };

    // Layer 1: printed base.
    let base = match &def.spark {
        None => return 0,
        Some(Spark::Fixed(n)) => *n,
        Some(Spark::Variable(query)) => {
            queries::evaluate_guarded(state, card.owner, *query, None, guard)
        }
    };

    let on_battlefield = state.zones.contains(card.owner, instance, Zone::Battlefield);

    // Layer 2: "set" effects, applied in establishment order; the latest
    // one wins.
    let mut sets: Vec<(u64, u32)> = card
        .modifiers
        .iter()
        .filter_map(|m| match m.kind {
            ModifierKind::SetSpark(value) => Some((m.timestamp, value)),
            _ => None,
        })
        .collect();
    if on_battlefield {
        for (timestamp, effect) in ally_statics(state, card.owner) {
            if let ContinuousEffect::SetSparkAllies { value } = effect {
                sets.push((timestamp, value));
            }
        }
    }
    sets.sort_by_key(|&(timestamp, _)| timestamp);
    let mut value = i64::from(sets.last().map_or(base, |&(_, v)| v));

    // Layer 3: additive modifiers, summed.
    for modifier in &card.modifiers {
        if let ModifierKind::AddSpark(delta) = modifier.kind {
            value += i64::from(delta);
        }
    }
    if on_battlefield {
        for (_, effect) in ally_statics(state, card.owner) {
            if let ContinuousEffect::ModifySparkAllies { delta } = effect {
                value += i64::from(delta);
            }
        }
    }

    // Layer 4: clamps.
    value = value.max(0);
    for modifier in &card.modifiers {
        if let ModifierKind::SparkCap(cap) = modifier.kind {
            value = value.min(i64::from(cap));
        }
    }
    value as u32
}

/// Summed cost delta from all battlefield `CostDelta` statics that match a
/// play. Reductions and taxes combine additively; the caller floors at 0.
#[must_use]
pub fn cost_statics(
    state: &GameState,
    playing_player: PlayerId,
    card_type: CardType,
    from_zone: Zone,
) -> i64 {
    let mut total = 0i64;
    for controller in PlayerId::both() {
        for (_, effect) in ally_statics(state, controller) {
            if let ContinuousEffect::CostDelta { filter, delta } = effect {
                if filter.matches(controller, playing_player, card_type, from_zone) {
                    total += i64::from(delta);
                }
            }
        }
    }
    total
}

/// The summed current spark of a player's battlefield.
#[must_use]
pub fn total_spark(state: &GameState, player: PlayerId) -> u32 {
    state
        .zones
        .battlefield(player)
        .iter()
        .map(|&instance| current_spark(state, instance))
        .sum()
}

/// All `Static` abilities on a player's battlefield, with establishment
/// timestamps (battlefield entry order).
fn ally_statics(state: &GameState, player: PlayerId) -> Vec<(u64, ContinuousEffect)> {
    use crate::cards::ability::AbilitySpec;

    let mut statics = Vec::new();
    for &source in state.zones.battlefield(player) {
        let Some(card) = state.cards.get(&source) else { continue };
        let Some(def) = state.registry.get(card.card_id) else { continue };
        let Some(timestamp) = card.entered_battlefield_at else { continue };
        for ability in &def.abilities {
            if let AbilitySpec::Static(effect) = ability {
                statics.push((timestamp, *effect));
            }
        }
    }
    statics
}
