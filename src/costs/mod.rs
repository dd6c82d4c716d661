//! Cost computation and payment.
//!
//! The final cost of a play is the base cost (or the Reclaim cost when
//! playing from the void) plus every active cost modifier, summed before
//! flooring at zero. Reductions and taxes therefore stack additively: two
//! independent "1 less" effects turn a 3-cost play into a 1-cost play.
//!
//! Payment is all-or-nothing: validation happens before any state
//! mutation, and a successful payment emits exactly one `EnergySpent`.

use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::dispatch::event::{Cause, EventKind, GameEvent};
use crate::effects::layers;
use crate::zones::zone::Zone;

/// Compute the final energy cost of playing `instance` from `from_zone`.
///
/// Playing from the void requires Reclaim; fails with `IllegalAction` if
/// the card has none.
pub fn final_cost(
    state: &GameState,
    player: PlayerId,
    instance: InstanceId,
    from_zone: Zone,
) -> EngineResult<u32> {
    let card = state.card(instance)?;
    let def = state.definition_of(instance)?;

    let base = if from_zone == Zone::Void {
        def.reclaim_cost
            .ok_or_else(|| EngineError::illegal(format!("{} has no Reclaim", def.name)))?
    } else {
        def.cost
    };

    let mut total = i64::from(base);
    total += layers::cost_statics(state, player, def.card_type, from_zone);
    for modifier in &card.modifiers {
        if let crate::cards::instance::ModifierKind::AddCost(delta) = modifier.kind {
            total += i64::from(delta);
        }
    }
    Ok(total.max(0) as u32)
}

/// Debit energy, emitting `EnergySpent`. Fails with `InsufficientEnergy`
/// before any mutation.
pub fn pay(
    state: &mut GameState,
    player: PlayerId,
    amount: u32,
    cause: Cause,
) -> EngineResult<Option<GameEvent>> {
    let available = state.players[player].energy;
    if available < amount {
        return Err(EngineError::InsufficientEnergy { required: amount, available });
    }
    if amount == 0 {
        return Ok(None);
    }
    state.players[player].energy -= amount;
    Ok(Some(state.emit(cause, EventKind::EnergySpent { player, amount })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::ability::AbilitySpec;
    use crate::cards::definition::{CardDefinition, CardId, CardType, Spark};
    use crate::cards::registry::CardRegistry;
    use crate::core::player::PlayerMap;
    use crate::core::state::GameConfig;
    use crate::effects::effect::PlayerSel;
    use crate::effects::layers::{ContinuousEffect, CostFilter};
    use crate::zones::zone::Placement;

    fn registry() -> CardRegistry {
        let mut registry = CardRegistry::new();
        registry
            .insert(
                CardDefinition::character(CardId::new(1), "Revenant", 3)
                    .with_spark(Spark::Fixed(2))
                    .with_reclaim(3),
            )
            .unwrap();
        registry
            .insert(
                CardDefinition::character(CardId::new(2), "Gravecaller", 2)
                    .with_spark(Spark::Fixed(1))
                    .with_ability(AbilitySpec::Static(ContinuousEffect::CostDelta {
                        filter: CostFilter {
                            applies_to: PlayerSel::Controller,
                            card_type: Some(CardType::Character),
                            from_zone: Some(Zone::Void),
                        },
                        delta: -1,
                    })),
            )
            .unwrap();
        registry
    }

    fn setup() -> GameState {
        let config = GameConfig {
            decks: PlayerMap::new(|p| {
                if p == PlayerId::ONE {
                    vec![CardId::new(2), CardId::new(2), CardId::new(1)]
                } else {
                    vec![]
                }
            }),
            starting_hand: 0,
            shuffle_decks: false,
            ..GameConfig::default()
        };
        GameState::new(config, registry()).unwrap()
    }

    #[test]
    fn test_base_cost() {
        let mut state = setup();
        let top = state.zones.top_of_deck(PlayerId::ONE).unwrap();
        state.zones.move_card(top, Zone::Deck, Zone::Hand, Placement::default()).unwrap();

        // Deck is stacked with the Revenant on top.
        assert_eq!(state.card(top).unwrap().card_id, CardId::new(1));
        assert_eq!(final_cost(&state, PlayerId::ONE, top, Zone::Hand).unwrap(), 3);
    }

    #[test]
    fn test_reductions_stack_additively() {
        let mut state = setup();
        // Two Gravecallers on the battlefield, Revenant in the void.
        let mut revenant = None;
        while let Some(top) = state.zones.top_of_deck(PlayerId::ONE) {
            let card_id = state.card(top).unwrap().card_id;
            let dest = if card_id == CardId::new(1) { Zone::Void } else { Zone::Battlefield };
            state.move_card(top, Zone::Deck, dest, Placement::default(), Cause::System).unwrap();
            if card_id == CardId::new(1) {
                revenant = Some(top);
            }
        }
        let revenant = revenant.unwrap();

        // 3 base Reclaim cost, minus 1 twice.
        assert_eq!(final_cost(&state, PlayerId::ONE, revenant, Zone::Void).unwrap(), 1);
    }

    #[test]
    fn test_no_reclaim_from_void_rejected() {
        let mut state = setup();
        let mut gravecaller = None;
        while let Some(top) = state.zones.top_of_deck(PlayerId::ONE) {
            state.zones.move_card(top, Zone::Deck, Zone::Void, Placement::default()).unwrap();
            if state.card(top).unwrap().card_id == CardId::new(2) {
                gravecaller = Some(top);
            }
        }

        let err = final_cost(&state, PlayerId::ONE, gravecaller.unwrap(), Zone::Void).unwrap_err();
        assert!(err.to_string().contains("Reclaim"));
    }

    #[test]
    fn test_pay_insufficient() {
        let mut state = setup();
        state.players[PlayerId::ONE].energy = 2;

        let err = pay(&mut state, PlayerId::ONE, 3, Cause::System).unwrap_err();
        assert_eq!(err, EngineError::InsufficientEnergy { required: 3, available: 2 });
        // All-or-nothing: nothing debited, nothing logged.
        assert_eq!(state.players[PlayerId::ONE].energy, 2);
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_pay_emits_energy_spent() {
        let mut state = setup();
        state.players[PlayerId::ONE].energy = 5;

        let event = pay(&mut state, PlayerId::ONE, 3, Cause::System).unwrap().unwrap();
        assert_eq!(state.players[PlayerId::ONE].energy, 2);
        assert_eq!(event.kind, EventKind::EnergySpent { player: PlayerId::ONE, amount: 3 });
    }
}
