//! The Judgment phase controller.
//!
//! Judgment is the discrete scoring step at the end of each turn. The
//! controller gathers every battlefield character with a Judgment trigger,
//! orders them by the dispatcher's rule (active player first, leftmost
//! first), and resolves each one to completion - including any secondary
//! triggers it sets off - before the next begins, so chains never
//! interleave. Scoring then awards each player their total-spark margin
//! over the opponent.
//!
//! An `AdditionalJudgment` effect granted during the turn (or during the
//! phase itself) re-runs the whole phase against the then-current board.
//! Phase repetition shares the dispatcher's depth limit: a board that keeps
//! granting itself more phases aborts with `InfiniteLoopDetected`.

use tracing::debug;

use crate::cards::ability::{AbilitySpec, EventPattern, TriggeredAbility};
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::event::{Cause, EventKind};
use crate::effects::layers;
use crate::effects::queries;
use crate::effects::resolver::EffectContext;
use crate::zones::zone::Zone;

/// Run the Judgment phase, repeating for any additional phases granted.
///
/// Repetitions are bounded by `config.max_depth`; completed phases stand
/// when the bound aborts the chain.
pub fn run(state: &mut GameState, dispatcher: &Dispatcher) -> EngineResult<()> {
    let limit = state.config.max_depth;
    let mut phases = 0;
    loop {
        phases += 1;
        if phases > limit {
            state.turn.extra_judgments = 0;
            return Err(EngineError::InfiniteLoopDetected { limit });
        }
        run_one_phase(state, dispatcher)?;
        if state.turn.extra_judgments == 0 {
            return Ok(());
        }
        state.turn.extra_judgments -= 1;
        debug!(turn = state.turn.number, "additional judgment phase");
    }
}

fn run_one_phase(state: &mut GameState, dispatcher: &Dispatcher) -> EngineResult<()> {
    let turn = state.turn.number;
    let started = state.emit(Cause::System, EventKind::JudgmentStarted { turn });
    let snapshot = started.id.raw() as usize;

    // Fixed at phase start; board changes during the phase do not add or
    // reorder entries, but an entry that has left the battlefield by the
    // time its turn comes is skipped.
    for (source, controller, ability) in gather(state) {
        if !state.zones.contains(controller, source, Zone::Battlefield) {
            continue;
        }
        if let Some(condition) = ability.condition {
            if !queries::check(state, controller, condition, Some(snapshot)) {
                continue;
            }
        }
        let ctx = EffectContext {
            source,
            controller,
            cause: Cause::Trigger { source, event: started.id },
            triggering: Some(source),
            mode: None,
            log_snapshot: snapshot,
            depth: 0,
        };
        dispatcher.execute_and_drain(state, &ctx, &ability.effect)?;
    }

    // Scoring: each player gains their spark margin over the opponent.
    // At most one margin is positive.
    let mut scored = Vec::new();
    for player in PlayerId::both() {
        let own = layers::total_spark(state, player);
        let opposing = layers::total_spark(state, player.opponent());
        let margin = own.saturating_sub(opposing);
        if margin > 0 {
            scored.push(state.score_points(player, margin, Cause::System));
        }
    }
    dispatcher.run(state, scored)?;

    state.emit(Cause::System, EventKind::JudgmentEnded { turn });
    Ok(())
}

/// Judgment-triggered abilities in resolution order.
fn gather(state: &GameState) -> Vec<(InstanceId, PlayerId, TriggeredAbility)> {
    let active = state.active_player();
    let mut entries = Vec::new();
    for player in [active, active.opponent()] {
        for &source in state.zones.battlefield(player) {
            let Some(card) = state.cards.get(&source) else { continue };
            let Some(def) = state.registry.get(card.card_id) else { continue };
            for ability in &def.abilities {
                if let AbilitySpec::Triggered(trigger) = ability {
                    if trigger.pattern == EventPattern::Judgment {
                        entries.push((source, player, trigger.clone()));
                    }
                }
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::definition::{CardDefinition, CardId, Spark};
    use crate::cards::registry::CardRegistry;
    use crate::core::player::PlayerMap;
    use crate::core::state::GameConfig;
    use crate::effects::effect::{Effect, PlayerSel};
    use crate::zones::zone::Placement;

    fn setup(registry: CardRegistry, decks: PlayerMap<Vec<CardId>>) -> GameState {
        let config =
            GameConfig { decks, starting_hand: 0, shuffle_decks: false, ..GameConfig::default() };
        GameState::new(config, registry).unwrap()
    }

    fn materialize(state: &mut GameState, player: PlayerId) -> InstanceId {
        let top = state.zones.top_of_deck(player).unwrap();
        state
            .move_card(top, Zone::Deck, Zone::Battlefield, Placement::default(), Cause::System)
            .unwrap();
        top
    }

    fn vanilla(id: u32, spark: u32) -> CardDefinition {
        CardDefinition::character(CardId::new(id), format!("Vanilla {spark}"), 1)
            .with_spark(Spark::Fixed(spark))
    }

    #[test]
    fn test_scoring_awards_margin() {
        let mut registry = CardRegistry::new();
        registry.insert(vanilla(1, 4)).unwrap();
        registry.insert(vanilla(2, 1)).unwrap();
        let decks = PlayerMap::new(|p| {
            if p == PlayerId::ONE {
                vec![CardId::new(1)]
            } else {
                vec![CardId::new(2)]
            }
        });
        let mut state = setup(registry, decks);
        materialize(&mut state, PlayerId::ONE);
        materialize(&mut state, PlayerId::TWO);

        run(&mut state, &Dispatcher::default()).unwrap();

        assert_eq!(state.players[PlayerId::ONE].points, 3);
        assert_eq!(state.players[PlayerId::TWO].points, 0);
    }

    #[test]
    fn test_equal_spark_scores_nothing() {
        let mut registry = CardRegistry::new();
        registry.insert(vanilla(1, 2)).unwrap();
        let decks = PlayerMap::with_value(vec![CardId::new(1)]);
        let mut state = setup(registry, decks);
        materialize(&mut state, PlayerId::ONE);
        materialize(&mut state, PlayerId::TWO);

        run(&mut state, &Dispatcher::default()).unwrap();

        assert_eq!(state.players[PlayerId::ONE].points, 0);
        assert_eq!(state.players[PlayerId::TWO].points, 0);
    }

    #[test]
    fn test_judgment_chain_completes_before_next_ability() {
        // First judgment character mills one card, which a void-watcher
        // converts to energy; the second judgment character then scores.
        // The energy gain must appear in the log before the point gain.
        let mut registry = CardRegistry::new();
        registry.insert(vanilla(1, 1)).unwrap();
        registry
            .insert(
                CardDefinition::character(CardId::new(2), "Dredger", 2)
                    .with_spark(Spark::Fixed(1))
                    .with_ability(AbilitySpec::triggered(
                        EventPattern::Judgment,
                        Effect::Mill { player: PlayerSel::Controller, count: 1 },
                    )),
            )
            .unwrap();
        registry
            .insert(
                CardDefinition::character(CardId::new(3), "Watcher", 2)
                    .with_spark(Spark::Fixed(1))
                    .with_ability(AbilitySpec::triggered(
                        EventPattern::EntersVoid,
                        Effect::GainEnergy { player: PlayerSel::Controller, amount: 1 },
                    )),
            )
            .unwrap();
        registry
            .insert(
                CardDefinition::character(CardId::new(4), "Closer", 2)
                    .with_spark(Spark::Fixed(1))
                    .with_ability(AbilitySpec::triggered(
                        EventPattern::Judgment,
                        Effect::GainPoints { player: PlayerSel::Controller, amount: 1 },
                    )),
            )
            .unwrap();
        let decks = PlayerMap::new(|p| {
            if p == PlayerId::ONE {
                // Stacked bottom-to-top: vanilla stays as mill fodder.
                vec![CardId::new(1), CardId::new(4), CardId::new(3), CardId::new(2)]
            } else {
                vec![]
            }
        });
        let mut state = setup(registry, decks);
        materialize(&mut state, PlayerId::ONE); // Dredger, leftmost
        materialize(&mut state, PlayerId::ONE); // Watcher
        materialize(&mut state, PlayerId::ONE); // Closer

        run(&mut state, &Dispatcher::default()).unwrap();

        let positions: Vec<(usize, &EventKind)> = state
            .log
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                matches!(e.kind, EventKind::EnergyGained { .. } | EventKind::PointsScored { .. })
            })
            .map(|(i, e)| (i, &e.kind))
            .collect();
        assert_eq!(positions.len(), 3);
        assert!(matches!(positions[0].1, EventKind::EnergyGained { .. }));
        assert!(matches!(positions[1].1, EventKind::PointsScored { amount: 1, .. }));
        // Phase-end scoring margin comes last.
        assert!(matches!(positions[2].1, EventKind::PointsScored { .. }));
    }

    #[test]
    fn test_additional_judgment_repeats_phase() {
        let mut registry = CardRegistry::new();
        registry.insert(vanilla(1, 2)).unwrap();
        let decks = PlayerMap::new(|p| {
            if p == PlayerId::ONE {
                vec![CardId::new(1)]
            } else {
                vec![]
            }
        });
        let mut state = setup(registry, decks);
        materialize(&mut state, PlayerId::ONE);
        state.turn.extra_judgments = 1;

        run(&mut state, &Dispatcher::default()).unwrap();

        // Two full phases, each scoring the 2-spark margin.
        assert_eq!(state.players[PlayerId::ONE].points, 4);
        let ended = state
            .log
            .iter()
            .filter(|e| matches!(e.kind, EventKind::JudgmentEnded { .. }))
            .count();
        assert_eq!(ended, 2);
        assert_eq!(state.turn.extra_judgments, 0);
    }

    #[test]
    fn test_self_granting_phase_aborts() {
        // A Judgment trigger that grants another phase every phase would
        // repeat forever; the depth limit has to cut it off.
        let mut registry = CardRegistry::new();
        registry
            .insert(
                CardDefinition::character(CardId::new(5), "Eternal", 2)
                    .with_spark(Spark::Fixed(0))
                    .with_ability(AbilitySpec::triggered(
                        EventPattern::Judgment,
                        Effect::AdditionalJudgment,
                    )),
            )
            .unwrap();
        let decks = PlayerMap::new(|p| {
            if p == PlayerId::ONE {
                vec![CardId::new(5)]
            } else {
                vec![]
            }
        });
        let mut state = setup(registry, decks);
        materialize(&mut state, PlayerId::ONE);

        let err = run(&mut state, &Dispatcher::default()).unwrap_err();

        assert_eq!(err, EngineError::InfiniteLoopDetected { limit: 64 });
        assert_eq!(state.turn.extra_judgments, 0);
        assert!(state.zones.check_consistency());
    }

    #[test]
    fn test_departed_entry_is_skipped() {
        // The first judgment ability dissolves the second judgment
        // character; the second entry must not resolve.
        let mut registry = CardRegistry::new();
        registry
            .insert(
                CardDefinition::character(CardId::new(2), "Usher", 2)
                    .with_spark(Spark::Fixed(1))
                    .with_ability(AbilitySpec::triggered(
                        EventPattern::Judgment,
                        Effect::Dissolve { target: crate::effects::effect::EffectTarget::EachEnemy },
                    )),
            )
            .unwrap();
        registry
            .insert(
                CardDefinition::character(CardId::new(3), "Latecomer", 2)
                    .with_spark(Spark::Fixed(5))
                    .with_ability(AbilitySpec::triggered(
                        EventPattern::Judgment,
                        Effect::GainPoints { player: PlayerSel::Controller, amount: 10 },
                    )),
            )
            .unwrap();
        let decks = PlayerMap::new(|p| {
            if p == PlayerId::ONE {
                vec![CardId::new(2)]
            } else {
                vec![CardId::new(3)]
            }
        });
        let mut state = setup(registry, decks);
        materialize(&mut state, PlayerId::ONE);
        materialize(&mut state, PlayerId::TWO);

        run(&mut state, &Dispatcher::default()).unwrap();

        // The Latecomer was dissolved before its entry resolved.
        assert_eq!(state.players[PlayerId::TWO].points, 0);
        // Active player's Usher scores the 1-spark margin at phase end.
        assert_eq!(state.players[PlayerId::ONE].points, 1);
    }
}
