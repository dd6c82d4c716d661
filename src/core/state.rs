//! The authoritative game state.
//!
//! Exactly one `GameState` exists per game. It is threaded through pure-ish
//! transition functions (the resolver, the dispatcher, the judgment
//! controller) and owned exclusively by the dispatch cycle while events
//! resolve; parallelism only ever exists at the granularity of whole games.
//!
//! `move_card` is the single entry point for zone transitions: it strips
//! `WhileInZone` modifiers on departure, applies the banish-on-leave
//! redirect, stamps battlefield entries for layer ordering, and emits
//! exactly one `ZoneChanged` event per committed move.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cards::definition::{CardDefinition, CardId};
use crate::cards::instance::CardInstance;
use crate::cards::registry::CardRegistry;
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::InstanceId;
use crate::core::player::{PlayerId, PlayerMap};
use crate::core::rng::GameRng;
use crate::dispatch::event::{Cause, EventKind, GameEvent, ReplayLog};
use crate::zones::manager::ZoneManager;
use crate::zones::zone::{Placement, Zone};

/// Fixed parameters of one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Shuffle seed. Two games with the same config and action sequence
    /// are bit-for-bit identical.
    pub seed: u64,
    /// Deck lists, as definition ids.
    pub decks: PlayerMap<Vec<CardId>>,
    /// Points needed to win.
    pub points_to_win: u32,
    /// Energy gained by the active player at each turn start.
    pub energy_per_turn: u32,
    /// Cards drawn during setup.
    pub starting_hand: usize,
    /// Resolution-chain depth bound.
    pub max_depth: u32,
    /// Shuffle decks at setup. Test scenarios disable this to pin deck
    /// order; the deck list is then stacked bottom-to-top.
    pub shuffle_decks: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            decks: PlayerMap::with_default(),
            points_to_win: 25,
            energy_per_turn: 2,
            starting_hand: 5,
            max_depth: 64,
            shuffle_decks: true,
        }
    }
}

/// Per-player resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub energy: u32,
    pub points: u32,
}

/// Turn structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// 1-based turn number.
    pub number: u32,
    pub active_player: PlayerId,
    /// Pending "additional Judgment phase" grants for this turn.
    pub extra_judgments: u32,
}

/// The complete state of one game.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub registry: CardRegistry,
    pub zones: ZoneManager,
    pub cards: FxHashMap<InstanceId, CardInstance>,
    pub players: PlayerMap<PlayerState>,
    pub turn: TurnState,
    pub log: ReplayLog,
    pub rng: GameRng,
    next_instance: u32,
    timestamp: u64,
}

impl GameState {
    /// Set up a new game: instantiate both decks, shuffle, draw opening
    /// hands. Setup emits no events; the log begins with turn 1.
    pub fn new(config: GameConfig, registry: CardRegistry) -> EngineResult<Self> {
        let mut state = Self {
            config: config.clone(),
            registry,
            zones: ZoneManager::new(),
            cards: FxHashMap::default(),
            players: PlayerMap::with_default(),
            turn: TurnState { number: 1, active_player: PlayerId::ONE, extra_judgments: 0 },
            log: ReplayLog::new(),
            rng: GameRng::new(config.seed),
            next_instance: 0,
            timestamp: 0,
        };

        for player in PlayerId::both() {
            for &card_id in &config.decks[player] {
                state.registry.definition(card_id)?;
                state.alloc_instance(card_id, player, Zone::Deck);
            }
            if config.shuffle_decks {
                state.zones.shuffle_deck(player, &mut state.rng);
            }
            for _ in 0..config.starting_hand {
                let Some(top) = state.zones.top_of_deck(player) else { break };
                state.zones.move_card(top, Zone::Deck, Zone::Hand, Placement::default())?;
            }
        }
        Ok(state)
    }

    /// Create a fresh instance of a definition in a zone.
    pub fn alloc_instance(&mut self, card_id: CardId, owner: PlayerId, zone: Zone) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.cards.insert(id, CardInstance::new(id, card_id, owner));
        self.zones.add_new(id, owner, zone);
        id
    }

    /// Next establishment timestamp for modifier and layer ordering.
    pub fn bump_timestamp(&mut self) -> u64 {
        self.timestamp += 1;
        self.timestamp
    }

    /// Append an event to the replay log.
    pub fn emit(&mut self, cause: Cause, kind: EventKind) -> GameEvent {
        self.log.append(self.turn.number, cause, kind)
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    /// Look up an instance.
    pub fn card(&self, instance: InstanceId) -> EngineResult<&CardInstance> {
        self.cards.get(&instance).ok_or_else(|| EngineError::illegal(format!("unknown {instance}")))
    }

    /// Look up an instance mutably.
    pub fn card_mut(&mut self, instance: InstanceId) -> EngineResult<&mut CardInstance> {
        self.cards
            .get_mut(&instance)
            .ok_or_else(|| EngineError::illegal(format!("unknown {instance}")))
    }

    /// The definition behind an instance.
    pub fn definition_of(&self, instance: InstanceId) -> EngineResult<&CardDefinition> {
        let card = self.card(instance)?;
        self.registry.definition(card.card_id)
    }

    /// Move a card between zones, emitting exactly one `ZoneChanged`.
    ///
    /// Applies the banish-on-leave redirect (battlefield departures bound
    /// for the void go to the banished zone instead), strips modifiers
    /// scoped to the departed zone, and stamps battlefield entries.
    pub fn move_card(
        &mut self,
        instance: InstanceId,
        from: Zone,
        to: Zone,
        placement: Placement,
        cause: Cause,
    ) -> EngineResult<GameEvent> {
        let to = if from == Zone::Battlefield
            && to == Zone::Void
            && self.card(instance)?.banish_on_leave()
        {
            Zone::Banished
        } else {
            to
        };

        self.zones.move_card(instance, from, to, placement)?;
        trace!(%instance, %from, %to, "zone move");

        let stamp = if to == Zone::Battlefield { Some(self.bump_timestamp()) } else { None };
        let card = self.card_mut(instance)?;
        card.strip_zone_modifiers(from);
        card.entered_battlefield_at = if to == Zone::Battlefield {
            stamp
        } else {
            None
        };

        Ok(self.emit(cause, EventKind::ZoneChanged { instance, from, to }))
    }

    /// Credit energy and emit `EnergyGained`.
    pub fn gain_energy(&mut self, player: PlayerId, amount: u32, cause: Cause) -> GameEvent {
        self.players[player].energy += amount;
        self.emit(cause, EventKind::EnergyGained { player, amount })
    }

    /// Credit points and emit `PointsScored`.
    pub fn score_points(&mut self, player: PlayerId, amount: u32, cause: Cause) -> GameEvent {
        self.players[player].points += amount;
        self.emit(cause, EventKind::PointsScored { player, amount })
    }

    /// Draw one card: deck top to hand. Drawing from an empty deck is a
    /// no-op, not an error.
    pub fn draw_one(&mut self, player: PlayerId, cause: Cause) -> EngineResult<Vec<GameEvent>> {
        let Some(top) = self.zones.top_of_deck(player) else {
            return Ok(Vec::new());
        };
        let moved = self.move_card(top, Zone::Deck, Zone::Hand, Placement::default(), cause)?;
        let drawn = self.emit(cause, EventKind::CardDrawn { player, instance: top });
        Ok(vec![moved, drawn])
    }

    /// Strip all end-of-turn modifiers from every instance.
    pub fn expire_end_of_turn_modifiers(&mut self) {
        for card in self.cards.values_mut() {
            card.expire_end_of_turn();
        }
    }

    /// A deterministic digest of the full game state.
    ///
    /// Hash-map contents are serialized in sorted order so two states that
    /// compare equal always digest equal, regardless of map iteration
    /// order.
    pub fn digest(&self) -> EngineResult<u64> {
        use std::hash::Hasher;

        let mut cards: Vec<&CardInstance> = self.cards.values().collect();
        cards.sort_by_key(|c| c.id);

        let zone_lists: Vec<(PlayerId, Zone, &[InstanceId])> = PlayerId::both()
            .into_iter()
            .flat_map(|p| Zone::ALL.into_iter().map(move |z| (p, z, self.zones.cards_in(p, z))))
            .collect();

        let canonical = (
            &self.players,
            &self.turn,
            &cards,
            &zone_lists,
            self.rng.state(),
            &self.log,
        );
        let bytes = bincode::serialize(&canonical)
            .map_err(|e| EngineError::Serialization(e.to_string()))?;

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        hasher.write(&bytes);
        Ok(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::definition::{CardDefinition, Spark};

    fn registry() -> CardRegistry {
        let mut registry = CardRegistry::new();
        registry
            .insert(CardDefinition::character(CardId::new(1), "Vanilla", 2).with_spark(Spark::Fixed(2)))
            .unwrap();
        registry
    }

    fn config() -> GameConfig {
        GameConfig {
            seed: 9,
            decks: PlayerMap::with_value(vec![CardId::new(1); 10]),
            starting_hand: 3,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_setup_deals_hands() {
        let state = GameState::new(config(), registry()).unwrap();

        for player in PlayerId::both() {
            assert_eq!(state.zones.zone_size(player, Zone::Hand), 3);
            assert_eq!(state.zones.zone_size(player, Zone::Deck), 7);
        }
        assert!(state.log.is_empty());
        assert!(state.zones.check_consistency());
    }

    #[test]
    fn test_unknown_deck_card_rejected() {
        let bad = GameConfig {
            decks: PlayerMap::with_value(vec![CardId::new(99)]),
            ..GameConfig::default()
        };
        assert!(GameState::new(bad, registry()).is_err());
    }

    #[test]
    fn test_move_card_emits_zone_changed() {
        let mut state = GameState::new(config(), registry()).unwrap();
        let card = state.zones.cards_in(PlayerId::ONE, Zone::Hand)[0];

        let event = state
            .move_card(card, Zone::Hand, Zone::Battlefield, Placement::default(), Cause::System)
            .unwrap();

        assert!(matches!(
            event.kind,
            EventKind::ZoneChanged { to: Zone::Battlefield, .. }
        ));
        assert_eq!(state.log.len(), 1);
        assert!(state.card(card).unwrap().entered_battlefield_at.is_some());
    }

    #[test]
    fn test_banish_on_leave_redirect() {
        use crate::cards::instance::{ModifierExpiry, ModifierKind};

        let mut state = GameState::new(config(), registry()).unwrap();
        let card = state.zones.cards_in(PlayerId::ONE, Zone::Hand)[0];
        state
            .move_card(card, Zone::Hand, Zone::Battlefield, Placement::default(), Cause::System)
            .unwrap();
        let stamp = state.bump_timestamp();
        state
            .card_mut(card)
            .unwrap()
            .add_modifier(ModifierKind::BanishOnLeave, ModifierExpiry::Permanent, stamp);

        let event = state
            .move_card(card, Zone::Battlefield, Zone::Void, Placement::default(), Cause::System)
            .unwrap();

        assert!(matches!(event.kind, EventKind::ZoneChanged { to: Zone::Banished, .. }));
        assert!(state.zones.contains(PlayerId::ONE, card, Zone::Banished));
    }

    #[test]
    fn test_draw_from_empty_deck_is_noop() {
        let mut state = GameState::new(
            GameConfig { decks: PlayerMap::with_default(), ..GameConfig::default() },
            registry(),
        )
        .unwrap();

        let events = state.draw_one(PlayerId::ONE, Cause::System).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_digest_is_stable() {
        let state = GameState::new(config(), registry()).unwrap();
        let copy = state.clone();

        assert_eq!(state.digest().unwrap(), copy.digest().unwrap());
    }

    #[test]
    fn test_digest_changes_with_state() {
        let mut state = GameState::new(config(), registry()).unwrap();
        let before = state.digest().unwrap();

        state.gain_energy(PlayerId::ONE, 1, Cause::System);
        assert_ne!(before, state.digest().unwrap());
    }
}
