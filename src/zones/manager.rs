//! Zone manager: the single owner of zone membership.
//!
//! The `ZoneManager` tracks which zone every card instance occupies and
//! performs atomic moves. No other component mutates zone sets; everything
//! else goes through `GameState::move_card`, which wraps `move_card` here.
//!
//! Invariants maintained:
//! - every tracked instance appears in exactly one zone list, and that list
//!   agrees with the `locations` map;
//! - the battlefield sequence is ordered, index 0 = leftmost, and is updated
//!   atomically with the move itself.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::InstanceId;
use crate::core::player::{PlayerId, PlayerMap};
use crate::core::rng::GameRng;

use super::zone::{Placement, Zone};

/// One player's zone contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PlayerZones {
    deck: Vec<InstanceId>,
    hand: Vec<InstanceId>,
    stack: Vec<InstanceId>,
    battlefield: Vec<InstanceId>,
    void: Vec<InstanceId>,
    banished: Vec<InstanceId>,
}

impl PlayerZones {
    fn list(&self, zone: Zone) -> &Vec<InstanceId> {
        match zone {
            Zone::Deck => &self.deck,
            Zone::Hand => &self.hand,
            Zone::Stack => &self.stack,
            Zone::Battlefield => &self.battlefield,
            Zone::Void => &self.void,
            Zone::Banished => &self.banished,
        }
    }

    fn list_mut(&mut self, zone: Zone) -> &mut Vec<InstanceId> {
        match zone {
            Zone::Deck => &mut self.deck,
            Zone::Hand => &mut self.hand,
            Zone::Stack => &mut self.stack,
            Zone::Battlefield => &mut self.battlefield,
            Zone::Void => &mut self.void,
            Zone::Banished => &mut self.banished,
        }
    }
}

/// Tracks card locations for both players and performs atomic moves.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZoneManager {
    /// instance -> (owner, zone). Owner never changes in Dreamtides.
    locations: FxHashMap<InstanceId, (PlayerId, Zone)>,
    zones: PlayerMap<PlayerZones>,
}

impl ZoneManager {
    /// Create an empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self { locations: FxHashMap::default(), zones: PlayerMap::with_default() }
    }

    /// Register a new instance in a zone (game setup only).
    ///
    /// Panics if the instance is already tracked.
    pub fn add_new(&mut self, instance: InstanceId, owner: PlayerId, zone: Zone) {
        if self.locations.contains_key(&instance) {
            panic!("{instance} already tracked by zone manager");
        }
        self.locations.insert(instance, (owner, zone));
        self.zones[owner].list_mut(zone).push(instance);
    }

    /// Move an instance from one zone to another, atomically.
    ///
    /// Validates that the instance is currently in `from`; fails with
    /// `IllegalAction` otherwise and mutates nothing.
    pub fn move_card(
        &mut self,
        instance: InstanceId,
        from: Zone,
        to: Zone,
        placement: Placement,
    ) -> EngineResult<()> {
        let Some(&(owner, current)) = self.locations.get(&instance) else {
            return Err(EngineError::illegal(format!("{instance} is not tracked")));
        };
        if current != from {
            return Err(EngineError::illegal(format!(
                "{instance} is in {current}, not {from}"
            )));
        }

        let zones = &mut self.zones[owner];
        zones.list_mut(from).retain(|&i| i != instance);
        let dest = zones.list_mut(to);
        match placement {
            Placement::Rightmost => dest.push(instance),
            Placement::Leftmost => dest.insert(0, instance),
            Placement::Index(i) => {
                let idx = i.min(dest.len());
                dest.insert(idx, instance);
            }
        }
        self.locations.insert(instance, (owner, to));
        Ok(())
    }

    /// Get the owner and zone of an instance.
    #[must_use]
    pub fn location(&self, instance: InstanceId) -> Option<(PlayerId, Zone)> {
        self.locations.get(&instance).copied()
    }

    /// Check whether `instance` is in `player`'s `zone`.
    #[must_use]
    pub fn contains(&self, player: PlayerId, instance: InstanceId, zone: Zone) -> bool {
        self.locations.get(&instance) == Some(&(player, zone))
    }

    /// The contents of a zone, in order.
    #[must_use]
    pub fn cards_in(&self, player: PlayerId, zone: Zone) -> &[InstanceId] {
        self.zones[player].list(zone)
    }

    /// The battlefield sequence; index 0 is leftmost.
    #[must_use]
    pub fn battlefield(&self, player: PlayerId) -> &[InstanceId] {
        &self.zones[player].battlefield
    }

    /// The leftmost character on a player's battlefield.
    #[must_use]
    pub fn leftmost(&self, player: PlayerId) -> Option<InstanceId> {
        self.zones[player].battlefield.first().copied()
    }

    /// Battlefield position of an instance, if it is on a battlefield.
    #[must_use]
    pub fn battlefield_index(&self, instance: InstanceId) -> Option<usize> {
        let &(owner, zone) = self.locations.get(&instance)?;
        if zone != Zone::Battlefield {
            return None;
        }
        self.zones[owner].battlefield.iter().position(|&i| i == instance)
    }

    /// The top card of a player's deck (next draw).
    #[must_use]
    pub fn top_of_deck(&self, player: PlayerId) -> Option<InstanceId> {
        self.zones[player].deck.last().copied()
    }

    /// Shuffle a player's deck.
    pub fn shuffle_deck(&mut self, player: PlayerId, rng: &mut GameRng) {
        rng.shuffle(&mut self.zones[player].deck);
    }

    /// Number of cards in a zone.
    #[must_use]
    pub fn zone_size(&self, player: PlayerId, zone: Zone) -> usize {
        self.zones[player].list(zone).len()
    }

    /// Total number of tracked instances.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.locations.len()
    }

    /// Verify the membership invariant: every tracked instance appears in
    /// exactly the one zone list its location says. Used by tests.
    #[must_use]
    pub fn check_consistency(&self) -> bool {
        let mut listed = 0usize;
        for player in PlayerId::both() {
            for zone in Zone::ALL {
                for &instance in self.zones[player].list(zone) {
                    listed += 1;
                    if self.locations.get(&instance) != Some(&(player, zone)) {
                        return false;
                    }
                }
            }
        }
        listed == self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_locate() {
        let mut zones = ZoneManager::new();
        zones.add_new(InstanceId(10), PlayerId::ONE, Zone::Deck);

        assert_eq!(zones.location(InstanceId(10)), Some((PlayerId::ONE, Zone::Deck)));
        assert!(zones.contains(PlayerId::ONE, InstanceId(10), Zone::Deck));
        assert!(!zones.contains(PlayerId::TWO, InstanceId(10), Zone::Deck));
        assert_eq!(zones.location(InstanceId(99)), None);
    }

    #[test]
    fn test_move_between_zones() {
        let mut zones = ZoneManager::new();
        zones.add_new(InstanceId(10), PlayerId::ONE, Zone::Hand);

        zones
            .move_card(InstanceId(10), Zone::Hand, Zone::Battlefield, Placement::default())
            .unwrap();

        assert!(zones.contains(PlayerId::ONE, InstanceId(10), Zone::Battlefield));
        assert_eq!(zones.zone_size(PlayerId::ONE, Zone::Hand), 0);
        assert!(zones.check_consistency());
    }

    #[test]
    fn test_move_wrong_source_fails() {
        let mut zones = ZoneManager::new();
        zones.add_new(InstanceId(10), PlayerId::ONE, Zone::Hand);

        let err = zones
            .move_card(InstanceId(10), Zone::Void, Zone::Battlefield, Placement::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalAction(_)));

        // Nothing moved.
        assert!(zones.contains(PlayerId::ONE, InstanceId(10), Zone::Hand));
    }

    #[test]
    fn test_battlefield_ordering() {
        let mut zones = ZoneManager::new();
        for i in 0..3 {
            zones.add_new(InstanceId(i), PlayerId::ONE, Zone::Hand);
            zones
                .move_card(InstanceId(i), Zone::Hand, Zone::Battlefield, Placement::default())
                .unwrap();
        }

        // Default placement is rightmost, so order matches play order.
        assert_eq!(
            zones.battlefield(PlayerId::ONE),
            &[InstanceId(0), InstanceId(1), InstanceId(2)]
        );
        assert_eq!(zones.leftmost(PlayerId::ONE), Some(InstanceId(0)));
        assert_eq!(zones.battlefield_index(InstanceId(2)), Some(2));
    }

    #[test]
    fn test_leftmost_placement() {
        let mut zones = ZoneManager::new();
        zones.add_new(InstanceId(1), PlayerId::ONE, Zone::Battlefield);
        zones.add_new(InstanceId(2), PlayerId::ONE, Zone::Hand);

        zones
            .move_card(InstanceId(2), Zone::Hand, Zone::Battlefield, Placement::Leftmost)
            .unwrap();

        assert_eq!(zones.leftmost(PlayerId::ONE), Some(InstanceId(2)));
    }

    #[test]
    fn test_void_preserves_insertion_order() {
        let mut zones = ZoneManager::new();
        for i in [5u32, 3, 9] {
            zones.add_new(InstanceId(i), PlayerId::TWO, Zone::Deck);
            zones.move_card(InstanceId(i), Zone::Deck, Zone::Void, Placement::default()).unwrap();
        }

        assert_eq!(
            zones.cards_in(PlayerId::TWO, Zone::Void),
            &[InstanceId(5), InstanceId(3), InstanceId(9)]
        );
    }

    #[test]
    fn test_top_of_deck() {
        let mut zones = ZoneManager::new();
        zones.add_new(InstanceId(1), PlayerId::ONE, Zone::Deck);
        zones.add_new(InstanceId(2), PlayerId::ONE, Zone::Deck);

        // Top is the last element.
        assert_eq!(zones.top_of_deck(PlayerId::ONE), Some(InstanceId(2)));
    }

    #[test]
    fn test_shuffle_deck() {
        let mut zones = ZoneManager::new();
        for i in 0..20 {
            zones.add_new(InstanceId(i), PlayerId::ONE, Zone::Deck);
        }
        let before: Vec<_> = zones.cards_in(PlayerId::ONE, Zone::Deck).to_vec();

        let mut rng = GameRng::new(42);
        zones.shuffle_deck(PlayerId::ONE, &mut rng);

        let after: Vec<_> = zones.cards_in(PlayerId::ONE, Zone::Deck).to_vec();
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
        assert!(zones.check_consistency());
    }

    #[test]
    #[should_panic(expected = "already tracked")]
    fn test_duplicate_add_panics() {
        let mut zones = ZoneManager::new();
        zones.add_new(InstanceId(1), PlayerId::ONE, Zone::Deck);
        zones.add_new(InstanceId(1), PlayerId::ONE, Zone::Hand);
    }
}
