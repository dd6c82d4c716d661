//! Card instances - runtime card state.
//!
//! `CardInstance` is one copy of a card in one game. The instance id is
//! stable across zone moves, which is what lets "materialize from void" and
//! self-targeting abilities distinguish "this instance" from "a new copy".
//!
//! Zone membership is NOT stored here; the `ZoneManager` is the single
//! owner of zone sets. An instance carries only its identity, its applied
//! modifiers, and the timestamp of its last battlefield entry (used to
//! order continuous effects).

use serde::{Deserialize, Serialize};

use super::definition::CardId;
use crate::core::ids::InstanceId;
use crate::core::player::PlayerId;
use crate::zones::zone::Zone;

/// How long an applied modifier lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierExpiry {
    /// Stripped when the current turn ends.
    UntilEndOfTurn,
    /// Never stripped.
    Permanent,
    /// Stripped when the instance leaves the named zone.
    WhileInZone(Zone),
}

/// What an applied modifier changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Spark becomes this value (a layer-2 "set" effect).
    SetSpark(u32),
    /// Spark delta (layer 3).
    AddSpark(i32),
    /// Energy cost delta for playing this card (layer 3).
    AddCost(i32),
    /// Spark may not exceed this value (layer 4 clamp).
    SparkCap(u32),
    /// When this card would leave the battlefield for the void, it is
    /// banished instead.
    BanishOnLeave,
}

/// A temporary or permanent grant applied to one instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub expiry: ModifierExpiry,
    /// Establishment order for layer sequencing.
    pub timestamp: u64,
}

/// A card instance in a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique, zone-stable identity.
    pub id: InstanceId,

    /// Reference to the card definition.
    pub card_id: CardId,

    /// Owner. Ownership never changes in Dreamtides; the owner is also the
    /// controller.
    pub owner: PlayerId,

    /// Applied modifiers, in application order.
    pub modifiers: Vec<Modifier>,

    /// Timestamp of the most recent battlefield entry, if currently on the
    /// battlefield. Orders this card's static abilities in the layer
    /// system.
    pub entered_battlefield_at: Option<u64>,
}

impl CardInstance {
    /// Create a fresh instance of a definition.
    #[must_use]
    pub fn new(id: InstanceId, card_id: CardId, owner: PlayerId) -> Self {
        Self { id, card_id, owner, modifiers: Vec::new(), entered_battlefield_at: None }
    }

    /// Apply a modifier.
    pub fn add_modifier(&mut self, kind: ModifierKind, expiry: ModifierExpiry, timestamp: u64) {
        self.modifiers.push(Modifier { kind, expiry, timestamp });
    }

    /// Strip modifiers that expire at end of turn.
    pub fn expire_end_of_turn(&mut self) {
        self.modifiers.retain(|m| m.expiry != ModifierExpiry::UntilEndOfTurn);
    }

    /// Strip modifiers that only persist while the instance is in `zone`.
    /// Called by `GameState::move_card` as the instance departs.
    pub fn strip_zone_modifiers(&mut self, zone: Zone) {
        self.modifiers.retain(|m| m.expiry != ModifierExpiry::WhileInZone(zone));
    }

    /// Whether a void-bound departure from the battlefield is redirected to
    /// the banished zone.
    #[must_use]
    pub fn banish_on_leave(&self) -> bool {
        self.modifiers.iter().any(|m| m.kind == ModifierKind::BanishOnLeave)
    }
}
