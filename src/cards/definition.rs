//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable, authored properties of a card:
//! cost, printed spark, type, resonance, and its ability list. Definitions
//! are produced by external authoring tooling and validated by the
//! `CardRegistry` at load time.
//!
//! Per-game mutable state (zone, applied modifiers) lives in `CardInstance`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ability::AbilitySpec;
use crate::effects::queries::QueryKind;

/// Unique identifier for a card definition.
///
/// This identifies the card's printed identity, not a specific copy in a
/// game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The two playable card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Stays on the battlefield after resolving; has spark.
    Character,
    /// Resolves once and goes to the void.
    Event,
}

/// A card's deck-building color tag. Opaque to the engine; deck
/// construction tooling interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resonance(pub String);

impl Resonance {
    /// Create a resonance tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

/// A character's printed spark.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spark {
    /// A constant printed value.
    Fixed(u32),
    /// Recomputed from game state every time it is read. The query result
    /// is the base value; modifiers and statics apply on top of it.
    Variable(QueryKind),
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use dreamtides::cards::{CardDefinition, CardId, CardType, Spark};
///
/// let card = CardDefinition::character(CardId::new(1), "Tidecaller", 2)
///     .with_spark(Spark::Fixed(3))
///     .with_subtype("Mystic");
///
/// assert_eq!(card.cost, 2);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Card name (for display/debugging).
    pub name: String,

    /// Character or event.
    pub card_type: CardType,

    /// Base energy cost.
    pub cost: u32,

    /// Printed spark. Present exactly when `card_type` is `Character`.
    pub spark: Option<Spark>,

    /// Subtype line, e.g. "Mystic".
    pub subtype: Option<String>,

    /// Deck-building resonance tags.
    pub resonance: SmallVec<[Resonance; 2]>,

    /// Alternative cost to play this card from the void, if it has Reclaim.
    pub reclaim_cost: Option<u32>,

    /// Abilities in printed order. Order matters for trigger resolution.
    pub abilities: Vec<AbilitySpec>,
}

impl CardDefinition {
    /// Create a character definition with no spark set yet.
    #[must_use]
    pub fn character(id: CardId, name: impl Into<String>, cost: u32) -> Self {
        Self {
            id,
            name: name.into(),
            card_type: CardType::Character,
            cost,
            spark: Some(Spark::Fixed(0)),
            subtype: None,
            resonance: SmallVec::new(),
            reclaim_cost: None,
            abilities: Vec::new(),
        }
    }

    /// Create an event definition.
    #[must_use]
    pub fn event(id: CardId, name: impl Into<String>, cost: u32) -> Self {
        Self {
            id,
            name: name.into(),
            card_type: CardType::Event,
            cost,
            spark: None,
            subtype: None,
            resonance: SmallVec::new(),
            reclaim_cost: None,
            abilities: Vec::new(),
        }
    }

    /// Set the printed spark (builder pattern).
    #[must_use]
    pub fn with_spark(mut self, spark: Spark) -> Self {
        self.spark = Some(spark);
        self
    }

    /// Set the subtype line.
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Add a resonance tag.
    #[must_use]
    pub fn with_resonance(mut self, tag: impl Into<String>) -> Self {
        self.resonance.push(Resonance::new(tag));
        self
    }

    /// Grant Reclaim at the given alternative cost.
    #[must_use]
    pub fn with_reclaim(mut self, cost: u32) -> Self {
        self.reclaim_cost = Some(cost);
        self
    }

    /// Append an ability.
    #[must_use]
    pub fn with_ability(mut self, ability: AbilitySpec) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Whether this card may be played from the void.
    #[must_use]
    pub fn has_reclaim(&self) -> bool {
        self.reclaim_cost.is_some()
    }

    /// Whether this is a character.
    #[must_use]
    pub fn is_character(&self) -> bool {
        self.card_type == CardType::Character
    }
}
