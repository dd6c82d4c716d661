//! Zone identities and placement.

use serde::{Deserialize, Serialize};

/// The zones a card can occupy.
///
/// Every card instance is in exactly one zone at any time. `Stack` is the
/// transient holding area for a played card between payment and resolution;
/// `Banished` is the removed-from-game area used by flicker and banish
/// effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Ordered; the top of the deck is the last element.
    Deck,
    /// Insertion-ordered.
    Hand,
    /// Played cards awaiting resolution (or prevention).
    Stack,
    /// Ordered left to right; index 0 is the leftmost character.
    Battlefield,
    /// Discard pile. Insertion-ordered for mill display.
    Void,
    /// Removed from the game.
    Banished,
}

impl Zone {
    /// All zones, for iteration.
    pub const ALL: [Zone; 6] =
        [Zone::Deck, Zone::Hand, Zone::Stack, Zone::Battlefield, Zone::Void, Zone::Banished];
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::Deck => "deck",
            Zone::Hand => "hand",
            Zone::Stack => "stack",
            Zone::Battlefield => "battlefield",
            Zone::Void => "void",
            Zone::Banished => "banished",
        };
        write!(f, "{name}")
    }
}

/// Where a card lands in its destination zone.
///
/// Only meaningful for the battlefield (and the deck, where `Leftmost`
/// means bottom). Everything else appends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Append: rightmost on the battlefield, top of the deck.
    #[default]
    Rightmost,
    /// Prepend: leftmost on the battlefield, bottom of the deck.
    Leftmost,
    /// Insert at a specific index (clamped to the zone's length).
    Index(usize),
}
