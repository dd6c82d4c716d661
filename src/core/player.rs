//! Player identification and per-player data storage.
//!
//! Dreamtides is a two-player game. `PlayerId` identifies one side and
//! `PlayerMap` stores one value per side with O(1) access.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The first player.
    pub const ONE: PlayerId = PlayerId(0);

    /// The second player.
    pub const TWO: PlayerId = PlayerId(1);

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> PlayerId {
        PlayerId(1 - self.0)
    }

    /// Both players in seating order.
    #[must_use]
    pub const fn both() -> [PlayerId; 2] {
        [Self::ONE, Self::TWO]
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// Per-player data storage.
///
/// ## Example
///
/// ```
/// use dreamtides::core::{PlayerId, PlayerMap};
///
/// let mut energy: PlayerMap<u32> = PlayerMap::with_value(0);
/// energy[PlayerId::ONE] = 3;
/// assert_eq!(energy[PlayerId::ONE], 3);
/// assert_eq!(energy[PlayerId::TWO], 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    one: T,
    two: T,
}

impl<T> PlayerMap<T> {
    /// Create with values from a factory function.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self { one: factory(PlayerId::ONE), two: factory(PlayerId::TWO) }
    }

    /// Create with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self { one: value.clone(), two: value }
    }

    /// Create with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a player's entry.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        match player {
            PlayerId::ONE => &self.one,
            _ => &self.two,
        }
    }

    /// Get a mutable reference to a player's entry.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        match player {
            PlayerId::ONE => &mut self.one,
            _ => &mut self.two,
        }
    }

    /// Iterate over (PlayerId, &T) pairs in seating order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        [(PlayerId::ONE, &self.one), (PlayerId::TWO, &self.two)].into_iter()
    }
}

impl<T: Default> Default for PlayerMap<T> {
    fn default() -> Self {
        Self::with_default()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}
