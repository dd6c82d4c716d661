//! Player actions.
//!
//! Actions are the only way a client mutates a game. Validation is
//! transactional: a rejected action mutates nothing.

use serde::{Deserialize, Serialize};

use crate::core::ids::{ActionId, InstanceId};
use crate::core::player::PlayerId;

/// A player action submitted through `GameEngine::submit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Play a card from hand, or from the void with Reclaim.
    PlayCard {
        instance: InstanceId,
        /// Play via Reclaim from the void instead of from hand.
        from_void: bool,
        /// Modal choice, for cards with a choose-one effect. Fixed here,
        /// at submission, so later queries cannot change which mode
        /// resolves.
        mode: Option<usize>,
    },
    /// Activate the numbered ability of a battlefield character.
    ActivateAbility { instance: InstanceId, index: usize },
    /// Apply a Prevent from hand during a response window.
    ChooseReplacement { source: InstanceId },
    /// Decline a response window, or do nothing.
    Pass,
    /// End the turn: expire turn modifiers, run Judgment, hand over.
    EndTurn,
}

/// A submitted action with its id, as recorded for replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: ActionId,
    pub player: PlayerId,
    pub action: Action,
}
