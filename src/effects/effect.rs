//! The effect primitive vocabulary.
//!
//! Card behavior composes from these primitives; new cards are data, not
//! new code. The resolver executes an `Effect` against game state within a
//! resolution frame that fixes the source, controller, triggering event,
//! and (for modal effects) the chosen mode.

use serde::{Deserialize, Serialize};

use crate::cards::instance::{ModifierExpiry, ModifierKind};
use crate::effects::queries::Condition;
use crate::zones::zone::Zone;

/// A player reference relative to the effect's controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSel {
    Controller,
    Opponent,
}

/// What an effect acts on, resolved at execution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The effect's source instance.
    This,
    /// The instance named by the triggering event.
    Triggering,
    /// The controller's leftmost battlefield character.
    LeftmostAlly,
    /// Every character on the controller's battlefield.
    EachAlly,
    /// Every character on the opponent's battlefield.
    EachEnemy,
    /// The oldest card in the controller's void.
    OldestInVoid,
    /// The oldest event card in the controller's void.
    OldestEventInVoid,
}

/// One executable effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Move the target to a zone (retrieval, materialize-from-void).
    MoveTo { target: EffectTarget, zone: Zone },
    /// Dissolve the target character (battlefield to void, with dissolve
    /// triggers and replacement interception).
    Dissolve { target: EffectTarget },
    /// The controller abandons the target character (battlefield to void,
    /// no dissolve triggers).
    Abandon { target: EffectTarget },
    /// Remove the target from the game.
    Banish { target: EffectTarget },
    /// Banish the target, then return it to the battlefield, re-triggering
    /// Materialized.
    FlickerReturn { target: EffectTarget },
    Draw { player: PlayerSel, count: u32 },
    /// Deck top to void, one `ZoneChanged` per card.
    Mill { player: PlayerSel, count: u32 },
    /// Discard from the front of the hand.
    Discard { player: PlayerSel, count: u32 },
    GainEnergy { player: PlayerSel, amount: u32 },
    GainPoints { player: PlayerSel, amount: u32 },
    /// Permanent spark increase on the controller's leftmost character.
    Kindle { amount: u32 },
    /// Apply a modifier to the target.
    ApplyModifier { target: EffectTarget, kind: ModifierKind, expiry: ModifierExpiry },
    /// "Choose one of N". The mode is fixed when the triggering action is
    /// submitted and stored on the resolution frame; later queries cannot
    /// retroactively change which mode resolved.
    ChooseMode(Vec<Effect>),
    /// Execute each step in order.
    Sequence(Vec<Effect>),
    /// Execute `then` only if the condition holds at the frame's log
    /// snapshot.
    Conditional { condition: Condition, then: Box<Effect> },
    /// Grant an additional Judgment phase this turn.
    AdditionalJudgment,
}
