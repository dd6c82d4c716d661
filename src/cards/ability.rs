//! Ability specifications.
//!
//! Card behavior is data: every ability is a tagged `AbilitySpec` composed
//! from a small effect vocabulary, so new cards never require new engine
//! code. The dispatcher matches `EventPattern`s against the event stream;
//! the layer system consumes `Static` entries; the replacement interceptor
//! consumes `Replacement` entries.

use serde::{Deserialize, Serialize};

use crate::effects::effect::Effect;
use crate::effects::layers::ContinuousEffect;
use crate::effects::queries::Condition;

/// When an ability or card may be used.
///
/// Records the card's intended speed. The engine's action gate enforces
/// sorcery timing structurally; Prevent eligibility keys off
/// `ReplacementPattern`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timing {
    /// Only during the controller's own turn, with an empty stack.
    Sorcery,
    /// May be used during the opponent's priority window (e.g. Prevent).
    Fast,
}

/// What a triggered ability listens for.
///
/// Patterns are interpreted relative to the ability's source instance and
/// its controller. Triggered abilities listen from the battlefield;
/// `Dissolved` additionally fires for the source's own departure event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventPattern {
    /// This card entered the battlefield.
    Materialized,
    /// This card was dissolved.
    Dissolved,
    /// Any card entered the controller's void.
    EntersVoid,
    /// The controller drew a card.
    Drawn,
    /// The controller played a card.
    Played,
    /// The Judgment phase fires this ability. Driven by the Judgment
    /// controller, never by generic event matching.
    Judgment,
    /// A turn ended.
    TurnEnded,
    /// The controller prevented a card.
    Prevented,
    /// The controller gained energy.
    EnergyGained,
}

/// A triggered ability: pattern, optional threshold, effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub pattern: EventPattern,
    pub condition: Option<Condition>,
    pub effect: Effect,
    pub timing: Timing,
}

impl TriggeredAbility {
    /// A sorcery-speed trigger with no condition.
    #[must_use]
    pub fn new(pattern: EventPattern, effect: Effect) -> Self {
        Self { pattern, condition: None, effect, timing: Timing::Sorcery }
    }

    /// Gate this trigger behind a threshold condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// What a replacement ability intercepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacementPattern {
    /// A card the opponent played, before it resolves (Prevent).
    CardPlayed,
    /// A character the controller owns would be dissolved.
    WouldDissolve,
}

/// One ability on a card definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AbilitySpec {
    /// Fires when its pattern matches a dispatched event.
    Triggered(TriggeredAbility),
    /// Always-on while the source is on the battlefield.
    Static(ContinuousEffect),
    /// Player-activated, paying an energy cost.
    Activated { cost: u32, effect: Effect },
    /// Cancels or redirects a matching in-flight event. `effect` is the
    /// rider executed when the replacement applies (may be empty).
    Replacement { pattern: ReplacementPattern, effect: Effect },
}

impl AbilitySpec {
    /// Shorthand for an unconditional sorcery-speed trigger.
    #[must_use]
    pub fn triggered(pattern: EventPattern, effect: Effect) -> Self {
        Self::Triggered(TriggeredAbility::new(pattern, effect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggered_builder() {
        let ability = TriggeredAbility::new(EventPattern::Materialized, Effect::Draw {
            player: crate::effects::effect::PlayerSel::Controller,
            count: 1,
        })
        .with_condition(Condition::QueryAtLeast(
            crate::effects::queries::QueryKind::CardsInVoid,
            3,
        ));

        assert_eq!(ability.pattern, EventPattern::Materialized);
        assert!(ability.condition.is_some());
        assert_eq!(ability.timing, Timing::Sorcery);
    }

    #[test]
    fn test_ability_serialization() {
        let spec = AbilitySpec::triggered(
            EventPattern::EntersVoid,
            Effect::Kindle { amount: 1 },
        );

        let json = serde_json::to_string(&spec).unwrap();
        let deserialized: AbilitySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, deserialized);
    }
}
