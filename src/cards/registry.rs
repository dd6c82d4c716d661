//! Card definition loading and validation.
//!
//! The registry is the boundary with card-authoring tooling: definitions
//! are validated here, at load time, so that a malformed card can never
//! reach a live game. Play-time code may therefore assume every definition
//! it reads is well-formed.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ability::{AbilitySpec, EventPattern, ReplacementPattern};
use super::definition::{CardDefinition, CardId, CardType, Spark};
use crate::core::error::{EngineError, EngineResult};
use crate::effects::effect::Effect;

/// All card definitions known to one game.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
}

impl CardRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert a definition.
    ///
    /// Fails with `InvalidCardDefinition` on any structural problem;
    /// nothing is inserted in that case.
    pub fn insert(&mut self, card: CardDefinition) -> EngineResult<()> {
        validate(&card)?;
        if self.cards.contains_key(&card.id) {
            return Err(invalid(&card, format!("duplicate card id {}", card.id)));
        }
        self.cards.insert(card.id, card);
        Ok(())
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Look up a definition, failing with `IllegalAction` if unknown.
    pub fn definition(&self, id: CardId) -> EngineResult<&CardDefinition> {
        self.cards.get(&id).ok_or_else(|| EngineError::illegal(format!("unknown {id}")))
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn invalid(card: &CardDefinition, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidCardDefinition { name: card.name.clone(), reason: reason.into() }
}

fn validate(card: &CardDefinition) -> EngineResult<()> {
    match card.card_type {
        CardType::Character => {
            if card.spark.is_none() {
                return Err(invalid(card, "characters require a spark value"));
            }
        }
        CardType::Event => {
            if card.spark.is_some() {
                return Err(invalid(card, "events cannot have spark"));
            }
        }
    }
    if matches!(card.spark, Some(Spark::Variable(_))) && !card.is_character() {
        return Err(invalid(card, "variable spark is only valid on characters"));
    }

    for ability in &card.abilities {
        match ability {
            AbilitySpec::Triggered(trigger) => {
                let battlefield_only = matches!(
                    trigger.pattern,
                    EventPattern::Materialized | EventPattern::Dissolved | EventPattern::Judgment
                );
                if battlefield_only && !card.is_character() {
                    return Err(invalid(
                        card,
                        format!("{:?} triggers are only valid on characters", trigger.pattern),
                    ));
                }
                validate_effect(card, &trigger.effect)?;
            }
            AbilitySpec::Static(_) => {
                if !card.is_character() {
                    return Err(invalid(card, "static abilities are only valid on characters"));
                }
            }
            AbilitySpec::Activated { effect, .. } => {
                if !card.is_character() {
                    return Err(invalid(card, "activated abilities are only valid on characters"));
                }
                validate_effect(card, effect)?;
            }
            AbilitySpec::Replacement { pattern, effect } => {
                match pattern {
                    ReplacementPattern::CardPlayed if card.is_character() => {
                        return Err(invalid(card, "Prevent replacements are only valid on events"));
                    }
                    ReplacementPattern::WouldDissolve if !card.is_character() => {
                        return Err(invalid(
                            card,
                            "dissolve replacements are only valid on characters",
                        ));
                    }
                    _ => {}
                }
                validate_effect(card, effect)?;
            }
        }
    }
    Ok(())
}

fn validate_effect(card: &CardDefinition, effect: &Effect) -> EngineResult<()> {
    match effect {
        Effect::ChooseMode(modes) => {
            if modes.is_empty() {
                return Err(invalid(card, "modal effect with no modes"));
            }
            for mode in modes {
                validate_effect(card, mode)?;
            }
        }
        Effect::Sequence(steps) => {
            for step in steps {
                validate_effect(card, step)?;
            }
        }
        Effect::Conditional { then, .. } => validate_effect(card, then)?,
        Effect::Draw { count, .. } | Effect::Mill { count, .. } | Effect::Discard { count, .. } => {
            if *count == 0 {
                return Err(invalid(card, "zero-count effect"));
            }
        }
        Effect::Kindle { amount } => {
            if *amount == 0 {
                return Err(invalid(card, "zero-amount kindle"));
            }
        }
        _ => {}
    }
    Ok(())
}
