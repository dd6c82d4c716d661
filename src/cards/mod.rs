//! Card definitions, abilities, instances, and the definition registry.

pub mod ability;
pub mod definition;
pub mod instance;
pub mod registry;

pub use ability::{AbilitySpec, EventPattern, ReplacementPattern, Timing, TriggeredAbility};
pub use definition::{CardDefinition, CardId, CardType, Resonance, Spark};
pub use instance::{CardInstance, Modifier, ModifierExpiry, ModifierKind};
pub use registry::CardRegistry;
