//! Effect primitives, continuous-effect layers, numeric queries, and the
//! effect resolver.

pub mod effect;
pub mod layers;
pub mod queries;
pub mod resolver;

pub use effect::{Effect, EffectTarget, PlayerSel};
pub use layers::{ContinuousEffect, CostFilter, CycleGuard};
pub use queries::{Condition, QueryKind};
pub use resolver::EffectContext;
