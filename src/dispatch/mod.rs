//! Events, the replay log, trigger dispatch, and replacement interception.

pub mod dispatcher;
pub mod event;
pub mod replacement;

pub use dispatcher::Dispatcher;
pub use event::{Cause, EventKind, GameEvent, ReplayLog};
