//! Game events and the replay log.
//!
//! Every observable state change is captured as a `GameEvent` with a causal
//! reference to the action or trigger that produced it. The log is
//! append-only; event ids are assigned in append order, so an id doubles as
//! the event's position in the log. That property is what lets threshold
//! queries truncate the log "as of" a triggering event.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::ids::{ActionId, EventId, InstanceId};
use crate::core::player::PlayerId;
use crate::zones::zone::Zone;

/// What produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cause {
    /// A player action submitted through the API.
    Action(ActionId),
    /// A triggered ability resolving in response to an earlier event.
    Trigger { source: InstanceId, event: EventId },
    /// Engine-driven turn structure (judgment, turn start/end).
    System,
}

/// The event vocabulary understood by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A card was played (paid for and put on the stack).
    CardPlayed { player: PlayerId, instance: InstanceId, from: Zone },
    /// A card moved between zones. Exactly one per committed move.
    ZoneChanged { instance: InstanceId, from: Zone, to: Zone },
    /// A character was dissolved. The accompanying `ZoneChanged` to the
    /// void (or banished) follows separately.
    CharacterDissolved { instance: InstanceId },
    /// A character was abandoned (sacrificed) by its controller.
    CharacterAbandoned { instance: InstanceId },
    CardDrawn { player: PlayerId, instance: InstanceId },
    CardDiscarded { player: PlayerId, instance: InstanceId },
    /// Summary event for a mill; the per-card `ZoneChanged` events carry
    /// the individual moves.
    CardsMilled { player: PlayerId, count: u32 },
    EnergyGained { player: PlayerId, amount: u32 },
    EnergySpent { player: PlayerId, amount: u32 },
    PointsScored { player: PlayerId, amount: u32 },
    /// Kindle resolved onto the leftmost ally.
    KindleApplied { target: InstanceId, amount: u32 },
    JudgmentStarted { turn: u32 },
    JudgmentEnded { turn: u32 },
    TurnStarted { player: PlayerId, turn: u32 },
    TurnEnded { player: PlayerId, turn: u32 },
    /// A replacement cancelled `original`. The original event was never
    /// dispatched; this event is, so prevent-reaction triggers can fire.
    Prevented { original: Box<EventKind>, source: InstanceId },
}

/// One entry in the replay log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position in the replay log.
    pub id: EventId,
    /// Turn number when the event occurred.
    pub turn: u32,
    /// Causal reference for replay and loop diagnosis.
    pub cause: Cause,
    pub kind: EventKind,
}

/// Append-only event history.
///
/// Backed by `im::Vector` so snapshots of the whole log are O(1) clones,
/// which parallel simulation harnesses rely on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    events: Vector<GameEvent>,
}

impl ReplayLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning the next id.
    pub fn append(&mut self, turn: u32, cause: Cause, kind: EventKind) -> GameEvent {
        let event = GameEvent { id: EventId(self.events.len() as u64), turn, cause, kind };
        self.events.push_back(event.clone());
        event
    }

    /// Number of logged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up an event by id.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&GameEvent> {
        self.events.get(id.raw() as usize)
    }

    /// Iterate the full log in order.
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Iterate the log truncated to the first `limit` events. Threshold
    /// queries use this to exclude the triggering event and anything after
    /// it.
    pub fn iter_until(&self, limit: usize) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().take(limit)
    }
}
