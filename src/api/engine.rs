//! The engine boundary surface.
//!
//! `GameEngine` owns one game and accepts player actions. Suspension
//! points are explicit states polled by the driving harness: after a card
//! is played, if the opponent holds an applicable Prevent, the engine
//! enters `AwaitingResponse` and resumes only when that player chooses a
//! replacement or passes. Nothing here is asynchronous; replay is
//! bit-for-bit deterministic given the same config and action sequence.

use tracing::debug;

use crate::cards::definition::CardType;
use crate::core::error::{EngineError, EngineResult};
use crate::core::ids::{ActionId, InstanceId};
use crate::core::player::PlayerId;
use crate::core::state::{GameConfig, GameState};
use crate::costs;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::event::{Cause, EventKind, GameEvent};
use crate::dispatch::replacement;
use crate::effects::queries;
use crate::effects::resolver::{self, EffectContext};
use crate::judgment;
use crate::zones::zone::{Placement, Zone};

use super::action::{Action, ActionRecord};
use crate::cards::ability::{AbilitySpec, EventPattern};
use crate::cards::registry::CardRegistry;

/// What the engine is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// The active player may act.
    AwaitingAction,
    /// A played card awaits the responder's Prevent decision.
    AwaitingResponse { responder: PlayerId },
    /// The game has ended.
    GameOver { winner: PlayerId },
}

/// A played card held on the stack pending a response window.
#[derive(Clone, Debug)]
struct PendingPlay {
    instance: InstanceId,
    player: PlayerId,
    mode: Option<usize>,
    action: ActionId,
    played: GameEvent,
}

/// One game instance and its action boundary.
#[derive(Debug)]
pub struct GameEngine {
    state: GameState,
    dispatcher: Dispatcher,
    status: EngineStatus,
    pending: Option<PendingPlay>,
    actions: Vec<ActionRecord>,
    next_action: u32,
}

impl GameEngine {
    /// Set up a game and start turn 1. The starting player gains turn
    /// energy but does not draw.
    pub fn new(config: GameConfig, registry: CardRegistry) -> EngineResult<Self> {
        let dispatcher = Dispatcher::new(config.max_depth);
        let energy = config.energy_per_turn;
        let mut state = GameState::new(config, registry)?;

        let active = state.active_player();
        let mut events = vec![state.emit(Cause::System, EventKind::TurnStarted {
            player: active,
            turn: 1,
        })];
        events.push(state.gain_energy(active, energy, Cause::System));
        dispatcher.run(&mut state, events)?;

        Ok(Self {
            state,
            dispatcher,
            status: EngineStatus::AwaitingAction,
            pending: None,
            actions: Vec::new(),
            next_action: 0,
        })
    }

    /// The current game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// What the engine is waiting for.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Every action applied so far, in order. Together with the
    /// `GameConfig` this reconstructs the game.
    #[must_use]
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Submit an action. Returns the batch of events it produced.
    ///
    /// Validation failures mutate nothing and are not recorded.
    /// `InfiniteLoopDetected` is recorded (its committed moves stand) and
    /// surfaced to the harness.
    pub fn submit(&mut self, player: PlayerId, action: Action) -> EngineResult<Vec<GameEvent>> {
        if let EngineStatus::GameOver { .. } = self.status {
            return Err(EngineError::illegal("the game is over"));
        }
        let id = ActionId(self.next_action);
        let log_start = self.state.log.len();

        let result = self.apply(player, action, id);
        match result {
            Ok(()) => {
                self.record(id, player, action);
                self.check_win();
                Ok(self.batch_since(log_start))
            }
            Err(err @ EngineError::InfiniteLoopDetected { .. }) => {
                self.record(id, player, action);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn record(&mut self, id: ActionId, player: PlayerId, action: Action) {
        self.actions.push(ActionRecord { id, player, action });
        self.next_action += 1;
    }

    fn batch_since(&self, log_start: usize) -> Vec<GameEvent> {
        self.state.log.iter().skip(log_start).cloned().collect()
    }

    fn apply(&mut self, player: PlayerId, action: Action, id: ActionId) -> EngineResult<()> {
        match self.status {
            EngineStatus::AwaitingResponse { responder } => {
                if player != responder {
                    return Err(EngineError::illegal(format!("{responder} holds the response")));
                }
                match action {
                    Action::ChooseReplacement { source } => self.apply_prevent(source, id),
                    Action::Pass => self.resolve_pending(),
                    _ => Err(EngineError::illegal("only ChooseReplacement or Pass may respond")),
                }
            }
            EngineStatus::AwaitingAction => {
                if player != self.state.active_player() {
                    return Err(EngineError::illegal(format!("it is not {player}'s turn")));
                }
                match action {
                    Action::PlayCard { instance, from_void, mode } => {
                        self.play_card(player, instance, from_void, mode, id)
                    }
                    Action::ActivateAbility { instance, index } => {
                        self.activate(player, instance, index, id)
                    }
                    Action::Pass => Ok(()),
                    Action::EndTurn => self.end_turn(player, id),
                    Action::ChooseReplacement { .. } => {
                        Err(EngineError::illegal("no response window is open"))
                    }
                }
            }
            EngineStatus::GameOver { .. } => Err(EngineError::illegal("the game is over")),
        }
    }

    fn play_card(
        &mut self,
        player: PlayerId,
        instance: InstanceId,
        from_void: bool,
        mode: Option<usize>,
        id: ActionId,
    ) -> EngineResult<()> {
        let from = if from_void { Zone::Void } else { Zone::Hand };
        if !self.state.zones.contains(player, instance, from) {
            return Err(EngineError::illegal(format!("{instance} is not in {player}'s {from}")));
        }

        // Validate the full cost before any mutation.
        let cost = costs::final_cost(&self.state, player, instance, from)?;
        costs::pay(&mut self.state, player, cost, Cause::Action(id))?;

        self.state.move_card(instance, from, Zone::Stack, Placement::default(), Cause::Action(id))?;
        let played = self.state.emit(Cause::Action(id), EventKind::CardPlayed {
            player,
            instance,
            from,
        });
        debug!(%player, %instance, cost, "card played");

        let pending = PendingPlay { instance, player, mode, action: id, played };
        let responder = player.opponent();
        if replacement::applicable_prevents(&self.state, responder).is_empty() {
            self.pending = Some(pending);
            self.resolve_pending()
        } else {
            self.pending = Some(pending);
            self.status = EngineStatus::AwaitingResponse { responder };
            Ok(())
        }
    }

    /// Resolve the pending play normally: characters materialize, events
    /// execute and go to the void. Only now is `CardPlayed` dispatched.
    fn resolve_pending(&mut self) -> EngineResult<()> {
        let Some(pending) = self.pending.take() else {
            return Err(EngineError::illegal("nothing is pending"));
        };
        self.status = EngineStatus::AwaitingAction;
        let cause = Cause::Action(pending.action);
        let mut events = vec![pending.played.clone()];

        let def = self.state.definition_of(pending.instance)?;
        match def.card_type {
            CardType::Character => {
                let moved = self.state.move_card(
                    pending.instance,
                    Zone::Stack,
                    Zone::Battlefield,
                    Placement::default(),
                    cause,
                )?;
                events.push(moved);
            }
            CardType::Event => {
                let abilities: Vec<_> = def
                    .abilities
                    .iter()
                    .filter_map(|ability| match ability {
                        AbilitySpec::Triggered(t) if t.pattern == EventPattern::Played => {
                            Some((t.condition, t.effect.clone()))
                        }
                        _ => None,
                    })
                    .collect();
                let snapshot = pending.played.id.raw() as usize;
                let ctx = EffectContext {
                    source: pending.instance,
                    controller: pending.player,
                    cause,
                    triggering: Some(pending.instance),
                    mode: pending.mode,
                    log_snapshot: snapshot,
                    depth: 0,
                };
                for (condition, effect) in &abilities {
                    if let Some(condition) = condition {
                        if !queries::check(&self.state, pending.player, *condition, Some(snapshot))
                        {
                            continue;
                        }
                    }
                    resolver::execute(&mut self.state, &ctx, effect, &mut events)?;
                }
                // Spent events go to the void after resolving.
                if self.state.zones.contains(pending.player, pending.instance, Zone::Stack) {
                    let moved = self.state.move_card(
                        pending.instance,
                        Zone::Stack,
                        Zone::Void,
                        Placement::default(),
                        cause,
                    )?;
                    events.push(moved);
                }
            }
        }
        self.dispatcher.run(&mut self.state, events)
    }

    /// Apply a Prevent: the responder pays and discards the Prevent card,
    /// the pending card goes from the stack to the void unresolved, and
    /// only the `Prevented` event is dispatched.
    fn apply_prevent(&mut self, source: InstanceId, id: ActionId) -> EngineResult<()> {
        let Some(pending) = self.pending.clone() else {
            return Err(EngineError::illegal("nothing is pending"));
        };
        let responder = pending.player.opponent();
        if !replacement::applicable_prevents(&self.state, responder).contains(&source) {
            return Err(EngineError::illegal(format!("{source} is not an applicable Prevent")));
        }
        let Some(index) = replacement::prevent_index(&self.state, source) else {
            return Err(EngineError::illegal(format!("{source} has no Prevent ability")));
        };
        let cause = Cause::Action(id);

        // Pay before consuming the pending play: a failed payment leaves
        // the response window open and the played card on the stack.
        let cost = costs::final_cost(&self.state, responder, source, Zone::Hand)?;
        costs::pay(&mut self.state, responder, cost, cause)?;
        self.pending = None;
        self.status = EngineStatus::AwaitingAction;

        let mut events = Vec::new();
        events.push(self.state.move_card(source, Zone::Hand, Zone::Void, Placement::default(), cause)?);
        events.push(self.state.move_card(
            pending.instance,
            Zone::Stack,
            Zone::Void,
            Placement::default(),
            cause,
        )?);
        events.push(self.state.emit(cause, EventKind::Prevented {
            original: Box::new(pending.played.kind.clone()),
            source,
        }));
        debug!(%source, prevented = %pending.instance, "play prevented");

        let rider = resolver::replacement_rider(&self.state, source, index)?;
        let ctx = EffectContext {
            source,
            controller: responder,
            cause,
            triggering: Some(pending.instance),
            mode: None,
            log_snapshot: pending.played.id.raw() as usize,
            depth: 0,
        };
        resolver::execute(&mut self.state, &ctx, &rider, &mut events)?;

        self.dispatcher.run(&mut self.state, events)
    }

    fn activate(
        &mut self,
        player: PlayerId,
        instance: InstanceId,
        index: usize,
        id: ActionId,
    ) -> EngineResult<()> {
        if !self.state.zones.contains(player, instance, Zone::Battlefield) {
            return Err(EngineError::illegal(format!(
                "{instance} is not on {player}'s battlefield"
            )));
        }
        let def = self.state.definition_of(instance)?;
        let Some(AbilitySpec::Activated { cost, effect }) = def.abilities.get(index) else {
            return Err(EngineError::illegal(format!("{instance} has no activated ability {index}")));
        };
        let (cost, effect) = (*cost, effect.clone());

        let cause = Cause::Action(id);
        costs::pay(&mut self.state, player, cost, cause)?;
        let ctx = EffectContext {
            source: instance,
            controller: player,
            cause,
            triggering: None,
            mode: None,
            log_snapshot: self.state.log.len(),
            depth: 0,
        };
        self.dispatcher.execute_and_drain(&mut self.state, &ctx, &effect)
    }

    fn end_turn(&mut self, player: PlayerId, _id: ActionId) -> EngineResult<()> {
        let turn = self.state.turn.number;
        self.state.expire_end_of_turn_modifiers();

        judgment::run(&mut self.state, &self.dispatcher)?;
        self.check_win();
        if let EngineStatus::GameOver { .. } = self.status {
            return Ok(());
        }

        let ended = self.state.emit(Cause::System, EventKind::TurnEnded { player, turn });
        self.dispatcher.run(&mut self.state, vec![ended])?;

        let next = player.opponent();
        self.state.turn.number = turn + 1;
        self.state.turn.active_player = next;
        self.state.turn.extra_judgments = 0;

        let mut events = vec![self.state.emit(Cause::System, EventKind::TurnStarted {
            player: next,
            turn: turn + 1,
        })];
        events.push(self.state.gain_energy(next, self.state.config.energy_per_turn, Cause::System));
        events.extend(self.state.draw_one(next, Cause::System)?);
        self.dispatcher.run(&mut self.state, events)
    }

    fn check_win(&mut self) {
        if let EngineStatus::GameOver { .. } = self.status {
            return;
        }
        let threshold = self.state.config.points_to_win;
        let active = self.state.active_player();
        // Ties go to the active player.
        for player in [active, active.opponent()] {
            if self.state.players[player].points >= threshold {
                self.status = EngineStatus::GameOver { winner: player };
                debug!(%player, "game over");
                return;
            }
        }
    }
}
