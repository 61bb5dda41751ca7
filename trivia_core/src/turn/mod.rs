//! Turn state machine.
//!
//! The machine never waits. Each input method checks that it answers the
//! pending [`Phase`], applies the result, and leaves the machine in the next
//! phase with any resulting [`GameEvent`]s queued for `drain_events`.

mod phase;

pub use phase::*;

use tracing::{debug, error, info, instrument, warn};
use trivia_rules::{NodeId, NodeKind, PlayerIndex, RulesError, WedgeColor};

use crate::config::MovementMode;
use crate::duel::{eligible_defenders, DuelOutcome, DuelState};
use crate::error::{DuelError, MoveError, SessionError, TurnError};
use crate::events::{ExtraRollReason, GameEvent};
use crate::movement::{
    commit_move, find_path, plan_traversal, reachable_destinations, validate_roll,
    IntersectionWalk, WalkStatus,
};
use crate::questions::QuestionHistory;
use crate::save::SaveData;
use crate::session::Session;

pub struct TurnMachine {
    session: Session,
    phase: Phase,
    duel: Option<DuelState>,
    events: Vec<GameEvent>,
}

impl TurnMachine {
    pub fn new(session: Session) -> Self {
        let mut machine = Self {
            session,
            phase: Phase::WaitingForRoll,
            duel: None,
            events: Vec::new(),
        };

        let state = machine.session.state();
        match state.winner().filter(|_| state.game_ended()) {
            Some(winner) => machine.phase = Phase::GameOver { winner },
            None => {
                let player = state.current_player();
                machine.emit(GameEvent::TurnStarted { player });
            }
        }
        machine
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_player(&self) -> PlayerIndex {
        self.session.state().current_player()
    }

    pub fn duel(&self) -> Option<&DuelState> {
        self.duel.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_game_over()
    }

    /// Take all events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Late registration of a piece, e.g. after a restore.
    pub fn register_piece(&mut self, player: PlayerIndex) -> Result<(), SessionError> {
        self.session.register_piece(player).map(|_| ())
    }

    /// Save between moves. Mid-move phases cannot be saved.
    pub fn snapshot(&self, history: QuestionHistory) -> Result<SaveData, TurnError> {
        match self.phase {
            Phase::WaitingForRoll | Phase::GameOver { .. } => Ok(self.session.snapshot(history)),
            _ => Err(TurnError::UnexpectedInput {
                input: "snapshot",
                phase: self.phase.name(),
            }),
        }
    }

    /// The current player asks to roll.
    #[instrument(level = "debug", skip(self))]
    pub fn request_roll(&mut self) -> Result<(), TurnError> {
        if !matches!(self.phase, Phase::WaitingForRoll) {
            return Err(self.unexpected("request_roll"));
        }
        let player = self.current_player();
        if self.session.piece(player).is_none() {
            return Err(TurnError::MissingPiece(player));
        }
        self.phase = Phase::Rolling;
        Ok(())
    }

    /// The dice oracle reports `value`.
    #[instrument(level = "debug", skip(self))]
    pub fn submit_roll(&mut self, value: u8) -> Result<(), TurnError> {
        if !matches!(self.phase, Phase::Rolling) {
            return Err(self.unexpected("submit_roll"));
        }
        let player = self.current_player();
        self.emit(GameEvent::Rolled { player, value });

        let steps = match validate_roll(value) {
            Ok(steps) => steps,
            Err(e) => return self.abort_move(player, e),
        };
        let origin = self.piece_node(player)?;
        let mode = self.session.config().movement_mode;
        let board = self.session.board();

        match mode {
            MovementMode::Destination => match reachable_destinations(board, &origin, steps) {
                Ok(candidates) => {
                    self.emit(GameEvent::DestinationsOffered {
                        player,
                        nodes: candidates.clone(),
                    });
                    self.phase = Phase::ChoosingDestination { steps, candidates };
                    Ok(())
                }
                Err(e) => self.abort_move(player, e),
            },
            MovementMode::Stepwise => match IntersectionWalk::begin(board, &origin, steps) {
                Ok((walk, status)) => self.continue_walk(player, walk, status),
                Err(e) => self.abort_move(player, e),
            },
        }
    }

    /// The dice oracle gave up or returned something unreadable.
    pub fn abort_roll(&mut self, reason: &str) -> Result<(), TurnError> {
        if !matches!(self.phase, Phase::Rolling) {
            return Err(self.unexpected("abort_roll"));
        }
        let player = self.current_player();
        warn!(%player, reason, "roll abandoned");
        self.emit(GameEvent::MoveAborted {
            player,
            reason: reason.to_string(),
        });
        self.phase = Phase::WaitingForRoll;
        Ok(())
    }

    /// The player picks one of the highlighted destinations.
    #[instrument(level = "debug", skip(self))]
    pub fn select_destination(&mut self, destination: NodeId) -> Result<(), TurnError> {
        let (steps, candidates) = match &self.phase {
            Phase::ChoosingDestination { steps, candidates } => (*steps, candidates),
            _ => return Err(self.unexpected("select_destination")),
        };
        if !candidates.contains(&destination) {
            return Err(MoveError::IllegalChoice(destination).into());
        }
        let nodes = candidates.clone();
        let player = self.current_player();
        self.emit(GameEvent::HighlightCleared { nodes });

        let origin = self.piece_node(player)?;
        match find_path(self.session.board(), &origin, &destination, steps) {
            Ok(path) => self.start_move(player, origin, path),
            Err(e) => self.abort_move(player, e),
        }
    }

    /// The player picks the way on at an intersection.
    #[instrument(level = "debug", skip(self))]
    pub fn choose_branch(&mut self, next: NodeId) -> Result<(), TurnError> {
        let (mut walk, options) = match &self.phase {
            Phase::ChoosingBranch { walk, options } => (walk.clone(), options.clone()),
            _ => return Err(self.unexpected("choose_branch")),
        };
        let player = self.current_player();

        let status = match walk.choose(self.session.board(), &next) {
            Ok(status) => status,
            Err(e @ MoveError::IllegalChoice(_)) => return Err(e.into()),
            Err(e) => return self.abort_move(player, e),
        };
        self.emit(GameEvent::HighlightCleared { nodes: options });
        self.continue_walk(player, walk, status)
    }

    /// The presentation layer has finished animating the move.
    #[instrument(level = "debug", skip(self))]
    pub fn finish_animation(&mut self) -> Result<(), TurnError> {
        let plan = match &self.phase {
            Phase::Moving { plan } => plan.clone(),
            _ => return Err(self.unexpected("finish_animation")),
        };
        let player = plan.player;
        let (board, piece) = self
            .session
            .board_and_piece(player)
            .ok_or(TurnError::MissingPiece(player))?;

        if let Err(e) = commit_move(board, piece, &plan) {
            error!(%player, error = %e, "move could not be committed");
            self.emit(GameEvent::MoveAborted {
                player,
                reason: e.to_string(),
            });
            self.phase = Phase::WaitingForRoll;
            return Err(e.into());
        }

        let node = plan.destination().clone();
        self.emit(GameEvent::MoveCompleted {
            player,
            node: node.clone(),
        });
        self.resolve_landing(player, node)
    }

    /// The question bank reports the pending answer.
    #[instrument(level = "debug", skip(self))]
    pub fn submit_answer(&mut self, correct: bool) -> Result<(), TurnError> {
        let pending = match &self.phase {
            Phase::AwaitingAnswer(pending) => pending.clone(),
            _ => return Err(self.unexpected("submit_answer")),
        };
        self.emit(GameEvent::Answered {
            player: pending.player,
            correct,
        });

        match pending.stake {
            QuestionStake::Normal if correct => {
                self.extra_roll(pending.player, ExtraRollReason::CorrectAnswer);
                Ok(())
            }
            QuestionStake::Wedge(color) if correct => {
                let granted = self.session.state_mut().grant_wedge(pending.player, color)?;
                let reason = match granted {
                    Some(change) => {
                        self.emit(GameEvent::WedgeChanged(change));
                        ExtraRollReason::WedgeWon
                    }
                    None => ExtraRollReason::CorrectAnswer,
                };
                if !self.check_game_over() {
                    self.extra_roll(pending.player, reason);
                }
                Ok(())
            }
            QuestionStake::Normal | QuestionStake::Wedge(_) => self.pass_turn(),
            QuestionStake::Duel => self.resolve_duel_answer(correct),
        }
    }

    /// The attacker picks whom to challenge and for which color.
    #[instrument(level = "debug", skip(self))]
    pub fn choose_duel_target(
        &mut self,
        defender: PlayerIndex,
        color: WedgeColor,
    ) -> Result<(), TurnError> {
        if !matches!(self.phase, Phase::ChoosingDuelTarget { .. }) {
            return Err(self.unexpected("choose_duel_target"));
        }
        let attacker = self.current_player();
        let duel = DuelState::begin(self.session.state(), attacker, defender, color)?;

        self.emit(GameEvent::DuelStarted {
            attacker,
            defender,
            color,
        });
        self.duel = Some(duel);
        self.ask_duel_question(attacker)
    }

    fn unexpected(&self, input: &'static str) -> TurnError {
        if self.phase.is_game_over() {
            TurnError::GameOver
        } else {
            TurnError::UnexpectedInput {
                input,
                phase: self.phase.name(),
            }
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn piece_node(&self, player: PlayerIndex) -> Result<NodeId, TurnError> {
        self.session
            .piece(player)
            .map(|piece| piece.node().clone())
            .ok_or(TurnError::MissingPiece(player))
    }

    /// Drop the move and let the same player roll again. Only board defects
    /// are reported to the caller.
    fn abort_move(&mut self, player: PlayerIndex, e: MoveError) -> Result<(), TurnError> {
        if e.is_configuration() {
            error!(%player, error = %e, "board cannot resolve this move");
        } else {
            warn!(%player, error = %e, "move abandoned");
        }
        self.emit(GameEvent::MoveAborted {
            player,
            reason: e.to_string(),
        });
        self.phase = Phase::WaitingForRoll;

        if e.is_configuration() {
            Err(e.into())
        } else {
            Ok(())
        }
    }

    fn continue_walk(
        &mut self,
        player: PlayerIndex,
        walk: IntersectionWalk,
        status: WalkStatus,
    ) -> Result<(), TurnError> {
        match status {
            WalkStatus::Arrived => {
                let origin = walk.origin().clone();
                self.start_move(player, origin, walk.into_path())
            }
            WalkStatus::Branch { at, options } => {
                self.emit(GameEvent::BranchOffered {
                    player,
                    at,
                    options: options.clone(),
                });
                self.phase = Phase::ChoosingBranch { walk, options };
                Ok(())
            }
        }
    }

    fn start_move(
        &mut self,
        player: PlayerIndex,
        origin: NodeId,
        path: Vec<NodeId>,
    ) -> Result<(), TurnError> {
        let geometry = self.session.geometry();
        match plan_traversal(self.session.board(), player, &origin, path, &geometry) {
            Ok(plan) => {
                debug!(
                    %player,
                    to = %plan.destination(),
                    jumps = plan.jump_count(),
                    "move planned"
                );
                self.emit(GameEvent::MoveStarted { plan: plan.clone() });
                self.phase = Phase::Moving { plan };
                Ok(())
            }
            Err(e) => self.abort_move(player, e),
        }
    }

    fn resolve_landing(&mut self, player: PlayerIndex, node: NodeId) -> Result<(), TurnError> {
        let landing = self.session.board().require(&node).map_err(MoveError::from)?;
        let (kind, color) = (landing.kind, landing.color);
        debug!(%player, %node, %kind, "resolving landing");

        match kind {
            NodeKind::Normal | NodeKind::Wedge => {
                let Some(color) = color else {
                    return self.fail_category(player, RulesError::UncoloredNode(node));
                };
                let category = match self.session.state().categories().category_for(color) {
                    Ok(category) => category.clone(),
                    Err(e) => return self.fail_category(player, e),
                };

                let config = self.session.config();
                let (profile, stake) = if kind == NodeKind::Wedge {
                    (config.wedge_difficulty, QuestionStake::Wedge(color))
                } else {
                    (config.normal_difficulty, QuestionStake::Normal)
                };
                let difficulty = self.session.sample_difficulty(profile);
                self.ask(PendingQuestion {
                    player,
                    category,
                    difficulty,
                    stake,
                });
                Ok(())
            }
            NodeKind::Reroll => {
                self.extra_roll(player, ExtraRollReason::RerollNode);
                Ok(())
            }
            NodeKind::Start => self.offer_duel(player),
        }
    }

    /// A landing whose category cannot be resolved is reported and the turn
    /// moves on.
    fn fail_category(&mut self, player: PlayerIndex, e: RulesError) -> Result<(), TurnError> {
        error!(%player, error = %e, "no category for landing node");
        self.pass_turn()?;
        Err(e.into())
    }

    fn ask(&mut self, question: PendingQuestion) {
        info!(
            player = %question.player,
            category = %question.category,
            difficulty = %question.difficulty,
            "question asked"
        );
        self.emit(GameEvent::QuestionAsked {
            player: question.player,
            category: question.category.clone(),
            difficulty: question.difficulty,
            stake: question.stake,
        });
        self.phase = Phase::AwaitingAnswer(question);
    }

    fn extra_roll(&mut self, player: PlayerIndex, reason: ExtraRollReason) {
        debug!(%player, ?reason, "extra roll");
        self.emit(GameEvent::ExtraRoll { player, reason });
        self.phase = Phase::WaitingForRoll;
    }

    fn pass_turn(&mut self) -> Result<(), TurnError> {
        let from = self.current_player();
        let to = self.session.state_mut().advance()?;
        info!(%from, %to, "turn passed");
        self.emit(GameEvent::TurnPassed { from, to });
        self.emit(GameEvent::TurnStarted { player: to });
        self.phase = Phase::WaitingForRoll;
        Ok(())
    }

    fn check_game_over(&mut self) -> bool {
        let state = self.session.state();
        match state.winner().filter(|_| state.game_ended()) {
            Some(winner) => {
                info!(player = %winner, "game won");
                self.emit(GameEvent::GameWon { player: winner });
                self.phase = Phase::GameOver { winner };
                true
            }
            None => false,
        }
    }

    fn offer_duel(&mut self, attacker: PlayerIndex) -> Result<(), TurnError> {
        let candidates = eligible_defenders(self.session.state(), attacker);
        if candidates.is_empty() {
            info!(%attacker, "no wedges to steal");
            self.emit(GameEvent::DuelSkipped { player: attacker });
            return self.pass_turn();
        }

        self.emit(GameEvent::DuelTargetRequested {
            attacker,
            candidates: candidates.clone(),
        });
        self.phase = Phase::ChoosingDuelTarget { candidates };
        Ok(())
    }

    fn ask_duel_question(&mut self, player: PlayerIndex) -> Result<(), TurnError> {
        let Some(color) = self.duel.as_ref().map(|duel| duel.color) else {
            return Err(DuelError::NoActiveDuel.into());
        };
        let category = match self.session.state().categories().category_for(color) {
            Ok(category) => category.clone(),
            Err(e) => {
                self.duel = None;
                return self.fail_category(player, e);
            }
        };
        let profile = self.session.config().duel_difficulty;
        let difficulty = self.session.sample_difficulty(profile);

        self.ask(PendingQuestion {
            player,
            category,
            difficulty,
            stake: QuestionStake::Duel,
        });
        Ok(())
    }

    fn resolve_duel_answer(&mut self, correct: bool) -> Result<(), TurnError> {
        let Some(mut duel) = self.duel.take() else {
            return Err(DuelError::NoActiveDuel.into());
        };

        match duel.resolve(self.session.state_mut(), correct)? {
            DuelOutcome::Continue { next } => {
                self.duel = Some(duel);
                self.ask_duel_question(next)
            }
            DuelOutcome::AttackerFailed => {
                self.emit(GameEvent::DuelEnded {
                    attacker: duel.attacker,
                    defender: duel.defender,
                    color: duel.color,
                    stolen: false,
                });
                self.pass_turn()
            }
            DuelOutcome::DefenderFailed { change } => {
                self.emit(GameEvent::WedgeChanged(change));
                self.emit(GameEvent::DuelEnded {
                    attacker: duel.attacker,
                    defender: duel.defender,
                    color: duel.color,
                    stolen: true,
                });
                if !self.check_game_over() {
                    self.extra_roll(duel.attacker, ExtraRollReason::DuelWon);
                }
                Ok(())
            }
        }
    }
}
