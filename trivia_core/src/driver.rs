//! Pumps a [`TurnMachine`] against concrete collaborators.

use tracing::warn;
use trivia_rules::PlayerIndex;

use crate::collaborators::{DiceOracle, Presentation, QuestionBank};
use crate::error::TurnError;
use crate::events::GameEvent;
use crate::save::SaveData;
use crate::turn::{Phase, TurnMachine};

/// Where a pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// The current player may roll.
    AwaitingRoll,
    /// The presentation layer has not made a pending choice yet.
    Stalled,
    GameOver { winner: PlayerIndex },
}

pub struct Driver<D, Q, P> {
    machine: TurnMachine,
    dice: D,
    bank: Q,
    presentation: P,
}

impl<D, Q, P> Driver<D, Q, P>
where
    D: DiceOracle,
    Q: QuestionBank,
    P: Presentation,
{
    pub fn new(machine: TurnMachine, dice: D, bank: Q, presentation: P) -> Self {
        Self {
            machine,
            dice,
            bank,
            presentation,
        }
    }

    pub fn machine(&self) -> &TurnMachine {
        &self.machine
    }

    pub fn bank(&self) -> &Q {
        &self.bank
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn into_parts(self) -> (TurnMachine, D, Q, P) {
        (self.machine, self.dice, self.bank, self.presentation)
    }

    /// Snapshot the game, including the question history.
    pub fn save(&self) -> Result<SaveData, TurnError> {
        self.machine.snapshot(self.bank.history())
    }

    /// Roll for the current player and run until the next roll trigger.
    pub fn play_turn(&mut self) -> Result<PumpStatus, TurnError> {
        self.machine.request_roll()?;
        self.pump()
    }

    /// Play up to `max_rolls` rolls, stopping early on game over or a stall.
    pub fn play(&mut self, max_rolls: usize) -> Result<PumpStatus, TurnError> {
        let mut status = self.pump()?;
        for _ in 0..max_rolls {
            if status != PumpStatus::AwaitingRoll {
                break;
            }
            status = self.play_turn()?;
        }
        Ok(status)
    }

    /// Feed collaborator results into the machine until it waits for a roll
    /// trigger, ends, or needs a choice the presentation layer withholds.
    pub fn pump(&mut self) -> Result<PumpStatus, TurnError> {
        loop {
            self.dispatch_events();
            let player = self.machine.current_player();

            match self.machine.phase().clone() {
                Phase::WaitingForRoll => return Ok(PumpStatus::AwaitingRoll),
                Phase::GameOver { winner } => return Ok(PumpStatus::GameOver { winner }),
                Phase::Rolling => match self.dice.roll() {
                    Ok(value) => self.machine.submit_roll(value)?,
                    Err(e) => self.machine.abort_roll(&e.to_string())?,
                },
                Phase::ChoosingDestination { candidates, .. } => {
                    match self.presentation.prompt_selection(player, &candidates) {
                        Some(node) => self.machine.select_destination(node)?,
                        None => return Ok(PumpStatus::Stalled),
                    }
                }
                Phase::ChoosingBranch { options, .. } => {
                    match self.presentation.prompt_selection(player, &options) {
                        Some(node) => self.machine.choose_branch(node)?,
                        None => return Ok(PumpStatus::Stalled),
                    }
                }
                Phase::Moving { plan } => {
                    self.presentation.animate_move(&plan);
                    self.machine.finish_animation()?;
                }
                Phase::AwaitingAnswer(question) => {
                    let correct = self
                        .bank
                        .ask(question.player, &question.category, question.difficulty)
                        .unwrap_or_else(|e| {
                            warn!(error = %e, "question unavailable, counted as wrong");
                            false
                        });
                    self.machine.submit_answer(correct)?;
                }
                Phase::ChoosingDuelTarget { candidates } => {
                    match self.presentation.prompt_duel_target(player, &candidates) {
                        Some((defender, color)) => {
                            self.machine.choose_duel_target(defender, color)?
                        }
                        None => return Ok(PumpStatus::Stalled),
                    }
                }
            }
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.machine.drain_events() {
            match &event {
                GameEvent::DestinationsOffered { player, nodes } => {
                    self.presentation.highlight(*player, nodes)
                }
                GameEvent::BranchOffered {
                    player, options, ..
                } => self.presentation.highlight(*player, options),
                GameEvent::HighlightCleared { nodes } => self.presentation.unhighlight(nodes),
                GameEvent::WedgeChanged(change) => self.presentation.wedge_changed(change),
                _ => {}
            }
            self.presentation.on_event(&event);
        }
    }
}
