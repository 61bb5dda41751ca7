//! Steal duel: the attacker and a defender answer in turns until one of
//! them misses. A defender miss hands the contested wedge to the attacker.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use trivia_rules::{GameTurnState, PlayerIndex, WedgeChange, WedgeColor};

use crate::error::DuelError;

/// An opponent that can be challenged, with the colors at stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelCandidate {
    pub player: PlayerIndex,
    pub colors: Vec<WedgeColor>,
}

/// Opponents of `attacker` that own at least one wedge, in player order.
pub fn eligible_defenders(state: &GameTurnState, attacker: PlayerIndex) -> Vec<DuelCandidate> {
    state
        .opponents_with_wedges(attacker)
        .into_iter()
        .map(|player| DuelCandidate {
            player,
            colors: state
                .owned_colors(player)
                .map(|owned| owned.iter().copied().collect())
                .unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelSide {
    Attacker,
    Defender,
}

impl DuelSide {
    fn other(self) -> Self {
        match self {
            DuelSide::Attacker => DuelSide::Defender,
            DuelSide::Defender => DuelSide::Attacker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelOutcome {
    /// Correct answer; `next` answers the following question.
    Continue { next: PlayerIndex },
    /// Attacker missed. Nothing changes hands.
    AttackerFailed,
    /// Defender missed. The wedge has moved.
    DefenderFailed { change: WedgeChange },
}

/// A steal duel in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelState {
    pub attacker: PlayerIndex,
    pub defender: PlayerIndex,
    pub color: WedgeColor,
    turn: DuelSide,
    rounds: u32,
}

impl DuelState {
    /// Open a duel. The defender must own the contested color.
    pub fn begin(
        state: &GameTurnState,
        attacker: PlayerIndex,
        defender: PlayerIndex,
        color: WedgeColor,
    ) -> Result<Self, DuelError> {
        if attacker == defender {
            return Err(DuelError::SelfDuel(attacker));
        }
        state.owned_colors(attacker)?;
        if !state.owned_colors(defender)?.contains(&color) {
            return Err(DuelError::ColorNotOwned { defender, color });
        }

        info!(%attacker, %defender, %color, "steal duel started");
        Ok(Self {
            attacker,
            defender,
            color,
            turn: DuelSide::Attacker,
            rounds: 0,
        })
    }

    pub fn turn(&self) -> DuelSide {
        self.turn
    }

    /// Player who answers the pending question.
    pub fn answering_player(&self) -> PlayerIndex {
        match self.turn {
            DuelSide::Attacker => self.attacker,
            DuelSide::Defender => self.defender,
        }
    }

    /// Questions answered so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Apply the answer to the pending question.
    pub fn resolve(
        &mut self,
        state: &mut GameTurnState,
        correct: bool,
    ) -> Result<DuelOutcome, DuelError> {
        self.rounds += 1;
        if correct {
            self.turn = self.turn.other();
            debug!(rounds = self.rounds, next = %self.answering_player(), "duel continues");
            return Ok(DuelOutcome::Continue {
                next: self.answering_player(),
            });
        }

        match self.turn {
            DuelSide::Attacker => {
                info!(attacker = %self.attacker, "attacker missed, duel over");
                Ok(DuelOutcome::AttackerFailed)
            }
            DuelSide::Defender => {
                let change = state.transfer_wedge(self.defender, self.attacker, self.color)?;
                info!(defender = %self.defender, color = %self.color, "defender missed, wedge stolen");
                Ok(DuelOutcome::DefenderFailed { change })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::categories;

    fn state_with(owned: &[(usize, WedgeColor)]) -> GameTurnState {
        let mut state = GameTurnState::new(3, categories()).unwrap();
        for &(player, color) in owned {
            state.grant_wedge(PlayerIndex(player), color).unwrap();
        }
        state
    }

    #[test]
    fn test_eligible_defenders() {
        let state = state_with(&[(1, WedgeColor::Blue), (1, WedgeColor::Green), (0, WedgeColor::Pink)]);
        let candidates = eligible_defenders(&state, PlayerIndex(0));
        assert_eq!(
            candidates,
            vec![DuelCandidate {
                player: PlayerIndex(1),
                colors: vec![WedgeColor::Blue, WedgeColor::Green],
            }]
        );
        assert!(eligible_defenders(&state_with(&[]), PlayerIndex(0)).is_empty());
    }

    #[test]
    fn test_begin_requires_owned_color() {
        let state = state_with(&[(1, WedgeColor::Blue)]);
        let err = DuelState::begin(&state, PlayerIndex(0), PlayerIndex(1), WedgeColor::Pink).unwrap_err();
        assert_eq!(
            err,
            DuelError::ColorNotOwned {
                defender: PlayerIndex(1),
                color: WedgeColor::Pink,
            }
        );
        assert!(matches!(
            DuelState::begin(&state, PlayerIndex(1), PlayerIndex(1), WedgeColor::Blue),
            Err(DuelError::SelfDuel(_))
        ));
    }

    #[test]
    fn test_attacker_miss_changes_nothing() {
        let mut state = state_with(&[(1, WedgeColor::Blue)]);
        let before = state.wedges_by_player();
        let mut duel = DuelState::begin(&state, PlayerIndex(0), PlayerIndex(1), WedgeColor::Blue).unwrap();

        assert_eq!(duel.answering_player(), PlayerIndex(0));
        assert_eq!(duel.resolve(&mut state, false).unwrap(), DuelOutcome::AttackerFailed);
        assert_eq!(state.wedges_by_player(), before);
    }

    #[test]
    fn test_defender_miss_transfers_wedge() {
        let mut state = state_with(&[(1, WedgeColor::Blue)]);
        let mut duel = DuelState::begin(&state, PlayerIndex(0), PlayerIndex(1), WedgeColor::Blue).unwrap();

        assert_eq!(
            duel.resolve(&mut state, true).unwrap(),
            DuelOutcome::Continue { next: PlayerIndex(1) }
        );
        let outcome = duel.resolve(&mut state, false).unwrap();
        assert_eq!(
            outcome,
            DuelOutcome::DefenderFailed {
                change: WedgeChange::Transferred {
                    from: PlayerIndex(1),
                    to: PlayerIndex(0),
                    color: WedgeColor::Blue,
                },
            }
        );
        assert!(state.owns(PlayerIndex(0), WedgeColor::Blue));
        assert!(!state.owns(PlayerIndex(1), WedgeColor::Blue));
        assert_eq!(duel.rounds(), 2);
    }

    #[test]
    fn test_turns_alternate_strictly() {
        let mut state = state_with(&[(2, WedgeColor::Orange)]);
        let mut duel = DuelState::begin(&state, PlayerIndex(0), PlayerIndex(2), WedgeColor::Orange).unwrap();

        let answerers: Vec<_> = (0..5)
            .map(|_| {
                let who = duel.answering_player();
                duel.resolve(&mut state, true).unwrap();
                who
            })
            .collect();
        assert_eq!(
            answerers,
            vec![PlayerIndex(0), PlayerIndex(2), PlayerIndex(0), PlayerIndex(2), PlayerIndex(0)]
        );
    }
}
