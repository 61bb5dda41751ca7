use trivia_rules::{Category, Difficulty, NodeId, PlayerIndex, WedgeColor};

use crate::duel::DuelCandidate;
use crate::movement::{IntersectionWalk, TraversalPlan};

/// What rides on a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStake {
    /// Normal node: an extra roll.
    Normal,
    /// Wedge node: the wedge, then an extra roll.
    Wedge(WedgeColor),
    /// A steal duel question.
    Duel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub player: PlayerIndex,
    pub category: Category,
    pub difficulty: Difficulty,
    pub stake: QuestionStake,
}

/// The single continuation the machine is waiting on.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Waiting for the current player to trigger a roll.
    WaitingForRoll,
    /// Waiting for the dice oracle.
    Rolling,
    ChoosingDestination {
        steps: usize,
        candidates: Vec<NodeId>,
    },
    ChoosingBranch {
        walk: IntersectionWalk,
        options: Vec<NodeId>,
    },
    /// Waiting for the move animation to finish.
    Moving {
        plan: TraversalPlan,
    },
    AwaitingAnswer(PendingQuestion),
    ChoosingDuelTarget {
        candidates: Vec<DuelCandidate>,
    },
    /// Terminal.
    GameOver {
        winner: PlayerIndex,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::WaitingForRoll => "waiting for a roll",
            Phase::Rolling => "rolling",
            Phase::ChoosingDestination { .. } => "choosing a destination",
            Phase::ChoosingBranch { .. } => "choosing a branch",
            Phase::Moving { .. } => "moving",
            Phase::AwaitingAnswer(_) => "awaiting an answer",
            Phase::ChoosingDuelTarget { .. } => "choosing a duel target",
            Phase::GameOver { .. } => "game over",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, Phase::GameOver { .. })
    }
}
