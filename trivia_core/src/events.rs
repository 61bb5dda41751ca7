//! Events emitted by the turn machine for presentation and logging.

use trivia_rules::{Category, Difficulty, NodeId, PlayerIndex, WedgeChange, WedgeColor};

use crate::duel::DuelCandidate;
use crate::movement::TraversalPlan;
use crate::turn::QuestionStake;

/// Why a player rolls again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraRollReason {
    CorrectAnswer,
    WedgeWon,
    RerollNode,
    DuelWon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TurnStarted {
        player: PlayerIndex,
    },
    Rolled {
        player: PlayerIndex,
        value: u8,
    },
    /// Highlight candidate destinations.
    DestinationsOffered {
        player: PlayerIndex,
        nodes: Vec<NodeId>,
    },
    /// Highlight the onward choices at an intersection.
    BranchOffered {
        player: PlayerIndex,
        at: NodeId,
        options: Vec<NodeId>,
    },
    /// Clear a previous highlight.
    HighlightCleared {
        nodes: Vec<NodeId>,
    },
    /// Animate the plan, then call `finish_animation`.
    MoveStarted {
        plan: TraversalPlan,
    },
    MoveCompleted {
        player: PlayerIndex,
        node: NodeId,
    },
    MoveAborted {
        player: PlayerIndex,
        reason: String,
    },
    QuestionAsked {
        player: PlayerIndex,
        category: Category,
        difficulty: Difficulty,
        stake: QuestionStake,
    },
    Answered {
        player: PlayerIndex,
        correct: bool,
    },
    WedgeChanged(WedgeChange),
    ExtraRoll {
        player: PlayerIndex,
        reason: ExtraRollReason,
    },
    DuelTargetRequested {
        attacker: PlayerIndex,
        candidates: Vec<DuelCandidate>,
    },
    DuelSkipped {
        player: PlayerIndex,
    },
    DuelStarted {
        attacker: PlayerIndex,
        defender: PlayerIndex,
        color: WedgeColor,
    },
    DuelEnded {
        attacker: PlayerIndex,
        defender: PlayerIndex,
        color: WedgeColor,
        stolen: bool,
    },
    TurnPassed {
        from: PlayerIndex,
        to: PlayerIndex,
    },
    GameWon {
        player: PlayerIndex,
    },
}
