//! Error types for the turn engine.

use thiserror::Error;
use trivia_rules::{
    BoardError, Category, Difficulty, NodeId, OccupancyError, PlayerIndex, RulesError, WedgeColor,
};

/// Why a move could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("dice value {0} is outside 1..=6")]
    InvalidRoll(u8),
    #[error("no legal destination {steps} steps from `{start}`")]
    NoDestinations { start: NodeId, steps: usize },
    #[error("no simple path of {steps} steps from `{start}` to `{destination}`")]
    NoPath {
        start: NodeId,
        destination: NodeId,
        steps: usize,
    },
    #[error("`{0}` is not one of the offered nodes")]
    IllegalChoice(NodeId),
    #[error("node `{0}` has no neighbors")]
    DeadEnd(NodeId),
    #[error("piece is on `{actual}` but the plan starts at `{planned}`")]
    StalePlan { planned: NodeId, actual: NodeId },
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
}

impl MoveError {
    /// Board authoring defects, as opposed to an unlucky roll.
    pub fn is_configuration(&self) -> bool {
        matches!(self, MoveError::DeadEnd(_) | MoveError::Board(_))
    }

    /// The move has no solution and is simply abandoned.
    pub fn is_no_solution(&self) -> bool {
        matches!(
            self,
            MoveError::NoDestinations { .. } | MoveError::NoPath { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DuelError {
    #[error("no steal duel is active")]
    NoActiveDuel,
    #[error("player {0} cannot duel themselves")]
    SelfDuel(PlayerIndex),
    #[error("player {defender} does not own the {color} wedge")]
    ColorNotOwned {
        defender: PlayerIndex,
        color: WedgeColor,
    },
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Errors surfaced by the turn state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("`{input}` is not accepted while {phase}")]
    UnexpectedInput {
        input: &'static str,
        phase: &'static str,
    },
    #[error("the game is over")]
    GameOver,
    #[error("player {0} has no piece on the board")]
    MissingPiece(PlayerIndex),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Duel(#[from] DuelError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("player count must be between {min} and {max}, got {found}")]
    PlayerCount {
        min: usize,
        max: usize,
        found: usize,
    },
    #[error("difficulty profile `{0}` has no weight")]
    EmptyProfile(&'static str),
    #[error("piece slot sizes must be positive")]
    SlotSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("player {0} is not part of this session")]
    UnknownPlayer(PlayerIndex),
    #[error("player {0} already has a piece")]
    AlreadyRegistered(PlayerIndex),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("failed to read save data: {0}")]
    Parse(String),
    #[error("failed to write save data: {0}")]
    Serialize(String),
    #[error("save is for {found} players, session has {expected}")]
    PlayerCount { expected: usize, found: usize },
    #[error("saved position `{node}` of player {player} is not on this board")]
    UnknownNode { player: PlayerIndex, node: NodeId },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rules(#[from] RulesError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("no questions for {category} [{difficulty}]")]
    EmptyPool {
        category: Category,
        difficulty: Difficulty,
    },
    #[error("failed to parse question bank: {0}")]
    Parse(String),
}

/// Failures reported by a dice oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("dice result unreadable: {0}")]
    Unreadable(String),
}
