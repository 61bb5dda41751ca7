//! Error types shared by the rules crate.

use thiserror::Error;

use crate::entities::{NodeId, PlayerIndex};
use crate::mechanics::{Category, WedgeColor};

/// Board authoring and topology errors, raised while loading a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(NodeId),
    #[error("node `{node}` lists unknown neighbor `{neighbor}`")]
    UnknownNeighbor { node: NodeId, neighbor: NodeId },
    #[error("node `{0}` lists itself as a neighbor")]
    SelfLoop(NodeId),
    #[error("{kind} node `{node}` has no category color")]
    MissingColor { node: NodeId, kind: String },
    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),
    #[error("board has no start node")]
    MissingStart,
    #[error("board has more than one start node: {0:?}")]
    AmbiguousStart(Vec<NodeId>),
    #[error("board definition is empty")]
    Empty,
    #[error("failed to parse board definition: {0}")]
    Parse(String),
}

/// Occupancy bookkeeping violations. These are programming defects, never
/// a normal runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OccupancyError {
    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),
    #[error("release on node `{0}` would drive its occupant count below zero")]
    Underflow(NodeId),
    #[error("player {player} is not on node `{node}`")]
    NotPresent { node: NodeId, player: PlayerIndex },
    #[error("player {player} already occupies node `{node}`")]
    AlreadyPresent { node: NodeId, player: PlayerIndex },
}

/// Errors from category assignment and the wedge registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("no category assigned to color {0}")]
    UnmappedColor(WedgeColor),
    #[error("node `{0}` has no color to resolve a category from")]
    UncoloredNode(NodeId),
    #[error("category `{category}` assigned to both {first} and {second}")]
    DuplicateCategory {
        category: Category,
        first: WedgeColor,
        second: WedgeColor,
    },
    #[error("invalid player count {0}")]
    InvalidPlayerCount(usize),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerIndex),
    #[error("player {player} does not own the {color} wedge")]
    WedgeNotOwned { player: PlayerIndex, color: WedgeColor },
    #[error("the {color} wedge is owned by both {first} and {second}")]
    SharedWedge {
        color: WedgeColor,
        first: PlayerIndex,
        second: PlayerIndex,
    },
    #[error("a player cannot transfer a wedge to themselves")]
    SelfTransfer,
    #[error("the game has already ended")]
    GameEnded,
}
