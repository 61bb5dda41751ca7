//! Player pieces.

use serde::{Deserialize, Serialize};

use super::{NodeId, PlayerIndex};

/// The single piece a player moves around the board.
///
/// A spawned piece always stands on exactly one node. Only the movement
/// resolver (on move) and save restoration reposition it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPiece {
    pub owner: PlayerIndex,
    node: NodeId,
}

impl PlayerPiece {
    /// Create a piece for `owner` standing on `node`.
    pub fn new(owner: PlayerIndex, node: NodeId) -> Self {
        Self { owner, node }
    }

    /// The node the piece currently stands on.
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// Reposition the piece. Occupancy bookkeeping is the caller's job.
    pub fn place_on(&mut self, node: NodeId) {
        self.node = node;
    }
}
