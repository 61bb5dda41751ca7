//! Stepwise movement: walk the roll one node at a time and stop for a
//! choice wherever the way forward splits.

use tracing::trace;
use trivia_rules::{BoardGraph, NodeId};

use crate::error::MoveError;

/// Where a walk stands after advancing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkStatus {
    /// The player must pick one of `options` to continue from `at`.
    Branch { at: NodeId, options: Vec<NodeId> },
    /// All steps are spent.
    Arrived,
}

/// A roll being walked hop by hop.
///
/// Only onward nodes from which the rest of the roll can still be spent on
/// a simple path are offered, so a walk never strands mid-roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionWalk {
    origin: NodeId,
    steps: usize,
    path: Vec<NodeId>,
}

impl IntersectionWalk {
    /// Start walking `steps` from `origin`, advancing through every node
    /// that offers a single way on.
    pub fn begin(
        board: &BoardGraph,
        origin: &NodeId,
        steps: usize,
    ) -> Result<(Self, WalkStatus), MoveError> {
        let node = board.require(origin)?;
        if node.neighbors.is_empty() {
            return Err(MoveError::DeadEnd(origin.clone()));
        }

        let mut walk = Self {
            origin: origin.clone(),
            steps,
            path: Vec::with_capacity(steps),
        };
        let status = walk.advance(board)?;
        Ok((walk, status))
    }

    pub fn origin(&self) -> &NodeId {
        &self.origin
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn remaining(&self) -> usize {
        self.steps - self.path.len()
    }

    /// Nodes walked so far, excluding the origin.
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn position(&self) -> &NodeId {
        self.path.last().unwrap_or(&self.origin)
    }

    pub fn into_path(self) -> Vec<NodeId> {
        self.path
    }

    /// Viable next nodes from the current position.
    pub fn options(&self, board: &BoardGraph) -> Vec<NodeId> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Vec::new();
        }

        let mut visited: Vec<&NodeId> = std::iter::once(&self.origin).chain(&self.path).collect();
        let mut options = Vec::new();
        for neighbor in board.neighbors(self.position()) {
            if visited.contains(&neighbor) {
                continue;
            }
            visited.push(neighbor);
            if can_finish(board, neighbor, remaining - 1, &mut visited) {
                options.push(neighbor.clone());
            }
            visited.pop();
        }
        options
    }

    /// Continue through `next`, which must be one of the offered options.
    pub fn choose(&mut self, board: &BoardGraph, next: &NodeId) -> Result<WalkStatus, MoveError> {
        if !self.options(board).contains(next) {
            return Err(MoveError::IllegalChoice(next.clone()));
        }
        self.path.push(next.clone());
        self.advance(board)
    }

    fn advance(&mut self, board: &BoardGraph) -> Result<WalkStatus, MoveError> {
        loop {
            if self.remaining() == 0 {
                return Ok(WalkStatus::Arrived);
            }
            let mut options = self.options(board);
            match options.len() {
                0 => {
                    return Err(MoveError::NoDestinations {
                        start: self.origin.clone(),
                        steps: self.steps,
                    })
                }
                1 => {
                    let next = options.remove(0);
                    trace!(node = %next, "single way on");
                    self.path.push(next);
                }
                _ => {
                    return Ok(WalkStatus::Branch {
                        at: self.position().clone(),
                        options,
                    })
                }
            }
        }
    }
}

/// Whether some simple path of `remaining` hops leaves `from` without
/// touching `visited`.
fn can_finish<'a>(
    board: &'a BoardGraph,
    from: &'a NodeId,
    remaining: usize,
    visited: &mut Vec<&'a NodeId>,
) -> bool {
    if remaining == 0 {
        return true;
    }
    for neighbor in board.neighbors(from) {
        if visited.contains(&neighbor) {
            continue;
        }
        visited.push(neighbor);
        let done = can_finish(board, neighbor, remaining - 1, visited);
        visited.pop();
        if done {
            return true;
        }
    }
    false
}
