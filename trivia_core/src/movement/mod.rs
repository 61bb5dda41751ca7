//! Movement resolution: where a roll can take a piece, and how it gets there.
//!
//! All searches run over the static topology. Occupancy never blocks a
//! destination; it only turns steps into jumps when the traversal is planned.

mod traversal;
mod walk;

pub use traversal::*;
pub use walk::*;

use std::collections::{HashSet, VecDeque};
use tracing::{debug, instrument, trace};
use trivia_rules::{BoardGraph, NodeId, PlayerPiece};

use crate::error::MoveError;

pub const MIN_ROLL: u8 = 1;
pub const MAX_ROLL: u8 = 6;

/// Turn a raw dice value into a step count.
pub fn validate_roll(value: u8) -> Result<usize, MoveError> {
    if (MIN_ROLL..=MAX_ROLL).contains(&value) {
        Ok(usize::from(value))
    } else {
        Err(MoveError::InvalidRoll(value))
    }
}

/// Every node whose shortest distance from `start` is exactly `steps`.
///
/// Breadth-first, each node visited once. The start itself is never a
/// destination. Results are in discovery order.
#[instrument(level = "debug", skip(board))]
pub fn reachable_destinations(
    board: &BoardGraph,
    start: &NodeId,
    steps: usize,
) -> Result<Vec<NodeId>, MoveError> {
    let origin = board.require(start)?;
    if origin.neighbors.is_empty() {
        return Err(MoveError::DeadEnd(start.clone()));
    }
    if steps == 0 {
        return Err(MoveError::NoDestinations {
            start: start.clone(),
            steps,
        });
    }

    let mut visited: HashSet<&NodeId> = HashSet::from([&origin.id]);
    let mut queue = VecDeque::from([(&origin.id, steps)]);
    let mut destinations = Vec::new();

    while let Some((node, remaining)) = queue.pop_front() {
        if remaining == 0 {
            destinations.push(node.clone());
            continue;
        }
        for neighbor in board.neighbors(node) {
            if visited.insert(neighbor) {
                queue.push_back((neighbor, remaining - 1));
            }
        }
    }

    if destinations.is_empty() {
        return Err(MoveError::NoDestinations {
            start: start.clone(),
            steps,
        });
    }
    debug!(count = destinations.len(), "destinations found");
    Ok(destinations)
}

/// A simple path of exactly `steps` hops from `start` to `destination`.
///
/// The returned path excludes `start` and ends at `destination`. Among
/// several valid paths the first found in neighbor order wins.
#[instrument(level = "debug", skip(board))]
pub fn find_path(
    board: &BoardGraph,
    start: &NodeId,
    destination: &NodeId,
    steps: usize,
) -> Result<Vec<NodeId>, MoveError> {
    let origin = board.require(start)?;
    board.require(destination)?;
    if origin.neighbors.is_empty() {
        return Err(MoveError::DeadEnd(start.clone()));
    }

    let mut queue: VecDeque<Vec<&NodeId>> = VecDeque::from([vec![&origin.id]]);
    while let Some(path) = queue.pop_front() {
        let Some(&current) = path.last() else {
            continue;
        };
        if path.len() - 1 == steps {
            if current == destination {
                trace!(explored = queue.len(), "path found");
                return Ok(path[1..].iter().map(|&id| id.clone()).collect());
            }
            continue;
        }
        for neighbor in board.neighbors(current) {
            if !path.contains(&neighbor) {
                let mut next = path.clone();
                next.push(neighbor);
                queue.push_back(next);
            }
        }
    }

    Err(MoveError::NoPath {
        start: start.clone(),
        destination: destination.clone(),
        steps,
    })
}

/// Apply a finished traversal: release the origin, occupy the destination,
/// and move the piece.
pub fn commit_move(
    board: &mut BoardGraph,
    piece: &mut PlayerPiece,
    plan: &TraversalPlan,
) -> Result<(), MoveError> {
    if piece.node() != &plan.origin {
        return Err(MoveError::StalePlan {
            planned: plan.origin.clone(),
            actual: piece.node().clone(),
        });
    }
    let destination = plan.destination().clone();
    board.require(&destination)?;

    board.release(&plan.origin, piece.owner)?;
    board.occupy(&destination, piece.owner)?;
    debug!(player = %piece.owner, from = %plan.origin, to = %destination, "move committed");
    piece.place_on(destination);
    Ok(())
}
