//! Board graph - fixed node topology plus live occupancy.
//!
//! The graph performs no search. It answers topology questions
//! (`neighbors`, `is_intersection`) and keeps per-node occupant lists; the
//! movement resolver in the engine crate does the traversal.

mod authoring;

pub use authoring::*;

use glam::{Vec2, Vec3};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::entities::{NodeId, PlayerIndex};
use crate::error::{BoardError, OccupancyError};
use crate::mechanics::{NodeKind, WedgeColor};

/// A discrete board position.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardNode {
    pub id: NodeId,
    /// Ordered, duplicate-free, and mutual: if `b` is listed here, this node
    /// is listed on `b`.
    pub neighbors: Vec<NodeId>,
    pub kind: NodeKind,
    pub color: Option<WedgeColor>,
    pub position: Vec3,
    pub footprint: Option<Vec2>,
    occupants: Vec<PlayerIndex>,
}

impl BoardNode {
    /// More than two neighbors means a player must choose when passing.
    pub fn is_intersection(&self) -> bool {
        self.neighbors.len() > 2
    }

    /// Pieces on this node, in arrival order.
    pub fn occupants(&self) -> &[PlayerIndex] {
        &self.occupants
    }

    /// Always equal to `occupants().len()`.
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }
}

/// The board: nodes indexed by id, plus the start node.
#[derive(Debug, Clone)]
pub struct BoardGraph {
    nodes: Vec<BoardNode>,

    /// Index: node id -> position in `nodes`.
    index: HashMap<NodeId, usize>,

    start: NodeId,
}

impl BoardGraph {
    /// Build a board from authoring data.
    ///
    /// Duplicate ids, unknown neighbors and self-loops are rejected. An edge
    /// listed on only one side is mirrored onto the other.
    pub fn from_definition(definition: BoardDefinition) -> Result<Self, BoardError> {
        if definition.nodes.is_empty() {
            return Err(BoardError::Empty);
        }

        let mut nodes = Vec::with_capacity(definition.nodes.len());
        let mut index = HashMap::with_capacity(definition.nodes.len());
        let mut authored_neighbors = Vec::with_capacity(definition.nodes.len());

        // Assign ids and build the index
        for def in definition.nodes {
            let id = def.id.unwrap_or_else(NodeId::generate);
            if index.contains_key(&id) {
                return Err(BoardError::DuplicateNode(id));
            }

            if def.kind.requires_color() && def.color.is_none() {
                return Err(BoardError::MissingColor {
                    node: id,
                    kind: def.kind.to_string(),
                });
            }
            if !def.kind.requires_color() && def.color.is_some() {
                warn!(node = %id, kind = %def.kind, "color on a node kind that ignores it");
            }

            index.insert(id.clone(), nodes.len());
            authored_neighbors.push(def.neighbors);
            nodes.push(BoardNode {
                id,
                neighbors: Vec::new(),
                kind: def.kind,
                color: def.color,
                position: def.position.unwrap_or(Vec3::ZERO),
                footprint: def.footprint,
                occupants: Vec::new(),
            });
        }

        // Resolve neighbor references
        for (i, neighbors) in authored_neighbors.into_iter().enumerate() {
            let mut seen = HashSet::new();
            for neighbor in neighbors {
                if neighbor == nodes[i].id {
                    return Err(BoardError::SelfLoop(neighbor));
                }
                if !index.contains_key(&neighbor) {
                    return Err(BoardError::UnknownNeighbor {
                        node: nodes[i].id.clone(),
                        neighbor,
                    });
                }
                if seen.insert(neighbor.clone()) {
                    nodes[i].neighbors.push(neighbor);
                }
            }
        }

        // Mirror one-sided edges
        for i in 0..nodes.len() {
            let here = nodes[i].id.clone();
            let neighbors = nodes[i].neighbors.clone();
            for neighbor in neighbors {
                let j = index[&neighbor];
                if !nodes[j].neighbors.contains(&here) {
                    debug!(from = %here, to = %neighbor, "mirroring one-sided edge");
                    nodes[j].neighbors.push(here.clone());
                }
            }
        }

        let start = match definition.start {
            Some(start) => {
                if !index.contains_key(&start) {
                    return Err(BoardError::UnknownNode(start));
                }
                start
            }
            None => {
                let starts: Vec<NodeId> = nodes
                    .iter()
                    .filter(|n| n.kind == NodeKind::Start)
                    .map(|n| n.id.clone())
                    .collect();
                match starts.len() {
                    0 => return Err(BoardError::MissingStart),
                    1 => starts.into_iter().next().ok_or(BoardError::MissingStart)?,
                    _ => return Err(BoardError::AmbiguousStart(starts)),
                }
            }
        };

        debug!(nodes = nodes.len(), start = %start, "board loaded");
        Ok(Self { nodes, index, start })
    }

    /// The node every piece spawns on.
    pub fn start_node(&self) -> &NodeId {
        &self.start
    }

    /// Get node by ID.
    pub fn node(&self, id: &NodeId) -> Option<&BoardNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Get node by ID, failing on unknown ids.
    pub fn require(&self, id: &NodeId) -> Result<&BoardNode, BoardError> {
        self.node(id).ok_or_else(|| BoardError::UnknownNode(id.clone()))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Neighbors of a node in authored order. Unknown ids have none.
    pub fn neighbors(&self, id: &NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.neighbors.as_slice()).unwrap_or(&[])
    }

    pub fn is_intersection(&self, id: &NodeId) -> bool {
        self.node(id).is_some_and(BoardNode::is_intersection)
    }

    pub fn are_neighbors(&self, a: &NodeId, b: &NodeId) -> bool {
        self.neighbors(a).contains(b)
    }

    /// All nodes in authored order.
    pub fn nodes(&self) -> impl Iterator<Item = &BoardNode> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn occupant_count(&self, id: &NodeId) -> usize {
        self.node(id).map(BoardNode::occupant_count).unwrap_or(0)
    }

    pub fn occupants(&self, id: &NodeId) -> &[PlayerIndex] {
        self.node(id).map(BoardNode::occupants).unwrap_or(&[])
    }

    pub fn is_occupied(&self, id: &NodeId) -> bool {
        self.occupant_count(id) > 0
    }

    /// Add `player` to the node's occupants.
    pub fn occupy(&mut self, id: &NodeId, player: PlayerIndex) -> Result<(), OccupancyError> {
        let node = self.node_mut(id)?;
        if node.occupants.contains(&player) {
            return Err(OccupancyError::AlreadyPresent {
                node: id.clone(),
                player,
            });
        }
        node.occupants.push(player);
        Ok(())
    }

    /// Remove `player` from the node's occupants.
    ///
    /// Releasing an empty node is an underflow, not a no-op.
    pub fn release(&mut self, id: &NodeId, player: PlayerIndex) -> Result<(), OccupancyError> {
        let node = self.node_mut(id)?;
        if node.occupants.is_empty() {
            return Err(OccupancyError::Underflow(id.clone()));
        }
        match node.occupants.iter().position(|p| *p == player) {
            Some(pos) => {
                node.occupants.remove(pos);
                Ok(())
            }
            None => Err(OccupancyError::NotPresent {
                node: id.clone(),
                player,
            }),
        }
    }

    /// Total pieces on the board.
    pub fn total_occupants(&self) -> usize {
        self.nodes.iter().map(BoardNode::occupant_count).sum()
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut BoardNode, OccupancyError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(OccupancyError::UnknownNode(id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_tail() -> BoardDefinition {
        // s - a - b - s forms a triangle, b - c is a tail
        BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start).with_neighbors(["a", "b"]))
            .with_node(
                NodeDefinition::new("a", NodeKind::Normal)
                    .with_color(WedgeColor::Blue)
                    .with_neighbors(["s", "b"]),
            )
            .with_node(
                NodeDefinition::new("b", NodeKind::Wedge)
                    .with_color(WedgeColor::Pink)
                    .with_neighbors(["a", "s", "c"]),
            )
            .with_node(NodeDefinition::new("c", NodeKind::Reroll).with_neighbors(["b"]))
    }

    #[test]
    fn test_load_and_query() {
        let board = BoardGraph::from_definition(triangle_with_tail()).unwrap();

        assert_eq!(board.node_count(), 4);
        assert_eq!(board.start_node(), &NodeId::new("s"));
        assert_eq!(board.neighbors(&NodeId::new("b")).len(), 3);
        assert!(board.is_intersection(&NodeId::new("b")));
        assert!(!board.is_intersection(&NodeId::new("a")));
        assert!(board.neighbors(&NodeId::new("missing")).is_empty());
    }

    #[test]
    fn test_one_sided_edges_are_mirrored() {
        let def = BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start).with_neighbor("r"))
            .with_node(NodeDefinition::new("r", NodeKind::Reroll));

        let board = BoardGraph::from_definition(def).unwrap();
        assert!(board.are_neighbors(&NodeId::new("s"), &NodeId::new("r")));
        assert!(board.are_neighbors(&NodeId::new("r"), &NodeId::new("s")));
    }

    #[test]
    fn test_duplicate_neighbor_listed_once() {
        let def = BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start).with_neighbors(["r", "r"]))
            .with_node(NodeDefinition::new("r", NodeKind::Reroll).with_neighbor("s"));

        let board = BoardGraph::from_definition(def).unwrap();
        assert_eq!(board.neighbors(&NodeId::new("s")).len(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let def = BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start))
            .with_node(NodeDefinition::new("s", NodeKind::Reroll));

        assert_eq!(
            BoardGraph::from_definition(def).unwrap_err(),
            BoardError::DuplicateNode(NodeId::new("s"))
        );
    }

    #[test]
    fn test_unknown_neighbor_and_self_loop_rejected() {
        let unknown = BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start).with_neighbor("ghost"));
        assert!(matches!(
            BoardGraph::from_definition(unknown),
            Err(BoardError::UnknownNeighbor { .. })
        ));

        let looped = BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start).with_neighbor("s"));
        assert_eq!(
            BoardGraph::from_definition(looped).unwrap_err(),
            BoardError::SelfLoop(NodeId::new("s"))
        );
    }

    #[test]
    fn test_colorless_normal_node_rejected() {
        let def = BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start).with_neighbor("n"))
            .with_node(NodeDefinition::new("n", NodeKind::Normal));

        assert!(matches!(
            BoardGraph::from_definition(def),
            Err(BoardError::MissingColor { .. })
        ));
    }

    #[test]
    fn test_start_resolution() {
        let none = BoardDefinition::new().with_node(NodeDefinition::new("r", NodeKind::Reroll));
        assert_eq!(BoardGraph::from_definition(none).unwrap_err(), BoardError::MissingStart);

        let two = BoardDefinition::new()
            .with_node(NodeDefinition::new("s1", NodeKind::Start))
            .with_node(NodeDefinition::new("s2", NodeKind::Start));
        assert!(matches!(
            BoardGraph::from_definition(two),
            Err(BoardError::AmbiguousStart(_))
        ));

        let explicit = BoardDefinition::new()
            .with_start("s2")
            .with_node(NodeDefinition::new("s1", NodeKind::Start))
            .with_node(NodeDefinition::new("s2", NodeKind::Start));
        let board = BoardGraph::from_definition(explicit).unwrap();
        assert_eq!(board.start_node(), &NodeId::new("s2"));
    }

    #[test]
    fn test_anonymous_nodes_get_ids() {
        let def = BoardDefinition::new()
            .with_node(NodeDefinition::new("s", NodeKind::Start))
            .with_node(NodeDefinition::anonymous(NodeKind::Reroll).with_neighbor("s"));

        let board = BoardGraph::from_definition(def).unwrap();
        let generated = &board.neighbors(&NodeId::new("s"))[0];
        assert!(!generated.as_str().is_empty());
        assert!(board.contains(generated));
    }

    #[test]
    fn test_occupy_and_release() {
        let mut board = BoardGraph::from_definition(triangle_with_tail()).unwrap();
        let a = NodeId::new("a");

        board.occupy(&a, PlayerIndex(0)).unwrap();
        board.occupy(&a, PlayerIndex(2)).unwrap();
        assert_eq!(board.occupant_count(&a), 2);
        assert_eq!(board.occupants(&a), &[PlayerIndex(0), PlayerIndex(2)]);

        board.release(&a, PlayerIndex(0)).unwrap();
        assert_eq!(board.occupants(&a), &[PlayerIndex(2)]);
        assert_eq!(board.total_occupants(), 1);
    }

    #[test]
    fn test_release_underflow_is_reported() {
        let mut board = BoardGraph::from_definition(triangle_with_tail()).unwrap();
        let c = NodeId::new("c");

        assert_eq!(
            board.release(&c, PlayerIndex(0)).unwrap_err(),
            OccupancyError::Underflow(c.clone())
        );

        board.occupy(&c, PlayerIndex(1)).unwrap();
        assert!(matches!(
            board.release(&c, PlayerIndex(0)),
            Err(OccupancyError::NotPresent { .. })
        ));
        assert!(matches!(
            board.occupy(&c, PlayerIndex(1)),
            Err(OccupancyError::AlreadyPresent { .. })
        ));
    }
}
