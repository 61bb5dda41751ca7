//! Traversal planning: the hops a piece makes along a path, and where pieces
//! stand when they share a node.

use glam::Vec3;
use trivia_rules::{BoardGraph, BoardNode, NodeId, PlayerIndex};

use crate::config::EngineConfig;
use crate::error::MoveError;

pub const STEP_DURATION: f32 = 0.5;
pub const JUMP_BASE_HEIGHT: f32 = 2.5;
pub const JUMP_BASE_DURATION: f32 = 0.5;
pub const JUMP_DURATION_PER_NODE: f32 = 0.25;

/// Offset slots per node. Extra pieces share the last slot.
pub const SLOT_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum HopKind {
    Step,
    /// Clear a run of occupied nodes in one arc.
    Jump { skipped: Vec<NodeId>, height: f32 },
}

/// One visual movement of a piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub to: NodeId,
    pub kind: HopKind,
    /// Seconds.
    pub duration: f32,
}

impl Hop {
    pub fn is_jump(&self) -> bool {
        matches!(self.kind, HopKind::Jump { .. })
    }
}

/// Where one piece stands on a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub player: PlayerIndex,
    /// `None` when the piece is alone and centered.
    pub slot: Option<usize>,
    pub position: Vec3,
}

/// Arrangement of every piece on one node.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotLayout {
    pub node: NodeId,
    pub placements: Vec<Placement>,
}

impl SlotLayout {
    pub fn placement_of(&self, player: PlayerIndex) -> Option<&Placement> {
        self.placements.iter().find(|p| p.player == player)
    }
}

/// Scale of the slot offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGeometry {
    /// Fraction of the smaller footprint side.
    pub ratio: f32,
    /// Used when a node has no footprint.
    pub default_size: f32,
}

impl Default for SlotGeometry {
    fn default() -> Self {
        Self {
            ratio: 0.2,
            default_size: 0.05,
        }
    }
}

impl SlotGeometry {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            ratio: config.slot_size_ratio,
            default_size: config.default_slot_size,
        }
    }

    pub fn slot_size(&self, node: &BoardNode) -> f32 {
        match node.footprint {
            Some(footprint) => footprint.x.min(footprint.y) * self.ratio,
            None => self.default_size,
        }
    }

    /// The four corner offsets, relative to the node's position.
    pub fn offsets(&self, node: &BoardNode) -> [Vec3; SLOT_COUNT] {
        let s = self.slot_size(node);
        [
            Vec3::new(-1.5 * s, 0.0, -1.2 * s),
            Vec3::new(1.5 * s, 0.0, -1.2 * s),
            Vec3::new(-1.5 * s, 0.0, 1.2 * s),
            Vec3::new(1.5 * s, 0.0, 1.2 * s),
        ]
    }

    /// Arrange `pieces` (in arrival order) on `node`.
    ///
    /// A lone piece is centered; otherwise piece `i` takes slot `min(i, 3)`.
    pub fn layout(&self, node: &BoardNode, pieces: &[PlayerIndex]) -> SlotLayout {
        let placements = if let [player] = pieces {
            vec![Placement {
                player: *player,
                slot: None,
                position: node.position,
            }]
        } else {
            let offsets = self.offsets(node);
            pieces
                .iter()
                .enumerate()
                .map(|(i, &player)| {
                    let slot = i.min(SLOT_COUNT - 1);
                    Placement {
                        player,
                        slot: Some(slot),
                        position: node.position + offsets[slot],
                    }
                })
                .collect()
        };

        SlotLayout {
            node: node.id.clone(),
            placements,
        }
    }
}

/// Everything needed to animate and then commit one move.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalPlan {
    pub player: PlayerIndex,
    pub origin: NodeId,
    /// Excludes the origin; never empty.
    pub path: Vec<NodeId>,
    pub hops: Vec<Hop>,
    /// Pieces left behind on the origin.
    pub departure: SlotLayout,
    /// Pieces on the destination once the mover arrives.
    pub landing: SlotLayout,
}

impl TraversalPlan {
    pub fn destination(&self) -> &NodeId {
        &self.path[self.path.len() - 1]
    }

    pub fn jump_count(&self) -> usize {
        self.hops.iter().filter(|h| h.is_jump()).count()
    }

    pub fn total_duration(&self) -> f32 {
        self.hops.iter().map(|h| h.duration).sum()
    }
}

/// Plan the hops for `player` moving from `origin` along `path`.
///
/// An occupied intermediate node starts a jump that lands on the next
/// unoccupied node of the path, or on the final node if there is none.
pub fn plan_traversal(
    board: &BoardGraph,
    player: PlayerIndex,
    origin: &NodeId,
    path: Vec<NodeId>,
    geometry: &SlotGeometry,
) -> Result<TraversalPlan, MoveError> {
    let origin_node = board.require(origin)?;
    let Some(destination) = path.last() else {
        return Err(MoveError::NoDestinations {
            start: origin.clone(),
            steps: 0,
        });
    };
    let destination_node = board.require(destination)?;

    let mut previous = origin;
    for node in &path {
        if !board.are_neighbors(previous, node) {
            return Err(MoveError::NoPath {
                start: origin.clone(),
                destination: destination.clone(),
                steps: path.len(),
            });
        }
        previous = node;
    }

    let blocked = |id: &NodeId| board.occupants(id).iter().any(|&p| p != player);

    let mut hops = Vec::with_capacity(path.len());
    let mut i = 0;
    while i < path.len() {
        let is_last = i + 1 == path.len();
        if !is_last && blocked(&path[i]) {
            let landing = (i + 1..path.len())
                .find(|&j| !blocked(&path[j]))
                .unwrap_or(path.len() - 1);
            let distance = (landing - i) as f32;
            hops.push(Hop {
                to: path[landing].clone(),
                kind: HopKind::Jump {
                    skipped: path[i..landing].to_vec(),
                    height: JUMP_BASE_HEIGHT + distance,
                },
                duration: JUMP_BASE_DURATION + distance * JUMP_DURATION_PER_NODE,
            });
            i = landing + 1;
        } else {
            hops.push(Hop {
                to: path[i].clone(),
                kind: HopKind::Step,
                duration: STEP_DURATION,
            });
            i += 1;
        }
    }

    let staying: Vec<PlayerIndex> = origin_node
        .occupants()
        .iter()
        .copied()
        .filter(|&p| p != player)
        .collect();
    let mut arriving: Vec<PlayerIndex> = destination_node
        .occupants()
        .iter()
        .copied()
        .filter(|&p| p != player)
        .collect();
    arriving.push(player);

    Ok(TraversalPlan {
        player,
        origin: origin.clone(),
        departure: geometry.layout(origin_node, &staying),
        landing: geometry.layout(destination_node, &arriving),
        hops,
        path,
    })
}
