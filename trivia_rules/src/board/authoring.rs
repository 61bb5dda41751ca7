//! Board authoring data - the static node list a board is built from.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::entities::NodeId;
use crate::error::BoardError;
use crate::mechanics::{NodeKind, WedgeColor};

/// One authored node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Generated at load time when absent.
    #[serde(default)]
    pub id: Option<NodeId>,
    #[serde(default)]
    pub neighbors: Vec<NodeId>,
    pub kind: NodeKind,
    #[serde(default)]
    pub color: Option<WedgeColor>,
    #[serde(default)]
    pub position: Option<Vec3>,
    /// Width and depth of the node's footprint, used to scale piece slots.
    #[serde(default)]
    pub footprint: Option<Vec2>,
}

impl NodeDefinition {
    /// Create a named node of the given kind.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: Some(id.into()),
            neighbors: Vec::new(),
            kind,
            color: None,
            position: None,
            footprint: None,
        }
    }

    /// Create a node whose id is generated at load time.
    pub fn anonymous(kind: NodeKind) -> Self {
        Self {
            id: None,
            ..Self::new("", kind)
        }
    }

    pub fn with_color(mut self, color: WedgeColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_neighbor(mut self, neighbor: impl Into<NodeId>) -> Self {
        self.neighbors.push(neighbor.into());
        self
    }

    pub fn with_neighbors<I, N>(mut self, neighbors: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        self.neighbors.extend(neighbors.into_iter().map(Into::into));
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_footprint(mut self, footprint: Vec2) -> Self {
        self.footprint = Some(footprint);
        self
    }
}

/// A complete authored board.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardDefinition {
    /// Explicit start node. When absent the single `Start`-kind node is used.
    #[serde(default)]
    pub start: Option<NodeId>,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
}

impl BoardDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: impl Into<NodeId>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_node(mut self, node: NodeDefinition) -> Self {
        self.nodes.push(node);
        self
    }

    /// Parse a board from TOML (`[[nodes]]` tables).
    pub fn from_toml_str(source: &str) -> Result<Self, BoardError> {
        toml::from_str(source).map_err(|e| BoardError::Parse(e.to_string()))
    }

    /// Parse a board from JSON (`{"nodes": [...]}`).
    pub fn from_json_str(source: &str) -> Result<Self, BoardError> {
        serde_json::from_str(source).map_err(|e| BoardError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_board() {
        let source = r#"
            start = "s"

            [[nodes]]
            id = "s"
            kind = "start"
            neighbors = ["a"]

            [[nodes]]
            id = "a"
            kind = "wedge"
            color = "blue"
            neighbors = ["s"]
            position = [1.0, 0.0, 2.0]
            footprint = [0.5, 0.5]
        "#;

        let def = BoardDefinition::from_toml_str(source).unwrap();
        assert_eq!(def.start, Some(NodeId::new("s")));
        assert_eq!(def.nodes.len(), 2);
        assert_eq!(def.nodes[1].color, Some(WedgeColor::Blue));
        assert_eq!(def.nodes[1].position, Some(Vec3::new(1.0, 0.0, 2.0)));
        assert_eq!(def.nodes[1].footprint, Some(Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn test_parse_json_board_without_ids() {
        let source = r#"{"nodes": [{"kind": "start"}, {"kind": "reroll"}]}"#;

        let def = BoardDefinition::from_json_str(source).unwrap();
        assert_eq!(def.nodes.len(), 2);
        assert!(def.nodes.iter().all(|n| n.id.is_none()));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = BoardDefinition::from_toml_str("[[nodes]]\nkind = \"portal\"");
        assert!(matches!(result, Err(BoardError::Parse(_))));
    }
}
