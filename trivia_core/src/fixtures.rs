//! Small boards shared by the engine tests.

use trivia_rules::{
    BoardDefinition, BoardGraph, Category, CategoryAssignment, NodeDefinition, NodeKind,
    WedgeColor,
};

pub fn start(id: &str, neighbors: &[&str]) -> NodeDefinition {
    NodeDefinition::new(id, NodeKind::Start).with_neighbors(neighbors.iter().copied())
}

pub fn normal(id: &str, color: WedgeColor, neighbors: &[&str]) -> NodeDefinition {
    NodeDefinition::new(id, NodeKind::Normal)
        .with_color(color)
        .with_neighbors(neighbors.iter().copied())
}

pub fn wedge(id: &str, color: WedgeColor, neighbors: &[&str]) -> NodeDefinition {
    NodeDefinition::new(id, NodeKind::Wedge)
        .with_color(color)
        .with_neighbors(neighbors.iter().copied())
}

pub fn reroll(id: &str, neighbors: &[&str]) -> NodeDefinition {
    NodeDefinition::new(id, NodeKind::Reroll).with_neighbors(neighbors.iter().copied())
}

pub fn build(nodes: Vec<NodeDefinition>) -> BoardGraph {
    let definition = nodes
        .into_iter()
        .fold(BoardDefinition::new(), BoardDefinition::with_node);
    BoardGraph::from_definition(definition).unwrap()
}

/// `s - n1 - n2 - ... - n{len}`, all blue normal nodes.
pub fn chain(len: usize) -> BoardGraph {
    let mut nodes = vec![start("s", &["n1"])];
    for i in 1..=len {
        let id = format!("n{i}");
        let prev = if i == 1 { "s".to_string() } else { format!("n{}", i - 1) };
        let mut node = NodeDefinition::new(id.as_str(), NodeKind::Normal)
            .with_color(WedgeColor::Blue)
            .with_neighbor(prev);
        if i < len {
            node = node.with_neighbor(format!("n{}", i + 1));
        }
        nodes.push(node);
    }
    build(nodes)
}

/// Two arms out of the start: `s - a - c` and `s - b - d`.
pub fn fork() -> BoardGraph {
    build(vec![
        start("s", &["a", "b"]),
        normal("a", WedgeColor::Blue, &["s", "c"]),
        normal("b", WedgeColor::Pink, &["s", "d"]),
        normal("c", WedgeColor::Yellow, &["a"]),
        normal("d", WedgeColor::Green, &["b"]),
    ])
}

/// `s - x`, where `x` splits into `y1 - y2` and `z1 - z2`.
pub fn crossroads() -> BoardGraph {
    build(vec![
        start("s", &["x"]),
        normal("x", WedgeColor::Blue, &["s", "y1", "z1"]),
        normal("y1", WedgeColor::Pink, &["x", "y2"]),
        normal("y2", WedgeColor::Yellow, &["y1"]),
        normal("z1", WedgeColor::Green, &["x", "z2"]),
        normal("z2", WedgeColor::Orange, &["z1"]),
    ])
}

pub fn categories() -> CategoryAssignment {
    let names = ["Science", "Arts", "History", "Nature", "Sports", "Geography"];
    CategoryAssignment::new(
        WedgeColor::ALL
            .into_iter()
            .zip(names)
            .map(|(color, name)| (color, Category::new(name))),
    )
    .unwrap()
}
