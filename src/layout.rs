//! Bridge between the diagram model and the dagre hierarchical layout engine.
//!
//! The engine works with center-anchored coordinates while the surface draws
//! nodes from their top-left corner, so every position read back from the
//! engine is shifted by half the node box.

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::ir::{Direction, Edge, Node, Position, validate_parts};
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use std::collections::HashSet;

/// Lays out `nodes` and `edges` in `direction`.
///
/// Returns fresh node values carrying positions and anchor sides; the edges are
/// returned unchanged. The inputs are never modified. A new engine graph is
/// built for every call.
pub fn layout_graph(
    nodes: &[Node],
    edges: &[Edge],
    direction: Direction,
    config: &LayoutConfig,
) -> Result<(Vec<Node>, Vec<Edge>)> {
    validate_parts(nodes, edges)?;
    if nodes.is_empty() {
        return Ok((Vec::new(), edges.to_vec()));
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        direction = direction.as_token(),
        "running hierarchical layout"
    );

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(dagre_rankdir(direction).to_string());
    graph_config.nodesep = Some(config.node_spacing);
    graph_config.ranksep = Some(config.rank_spacing);
    graph_config.marginx = Some(config.margin_x);
    graph_config.marginy = Some(config.margin_y);
    dagre_graph.set_graph(graph_config);

    for node in nodes {
        let mut dagre_node = DagreNode::default();
        dagre_node.width = config.node_width;
        dagre_node.height = config.node_height;
        dagre_graph.set_node(node.id.clone(), Some(dagre_node));
    }

    // Parallel edges share one engine edge; the engine is not a multigraph.
    let mut edge_set: HashSet<(String, String)> = HashSet::new();
    for edge in edges {
        let from = edge.source.clone();
        let to = edge.target.clone();
        if !edge_set.insert((from.clone(), to.clone())) {
            continue;
        }
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(&from, &to, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let (target_side, source_side) = direction.anchor_sides();
    let mut positioned = Vec::with_capacity(nodes.len());
    for node in nodes {
        let Some(dagre_node) = dagre_graph.node(&node.id) else {
            return Err(Error::Layout {
                node_id: node.id.clone(),
            });
        };
        if !(dagre_node.x.is_finite() && dagre_node.y.is_finite()) {
            return Err(Error::Layout {
                node_id: node.id.clone(),
            });
        }
        let mut node = node.clone();
        node.position = translate_center(dagre_node.x, dagre_node.y, config);
        node.target_position = target_side;
        node.source_position = source_side;
        positioned.push(node);
    }

    Ok((positioned, edges.to_vec()))
}

/// Converts an engine center into the top-left corner of the node box.
pub fn translate_center(center_x: f32, center_y: f32, config: &LayoutConfig) -> Position {
    Position {
        x: center_x - config.node_width / 2.0,
        y: center_y - config.node_height / 2.0,
    }
}

fn dagre_rankdir(direction: Direction) -> &'static str {
    match direction {
        Direction::TopBottom => "tb",
        Direction::LeftRight => "lr",
    }
}

/// Bounding box `(min_x, min_y, max_x, max_y)` of positioned nodes.
pub fn bounds(nodes: &[Node], config: &LayoutConfig) -> Option<(f32, f32, f32, f32)> {
    let mut iter = nodes.iter();
    let first = iter.next()?;
    let mut acc = (
        first.position.x,
        first.position.y,
        first.position.x + config.node_width,
        first.position.y + config.node_height,
    );
    for node in iter {
        acc.0 = acc.0.min(node.position.x);
        acc.1 = acc.1.min(node.position.y);
        acc.2 = acc.2.max(node.position.x + config.node_width);
        acc.3 = acc.3.max(node.position.y + config.node_height);
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Side;

    fn chain(ids: &[&str]) -> (Vec<Node>, Vec<Edge>) {
        let nodes = ids.iter().map(|id| Node::new(*id)).collect();
        let edges = ids
            .windows(2)
            .map(|pair| Edge::new(pair[0], pair[1]))
            .collect();
        (nodes, edges)
    }

    fn pos<'a>(nodes: &'a [Node], id: &str) -> &'a Position {
        &nodes.iter().find(|n| n.id == id).unwrap().position
    }

    #[test]
    fn translate_center_is_exact() {
        let config = LayoutConfig::default();
        let p = translate_center(100.0, 50.0, &config);
        assert_eq!(p, Position { x: 14.0, y: 32.0 });
    }

    #[test]
    fn vertical_layout_stacks_ranks() {
        let (nodes, edges) = chain(&["A", "B", "C"]);
        let (out, out_edges) =
            layout_graph(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out_edges, edges);
        assert!(pos(&out, "A").y < pos(&out, "B").y);
        assert!(pos(&out, "B").y < pos(&out, "C").y);
        for node in &out {
            assert_eq!(node.target_position, Side::Top);
            assert_eq!(node.source_position, Side::Bottom);
        }
    }

    #[test]
    fn horizontal_layout_spreads_ranks() {
        let (nodes, edges) = chain(&["A", "B"]);
        let (out, _) =
            layout_graph(&nodes, &edges, Direction::LeftRight, &LayoutConfig::default()).unwrap();
        assert!(pos(&out, "A").x < pos(&out, "B").x);
        for node in &out {
            assert_eq!(node.target_position, Side::Left);
            assert_eq!(node.source_position, Side::Right);
        }
    }

    #[test]
    fn ranks_are_separated_by_box_and_spacing() {
        let config = LayoutConfig::default();
        let (nodes, edges) = chain(&["A", "B"]);
        let (out, _) = layout_graph(&nodes, &edges, Direction::TopBottom, &config).unwrap();
        let gap = pos(&out, "B").y - pos(&out, "A").y;
        assert!((gap - (config.node_height + config.rank_spacing)).abs() < 0.01);
    }

    #[test]
    fn layout_is_repeatable_and_leaves_inputs_alone() {
        let (nodes, edges) = chain(&["A", "B", "C", "D"]);
        let config = LayoutConfig::default();
        let first = layout_graph(&nodes, &edges, Direction::TopBottom, &config).unwrap();
        let second = layout_graph(&nodes, &edges, Direction::TopBottom, &config).unwrap();
        assert_eq!(first, second);
        assert!(nodes.iter().all(|n| n.position == Position::default()));
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let nodes = vec![Node::new("A")];
        let edges = vec![Edge::new("A", "missing")];
        let err =
            layout_graph(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Reference { ref node_id, .. } if node_id == "missing"));
    }

    #[test]
    fn empty_graph_lays_out_to_nothing() {
        let (out, edges) =
            layout_graph(&[], &[], Direction::LeftRight, &LayoutConfig::default()).unwrap();
        assert!(out.is_empty());
        assert!(edges.is_empty());
    }

    #[test]
    fn parallel_edges_survive_layout() {
        let nodes = vec![Node::new("A"), Node::new("B")];
        let mut second = Edge::new("A", "B");
        second.id = "edge-A-B-again".to_string();
        let edges = vec![Edge::new("A", "B"), second];
        let (_, out_edges) =
            layout_graph(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap();
        assert_eq!(out_edges.len(), 2);
    }

    #[test]
    fn bounds_cover_every_box() {
        let config = LayoutConfig::default();
        let mut a = Node::new("A");
        a.position = Position { x: 10.0, y: 5.0 };
        let mut b = Node::new("B");
        b.position = Position { x: -4.0, y: 100.0 };
        let (min_x, min_y, max_x, max_y) = bounds(&[a, b], &config).unwrap();
        assert_eq!((min_x, min_y), (-4.0, 5.0));
        assert_eq!((max_x, max_y), (182.0, 136.0));
        assert!(bounds(&[], &config).is_none());
    }
}
