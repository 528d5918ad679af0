use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "tb" | "td" | "vertical" => Some(Self::TopBottom),
            "lr" | "horizontal" => Some(Self::LeftRight),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::LeftRight => "LR",
        }
    }

    /// Anchor sides as `(target, source)`.
    pub fn anchor_sides(self) -> (Side, Side) {
        match self {
            Self::TopBottom => (Side::Top, Side::Bottom),
            Self::LeftRight => (Side::Left, Side::Right),
        }
    }
}

/// Side of a node box an edge connector attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl NodeStyle {
    pub fn highlighted(color: &str) -> Self {
        Self {
            background: Some(color.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.background.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default)]
    pub source_position: Side,
    #[serde(default)]
    pub target_position: Side,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
}

fn default_node_type() -> String {
    "custom".to_string()
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            data: Map::new(),
            style: NodeStyle::default(),
            source_position: Side::Bottom,
            target_position: Side::Top,
            node_type: default_node_type(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or(self.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    #[default]
    Default,
    Straight,
    Step,
    SmoothStep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,
    #[serde(default)]
    pub animated: bool,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, None, &target, None),
            source,
            target,
            source_handle: None,
            target_handle: None,
            edge_type: EdgeType::Default,
            animated: false,
        }
    }
}

/// Edge ids are derived from both endpoints and their handles.
pub fn edge_id(
    source: &str,
    source_handle: Option<&str>,
    target: &str,
    target_handle: Option<&str>,
) -> String {
    format!(
        "edge-{}{}-{}{}",
        source,
        source_handle.unwrap_or_default(),
        target,
        target_handle.unwrap_or_default()
    )
}

/// Payload of a connect gesture between two anchor points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(mut self, source_handle: &str, target_handle: &str) -> Self {
        self.source_handle = Some(source_handle.to_string());
        self.target_handle = Some(target_handle.to_string());
        self
    }

    pub fn into_edge(self) -> Edge {
        Edge {
            id: edge_id(
                &self.source,
                self.source_handle.as_deref(),
                &self.target,
                self.target_handle.as_deref(),
            ),
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
            edge_type: EdgeType::SmoothStep,
            animated: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Adds a node unless one with the same id exists.
    pub fn ensure_node(&mut self, node: Node) -> &mut Node {
        let idx = match self.nodes.iter().position(|n| n.id == node.id) {
            Some(idx) => idx,
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[idx]
    }

    /// Adds an edge unless one with the same id exists.
    pub fn push_edge(&mut self, edge: Edge) -> bool {
        if self.edges.iter().any(|e| e.id == edge.id) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn validate(&self) -> Result<()> {
        validate_parts(&self.nodes, &self.edges)
    }
}

/// Node ids must be unique and every edge endpoint must name an existing node.
pub fn validate_parts(nodes: &[Node], edges: &[Edge]) -> Result<()> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(Error::DuplicateNode {
                node_id: node.id.clone(),
            });
        }
    }
    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !ids.contains(endpoint.as_str()) {
                return Err(Error::Reference {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_tokens() {
        assert_eq!(Direction::from_token("TB"), Some(Direction::TopBottom));
        assert_eq!(Direction::from_token("td"), Some(Direction::TopBottom));
        assert_eq!(Direction::from_token("horizontal"), Some(Direction::LeftRight));
        assert_eq!(Direction::from_token("diagonal"), None);
        assert_eq!(Direction::default(), Direction::TopBottom);
    }

    #[test]
    fn anchor_sides_follow_direction() {
        assert_eq!(Direction::TopBottom.anchor_sides(), (Side::Top, Side::Bottom));
        assert_eq!(Direction::LeftRight.anchor_sides(), (Side::Left, Side::Right));
    }

    #[test]
    fn connection_becomes_smoothstep_edge() {
        let edge = Connection::new("A", "B").with_handles("out", "in").into_edge();
        assert_eq!(edge.id, "edge-Aout-Bin");
        assert_eq!(edge.edge_type, EdgeType::SmoothStep);
        assert!(edge.animated);
        assert_eq!(edge.source_handle.as_deref(), Some("out"));
    }

    #[test]
    fn validate_rejects_dangling_edge() {
        let mut graph = Graph::new();
        graph.ensure_node(Node::new("A"));
        graph.push_edge(Edge::new("A", "Z"));
        match graph.validate() {
            Err(Error::Reference { node_id, .. }) => assert_eq!(node_id, "Z"),
            other => panic!("expected reference error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let graph = Graph {
            nodes: vec![Node::new("A"), Node::new("A")],
            edges: Vec::new(),
        };
        assert!(matches!(graph.validate(), Err(Error::DuplicateNode { .. })));
    }

    #[test]
    fn node_serializes_camel_case() {
        let node = Node::new("A").with_data("label", "Alpha");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["sourcePosition"], "bottom");
        assert_eq!(json["targetPosition"], "top");
        assert_eq!(json["type"], "custom");
        assert_eq!(node.label(), "Alpha");
    }
}
