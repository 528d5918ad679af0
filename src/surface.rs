use crate::config::{Config, LayoutConfig, SurfaceConfig};
use crate::error::{Error, Result};
use crate::extract::{Extractor, Record};
use crate::ir::{Connection, Direction, Edge, Graph, Node, NodeStyle};
use crate::layout::layout_graph;

/// Overlay buttons that trigger a re-layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Vertical,
    Horizontal,
}

impl Control {
    pub const ALL: [Control; 2] = [Control::Vertical, Control::Horizontal];

    pub fn label(self) -> &'static str {
        match self {
            Control::Vertical => "vertical layout",
            Control::Horizontal => "horizontal layout",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Control::Vertical => Direction::TopBottom,
            Control::Horizontal => Direction::LeftRight,
        }
    }
}

/// Interactive diagram state.
///
/// Owns the node and edge collections. Highlight styles are not stored on the
/// nodes; they are derived from the single selected id when read.
#[derive(Debug, Clone)]
pub struct DiagramSurface {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selected: Option<String>,
    direction: Direction,
    layout_config: LayoutConfig,
    surface_config: SurfaceConfig,
}

impl DiagramSurface {
    /// Extracts the graph from `records` once and lays it out top-to-bottom.
    pub fn new<E>(records: &[Record], extractor: &E, root_label: &str, config: &Config) -> Result<Self>
    where
        E: Extractor + ?Sized,
    {
        let graph = extractor
            .extract(records, root_label)
            .map_err(Error::Extraction)?;
        Self::from_graph(graph, config)
    }

    pub fn from_graph(graph: Graph, config: &Config) -> Result<Self> {
        let direction = Direction::default();
        let (nodes, edges) = layout_graph(&graph.nodes, &graph.edges, direction, &config.layout)?;
        tracing::info!(nodes = nodes.len(), edges = edges.len(), "diagram surface ready");
        Ok(Self {
            nodes,
            edges,
            selected: None,
            direction,
            layout_config: config.layout.clone(),
            surface_config: config.surface.clone(),
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout_config
    }

    pub fn surface_config(&self) -> &SurfaceConfig {
        &self.surface_config
    }

    pub fn controls(&self) -> [Control; 2] {
        Control::ALL
    }

    /// Marks `id` as the active node. Clicking the active node keeps it active.
    pub fn click_node(&mut self, id: &str) -> Result<()> {
        if !self.nodes.iter().any(|node| node.id == id) {
            return Err(Error::UnknownNode {
                node_id: id.to_string(),
            });
        }
        tracing::info!(node = id, "node selected");
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn node_style(&self, id: &str) -> NodeStyle {
        if self.selected.as_deref() == Some(id) {
            NodeStyle::highlighted(&self.surface_config.highlight_color)
        } else {
            NodeStyle::default()
        }
    }

    /// Nodes as they should be drawn, with the highlight applied.
    pub fn rendered_nodes(&self) -> Vec<Node> {
        self.nodes
            .iter()
            .map(|node| {
                let mut node = node.clone();
                node.style = self.node_style(&node.id);
                node
            })
            .collect()
    }

    /// Appends the edge produced by a connect gesture. Duplicates and
    /// self-loops are accepted as-is; both endpoints must be existing nodes.
    pub fn connect(&mut self, connection: Connection) -> Result<&Edge> {
        let edge = connection.into_edge();
        for node_id in [&edge.source, &edge.target] {
            if !self.nodes.iter().any(|node| &node.id == node_id) {
                return Err(Error::Reference {
                    edge_id: edge.id.clone(),
                    node_id: node_id.clone(),
                });
            }
        }
        tracing::info!(edge = %edge.id, "edge connected");
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Re-runs the layout on the current collections and replaces them.
    pub fn relayout(&mut self, direction: Direction) -> Result<()> {
        let (nodes, edges) = layout_graph(&self.nodes, &self.edges, direction, &self.layout_config)?;
        tracing::info!(direction = direction.as_token(), "diagram re-laid out");
        self.nodes = nodes;
        self.edges = edges;
        self.direction = direction;
        Ok(())
    }

    pub fn press(&mut self, control: Control) -> Result<()> {
        self.relayout(control.direction())
    }

    pub fn graph(&self) -> Graph {
        Graph {
            nodes: self.rendered_nodes(),
            edges: self.edges.clone(),
        }
    }
}
