use crate::ir::{EdgeType, NodeStyle, Side};
use crate::surface::DiagramSurface;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub direction: String,
    pub selected: Option<String>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub source_position: Side,
    pub target_position: Side,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub animated: bool,
}

impl LayoutDump {
    pub fn from_surface(surface: &DiagramSurface) -> Self {
        let layout = surface.layout_config();
        let nodes = surface
            .rendered_nodes()
            .into_iter()
            .map(|node| NodeDump {
                label: node.label().to_string(),
                x: node.position.x,
                y: node.position.y,
                width: layout.node_width,
                height: layout.node_height,
                source_position: node.source_position,
                target_position: node.target_position,
                style: node.style,
                id: node.id,
            })
            .collect();

        let edges = surface
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
                edge_type: edge.edge_type,
                animated: edge.animated,
            })
            .collect();

        LayoutDump {
            direction: surface.direction().as_token().to_string(),
            selected: surface.selected().map(str::to_string),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, surface: &DiagramSurface) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_surface(surface);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
