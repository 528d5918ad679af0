use crate::ir::{Edge, Graph, Node};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// One domain record as handed to the diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub predecessor_id: Option<String>,
    #[serde(default)]
    pub predecessor_name: Option<String>,
    #[serde(default)]
    pub successor_id: Option<String>,
    #[serde(default)]
    pub successor_name: Option<String>,
    #[serde(default)]
    pub keys: BTreeMap<String, f64>,
}

/// Turns domain records into the initial node and edge lists.
pub trait Extractor {
    fn extract(&self, records: &[Record], root_label: &str) -> anyhow::Result<Graph>;
}

impl<F> Extractor for F
where
    F: Fn(&[Record], &str) -> anyhow::Result<Graph>,
{
    fn extract(&self, records: &[Record], root_label: &str) -> anyhow::Result<Graph> {
        self(records, root_label)
    }
}

/// Builds a rooted hierarchy from predecessor/successor links.
///
/// Records without a predecessor hang off the root when they sit on the top
/// two levels; deeper orphans stay unconnected.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyExtractor;

impl Extractor for HierarchyExtractor {
    fn extract(&self, records: &[Record], root_label: &str) -> anyhow::Result<Graph> {
        if root_label.trim().is_empty() {
            anyhow::bail!("root label must not be empty");
        }

        let mut graph = Graph::new();
        graph.ensure_node(Node::new(root_label).with_data("label", root_label));

        for record in records {
            if record.id.trim().is_empty() {
                anyhow::bail!("record without id");
            }
            if record.id == root_label {
                anyhow::bail!("record id `{}` collides with the root label", record.id);
            }

            let node = graph.ensure_node(Node::new(record.id.as_str()));
            // A placeholder created from a link is upgraded by its own record.
            node.data = record_data(record);

            match record.predecessor_id.as_deref() {
                Some(pred) => {
                    link_node(&mut graph, pred, record.predecessor_name.as_deref());
                    graph.push_edge(Edge::new(pred, record.id.as_str()));
                }
                None if record.level <= 1 => {
                    graph.push_edge(Edge::new(root_label, record.id.as_str()));
                }
                None => {}
            }

            if let Some(succ) = record.successor_id.as_deref() {
                link_node(&mut graph, succ, record.successor_name.as_deref());
                graph.push_edge(Edge::new(record.id.as_str(), succ));
            }
        }

        tracing::debug!(
            records = records.len(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "extracted hierarchy"
        );
        Ok(graph)
    }
}

fn record_data(record: &Record) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(
        "label".to_string(),
        Value::from(record.name.clone().unwrap_or_else(|| record.id.clone())),
    );
    data.insert("level".to_string(), Value::from(record.level));
    if !record.keys.is_empty() {
        let keys: Map<String, Value> = record
            .keys
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(*v)))
            .collect();
        data.insert("keys".to_string(), Value::Object(keys));
    }
    data
}

fn link_node(graph: &mut Graph, id: &str, name: Option<&str>) {
    if graph.contains_node(id) {
        return;
    }
    graph.ensure_node(Node::new(id).with_data("label", name.unwrap_or(id)));
}

pub fn parse_records(input: &str) -> anyhow::Result<Vec<Record>> {
    Ok(serde_json::from_str(input)?)
}

pub fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let contents = std::fs::read_to_string(path)?;
    parse_records(&contents)
}
