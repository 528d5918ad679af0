#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("extraction failed: {0}")]
    Extraction(#[source] anyhow::Error),
    #[error("layout engine did not place node `{node_id}`")]
    Layout { node_id: String },
    #[error("edge `{edge_id}` references missing node `{node_id}`")]
    Reference { edge_id: String, node_id: String },
    #[error("duplicate node id `{node_id}`")]
    DuplicateNode { node_id: String },
    #[error("no node with id `{node_id}`")]
    UnknownNode { node_id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
