pub mod memory;
pub mod model;
pub mod remote;

pub use memory::MemoryGraph;
pub use model::{
    EdgeType, GraphNode, GraphSnapshot, GraphStats, NodeKey, NodeLabel, SnapshotEdge, SnapshotNode,
};
pub use remote::{RemoteGraph, RemoteGraphConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store rejected statement ({code}): {message}")]
    Store { code: String, message: String },

    #[error("Invalid store endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Cannot upsert edge to unknown node: {0}")]
    MissingNode(String),

    #[error("Edge {edge_type} cannot connect {edge_source} to {target}")]
    InvalidEdge {
        edge_type: EdgeType,
        edge_source: String,
        target: String,
    },

    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// The two idempotent primitives the pipeline needs from any graph store,
/// plus the paper-name read that drives RELATED-edge construction.
///
/// Node identity is always the full composite [`NodeKey`]; an upsert with a
/// key already present refreshes that node's attributes instead of creating
/// a duplicate. Edge upserts are no-ops when the same typed edge already
/// exists between the same endpoints.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    async fn upsert_node(&mut self, node: &GraphNode) -> GraphResult<()>;

    async fn upsert_edge(
        &mut self,
        edge_type: EdgeType,
        source: &NodeKey,
        target: &NodeKey,
    ) -> GraphResult<()>;

    /// All paper names the store knows, including ones from earlier runs.
    async fn paper_names(&self) -> GraphResult<Vec<String>>;

    async fn stats(&self) -> GraphResult<GraphStats>;
}
