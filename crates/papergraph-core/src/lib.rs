pub mod artifact;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod normalize;
pub mod pipeline;
pub mod segment;

pub use artifact::{discover_artifacts, ArtifactError, PageArtifact};
pub use config::{ConfigError, FilterConfig, PipelineConfig, ScorerKind, StoreConfig};
pub use error::{Error, Result};
pub use filter::{FilterDecision, FilterError, RelevanceFilter, RelevanceScorer};
pub use graph::{
    EdgeType, GraphError, GraphNode, GraphSnapshot, GraphStats, GraphStore, MemoryGraph, NodeKey,
    NodeLabel, RemoteGraph, RemoteGraphConfig,
};
pub use normalize::TextNormalizer;
pub use pipeline::{Pipeline, PipelineError, RunReport, RunStats};
pub use segment::{segment_sections, SectionTitle};
