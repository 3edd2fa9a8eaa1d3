use std::path::Path;

use anyhow::{Context, Result};

use papergraph_core::{EdgeType, GraphSnapshot, NodeLabel};

pub fn run(snapshot_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(snapshot_path)
        .with_context(|| format!("reading snapshot {}", snapshot_path.display()))?;
    let snapshot: GraphSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", snapshot_path.display()))?;

    let stats = snapshot.stats();

    println!("nodes: {}", stats.node_count);
    for label in [NodeLabel::Paper, NodeLabel::Section, NodeLabel::Image] {
        println!("  {label}: {}", snapshot.label_count(label));
    }

    println!("edges: {}", stats.edge_count);
    for edge_type in [EdgeType::HasSection, EdgeType::HasImage, EdgeType::Related] {
        println!("  {edge_type}: {}", snapshot.edge_type_count(edge_type));
    }

    Ok(())
}
