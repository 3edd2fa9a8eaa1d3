use std::collections::HashMap;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::model::{EdgeType, GraphNode, GraphSnapshot, GraphStats, NodeKey, SnapshotEdge, SnapshotNode};
use super::{GraphError, GraphResult, GraphStore};

/// In-memory graph backend. Upserts mutate a petgraph graph keyed by the
/// full composite node key; the result can be serialized to GraphML or
/// JSON for downstream graph tooling.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    graph: DiGraph<GraphNode, EdgeType>,
    index: HashMap<NodeKey, NodeIndex>,
}

impl MemoryGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Symmetric edges are stored once per unordered pair; canonicalize the
    /// direction so lookups and inserts agree.
    fn canonical_endpoints<'a>(
        edge_type: EdgeType,
        source: &'a NodeKey,
        target: &'a NodeKey,
    ) -> (&'a NodeKey, &'a NodeKey) {
        if edge_type.is_symmetric() && source > target {
            (target, source)
        } else {
            (source, target)
        }
    }

    fn node_index(&self, key: &NodeKey) -> GraphResult<NodeIndex> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| GraphError::MissingNode(key.id()))
    }

    /// Deterministically ordered serialized form of the current graph.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<&GraphNode> = self.graph.node_weights().collect();
        nodes.sort_by(|a, b| a.key.cmp(&b.key));

        let mut edges = Vec::with_capacity(self.graph.edge_count());
        for edge in self.graph.edge_indices() {
            if let (Some((source, target)), Some(edge_type)) = (
                self.graph.edge_endpoints(edge),
                self.graph.edge_weight(edge),
            ) {
                if let (Some(s), Some(t)) =
                    (self.graph.node_weight(source), self.graph.node_weight(target))
                {
                    edges.push(SnapshotEdge {
                        source: s.key.id(),
                        target: t.key.id(),
                        edge_type: *edge_type,
                    });
                }
            }
        }
        edges.sort_by(|a, b| {
            (&a.source, &a.target, a.edge_type).cmp(&(&b.source, &b.target, b.edge_type))
        });

        GraphSnapshot {
            nodes: nodes
                .into_iter()
                .map(|n| SnapshotNode {
                    id: n.key.id(),
                    label: n.key.label(),
                    properties: n.properties.clone(),
                })
                .collect(),
            edges,
        }
    }

    /// Serialize to GraphML with node labels and attributes carried as
    /// `<data>` entries.
    pub fn to_graphml(&self) -> GraphResult<String> {
        let snapshot = self.snapshot();
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(export_err)?;

        let mut graphml = BytesStart::new("graphml");
        graphml.push_attribute(("xmlns", "http://graphml.graphdrawing.org/xmlns"));
        writer.write_event(Event::Start(graphml)).map_err(export_err)?;

        for (id, target, attr_name) in [
            ("label", "node", "label"),
            ("content", "node", "content"),
            ("path", "node", "path"),
            ("edge_type", "edge", "edge_type"),
        ] {
            let mut key = BytesStart::new("key");
            key.push_attribute(("id", id));
            key.push_attribute(("for", target));
            key.push_attribute(("attr.name", attr_name));
            key.push_attribute(("attr.type", "string"));
            writer.write_event(Event::Empty(key)).map_err(export_err)?;
        }

        let mut graph = BytesStart::new("graph");
        graph.push_attribute(("id", "papers"));
        graph.push_attribute(("edgedefault", "directed"));
        writer.write_event(Event::Start(graph)).map_err(export_err)?;

        for node in &snapshot.nodes {
            let mut el = BytesStart::new("node");
            el.push_attribute(("id", node.id.as_str()));
            writer.write_event(Event::Start(el)).map_err(export_err)?;

            write_data(&mut writer, "label", node.label.as_str())?;
            for (name, value) in &node.properties {
                if let Some(text) = value.as_str() {
                    write_data(&mut writer, name, text)?;
                }
            }

            writer
                .write_event(Event::End(BytesEnd::new("node")))
                .map_err(export_err)?;
        }

        for edge in &snapshot.edges {
            let mut el = BytesStart::new("edge");
            el.push_attribute(("source", edge.source.as_str()));
            el.push_attribute(("target", edge.target.as_str()));
            writer.write_event(Event::Start(el)).map_err(export_err)?;
            write_data(&mut writer, "edge_type", edge.edge_type.as_str())?;
            writer
                .write_event(Event::End(BytesEnd::new("edge")))
                .map_err(export_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("graph")))
            .map_err(export_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("graphml")))
            .map_err(export_err)?;

        String::from_utf8(writer.into_inner()).map_err(export_err)
    }

    /// Serialize to the JSON snapshot format used by `inspect`.
    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub async fn write_graphml(&self, path: &Path) -> GraphResult<()> {
        let xml = self.to_graphml()?;
        tokio::fs::write(path, xml).await?;
        Ok(())
    }

    pub async fn write_json(&self, path: &Path) -> GraphResult<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

fn export_err<E: std::fmt::Display>(e: E) -> GraphError {
    GraphError::Export(e.to_string())
}

fn write_data(writer: &mut Writer<Vec<u8>>, key: &str, value: &str) -> GraphResult<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("key", key));

    writer.write_event(Event::Start(data)).map_err(export_err)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(export_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("data")))
        .map_err(export_err)?;
    Ok(())
}

#[async_trait::async_trait]
impl GraphStore for MemoryGraph {
    async fn upsert_node(&mut self, node: &GraphNode) -> GraphResult<()> {
        if let Some(&ix) = self.index.get(&node.key) {
            if let Some(existing) = self.graph.node_weight_mut(ix) {
                existing.properties = node.properties.clone();
            }
        } else {
            let ix = self.graph.add_node(node.clone());
            self.index.insert(node.key.clone(), ix);
        }

        Ok(())
    }

    async fn upsert_edge(
        &mut self,
        edge_type: EdgeType,
        source: &NodeKey,
        target: &NodeKey,
    ) -> GraphResult<()> {
        if !edge_type.connects(source, target) || (edge_type.is_symmetric() && source == target) {
            return Err(GraphError::InvalidEdge {
                edge_type,
                edge_source: source.id(),
                target: target.id(),
            });
        }

        let (source, target) = Self::canonical_endpoints(edge_type, source, target);
        let source_ix = self.node_index(source)?;
        let target_ix = self.node_index(target)?;

        let exists = self
            .graph
            .edges_connecting(source_ix, target_ix)
            .any(|e| *e.weight() == edge_type);
        if !exists {
            self.graph.add_edge(source_ix, target_ix, edge_type);
        }

        Ok(())
    }

    async fn paper_names(&self) -> GraphResult<Vec<String>> {
        let mut names: Vec<String> = self
            .graph
            .node_weights()
            .filter_map(|n| match &n.key {
                NodeKey::Paper { name } => Some(name.clone()),
                _ => None,
            })
            .collect();
        names.sort();
        Ok(names)
    }

    async fn stats(&self) -> GraphResult<GraphStats> {
        Ok(GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        })
    }
}
