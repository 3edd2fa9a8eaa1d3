use serde::{Deserialize, Serialize};

use crate::segment::SectionTitle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeLabel {
    Paper,
    Section,
    Image,
}

impl NodeLabel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "Paper",
            Self::Section => "Section",
            Self::Image => "Image",
        }
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paper" => Ok(Self::Paper),
            "Section" => Ok(Self::Section),
            "Image" => Ok(Self::Image),
            _ => Err(crate::Error::UnknownNodeLabel(s.to_string())),
        }
    }
}

/// Full composite identity of a node. Matching anywhere in the system is by
/// the whole key, label included; a Paper and a Section that share a literal
/// name string can never be conflated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum NodeKey {
    Paper { name: String },
    Section { paper: String, title: SectionTitle },
    Image { paper: String, page: u32 },
}

impl NodeKey {
    #[must_use]
    pub fn paper(name: impl Into<String>) -> Self {
        Self::Paper { name: name.into() }
    }

    #[must_use]
    pub fn section(paper: impl Into<String>, title: SectionTitle) -> Self {
        Self::Section {
            paper: paper.into(),
            title,
        }
    }

    #[must_use]
    pub fn image(paper: impl Into<String>, page: u32) -> Self {
        Self::Image {
            paper: paper.into(),
            page,
        }
    }

    #[must_use]
    pub fn label(&self) -> NodeLabel {
        match self {
            Self::Paper { .. } => NodeLabel::Paper,
            Self::Section { .. } => NodeLabel::Section,
            Self::Image { .. } => NodeLabel::Image,
        }
    }

    /// Stable textual id used in serialized snapshots.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Paper { name } => format!("paper:{name}"),
            Self::Section { paper, title } => format!("section:{paper}/{title}"),
            Self::Image { paper, page } => format!("image:{paper}/{page}"),
        }
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    HasSection,
    HasImage,
    Related,
}

impl EdgeType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasSection => "HAS_SECTION",
            Self::HasImage => "HAS_IMAGE",
            Self::Related => "RELATED",
        }
    }

    /// Symmetric edges carry no direction; stores deduplicate them per
    /// unordered endpoint pair.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::Related)
    }

    /// The labels an edge of this type is allowed to connect.
    #[must_use]
    pub fn endpoint_labels(&self) -> (NodeLabel, NodeLabel) {
        match self {
            Self::HasSection => (NodeLabel::Paper, NodeLabel::Section),
            Self::HasImage => (NodeLabel::Section, NodeLabel::Image),
            Self::Related => (NodeLabel::Paper, NodeLabel::Paper),
        }
    }

    #[must_use]
    pub fn connects(&self, source: &NodeKey, target: &NodeKey) -> bool {
        self.endpoint_labels() == (source.label(), target.label())
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EdgeType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HAS_SECTION" => Ok(Self::HasSection),
            "HAS_IMAGE" => Ok(Self::HasImage),
            "RELATED" => Ok(Self::Related),
            _ => Err(crate::Error::UnknownEdgeType(s.to_string())),
        }
    }
}

/// A node plus its non-key attributes, ready for upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub key: NodeKey,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl GraphNode {
    #[must_use]
    pub fn new(key: NodeKey) -> Self {
        Self {
            key,
            properties: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn paper(name: impl Into<String>) -> Self {
        Self::new(NodeKey::paper(name))
    }

    #[must_use]
    pub fn section(
        paper: impl Into<String>,
        title: SectionTitle,
        content: impl Into<String>,
    ) -> Self {
        let mut node = Self::new(NodeKey::section(paper, title));
        node.properties
            .insert("content".to_string(), content.into().into());
        node
    }

    #[must_use]
    pub fn image(paper: impl Into<String>, page: u32, path: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKey::image(paper, page));
        node.properties
            .insert("path".to_string(), path.into().into());
        node
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(serde_json::Value::as_str)
    }
}

/// Aggregate counts, mostly for run summaries and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}

/// Serialized form of the whole graph, readable by common graph tooling
/// after conversion and by this crate's own `inspect` path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    pub label: NodeLabel,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub source: String,
    pub target: String,
    pub edge_type: EdgeType,
}

impl GraphSnapshot {
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
        }
    }

    #[must_use]
    pub fn label_count(&self, label: NodeLabel) -> usize {
        self.nodes.iter().filter(|n| n.label == label).count()
    }

    #[must_use]
    pub fn edge_type_count(&self, edge_type: EdgeType) -> usize {
        self.edges.iter().filter(|e| e.edge_type == edge_type).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ids_are_label_qualified() {
        let paper = NodeKey::paper("alpha");
        let section = NodeKey::section("alpha", SectionTitle::Abstract);
        let image = NodeKey::image("alpha", 0);

        assert_eq!(paper.id(), "paper:alpha");
        assert_eq!(section.id(), "section:alpha/abstract");
        assert_eq!(image.id(), "image:alpha/0");
    }

    #[test]
    fn test_shared_name_does_not_conflate_labels() {
        // A paper literally named like a section id must still be distinct.
        let paper = NodeKey::paper("abstract");
        let section = NodeKey::section("abstract", SectionTitle::Abstract);

        assert_ne!(paper, section);
        assert_ne!(paper.id(), section.id());
    }

    #[test]
    fn test_edge_endpoint_validation() {
        let paper = NodeKey::paper("a");
        let section = NodeKey::section("a", SectionTitle::Methods);
        let image = NodeKey::image("a", 2);

        assert!(EdgeType::HasSection.connects(&paper, &section));
        assert!(!EdgeType::HasSection.connects(&section, &paper));
        assert!(EdgeType::HasImage.connects(&section, &image));
        assert!(EdgeType::Related.connects(&paper, &NodeKey::paper("b")));
        assert!(!EdgeType::Related.connects(&paper, &image));
    }

    #[test]
    fn test_node_builders_set_attributes() {
        let section = GraphNode::section("a", SectionTitle::Results, "finding one");
        assert_eq!(section.property("content"), Some("finding one"));

        let image = GraphNode::image("a", 3, "/data/a_3_image.png");
        assert_eq!(image.property("path"), Some("/data/a_3_image.png"));
    }

    #[test]
    fn test_edge_type_round_trip() {
        for edge_type in [EdgeType::HasSection, EdgeType::HasImage, EdgeType::Related] {
            assert_eq!(edge_type.as_str().parse::<EdgeType>().unwrap(), edge_type);
        }
    }
}
