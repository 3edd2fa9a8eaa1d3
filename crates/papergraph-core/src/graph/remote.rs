use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::model::{EdgeType, GraphNode, GraphStats, NodeKey};
use super::{GraphError, GraphResult, GraphStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteGraphConfig {
    /// Base URI of the graph service, e.g. `http://localhost:7474`.
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    pub username: String,
    /// Resolved credential. Configuration files carry the name of an
    /// environment variable instead; see `config::RemoteStoreConfig`.
    pub password: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_database() -> String {
    "neo4j".to_string()
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_request_timeout() -> u64 {
    30
}

/// Live graph-store backend speaking Cypher over the HTTP transactional
/// endpoint. Every mutation is a single MERGE statement keyed by label
/// plus the full composite key, so repeated runs cannot duplicate nodes
/// or edges.
pub struct RemoteGraph {
    client: Client,
    endpoint: Url,
    username: String,
    password: String,
}

impl RemoteGraph {
    /// Build the client and probe the store. An unreachable or
    /// misconfigured store fails here, before any artifact is processed.
    pub async fn connect(config: RemoteGraphConfig) -> GraphResult<Self> {
        let base = Url::parse(&config.uri)?;
        let endpoint = base.join(&format!("db/{}/tx/commit", config.database))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        let store = Self {
            client,
            endpoint,
            username: config.username,
            password: config.password,
        };

        store.run("RETURN 1", json!({})).await?;

        Ok(store)
    }

    /// Execute one Cypher statement and return its rows. The endpoint
    /// answers 200 even for statement errors, so the body's `errors`
    /// array is checked as well as the HTTP status.
    async fn run(
        &self,
        statement: &str,
        parameters: serde_json::Value,
    ) -> GraphResult<Vec<Vec<serde_json::Value>>> {
        let body = json!({
            "statements": [{ "statement": statement, "parameters": parameters }]
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: TxResponse = response.json().await?;

        if let Some(error) = payload.errors.into_iter().next() {
            return Err(GraphError::Store {
                code: error.code,
                message: error.message,
            });
        }

        Ok(payload
            .results
            .into_iter()
            .next()
            .map(|result| result.data.into_iter().map(|entry| entry.row).collect())
            .unwrap_or_default())
    }

    async fn run_unit(&self, statement: &str, parameters: serde_json::Value) -> GraphResult<()> {
        self.run(statement, parameters).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    #[allow(dead_code)]
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    #[serde(default)]
    row: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

/// MERGE statement plus parameters for one node upsert.
fn node_statement(node: &GraphNode) -> (&'static str, serde_json::Value) {
    match &node.key {
        NodeKey::Paper { name } => (
            "MERGE (p:Paper {name: $name})",
            json!({ "name": name }),
        ),
        NodeKey::Section { paper, title } => (
            "MERGE (s:Section {paper: $paper, title: $title}) SET s.content = $content",
            json!({
                "paper": paper,
                "title": title.as_str(),
                "content": node.property("content").unwrap_or_default(),
            }),
        ),
        NodeKey::Image { paper, page } => (
            "MERGE (i:Image {paper: $paper, page: $page}) SET i.path = $path",
            json!({
                "paper": paper,
                "page": page,
                "path": node.property("path").unwrap_or_default(),
            }),
        ),
    }
}

/// MERGE statement plus parameters for one edge upsert. Endpoints are
/// matched by label and full composite key; RELATED uses an undirected
/// pattern so either discovery order lands on the same edge.
fn edge_statement(
    edge_type: EdgeType,
    source: &NodeKey,
    target: &NodeKey,
) -> GraphResult<(&'static str, serde_json::Value)> {
    match (edge_type, source, target) {
        (
            EdgeType::HasSection,
            NodeKey::Paper { name },
            NodeKey::Section { paper, title },
        ) if name == paper => Ok((
            "MATCH (p:Paper {name: $paper}) \
             MATCH (s:Section {paper: $paper, title: $title}) \
             MERGE (p)-[:HAS_SECTION]->(s)",
            json!({ "paper": paper, "title": title.as_str() }),
        )),
        (
            EdgeType::HasImage,
            NodeKey::Section { paper, title },
            NodeKey::Image { paper: image_paper, page },
        ) if paper == image_paper => Ok((
            "MATCH (s:Section {paper: $paper, title: $title}) \
             MATCH (i:Image {paper: $paper, page: $page}) \
             MERGE (s)-[:HAS_IMAGE]->(i)",
            json!({ "paper": paper, "title": title.as_str(), "page": page }),
        )),
        (EdgeType::Related, NodeKey::Paper { name: a }, NodeKey::Paper { name: b })
            if a != b =>
        {
            Ok((
                "MATCH (a:Paper {name: $a}) \
                 MATCH (b:Paper {name: $b}) \
                 MERGE (a)-[:RELATED]-(b)",
                json!({ "a": a, "b": b }),
            ))
        }
        _ => Err(GraphError::InvalidEdge {
            edge_type,
            edge_source: source.id(),
            target: target.id(),
        }),
    }
}

#[async_trait::async_trait]
impl GraphStore for RemoteGraph {
    async fn upsert_node(&mut self, node: &GraphNode) -> GraphResult<()> {
        let (statement, parameters) = node_statement(node);
        self.run_unit(statement, parameters).await
    }

    async fn upsert_edge(
        &mut self,
        edge_type: EdgeType,
        source: &NodeKey,
        target: &NodeKey,
    ) -> GraphResult<()> {
        let (statement, parameters) = edge_statement(edge_type, source, target)?;
        self.run_unit(statement, parameters).await
    }

    async fn paper_names(&self) -> GraphResult<Vec<String>> {
        let rows = self
            .run("MATCH (p:Paper) RETURN p.name ORDER BY p.name", json!({}))
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                row.into_iter()
                    .next()
                    .and_then(|v| v.as_str().map(String::from))
            })
            .collect())
    }

    async fn stats(&self) -> GraphResult<GraphStats> {
        let nodes = self.run("MATCH (n) RETURN count(n)", json!({})).await?;
        let edges = self
            .run("MATCH ()-[r]->() RETURN count(r)", json!({}))
            .await?;

        let first = |rows: Vec<Vec<serde_json::Value>>| {
            rows.into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .and_then(|v| v.as_u64())
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or_default()
        };

        Ok(GraphStats {
            node_count: first(nodes),
            edge_count: first(edges),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SectionTitle;

    #[test]
    fn test_paper_statement_keys_by_label_and_name() {
        let (statement, params) = node_statement(&GraphNode::paper("alpha"));

        assert!(statement.contains(":Paper"));
        assert_eq!(params["name"], "alpha");
    }

    #[test]
    fn test_section_statement_uses_composite_key() {
        let node = GraphNode::section("alpha", SectionTitle::Methods, "lemma text");
        let (statement, params) = node_statement(&node);

        // Content is a SET, never part of the MERGE key; otherwise a
        // content change would mint a second node for the same section.
        assert!(statement.contains("MERGE (s:Section {paper: $paper, title: $title})"));
        assert!(statement.contains("SET s.content"));
        assert_eq!(params["paper"], "alpha");
        assert_eq!(params["title"], "methods");
        assert_eq!(params["content"], "lemma text");
    }

    #[test]
    fn test_related_statement_is_undirected() {
        let (statement, _) = edge_statement(
            EdgeType::Related,
            &NodeKey::paper("a"),
            &NodeKey::paper("b"),
        )
        .unwrap();

        assert!(statement.contains("-[:RELATED]-"));
        assert!(!statement.contains("-[:RELATED]->"));
    }

    #[test]
    fn test_self_related_edge_is_rejected() {
        let result = edge_statement(
            EdgeType::Related,
            &NodeKey::paper("a"),
            &NodeKey::paper("a"),
        );

        assert!(matches!(result, Err(GraphError::InvalidEdge { .. })));
    }

    #[test]
    fn test_cross_paper_section_edge_is_rejected() {
        let result = edge_statement(
            EdgeType::HasSection,
            &NodeKey::paper("alpha"),
            &NodeKey::section("beta", SectionTitle::Abstract),
        );

        assert!(matches!(result, Err(GraphError::InvalidEdge { .. })));
    }

    #[test]
    fn test_transaction_response_parsing() {
        let payload = r#"{
            "results": [{"columns": ["p.name"], "data": [{"row": ["alpha"]}, {"row": ["beta"]}]}],
            "errors": []
        }"#;

        let parsed: TxResponse = serde_json::from_str(payload).unwrap();

        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.results[0].data.len(), 2);
        assert_eq!(parsed.results[0].data[0].row[0], "alpha");
    }

    #[test]
    fn test_statement_error_parsing() {
        let payload = r#"{
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        }"#;

        let parsed: TxResponse = serde_json::from_str(payload).unwrap();

        assert_eq!(parsed.errors[0].code, "Neo.ClientError.Statement.SyntaxError");
    }
}
