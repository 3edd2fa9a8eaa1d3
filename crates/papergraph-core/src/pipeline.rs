use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::artifact::{discover_artifacts, ArtifactError, PageArtifact};
use crate::filter::RelevanceFilter;
use crate::graph::{EdgeType, GraphError, GraphNode, GraphStore, NodeKey};
use crate::normalize::TextNormalizer;
use crate::segment::{segment_sections, SectionTitle};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub artifacts_processed: usize,
    pub papers: usize,
    pub sections: usize,
    pub images_accepted: usize,
    pub images_rejected: usize,
    pub related_edges: usize,
    pub duration_ms: u64,
}

/// Outcome of one pipeline run: what was built, what was skipped, and why.
/// A run with failures is still a successful run; failures only mark the
/// artifacts (or late edge upserts) that contributed nothing.
#[derive(Debug)]
pub struct RunReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stats: RunStats,
    pub failed: Vec<(String, PipelineError)>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            stats: RunStats::default(),
            failed: Vec::new(),
        }
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives one snapshot of the input directory through segmentation,
/// normalization, image filtering, and graph upserts, one artifact at a
/// time. Owns its store for the duration of the run; callers take it back
/// with [`Pipeline::into_store`] when they need backend-specific output
/// such as snapshot serialization.
pub struct Pipeline<S> {
    store: S,
    normalizer: TextNormalizer,
    filter: RelevanceFilter,
}

impl<S: GraphStore> Pipeline<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            normalizer: TextNormalizer::new(),
            filter: RelevanceFilter::default(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: RelevanceFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Process every artifact in `data_dir`, then ensure the RELATED
    /// clique over all known papers.
    ///
    /// Only an unreadable input directory is fatal here; everything that
    /// goes wrong for a single artifact is logged, recorded in the
    /// report, and skipped.
    pub async fn run(&mut self, data_dir: &Path) -> PipelineResult<RunReport> {
        let start = std::time::Instant::now();
        let mut report = RunReport::new();

        let artifacts = discover_artifacts(data_dir).await?;
        tracing::info!(count = artifacts.len(), dir = %data_dir.display(), "starting run");

        let mut papers_seen = BTreeSet::new();

        for artifact in &artifacts {
            match self.process_artifact(artifact, &mut report).await {
                Ok(()) => {
                    report.stats.artifacts_processed += 1;
                    papers_seen.insert(artifact.paper.clone());
                }
                Err(e) => {
                    tracing::warn!(artifact = %artifact.name(), error = %e, "artifact skipped");
                    report.failed.push((artifact.name(), e));
                }
            }
        }

        report.stats.papers = papers_seen.len();

        self.connect_papers(&mut report).await;

        report.stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    async fn process_artifact(
        &mut self,
        artifact: &PageArtifact,
        report: &mut RunReport,
    ) -> PipelineResult<()> {
        let text = tokio::fs::read_to_string(&artifact.text_path)
            .await
            .map_err(ArtifactError::Io)?;

        let sections = segment_sections(&text);

        // Papers are keyed by name alone; every page of the same paper
        // merges into the one node.
        self.store
            .upsert_node(&GraphNode::paper(&artifact.paper))
            .await?;

        // The sibling image is scored at most once per artifact; the
        // filter is pure, so each non-empty section reuses the verdict.
        let mut image_accepted = None;

        for (title, body) in &sections {
            let content = self.normalizer.normalize(body);
            if content.is_empty() {
                continue;
            }

            let section_key = NodeKey::section(&artifact.paper, *title);
            let result = self
                .upsert_section(artifact, section_key, *title, content, &mut image_accepted, report)
                .await;

            // Sections of the same page are independent; one failed
            // upsert must not starve the rest.
            if let Err(e) = result {
                tracing::warn!(
                    artifact = %artifact.name(),
                    section = %title,
                    error = %e,
                    "section upsert failed"
                );
                report.failed.push((format!("{}#{title}", artifact.name()), e));
            }
        }

        Ok(())
    }

    async fn upsert_section(
        &mut self,
        artifact: &PageArtifact,
        section_key: NodeKey,
        title: SectionTitle,
        content: String,
        image_accepted: &mut Option<bool>,
        report: &mut RunReport,
    ) -> PipelineResult<()> {
        self.store
            .upsert_node(&GraphNode::section(&artifact.paper, title, content))
            .await?;
        self.store
            .upsert_edge(
                EdgeType::HasSection,
                &NodeKey::paper(&artifact.paper),
                &section_key,
            )
            .await?;
        report.stats.sections += 1;

        if self.image_relevant(artifact, image_accepted, &mut report.stats).await {
            let image_key = NodeKey::image(&artifact.paper, artifact.page);
            self.store
                .upsert_node(&GraphNode::image(
                    &artifact.paper,
                    artifact.page,
                    artifact.image_path.display().to_string(),
                ))
                .await?;
            self.store
                .upsert_edge(EdgeType::HasImage, &section_key, &image_key)
                .await?;
        }

        Ok(())
    }

    /// Existence check plus relevance verdict for the artifact's sibling
    /// image. Unreadable or undecodable images count as rejected; they
    /// are diagnostics, never run failures.
    async fn image_relevant(
        &self,
        artifact: &PageArtifact,
        cached: &mut Option<bool>,
        stats: &mut RunStats,
    ) -> bool {
        if let Some(accepted) = *cached {
            return accepted;
        }

        let exists = tokio::fs::try_exists(&artifact.image_path)
            .await
            .unwrap_or(false);

        let accepted = if exists {
            match self.filter.evaluate(&artifact.image_path) {
                Ok(decision) => {
                    if decision.accepted {
                        stats.images_accepted += 1;
                    } else {
                        stats.images_rejected += 1;
                        tracing::debug!(
                            image = %artifact.image_path.display(),
                            score = decision.score,
                            "image below relevance threshold"
                        );
                    }
                    decision.accepted
                }
                Err(e) => {
                    stats.images_rejected += 1;
                    tracing::warn!(
                        image = %artifact.image_path.display(),
                        error = %e,
                        "image unreadable, treating as rejected"
                    );
                    false
                }
            }
        } else {
            false
        };

        *cached = Some(accepted);
        accepted
    }

    /// Ensure the RELATED clique over every paper the store knows,
    /// including papers from earlier runs. Each pair upsert is isolated;
    /// the edge is undirected and deduplicated by the store.
    async fn connect_papers(&mut self, report: &mut RunReport) {
        let names = match self.store.paper_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate papers for RELATED edges");
                report.failed.push(("related-edges".to_string(), e.into()));
                return;
            }
        };

        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                let a = NodeKey::paper(names[i].clone());
                let b = NodeKey::paper(names[j].clone());

                match self.store.upsert_edge(EdgeType::Related, &a, &b).await {
                    Ok(()) => report.stats.related_edges += 1,
                    Err(e) => {
                        tracing::warn!(a = %names[i], b = %names[j], error = %e, "RELATED upsert failed");
                        report
                            .failed
                            .push((format!("{} <-> {}", names[i], names[j]), e.into()));
                    }
                }
            }
        }
    }
}
