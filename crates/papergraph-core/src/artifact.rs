use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Not a text artifact: {0}")]
    NotTextArtifact(String),
    #[error("Malformed artifact name {name}: {reason}")]
    MalformedName { name: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

pub const TEXT_SUFFIX: &str = "_text.txt";
pub const IMAGE_SUFFIX: &str = "_image.png";

/// One page's worth of extracted artifacts: the text file that names it and
/// the sibling image path the naming convention predicts (which may or may
/// not exist on disk).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArtifact {
    pub paper: String,
    pub page: u32,
    pub text_path: PathBuf,
    pub image_path: PathBuf,
}

impl PageArtifact {
    /// Parse a `{paper}_{page}_text.txt` path. The first `_`-separated
    /// segment is the paper name and the second is the page number; any
    /// further segments are ignored, matching the upstream extractor's
    /// naming convention.
    pub fn from_text_path(path: &Path) -> ArtifactResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ArtifactError::NotTextArtifact(path.display().to_string()))?;

        let stem = name
            .strip_suffix(TEXT_SUFFIX)
            .ok_or_else(|| ArtifactError::NotTextArtifact(name.to_string()))?;

        let mut segments = stem.split('_');

        let paper = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ArtifactError::MalformedName {
                name: name.to_string(),
                reason: "missing paper segment".to_string(),
            })?;

        let page_segment = segments.next().ok_or_else(|| ArtifactError::MalformedName {
            name: name.to_string(),
            reason: "missing page segment".to_string(),
        })?;

        let page: u32 = page_segment
            .parse()
            .map_err(|_| ArtifactError::MalformedName {
                name: name.to_string(),
                reason: format!("page segment {page_segment:?} is not a number"),
            })?;

        let image_path = path.with_file_name(format!("{paper}_{page_segment}{IMAGE_SUFFIX}"));

        Ok(Self {
            paper: paper.to_string(),
            page,
            text_path: path.to_path_buf(),
            image_path,
        })
    }

    /// Whether a bare file name looks like a text artifact at all.
    #[must_use]
    pub fn is_text_artifact(name: &str) -> bool {
        name.ends_with(TEXT_SUFFIX)
    }

    /// Short display name for diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        self.text_path
            .file_name()
            .map_or_else(|| self.text_path.display().to_string(), |n| {
                n.to_string_lossy().into_owned()
            })
    }
}

/// Enumerate the text artifacts in a directory snapshot, sorted by file
/// name so runs are deterministic. Files that do not match the naming
/// convention are skipped; candidates that match the suffix but carry a
/// malformed name are logged and skipped.
///
/// An unreadable directory is a configuration error and fails the whole
/// run.
pub async fn discover_artifacts(dir: &Path) -> ArtifactResult<Vec<PageArtifact>> {
    let mut names = Vec::new();

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if PageArtifact::is_text_artifact(name) {
            names.push(path);
        }
    }

    names.sort();

    let mut artifacts = Vec::with_capacity(names.len());
    for path in names {
        match PageArtifact::from_text_path(&path) {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping malformed artifact name");
            }
        }
    }

    Ok(artifacts)
}
