use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown section title: {0}")]
    UnknownSectionTitle(String),

    #[error("Unknown node label: {0}")]
    UnknownNodeLabel(String),

    #[error("Unknown edge type: {0}")]
    UnknownEdgeType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
