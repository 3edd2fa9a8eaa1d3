pub mod build;
pub mod inspect;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "ppg",
    about = "Build a property graph of papers, sections, and page images from extracted artifacts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the construction pipeline over a directory of page artifacts
    Build(BuildArgs),
    /// Print node and edge counts from a JSON snapshot
    Inspect {
        /// Snapshot file produced by `build --json-out`
        snapshot: PathBuf,
    },
}

#[derive(Args)]
pub struct BuildArgs {
    /// Directory containing {paper}_{page}_text.txt artifacts
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a GraphML snapshot here (in-memory store only)
    #[arg(long)]
    pub graphml_out: Option<PathBuf>,

    /// Write a JSON snapshot here (in-memory store only)
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Use a live graph store at this URI instead of the in-memory graph
    #[arg(long)]
    pub store_uri: Option<String>,

    /// Database name on the live store
    #[arg(long)]
    pub database: Option<String>,

    /// Username for the live store
    #[arg(long)]
    pub username: Option<String>,

    /// Environment variable holding the live store password
    #[arg(long)]
    pub password_env: Option<String>,

    /// Relevance signal used to admit page images
    #[arg(long, value_enum)]
    pub scorer: Option<ScorerArg>,

    /// Relevance threshold override
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScorerArg {
    PixelCount,
    HistogramEntropy,
}

impl From<ScorerArg> for papergraph_core::ScorerKind {
    fn from(value: ScorerArg) -> Self {
        match value {
            ScorerArg::PixelCount => Self::PixelCount,
            ScorerArg::HistogramEntropy => Self::HistogramEntropy,
        }
    }
}
