use std::path::Path;

use anyhow::{bail, Context, Result};

use papergraph_core::config::RemoteStoreConfig;
use papergraph_core::{
    MemoryGraph, Pipeline, PipelineConfig, RemoteGraph, RunReport, StoreConfig,
};

use super::BuildArgs;

pub async fn run(args: BuildArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;

    if config.data_dir.as_os_str().is_empty() {
        bail!("no data directory given (pass it as an argument or set data_dir in the config)");
    }

    let filter = config.filter.build();

    let report = match &config.store {
        StoreConfig::Memory {
            graphml_out,
            json_out,
        } => {
            let mut pipeline = Pipeline::new(MemoryGraph::new()).with_filter(filter);
            let report = pipeline
                .run(&config.data_dir)
                .await
                .context("pipeline run failed")?;

            let store = pipeline.into_store();
            if let Some(path) = graphml_out {
                store
                    .write_graphml(path)
                    .await
                    .with_context(|| format!("writing GraphML to {}", path.display()))?;
            }
            if let Some(path) = json_out {
                store
                    .write_json(path)
                    .await
                    .with_context(|| format!("writing JSON snapshot to {}", path.display()))?;
            }

            report
        }
        StoreConfig::Remote(remote) => {
            let store = RemoteGraph::connect(remote.resolve()?)
                .await
                .with_context(|| format!("graph store at {} is unreachable", remote.uri))?;

            let mut pipeline = Pipeline::new(store).with_filter(filter);
            pipeline
                .run(&config.data_dir)
                .await
                .context("pipeline run failed")?
        }
    };

    print_report(&report);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn apply_overrides(config: &mut PipelineConfig, args: &BuildArgs) -> Result<()> {
    if let Some(data_dir) = &args.data_dir {
        config.data_dir.clone_from(data_dir);
    }

    if let Some(uri) = &args.store_uri {
        let Some(username) = &args.username else {
            bail!("--store-uri requires --username");
        };

        config.store = StoreConfig::Remote(RemoteStoreConfig {
            uri: uri.clone(),
            database: args.database.clone().unwrap_or_else(|| "neo4j".to_string()),
            username: username.clone(),
            password_env: args
                .password_env
                .clone()
                .unwrap_or_else(|| "PAPERGRAPH_STORE_PASSWORD".to_string()),
            connect_timeout_seconds: 10,
            request_timeout_seconds: 30,
        });
    } else if let StoreConfig::Memory {
        graphml_out,
        json_out,
    } = &mut config.store
    {
        if args.graphml_out.is_some() {
            graphml_out.clone_from(&args.graphml_out);
        }
        if args.json_out.is_some() {
            json_out.clone_from(&args.json_out);
        }
    }

    if let Some(scorer) = args.scorer {
        config.filter.scorer = scorer.into();
    }
    if args.threshold.is_some() {
        config.filter.threshold = args.threshold;
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    let stats = &report.stats;

    println!("run {} finished in {} ms", report.id, stats.duration_ms);
    println!(
        "  artifacts processed: {} ({} failed)",
        stats.artifacts_processed,
        report.failure_count()
    );
    println!("  papers: {}", stats.papers);
    println!("  sections: {}", stats.sections);
    println!(
        "  images: {} accepted, {} rejected",
        stats.images_accepted, stats.images_rejected
    );
    println!("  related edges: {}", stats.related_edges);

    if !report.is_clean() {
        println!("failures:");
        for (name, error) in &report.failed {
            println!("  {name}: {error}");
        }
    }
}
