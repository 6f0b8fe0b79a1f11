use clap::Parser;
use overlayrank::layout::Strategy;
use overlayrank::rank::{LayoutRequest, RawProposal, StaticProposalSource};
use overlayrank::{RankConfig, RankContext, Ranker};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Overlayrank CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    output_path: Option<String>,
    /// Cached upstream proposals keyed by strategy; ranked from templates
    /// when absent.
    proposals: BTreeMap<Strategy, RawProposal>,
    /// Overrides `rank.proposal_timeout_ms` for this run.
    proposal_timeout_ms: Option<u64>,
    request: LayoutRequest,
    rank: RankConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("overlayrank=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }
    if config.request.text_requests.is_empty() {
        return Err("request.text_requests must name at least one text".into());
    }
    config.rank.validate()?;

    let image_bytes = fs::read(&config.image_path)?;
    let ranker = Ranker::new(config.rank);

    let mut ctx = if config.proposals.is_empty() {
        RankContext::offline()
    } else {
        let source = config
            .proposals
            .into_iter()
            .fold(StaticProposalSource::new("config"), |source, (strategy, proposal)| {
                source.with_proposal(strategy, proposal)
            });
        RankContext::with_source(Arc::new(source))
    };
    if let Some(millis) = config.proposal_timeout_ms {
        ctx = ctx.with_timeout(std::time::Duration::from_millis(millis));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let output = runtime.block_on(ranker.rank_encoded(&ctx, &image_bytes, &config.request));
    tracing::info!(
        strategies = ?output.strategies_used,
        fallback = output.fallback_used,
        "ranking finished"
    );
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
