use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tools::{ConfigOverrides, ReplayOptions};

#[derive(Parser)]
#[command(name = "voyager", about = "Inspect voyage datasets and replay playback headlessly")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a dataset directory and print one summary line per voyage.
    Inspect {
        /// Directory holding voyages.json, occurrences.json and optionally metadata.json.
        dir: PathBuf,
    },
    /// Run a headless playback session and print the view whenever the date label changes.
    Replay {
        dir: PathBuf,
        /// Vessel key of the voyage to select, e.g. `beagle`.
        #[arg(long)]
        voyage: Option<String>,
        #[arg(long, default_value_t = 600)]
        frames: u64,
        /// JSON playback config.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        scale_range: Option<u32>,
        #[arg(long)]
        speed_all: Option<u32>,
        #[arg(long)]
        speed_selected: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Inspect { dir } => {
            let config = tools::resolve_config(None, ConfigOverrides::default())?;
            let dataset = tools::load_dataset(&dir, &config)?;
            for summary in tools::summarize(&dataset) {
                println!("{}", serde_json::to_string(&summary).context("encode summary")?);
            }
        }
        Command::Replay {
            dir,
            voyage,
            frames,
            config,
            scale_range,
            speed_all,
            speed_selected,
        } => {
            let overrides = ConfigOverrides {
                scale_range,
                speed_all,
                speed_selected,
            };
            let config = tools::resolve_config(config.as_deref(), overrides)?;
            let dataset = Arc::new(tools::load_dataset(&dir, &config)?);
            let options = ReplayOptions {
                vessel: voyage,
                frames,
            };
            let report = tools::replay(dataset, config, &options)?;
            for step in &report.steps {
                println!("{}", serde_json::to_string(step).context("encode view")?);
            }
            tracing::info!(events = report.events, "replay finished");
            for (name, value) in &report.metrics.counters {
                tracing::info!(metric = name, value, "counter");
            }
        }
    }
    Ok(())
}
