use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::{
    cli::{Cli, Command},
    config::{Config, ConfigError},
    venue::{Normalizer, VenueMap},
};

mod cli;
mod config;
mod diet;
mod impact;
mod library;
mod output;
mod venue;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Cli::parse();
    match args.command {
        Command::Graph => {
            let config = Config::load(&args.config)?;
            let normalizer = load_normalizer(&config)?;
            let summary = impact::run(&config, &normalizer)?;
            eprintln!(
                "{} {} venues, {} connections",
                "✓".green(),
                summary.venues,
                summary.links
            );
        }
        Command::Pubs { dry_run } => {
            let config = Config::load(&args.config)?;
            let normalizer = load_normalizer(&config)?;
            let summary = library::run(&config, &normalizer, dry_run)?;
            eprintln!(
                "{} {} publications ({} citations across {} venues) {} {} skipped",
                "✓".green(),
                summary.publications,
                summary.citations,
                summary.venues,
                "✗".red(),
                summary.skipped
            );
        }
        Command::Normalize { names } => {
            let normalizer = match Config::load(&args.config) {
                Ok(config) => load_normalizer(&config)?,
                Err(ConfigError::Missing(path)) => {
                    debug!(path = %path.display(), "no config, normalizing without overrides");
                    Normalizer::default()
                }
                Err(e) => return Err(e.into()),
            };
            for name in names {
                println!("{name} => {}", normalizer.normalize(&name));
            }
        }
    }
    Ok(())
}

/// Build the normalizer shared by both jobs from the configured override table.
fn load_normalizer(config: &Config) -> anyhow::Result<Normalizer> {
    let overrides = VenueMap::load(&config.venue_map_path())?;
    debug!(entries = overrides.len(), "venue overrides loaded");
    Ok(Normalizer::new(overrides))
}
