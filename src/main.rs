//! CLI entry point for meir-downloader.

use anyhow::{Context, Result};
use clap::Parser;
use meir_downloader_core::{FacetKind, LessonDownloader, SiteClient};
use tracing::{debug, info};

mod app_config;
mod cli;
mod commands;

use app_config::{AppConfig, load_file_config};
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let file_config = load_file_config(cli.config.as_deref())?;
    let config = AppConfig::resolve(file_config.as_ref(), &cli.overrides());
    debug!(?config, "configuration resolved");

    let site = SiteClient::with_timeouts(&config.base_url, config.query_timeouts)
        .with_context(|| format!("cannot use site URL '{}'", config.base_url))?;
    let downloader = LessonDownloader::with_timeouts(
        &config.base_url,
        config.download_dir.clone(),
        config.download_timeouts,
    )
    .with_context(|| format!("cannot use site URL '{}'", config.base_url))?;

    match &cli.command {
        Command::Serve(args) => {
            info!("meir-downloader starting");
            commands::run_serve_command(args, &config, site, downloader).await
        }
        Command::Rabbis(args) => commands::run_facet_command(&site, FacetKind::Rabbis, args).await,
        Command::Series(args) => commands::run_facet_command(&site, FacetKind::Series, args).await,
        Command::Subjects(args) => {
            commands::run_facet_command(&site, FacetKind::Subjects, args).await
        }
        Command::Topics(args) => commands::run_facet_command(&site, FacetKind::Topics, args).await,
        Command::Occasions(args) => {
            commands::run_facet_command(&site, FacetKind::Occasions, args).await
        }
        Command::Lessons(args) => commands::run_lessons_command(&site, args).await,
        Command::Download(args) => {
            commands::run_download_command(&site, downloader, &config, args, cli.quiet).await
        }
    }
}
