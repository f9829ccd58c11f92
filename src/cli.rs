//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use meir_downloader_core::{FacetKind, Filters};

use crate::app_config::CliOverrides;

/// Browse and download lecture audio from meirtv.com.
///
/// Lists rabbis, series, subjects, topics, occasions and lessons from the
/// site's catalog, downloads lessons into <dir>/<rabbi>/<series>/, or serves
/// a local JSON API for a browser front end.
#[derive(Parser, Debug)]
#[command(name = "meir-downloader")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/meir-downloader/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Site origin (default: https://meirtv.com)
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Root directory for downloaded lessons (default: ~/meir-downloader)
    #[arg(long, value_name = "DIR", global = true)]
    pub download_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the local JSON API
    Serve(ServeArgs),
    /// List rabbis
    Rabbis(ListArgs),
    /// List series, optionally for one rabbi
    Series(ListArgs),
    /// List subjects
    Subjects(ListArgs),
    /// List topics
    Topics(ListArgs),
    /// List occasions
    Occasions(ListArgs),
    /// List lessons on one grid page
    Lessons(LessonsArgs),
    /// Download lessons from one grid page
    Download(DownloadArgs),
}

/// Facet filters shared by listing and download commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Rabbi id
    #[arg(long, value_name = "ID")]
    pub rabbi: Option<String>,
    /// Series id
    #[arg(long, value_name = "ID")]
    pub series: Option<String>,
    /// Subject id
    #[arg(long, value_name = "ID")]
    pub subject: Option<String>,
    /// Topic id
    #[arg(long, value_name = "ID")]
    pub topic: Option<String>,
    /// Occasion id
    #[arg(long, value_name = "ID")]
    pub occasion: Option<String>,
}

impl FilterArgs {
    /// Converts the flags into query filters.
    #[must_use]
    pub fn to_filters(&self) -> Filters {
        let mut filters = Filters::new();
        let values = [
            (FacetKind::Rabbis, &self.rabbi),
            (FacetKind::Series, &self.series),
            (FacetKind::Subjects, &self.subject),
            (FacetKind::Topics, &self.topic),
            (FacetKind::Occasions, &self.occasion),
        ];
        for (kind, value) in values {
            if let Some(value) = value {
                filters = filters.with(kind, value.clone());
            }
        }
        filters
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LessonsArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Grid page number
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Keep only lessons whose name contains this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Grid page number
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Keep only lessons whose name contains this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Lesson id to download (page id or grid post id; repeatable)
    #[arg(long = "lesson", value_name = "ID")]
    pub lessons: Vec<String>,

    /// Download every lesson on the page
    #[arg(long, conflicts_with = "lessons")]
    pub all: bool,

    /// Maximum concurrent downloads (1-16)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub concurrency: Option<u8>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind (default: 5000)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Collects the flags that override config file values.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        let (port, max_concurrent_downloads) = match &self.command {
            Command::Serve(args) => (args.port, None),
            Command::Download(args) => (None, args.concurrency.map(usize::from)),
            _ => (None, None),
        };
        CliOverrides {
            base_url: self.base_url.clone(),
            download_dir: self.download_dir.clone(),
            port,
            max_concurrent_downloads,
        }
    }
}
