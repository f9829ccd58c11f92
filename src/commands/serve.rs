//! Serve command handler: binds the local JSON API.

use anyhow::{Context, Result};
use meir_downloader_core::server::serve;
use meir_downloader_core::{ApiState, LessonDownloader, SiteClient};
use tokio::net::TcpListener;
use tracing::info;

use crate::app_config::AppConfig;
use crate::cli::ServeArgs;

pub async fn run_serve_command(
    args: &ServeArgs,
    config: &AppConfig,
    site: SiteClient,
    downloader: LessonDownloader,
) -> Result<()> {
    tokio::fs::create_dir_all(&config.download_dir)
        .await
        .with_context(|| {
            format!(
                "cannot create download directory {}",
                config.download_dir.display()
            )
        })?;

    let address = format!("{}:{}", args.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("cannot bind {address}"))?;
    info!(
        download_dir = %config.download_dir.display(),
        base_url = %config.base_url,
        "serving local API"
    );

    serve(listener, ApiState::new(site, downloader))
        .await
        .context("API server stopped")
}
