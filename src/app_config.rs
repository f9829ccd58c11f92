//! Application configuration: defaults, optional config file, CLI overrides.
//!
//! Precedence is CLI flag > config file > built-in default.

use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use meir_downloader_core::{DEFAULT_BASE_URL, HttpTimeouts};

const APP_DIR_NAME: &str = "meir-downloader";

/// Default port of the local API.
pub const DEFAULT_PORT: u16 = 5000;

/// Default cap on simultaneous downloads.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 4;

/// Values read from `config.toml`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Site origin.
    pub base_url: Option<String>,
    /// Root directory for downloaded lessons.
    pub download_dir: Option<PathBuf>,
    /// Port for `serve`.
    pub port: Option<u16>,
    /// Download concurrency cap (1..=16).
    pub max_concurrent_downloads: Option<usize>,
    pub query_connect_timeout_secs: Option<u64>,
    pub query_read_timeout_secs: Option<u64>,
    pub download_connect_timeout_secs: Option<u64>,
    pub download_read_timeout_secs: Option<u64>,
}

const PORT_RANGE: RangeInclusive<u64> = 1..=65535;
const MAX_CONCURRENT_RANGE: RangeInclusive<u64> = 1..=16;
const TIMEOUT_SECS_RANGE: RangeInclusive<u64> = 1..=3600;

/// Effective settings after merging all sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub base_url: String,
    pub download_dir: PathBuf,
    pub port: u16,
    pub max_concurrent_downloads: usize,
    pub query_timeouts: HttpTimeouts,
    pub download_timeouts: HttpTimeouts,
}

/// Values given on the command line that override the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub max_concurrent_downloads: Option<usize>,
}

impl AppConfig {
    /// Merges CLI overrides, file values and defaults.
    #[must_use]
    pub fn resolve(file: Option<&FileConfig>, cli: &CliOverrides) -> Self {
        let file = file.cloned().unwrap_or_default();
        Self {
            base_url: cli
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            download_dir: cli
                .download_dir
                .clone()
                .or(file.download_dir)
                .unwrap_or_else(default_download_dir),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            max_concurrent_downloads: cli
                .max_concurrent_downloads
                .or(file.max_concurrent_downloads)
                .unwrap_or(DEFAULT_MAX_CONCURRENT_DOWNLOADS),
            query_timeouts: HttpTimeouts::new(
                file.query_connect_timeout_secs
                    .unwrap_or(HttpTimeouts::QUERY.connect_secs),
                file.query_read_timeout_secs
                    .unwrap_or(HttpTimeouts::QUERY.read_secs),
            ),
            download_timeouts: HttpTimeouts::new(
                file.download_connect_timeout_secs
                    .unwrap_or(HttpTimeouts::DOWNLOAD.connect_secs),
                file.download_read_timeout_secs
                    .unwrap_or(HttpTimeouts::DOWNLOAD.read_secs),
            ),
        }
    }
}

/// `$HOME/meir-downloader`, or `./meir-downloader` without a home directory.
#[must_use]
pub fn default_download_dir() -> PathBuf {
    env_var_non_empty_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(APP_DIR_NAME)
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/meir-downloader/config.toml`
/// 2. `$HOME/.config/meir-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(APP_DIR_NAME)
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist; the default path is optional.
pub fn load_file_config(explicit_path: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit_path {
        return read_file_config(path).map(Some);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "base_url" => {
                let parsed = parse_base_url(value).with_context(invalid)?;
                cfg.base_url = Some(parsed);
            }
            "download_dir" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.download_dir = Some(PathBuf::from(parsed));
            }
            "port" => {
                let parsed = parse_integer_in(value, &PORT_RANGE).with_context(invalid)?;
                let port = u16::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("port out of range for u16"))
                    .with_context(invalid)?;
                cfg.port = Some(port);
            }
            "max_concurrent_downloads" => {
                let parsed = parse_integer_in(value, &MAX_CONCURRENT_RANGE).with_context(invalid)?;
                let max = usize::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("value out of range for usize"))
                    .with_context(invalid)?;
                cfg.max_concurrent_downloads = Some(max);
            }
            "query_connect_timeout_secs" => {
                cfg.query_connect_timeout_secs =
                    Some(parse_integer_in(value, &TIMEOUT_SECS_RANGE).with_context(invalid)?);
            }
            "query_read_timeout_secs" => {
                cfg.query_read_timeout_secs =
                    Some(parse_integer_in(value, &TIMEOUT_SECS_RANGE).with_context(invalid)?);
            }
            "download_connect_timeout_secs" => {
                cfg.download_connect_timeout_secs =
                    Some(parse_integer_in(value, &TIMEOUT_SECS_RANGE).with_context(invalid)?);
            }
            "download_read_timeout_secs" => {
                cfg.download_read_timeout_secs =
                    Some(parse_integer_in(value, &TIMEOUT_SECS_RANGE).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_base_url(raw_value: &str) -> Result<String> {
    let parsed = parse_string_literal(raw_value)?;
    if !(parsed.starts_with("http://") || parsed.starts_with("https://")) {
        bail!("Expected an http(s) URL, got '{parsed}'");
    }
    Ok(parsed.trim_end_matches('/').to_string())
}

fn parse_integer_in(raw_value: &str, range: &RangeInclusive<u64>) -> Result<u64> {
    let value = parse_integer_u64(raw_value)?;
    if !range.contains(&value) {
        bail!(
            "{value} is out of range. Expected range: {}..={}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
