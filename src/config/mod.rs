mod file_config;

pub use file_config::{FileConfig, MusicBrainzFileConfig};

use crate::metadata::MusicBrainzConfig;
use crate::server::{RequestsLoggingLevel, ServerConfig, StatusCodeScheme};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub status_codes: StatusCodeScheme,
    pub musicbrainz_url: String,
    pub musicbrainz_timeout_sec: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub status_codes: StatusCodeScheme,
    pub musicbrainz: MusicBrainzConfig,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow!("db_path must be specified on the command line or in config file"))?;
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let status_codes = match file.status_codes {
            Some(s) => parse_status_codes(&s)
                .ok_or_else(|| anyhow!("Unknown status code scheme: {}", s))?,
            None => cli.status_codes,
        };

        let mb_file = file.musicbrainz.unwrap_or_default();
        let musicbrainz = MusicBrainzConfig {
            base_url: mb_file
                .base_url
                .unwrap_or_else(|| cli.musicbrainz_url.clone()),
            user_agent: mb_file
                .user_agent
                .unwrap_or_else(|| cli.user_agent.clone()),
            timeout_sec: mb_file.timeout_sec.unwrap_or(cli.musicbrainz_timeout_sec),
        };
        if musicbrainz.timeout_sec == 0 {
            bail!("MusicBrainz timeout must be at least one second");
        }

        Ok(Self {
            db_path,
            host,
            port,
            logging_level,
            status_codes,
            musicbrainz,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            host: self.host.clone(),
            port: self.port,
            status_codes: self.status_codes,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

fn parse_status_codes(s: &str) -> Option<StatusCodeScheme> {
    StatusCodeScheme::from_str(s, true).ok()
}
