use album_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use album_catalog_server::metadata::{MetadataProvider, MusicBrainzClient};
use album_catalog_server::{run_server, RequestsLoggingLevel, SqliteCatalogStore, StatusCodeScheme};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite album catalog database file. Created if missing.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The address to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Status codes reported for catalog failures.
    #[clap(long, default_value = "legacy")]
    pub status_codes: StatusCodeScheme,

    /// Base URL of the MusicBrainz web service.
    #[clap(long, default_value = "https://musicbrainz.org/ws/2")]
    pub musicbrainz_url: String,

    /// Timeout in seconds for MusicBrainz requests.
    #[clap(long, default_value_t = 10)]
    pub musicbrainz_timeout_sec: u64,

    /// User-Agent sent to MusicBrainz, which asks for a way to contact the operator.
    #[clap(long, default_value = "AlbumCatalog/1.0 ( https://musicbrainz.org/doc/MusicBrainz_API )")]
    pub user_agent: String,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            host: self.host.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            status_codes: self.status_codes,
            musicbrainz_url: self.musicbrainz_url.clone(),
            musicbrainz_timeout_sec: self.musicbrainz_timeout_sec,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite catalog database at {:?}...", config.db_path);
    let catalog_store = Arc::new(SqliteCatalogStore::new(&config.db_path)?);

    info!(
        "Barcode lookups go to {} (timeout {}s)",
        config.musicbrainz.base_url, config.musicbrainz.timeout_sec
    );
    let metadata_provider = Arc::new(MusicBrainzClient::new(&config.musicbrainz)?);

    info!(
        "Ready to serve at {}:{} with {} status codes!",
        config.host, config.port, config.status_codes
    );
    let result = run_server(
        config.server_config(),
        catalog_store,
        metadata_provider.clone(),
    )
    .await;

    metadata_provider.shutdown();
    info!("Server stopped");
    result
}
