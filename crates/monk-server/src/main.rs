//! monk server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layers `MONK_*`
//! environment variables over it, opens the SQLite store and the upload
//! directory, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use monk_core::payload::PayloadDir;
use monk_server::{AppState, ServerConfig};
use monk_store_sqlite::SqliteStore;
use monk_waveform::CommandCodec;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "monk research record server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MONK"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.upload_dir = expand_tilde(&server_cfg.upload_dir);
  server_cfg.codec_program = expand_tilde(&server_cfg.codec_program);

  // Open SQLite store and upload directory.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  let payloads = PayloadDir::open(&server_cfg.upload_dir)
    .await
    .with_context(|| format!("failed to prepare upload dir {:?}", server_cfg.upload_dir))?;

  tracing::info!(
    codec = %server_cfg.codec_program.display(),
    ownership = ?server_cfg.ownership,
    waveform_only = server_cfg.waveform_only,
    "import policy"
  );

  // Build application state.
  let state = AppState {
    store:    Arc::new(store),
    codec:    Arc::new(CommandCodec::new(&server_cfg.codec_program)),
    payloads: Arc::new(payloads),
    config:   Arc::new(server_cfg.clone()),
  };

  let app = monk_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
