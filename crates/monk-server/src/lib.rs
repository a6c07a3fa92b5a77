//! HTTP layer for monk.
//!
//! Exposes an axum [`Router`] backed by any [`ResearchStore`] and
//! [`WaveformCodec`]. Every route except `/register` requires HTTP Basic
//! credentials of a registered account.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use monk_core::{
  file::OwnershipMode,
  intake::{ImportPolicy, Intake},
  payload::PayloadDir,
  store::ResearchStore,
};
use monk_waveform::{DEFAULT_ROW_CAP, WaveformCodec};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{export, files, projects, subjects, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MONK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Directory holding uploaded payloads and derived artefacts.
  pub upload_dir:       PathBuf,
  /// External converter run by [`monk_waveform::CommandCodec`].
  pub codec_program:    PathBuf,
  #[serde(default)]
  pub ownership:        OwnershipMode,
  #[serde(default)]
  pub waveform_only:    bool,
  /// Row cap for CSV export and charts when the request names none.
  #[serde(default = "default_rows")]
  pub default_rows:     usize,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_rows() -> usize { DEFAULT_ROW_CAP }

fn default_max_upload_bytes() -> usize { 64 * 1024 * 1024 }

impl ServerConfig {
  pub fn import_policy(&self) -> ImportPolicy {
    ImportPolicy {
      ownership:     self.ownership,
      waveform_only: self.waveform_only,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, C> {
  pub store:    Arc<S>,
  pub codec:    Arc<C>,
  pub payloads: Arc<PayloadDir>,
  pub config:   Arc<ServerConfig>,
}

impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      codec:    Arc::clone(&self.codec),
      payloads: Arc::clone(&self.payloads),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S, C> AppState<S, C>
where
  S: ResearchStore,
  C: WaveformCodec,
{
  pub fn intake(&self) -> Intake<'_, S, C> {
    Intake::new(&*self.store, &*self.codec, &*self.payloads, self.config.import_policy())
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the monk server.
pub fn router<S, C>(state: AppState<S, C>) -> Router
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let body_limit = state.config.max_upload_bytes;

  Router::new()
    // Accounts
    .route("/register", post(users::register::<S, C>))
    .route("/me", get(users::me::<S, C>))
    .route("/users", get(users::list::<S, C>))
    .route("/users/{id}", get(users::get_one::<S, C>))
    // Files
    .route("/files", get(files::list::<S, C>).post(files::upload::<S, C>))
    .route("/files/batch", post(files::upload_batch::<S, C>))
    .route("/files/{id}", get(files::detail::<S, C>))
    .route("/files/{id}/claim", post(files::claim::<S, C>))
    // Downloads and charts
    .route("/files/{id}/raw", get(export::raw::<S, C>))
    .route("/files/{id}/header", get(export::header::<S, C>))
    .route("/files/{id}/csv", get(export::csv::<S, C>))
    .route("/files/{id}/chart", get(export::chart::<S, C>))
    // Subjects
    .route("/subjects", get(subjects::list::<S, C>).post(subjects::create::<S, C>))
    .route("/subjects/{id}", get(subjects::get_one::<S, C>))
    .route(
      "/subjects/{id}/vitals",
      get(subjects::list_vitals::<S, C>).post(subjects::add_vitals::<S, C>),
    )
    // Projects
    .route("/projects", get(projects::list::<S, C>).post(projects::create::<S, C>))
    .route("/projects/{id}", get(projects::get_one::<S, C>).put(projects::edit::<S, C>))
    .route("/projects/{id}/leave", post(projects::leave::<S, C>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
