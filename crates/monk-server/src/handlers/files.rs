//! Handlers for `/files` endpoints: import, batch import, claims, listing,
//! and the access-checked detail view.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/files` | Files the caller owns. `?derived_only=true` |
//! | `POST` | `/files` | Raw body. `?filename=<name>&title=<title>` |
//! | `POST` | `/files/batch` | `{"files":[{"filename","title","content"}]}`, base64 content |
//! | `GET`  | `/files/{id}` | 403 unless owner or project member |
//! | `POST` | `/files/{id}/claim` | 409 if already owned |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use monk_core::{
  access::{Grant, authorize_file},
  file::File,
  intake::{BatchItem, Upload},
  store::ResearchStore,
  subject::Subject,
};
use monk_waveform::WaveformCodec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError, handlers::require_profile};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub derived_only: bool,
}

/// `GET /files[?derived_only=true]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<File>>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profile = require_profile(&*state.store, identity.account_id()).await?;
  let files = state
    .store
    .list_owned_files(profile.profile_id, params.derived_only)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(files))
}

// ─── Import ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  pub filename: String,
  #[serde(default)]
  pub title:    Option<String>,
}

/// `POST /files?filename=<name>[&title=<title>]`, payload as the raw body.
pub async fn upload<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Query(params): Query<UploadParams>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let report = state
    .intake()
    .import_file(identity.account_id(), Upload {
      filename: params.filename,
      title:    params.title,
      content:  body,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Debug, Deserialize)]
pub struct BatchFile {
  pub filename: String,
  #[serde(default)]
  pub title:    Option<String>,
  /// Standard base64.
  pub content:  String,
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
  pub files: Vec<BatchFile>,
}

/// `POST /files/batch`. Always 200 once the caller is registered; each
/// entry carries its own outcome.
pub async fn upload_batch<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Json(body): Json<BatchBody>,
) -> Result<Json<Vec<BatchItem>>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let uploads = body
    .files
    .into_iter()
    .map(|f| {
      let content = B64
        .decode(f.content.trim())
        .map_err(|e| ApiError::BadRequest(format!("{}: invalid base64 content: {e}", f.filename)))?;
      Ok(Upload { filename: f.filename, title: f.title, content: Bytes::from(content) })
    })
    .collect::<Result<Vec<_>, ApiError>>()?;

  let items = state
    .intake()
    .import_batch(identity.account_id(), uploads)
    .await?;
  Ok(Json(items))
}

// ─── Claim ────────────────────────────────────────────────────────────────────

/// `POST /files/{id}/claim`
pub async fn claim<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let claim = state.intake().claim_file(identity.account_id(), id).await?;
  Ok((StatusCode::CREATED, Json(claim)))
}

// ─── Detail ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FileDetail {
  pub file:     File,
  pub access:   Grant,
  pub subjects: Vec<Subject>,
  /// Rendered header for waveforms (or the codec's failure text), the text
  /// of `.txt` files, nothing otherwise.
  pub content:  Option<String>,
}

/// `GET /files/{id}`
pub async fn detail<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<FileDetail>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let (file, access) = authorize_file(&*state.store, identity.account_id(), id).await?;
  let subjects = state
    .store
    .subjects_for_file(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let path = state.payloads.resolve(&file);
  let content = if file.is_waveform() {
    Some(match state.codec.read_header(&path).await {
      Ok(header) => header.to_string(),
      Err(e) => e.to_string(),
    })
  } else if file.is_text() {
    let bytes = tokio::fs::read(&path).await.map_err(ApiError::upstream)?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
  } else {
    None
  };

  Ok(Json(FileDetail { file, access, subjects, content }))
}
