//! Handlers for `/subjects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects` | All subjects |
//! | `POST` | `/subjects` | Manual creation. 409 on a taken identifier |
//! | `GET`  | `/subjects/{id}` | Subject and the projects containing it |
//! | `GET`  | `/subjects/{id}/vitals` | Newest first |
//! | `POST` | `/subjects/{id}/vitals` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use monk_core::{
  project::Project,
  store::ResearchStore,
  subject::{self, NewSubject, NewVitals, Subject, Vitals},
};
use monk_waveform::WaveformCodec;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError};

async fn load<S: ResearchStore>(store: &S, id: Uuid) -> Result<Subject, ApiError> {
  Ok(
    store
      .get_subject(id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(monk_core::Error::SubjectNotFound(id))?,
  )
}

/// `GET /subjects`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let subjects = state
    .store
    .list_subjects()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(subjects))
}

/// `POST /subjects`
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
  Json(body): Json<NewSubject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let subject = subject::add_manual(&*state.store, body).await?;
  info!(id = %subject.id, subject_id = %subject.subject_id, "subject added");
  Ok((StatusCode::CREATED, Json(subject)))
}

#[derive(Debug, Serialize)]
pub struct SubjectDetail {
  pub subject:  Subject,
  pub projects: Vec<Project>,
}

/// `GET /subjects/{id}`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<SubjectDetail>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let subject = load(&*state.store, id).await?;
  let projects = state
    .store
    .projects_containing_subject(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(SubjectDetail { subject, projects }))
}

/// `GET /subjects/{id}/vitals`
pub async fn list_vitals<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Vitals>>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  load(&*state.store, id).await?;
  let vitals = state
    .store
    .list_vitals(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(vitals))
}

/// `POST /subjects/{id}/vitals`
pub async fn add_vitals<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
  Path(id): Path<Uuid>,
  Json(mut body): Json<NewVitals>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  body.subject = id;
  let vitals = subject::record_vitals(&*state.store, body).await?;
  Ok((StatusCode::CREATED, Json(vitals)))
}
