//! Handlers for `/projects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/projects` | Projects the caller is a member of |
//! | `POST` | `/projects` | The caller is always added as a member |
//! | `GET`  | `/projects/{id}` | |
//! | `PUT`  | `/projects/{id}` | Members only. Empty lists leave a set unchanged |
//! | `POST` | `/projects/{id}/leave` | 400 if not a member |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use monk_core::{
  project::{self, NewProject, Project, ProjectEdit},
  store::ResearchStore,
};
use monk_waveform::WaveformCodec;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError, handlers::require_profile};

/// `GET /projects`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
) -> Result<Json<Vec<Project>>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profile = require_profile(&*state.store, identity.account_id()).await?;
  let projects = state
    .store
    .list_projects_for(profile.profile_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(projects))
}

/// `POST /projects`
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Json(mut body): Json<NewProject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profile = require_profile(&*state.store, identity.account_id()).await?;
  if !body.members.contains(&profile.profile_id) {
    body.members.push(profile.profile_id);
  }

  let project = state
    .store
    .add_project(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  info!(project_id = %project.project_id, "project created");
  Ok((StatusCode::CREATED, Json(project)))
}

/// `GET /projects/{id}`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  Ok(Json(project::load(&*state.store, id).await?))
}

/// `PUT /projects/{id}`
pub async fn edit<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
  Json(body): Json<ProjectEdit>,
) -> Result<Json<Project>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profile = require_profile(&*state.store, identity.account_id()).await?;
  if !project::load(&*state.store, id).await?.has_member(profile.profile_id) {
    return Err(ApiError::Forbidden("You are not a member of this project.".into()));
  }
  Ok(Json(project::edit(&*state.store, id, body).await?))
}

/// `POST /projects/{id}/leave`
pub async fn leave<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profile = require_profile(&*state.store, identity.account_id()).await?;
  project::leave(&*state.store, id, profile.profile_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
