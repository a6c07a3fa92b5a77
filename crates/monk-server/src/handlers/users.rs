//! Handlers for registration and `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | Public. 409 if the username is taken |
//! | `GET`  | `/me` | Account and profile of the caller |
//! | `GET`  | `/users` | All profiles |
//! | `GET`  | `/users/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use monk_core::{
  account::{Account, NewRegistration, UserProfile, normalize_username, validate_registration},
  store::{Inserted, ResearchStore},
};
use monk_waveform::WaveformCodec;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Identity, hash_password},
  error::ApiError,
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username:       String,
  pub password:       String,
  pub name:           String,
  pub mobile:         String,
  #[serde(default)]
  pub specialization: Option<String>,
}

/// `POST /register`
pub async fn register<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResearchStore,
  C: WaveformCodec,
{
  validate_registration(&body.username, &body.password, &body.name, &body.mobile)?;

  let username = normalize_username(&body.username);
  let registration = NewRegistration {
    username:       username.clone(),
    password_hash:  hash_password(&body.password)?,
    name:           body.name.trim().to_owned(),
    mobile:         body.mobile.trim().to_owned(),
    specialization: body
      .specialization
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty()),
  };

  let profile = match state
    .store
    .add_registration(registration)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
  {
    Inserted::Created((_, profile)) => profile,
    Inserted::Duplicate => {
      return Err(ApiError::Conflict(format!("username {username:?} is already taken")));
    }
  };

  info!(%username, profile_id = %profile.profile_id, "registered");
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Me ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Me {
  pub account: Account,
  pub profile: Option<UserProfile>,
}

/// `GET /me`
pub async fn me<S, C>(
  State(state): State<AppState<S, C>>,
  Identity(account): Identity,
) -> Result<Json<Me>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profile = state
    .store
    .profile_for_account(account.account_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Me { account, profile }))
}

// ─── List / get ───────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
) -> Result<Json<Vec<UserProfile>>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profiles = state
    .store
    .list_profiles()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(profiles))
}

/// `GET /users/{id}`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  _: Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let profile = state
    .store
    .get_profile(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(monk_core::Error::ProfileNotFound(id))?;
  Ok(Json(profile))
}
