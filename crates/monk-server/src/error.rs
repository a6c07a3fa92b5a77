//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// The waveform codec or the payload directory failed; the text is shown
  /// to the caller.
  #[error("upstream failure: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Upstream(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  pub fn upstream(e: impl std::fmt::Display) -> Self { ApiError::Upstream(e.to_string()) }
}

impl From<monk_core::Error> for ApiError {
  fn from(e: monk_core::Error) -> Self {
    use monk_core::Error as E;
    match e {
      E::Validation(m) => ApiError::BadRequest(m),
      E::NotRegistered => {
        ApiError::Forbidden("You are not registered as a regular user.".into())
      }
      E::AlreadyImported(_) | E::DuplicateSubject(_) => ApiError::Conflict(e.to_string()),
      E::Forbidden(_) => {
        ApiError::Forbidden("You do not have permission to view this file.".into())
      }
      E::FileNotFound(_) | E::SubjectNotFound(_) | E::ProjectNotFound(_) | E::ProfileNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      E::NotAMember(_) => ApiError::BadRequest("You are not a member of this project.".into()),
      E::Codec(e) => ApiError::Upstream(e.to_string()),
      E::Io(e) => ApiError::Upstream(e.to_string()),
      E::Store(e) => ApiError::Store(e),
    }
  }
}

impl From<monk_waveform::Error> for ApiError {
  fn from(e: monk_waveform::Error) -> Self {
    if e.is_parameter_error() {
      ApiError::BadRequest(e.to_string())
    } else {
      ApiError::Upstream(e.to_string())
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Unauthorized => "Unauthorized".to_owned(),
      ApiError::BadRequest(m)
      | ApiError::Forbidden(m)
      | ApiError::NotFound(m)
      | ApiError::Conflict(m)
      | ApiError::Upstream(m) => m.clone(),
      ApiError::Store(e) => e.to_string(),
    };
    if status.is_server_error() {
      tracing::error!(%status, error = %message, "request failed");
    }

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"monk\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  #[test]
  fn domain_errors_map_to_distinct_statuses() {
    let id = Uuid::new_v4();
    let cases = [
      (monk_core::Error::Validation("x".into()), StatusCode::BAD_REQUEST),
      (monk_core::Error::NotRegistered, StatusCode::FORBIDDEN),
      (monk_core::Error::Forbidden(id), StatusCode::FORBIDDEN),
      (monk_core::Error::FileNotFound(id), StatusCode::NOT_FOUND),
      (monk_core::Error::AlreadyImported(id), StatusCode::CONFLICT),
      (monk_core::Error::NotAMember(id), StatusCode::BAD_REQUEST),
    ];
    for (e, status) in cases {
      assert_eq!(ApiError::from(e).status(), status);
    }
  }

  #[test]
  fn selection_errors_are_client_errors() {
    let e = ApiError::from(monk_waveform::Error::UnknownChannel("V9".into()));
    assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    let e = ApiError::from(monk_waveform::Error::EmptyTable);
    assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
