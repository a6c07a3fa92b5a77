//! HTTP Basic authentication against stored accounts.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use monk_core::{account::Account, account::normalize_username, store::ResearchStore};
use monk_waveform::WaveformCodec;
use rand_core::OsRng;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The authenticated account. Present in a handler means the request
/// carried valid credentials.
#[derive(Debug, Clone)]
pub struct Identity(pub Account);

impl Identity {
  pub fn account_id(&self) -> Uuid { self.0.account_id }
}

/// Argon2 PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Upstream(format!("argon2 error: {e}")))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Decode `Authorization: Basic ...` into a normalised username and the
/// password.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((normalize_username(username), password.to_owned()))
}

impl<S, C> FromRequestParts<AppState<S, C>> for Identity
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, C>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) = basic_credentials(&parts.headers)?;
    let account = state
      .store
      .get_account_by_username(&username)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&password, &account.password_hash) {
      return Err(ApiError::Unauthorized);
    }
    Ok(Identity(account))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("secret").unwrap();
    assert!(verify_password("secret", &hash));
    assert!(!verify_password("wrong", &hash));
    assert!(!verify_password("secret", "not-a-phc-string"));
  }

  #[test]
  fn credentials_are_decoded_and_username_normalised() {
    let value = format!("Basic {}", B64.encode("Alice:pa:ss"));
    let (user, pass) = basic_credentials(&headers(&value)).unwrap();
    assert_eq!(user, "alice");
    assert_eq!(pass, "pa:ss");
  }

  #[test]
  fn malformed_headers_are_unauthorized() {
    assert!(matches!(basic_credentials(&HeaderMap::new()), Err(ApiError::Unauthorized)));
    assert!(matches!(
      basic_credentials(&headers("Basic !!!not-base64!!!")),
      Err(ApiError::Unauthorized)
    ));
    assert!(matches!(
      basic_credentials(&headers("Bearer abc")),
      Err(ApiError::Unauthorized)
    ));
  }
}
