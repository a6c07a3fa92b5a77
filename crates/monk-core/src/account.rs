//! Accounts and user profiles.
//!
//! An [`Account`] is the authentication identity; a [`UserProfile`] is the
//! researcher record attached to it. Workflows always receive the acting
//! account id as an argument and look the profile up explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id:    Uuid,
  /// Always lower-case; unique across accounts.
  pub username:      String,
  /// PHC string produced by argon2.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// One-to-one with an [`Account`]; created at registration and never
/// re-linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub profile_id:     Uuid,
  pub account_id:     Uuid,
  pub name:           String,
  /// Contact number.
  pub mobile:         String,
  pub specialization: Option<String>,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::ResearchStore::add_profile`].
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub account_id:     Uuid,
  pub name:           String,
  pub mobile:         String,
  pub specialization: Option<String>,
}

/// Input to [`crate::store::ResearchStore::add_registration`].
#[derive(Debug, Clone)]
pub struct NewRegistration {
  /// Already normalised.
  pub username:       String,
  pub password_hash:  String,
  pub name:           String,
  pub mobile:         String,
  pub specialization: Option<String>,
}

pub fn normalize_username(username: &str) -> String { username.trim().to_lowercase() }

/// Field checks shared by every registration path.
pub fn validate_registration(
  username: &str,
  password: &str,
  name: &str,
  mobile: &str,
) -> Result<()> {
  if normalize_username(username).is_empty() {
    return Err(Error::Validation("a username is required".into()));
  }
  if username.contains(':') {
    return Err(Error::Validation("usernames may not contain ':'".into()));
  }
  if password.is_empty() {
    return Err(Error::Validation("a password is required".into()));
  }
  if name.trim().is_empty() {
    return Err(Error::Validation("a full name is required".into()));
  }
  let mobile = mobile.trim();
  if mobile.is_empty()
    || !mobile
      .chars()
      .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
  {
    return Err(Error::Validation("a contact number is required".into()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn usernames_are_trimmed_and_lowercased() {
    assert_eq!(normalize_username("  Alice "), "alice");
  }

  #[test]
  fn registration_requires_every_field() {
    assert!(validate_registration("alice", "pw", "Alice", "+47 123").is_ok());
    assert!(validate_registration(" ", "pw", "Alice", "123").is_err());
    assert!(validate_registration("alice", "", "Alice", "123").is_err());
    assert!(validate_registration("alice", "pw", "", "123").is_err());
    assert!(validate_registration("alice", "pw", "Alice", "call me").is_err());
    assert!(validate_registration("a:b", "pw", "Alice", "123").is_err());
  }
}
