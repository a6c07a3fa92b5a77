//! Subjects (patients or recordings) and their vitals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::Inserted, store::ResearchStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:         Uuid,
  /// Globally unique identifier string. Derived subjects use
  /// `"<measurement time> <patient id>"`.
  pub subject_id: String,
  pub name:       String,
  pub gender:     String,
  pub birth_date: Option<NaiveDate>,
  /// The file this subject was derived from, if any.
  pub file_id:    Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
  pub subject_id: String,
  #[serde(default = "unknown")]
  pub name:       String,
  #[serde(default = "unknown")]
  pub gender:     String,
  #[serde(default)]
  pub birth_date: Option<NaiveDate>,
  #[serde(default)]
  pub file_id:    Option<Uuid>,
}

fn unknown() -> String { monk_waveform::header::UNKNOWN.to_owned() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
  pub vitals_id:        Uuid,
  pub subject:          Uuid,
  pub description:      Option<String>,
  pub heart_rate:       Option<i64>,
  pub oxygen:           Option<i64>,
  pub body_temperature: Option<f64>,
  pub respiration_rate: Option<i64>,
  /// Free text such as `"120/80"`.
  pub blood_pressure:   Option<String>,
  pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVitals {
  #[serde(skip)]
  pub subject:          Uuid,
  #[serde(default)]
  pub description:      Option<String>,
  #[serde(default)]
  pub heart_rate:       Option<i64>,
  #[serde(default)]
  pub oxygen:           Option<i64>,
  #[serde(default)]
  pub body_temperature: Option<f64>,
  #[serde(default)]
  pub respiration_rate: Option<i64>,
  #[serde(default)]
  pub blood_pressure:   Option<String>,
}

// ─── Workflows ───────────────────────────────────────────────────────────────

/// Create a subject by hand. Unlike derivation, a collision on the
/// identifier is reported as [`Error::DuplicateSubject`].
pub async fn add_manual<S: ResearchStore>(store: &S, mut input: NewSubject) -> Result<Subject> {
  input.subject_id = input.subject_id.trim().to_owned();
  if input.subject_id.is_empty() {
    return Err(Error::Validation("a subject identifier is required".into()));
  }
  if input.name.trim().is_empty() {
    input.name = unknown();
  }
  if input.gender.trim().is_empty() {
    input.gender = unknown();
  }
  if let Some(file_id) = input.file_id {
    store
      .get_file(file_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .ok_or(Error::FileNotFound(file_id))?;
  }

  let subject_id = input.subject_id.clone();
  match store
    .add_subject(input)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  {
    Inserted::Created(subject) => Ok(subject),
    Inserted::Duplicate => Err(Error::DuplicateSubject(subject_id)),
  }
}

pub async fn record_vitals<S: ResearchStore>(store: &S, input: NewVitals) -> Result<Vitals> {
  store
    .get_subject(input.subject)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::SubjectNotFound(input.subject))?;
  if input.heart_rate.is_some_and(|v| v < 0)
    || input.oxygen.is_some_and(|v| !(0..=100).contains(&v))
    || input.respiration_rate.is_some_and(|v| v < 0)
  {
    return Err(Error::Validation("vital signs out of range".into()));
  }
  store
    .record_vitals(input)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}
