//! Subject derivation from a waveform header.
//!
//! [`derive_subject`] never fails: codec and storage errors are folded into
//! a [`Derivation`] so that an import is never undone by its follow-up step.

use std::path::Path;

use chrono::NaiveDate;
use monk_waveform::{WaveformCodec, WaveformHeader};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  file::File,
  notice::Notice,
  store::{Inserted, ResearchStore},
  subject::{NewSubject, Subject},
};

/// Outcome of one derivation attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Derivation {
  Created { subject: Subject },
  /// A subject with the same identifier already exists; nothing written.
  Duplicate { subject_id: String },
  /// The file is not a waveform; the codec was not called.
  Skipped,
  /// The header lacks what a subject identifier needs.
  ValidationFailed { reason: String },
  /// The codec or the store failed.
  UpstreamFailure { reason: String },
}

impl Derivation {
  pub fn is_created(&self) -> bool { matches!(self, Self::Created { .. }) }

  /// The status message shown for this outcome on a file titled `title`.
  pub fn notice(&self, title: &str) -> Notice {
    match self {
      Self::Created { .. } => Notice::success(format!("Subject created for file {title}")),
      Self::Duplicate { .. } => Notice::info(format!(
        "This subject already exists. No duplicate created for file {title}."
      )),
      Self::Skipped => Notice::info(format!(
        "File {title} imported but no subject created due to file type."
      )),
      Self::ValidationFailed { reason } | Self::UpstreamFailure { reason } => Notice::error(
        format!("Failed to process file {title} for subject creation: {reason}"),
      ),
    }
  }
}

/// `"<measurement time> <patient id>"`. Either part missing is an error
/// rather than a partial key.
pub fn subject_key(header: &WaveformHeader) -> Result<String, String> {
  match (header.measurement_time(), header.patient_id()) {
    (Some(time), Some(id)) => Ok(format!("{time} {id}")),
    (None, Some(_)) => Err("the header has no measurement time".into()),
    (Some(_), None) => Err("the header has no patient identifier".into()),
    (None, None) => Err("the header has neither measurement time nor patient identifier".into()),
  }
}

/// ISO calendar date, or `None` when absent, marked not available, or
/// unparseable.
pub fn parse_birth_date(header: &WaveformHeader) -> Option<NaiveDate> {
  header
    .birth_date()
    .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

pub fn subject_from_header(header: &WaveformHeader, file_id: Uuid) -> Result<NewSubject, String> {
  Ok(NewSubject {
    subject_id: subject_key(header)?,
    name:       header.patient_name().to_owned(),
    gender:     header.patient_sex().to_owned(),
    birth_date: parse_birth_date(header),
    file_id:    Some(file_id),
  })
}

/// Derive a subject from the waveform stored at `path` for `file`.
pub async fn derive_subject<S, C>(store: &S, codec: &C, file: &File, path: &Path) -> Derivation
where
  S: ResearchStore,
  C: WaveformCodec,
{
  if !file.is_waveform() {
    info!(file_id = %file.file_id, filename = %file.filename, "not a waveform; no subject derived");
    return Derivation::Skipped;
  }

  let header = match codec.read_header(path).await {
    Ok(header) => header,
    Err(e) => {
      warn!(file_id = %file.file_id, error = %e, "header could not be read");
      return Derivation::UpstreamFailure { reason: e.to_string() };
    }
  };

  let input = match subject_from_header(&header, file.file_id) {
    Ok(input) => input,
    Err(reason) => {
      info!(file_id = %file.file_id, %reason, "header unusable for derivation");
      return Derivation::ValidationFailed { reason };
    }
  };

  let subject_id = input.subject_id.clone();
  match store.add_subject(input).await {
    Ok(Inserted::Created(subject)) => {
      info!(file_id = %file.file_id, %subject_id, "subject derived");
      Derivation::Created { subject }
    }
    Ok(Inserted::Duplicate) => {
      info!(file_id = %file.file_id, %subject_id, "subject already exists");
      Derivation::Duplicate { subject_id }
    }
    Err(e) => {
      warn!(file_id = %file.file_id, error = %e, "subject could not be stored");
      Derivation::UpstreamFailure { reason: e.to_string() }
    }
  }
}
