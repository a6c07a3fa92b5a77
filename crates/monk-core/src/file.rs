//! Uploaded files and the ownership records that point at them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
  pub file_id:      Uuid,
  pub title:        String,
  /// Name the file was uploaded under; its extension decides derivation.
  pub filename:     String,
  /// Payload location relative to the upload directory.
  pub stored_path:  String,
  /// Lower-case hex SHA-256 of the payload.
  pub content_hash: String,
  pub size_bytes:   u64,
  pub uploaded_at:  DateTime<Utc>,
}

impl File {
  pub fn is_waveform(&self) -> bool { monk_waveform::is_waveform(&self.filename) }

  pub fn is_text(&self) -> bool { monk_waveform::codec::has_extension(&self.filename, "txt") }
}

/// Input to [`crate::store::ResearchStore::add_file`].
#[derive(Debug, Clone)]
pub struct NewFile {
  pub title:        String,
  pub filename:     String,
  pub stored_path:  String,
  pub content_hash: String,
  pub size_bytes:   u64,
}

/// Ownership record: a profile imported or claimed a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileImport {
  pub import_id:   Uuid,
  pub profile_id:  Uuid,
  pub file_id:     Uuid,
  pub imported_at: DateTime<Utc>,
}

/// Which existing ownership records block a new import or claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipMode {
  /// Any record for the file blocks; a file has a single owner.
  #[default]
  Global,
  /// Only a record held by the same profile blocks.
  PerUser,
}

impl OwnershipMode {
  pub fn blocks(self, existing: &[FileImport], profile_id: Uuid) -> bool {
    match self {
      Self::Global => !existing.is_empty(),
      Self::PerUser => existing.iter().any(|i| i.profile_id == profile_id),
    }
  }
}

/// The submitted title, or the filename when it is absent or blank.
pub fn title_or_filename(title: Option<&str>, filename: &str) -> String {
  match title.map(str::trim) {
    Some(t) if !t.is_empty() => t.to_owned(),
    _ => filename.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn import_by(profile_id: Uuid) -> FileImport {
    FileImport {
      import_id: Uuid::new_v4(),
      profile_id,
      file_id: Uuid::new_v4(),
      imported_at: Utc::now(),
    }
  }

  #[test]
  fn global_mode_blocks_on_any_record() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let existing = [import_by(a)];
    assert!(OwnershipMode::Global.blocks(&existing, a));
    assert!(OwnershipMode::Global.blocks(&existing, b));
    assert!(!OwnershipMode::Global.blocks(&[], b));
  }

  #[test]
  fn per_user_mode_blocks_only_the_same_profile() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let existing = [import_by(a)];
    assert!(OwnershipMode::PerUser.blocks(&existing, a));
    assert!(!OwnershipMode::PerUser.blocks(&existing, b));
  }

  #[test]
  fn blank_title_falls_back_to_filename() {
    assert_eq!(title_or_filename(None, "trace1.mwf"), "trace1.mwf");
    assert_eq!(title_or_filename(Some("  "), "trace1.mwf"), "trace1.mwf");
    assert_eq!(title_or_filename(Some(" ECG "), "trace1.mwf"), "ECG");
  }
}
