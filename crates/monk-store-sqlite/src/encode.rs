//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, birth dates `YYYY-MM-DD`, UUIDs
//! hyphenated lowercase strings. Each `Raw*` struct mirrors one row and is
//! decoded outside the connection thread.

use chrono::{DateTime, NaiveDate, Utc};
use monk_core::{
  account::{Account, UserProfile},
  file::{File, FileImport},
  project::Project,
  subject::{Subject, Vitals},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

/// True when `e` is a violated `UNIQUE` constraint.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ACCOUNT_COLUMNS: &str = "account_id, username, password_hash, created_at";

pub struct RawAccount {
  pub account_id:    String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:    decode_uuid(&self.account_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const PROFILE_COLUMNS: &str =
  "profile_id, account_id, name, mobile, specialization, created_at";

pub struct RawProfile {
  pub profile_id:     String,
  pub account_id:     String,
  pub name:           String,
  pub mobile:         String,
  pub specialization: Option<String>,
  pub created_at:     String,
}

impl RawProfile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:     row.get(0)?,
      account_id:     row.get(1)?,
      name:           row.get(2)?,
      mobile:         row.get(3)?,
      specialization: row.get(4)?,
      created_at:     row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      profile_id:     decode_uuid(&self.profile_id)?,
      account_id:     decode_uuid(&self.account_id)?,
      name:           self.name,
      mobile:         self.mobile,
      specialization: self.specialization,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

pub const FILE_COLUMNS: &str =
  "f.file_id, f.title, f.filename, f.stored_path, f.content_hash, f.size_bytes, f.uploaded_at";

pub struct RawFile {
  pub file_id:      String,
  pub title:        String,
  pub filename:     String,
  pub stored_path:  String,
  pub content_hash: String,
  pub size_bytes:   i64,
  pub uploaded_at:  String,
}

impl RawFile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      file_id:      row.get(0)?,
      title:        row.get(1)?,
      filename:     row.get(2)?,
      stored_path:  row.get(3)?,
      content_hash: row.get(4)?,
      size_bytes:   row.get(5)?,
      uploaded_at:  row.get(6)?,
    })
  }

  pub fn into_file(self) -> Result<File> {
    Ok(File {
      file_id:      decode_uuid(&self.file_id)?,
      title:        self.title,
      filename:     self.filename,
      stored_path:  self.stored_path,
      content_hash: self.content_hash,
      size_bytes:   u64::try_from(self.size_bytes)
        .map_err(|_| Error::Corrupt(format!("negative file size {}", self.size_bytes)))?,
      uploaded_at:  decode_dt(&self.uploaded_at)?,
    })
  }
}

pub const IMPORT_COLUMNS: &str = "import_id, profile_id, file_id, imported_at";

pub struct RawImport {
  pub import_id:   String,
  pub profile_id:  String,
  pub file_id:     String,
  pub imported_at: String,
}

impl RawImport {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      import_id:   row.get(0)?,
      profile_id:  row.get(1)?,
      file_id:     row.get(2)?,
      imported_at: row.get(3)?,
    })
  }

  pub fn into_import(self) -> Result<FileImport> {
    Ok(FileImport {
      import_id:   decode_uuid(&self.import_id)?,
      profile_id:  decode_uuid(&self.profile_id)?,
      file_id:     decode_uuid(&self.file_id)?,
      imported_at: decode_dt(&self.imported_at)?,
    })
  }
}

pub const SUBJECT_COLUMNS: &str =
  "s.id, s.subject_id, s.name, s.gender, s.birth_date, s.file_id, s.created_at";

pub struct RawSubject {
  pub id:         String,
  pub subject_id: String,
  pub name:       String,
  pub gender:     String,
  pub birth_date: Option<String>,
  pub file_id:    Option<String>,
  pub created_at: String,
}

impl RawSubject {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      subject_id: row.get(1)?,
      name:       row.get(2)?,
      gender:     row.get(3)?,
      birth_date: row.get(4)?,
      file_id:    row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:         decode_uuid(&self.id)?,
      subject_id: self.subject_id,
      name:       self.name,
      gender:     self.gender,
      birth_date: self.birth_date.as_deref().map(decode_date).transpose()?,
      file_id:    self.file_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const VITALS_COLUMNS: &str = "vitals_id, subject, description, heart_rate, oxygen, \
                                  body_temperature, respiration_rate, blood_pressure, created_at";

pub struct RawVitals {
  pub vitals_id:        String,
  pub subject:          String,
  pub description:      Option<String>,
  pub heart_rate:       Option<i64>,
  pub oxygen:           Option<i64>,
  pub body_temperature: Option<f64>,
  pub respiration_rate: Option<i64>,
  pub blood_pressure:   Option<String>,
  pub created_at:       String,
}

impl RawVitals {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vitals_id:        row.get(0)?,
      subject:          row.get(1)?,
      description:      row.get(2)?,
      heart_rate:       row.get(3)?,
      oxygen:           row.get(4)?,
      body_temperature: row.get(5)?,
      respiration_rate: row.get(6)?,
      blood_pressure:   row.get(7)?,
      created_at:       row.get(8)?,
    })
  }

  pub fn into_vitals(self) -> Result<Vitals> {
    Ok(Vitals {
      vitals_id:        decode_uuid(&self.vitals_id)?,
      subject:          decode_uuid(&self.subject)?,
      description:      self.description,
      heart_rate:       self.heart_rate,
      oxygen:           self.oxygen,
      body_temperature: self.body_temperature,
      respiration_rate: self.respiration_rate,
      blood_pressure:   self.blood_pressure,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// A `projects` row plus its two membership sets.
pub struct RawProject {
  pub project_id:  String,
  pub rek_number:  Option<String>,
  pub description: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
  pub members:     Vec<String>,
  pub subjects:    Vec<String>,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      project_id:  decode_uuid(&self.project_id)?,
      rek_number:  self.rek_number,
      description: self.description,
      members:     self.members.iter().map(|s| decode_uuid(s)).collect::<Result<_>>()?,
      subjects:    self.subjects.iter().map(|s| decode_uuid(s)).collect::<Result<_>>()?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_use_iso_calendar_format() {
    let d = NaiveDate::from_ymd_opt(1980, 5, 17).unwrap();
    assert_eq!(encode_date(d), "1980-05-17");
    assert_eq!(decode_date("1980-05-17").unwrap(), d);
    assert!(decode_date("17/05/1980").is_err());
  }
}
