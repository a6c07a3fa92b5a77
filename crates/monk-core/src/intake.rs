//! File import, batch import, and claims.
//!
//! The ownership check and the creation of the ownership record are two
//! separate store calls with nothing serialising them. Two concurrent
//! imports of the same content can therefore both succeed. The content
//! itself is stored once: the later of two racing imports attaches to the
//! file row the earlier one created.

use std::io;

use bytes::Bytes;
use monk_waveform::{WaveformCodec, codec::WAVEFORM_EXTENSION, is_waveform};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  account::UserProfile,
  derive::{Derivation, derive_subject},
  file::{File, FileImport, NewFile, OwnershipMode, title_or_filename},
  notice::Notice,
  payload::{PayloadDir, content_hash},
  store::{Inserted, ResearchStore},
};

/// Import rules, fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPolicy {
  pub ownership:     OwnershipMode,
  /// Reject uploads that are not waveform recordings.
  pub waveform_only: bool,
}

#[derive(Debug, Clone)]
pub struct Upload {
  pub filename: String,
  pub title:    Option<String>,
  pub content:  Bytes,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
  pub file:       File,
  pub import:     FileImport,
  /// The content matched a file that was already stored.
  pub reused:     bool,
  pub derivation: Derivation,
  pub notices:    Vec<Notice>,
}

/// Per-file result of a batch import.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
  Imported { report: ImportReport },
  Rejected { reason: String },
  Duplicate { file_id: Uuid },
  Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
  pub filename: String,
  #[serde(flatten)]
  pub outcome:  BatchOutcome,
}

/// Runs the import workflows against a store, a codec, and the payload
/// directory.
pub struct Intake<'a, S, C> {
  store:    &'a S,
  codec:    &'a C,
  payloads: &'a PayloadDir,
  policy:   ImportPolicy,
}

impl<'a, S, C> Intake<'a, S, C>
where
  S: ResearchStore,
  C: WaveformCodec,
{
  pub fn new(store: &'a S, codec: &'a C, payloads: &'a PayloadDir, policy: ImportPolicy) -> Self {
    Self { store, codec, payloads, policy }
  }

  /// Import one upload on behalf of `account_id` and attempt subject
  /// derivation.
  pub async fn import_file(&self, account_id: Uuid, upload: Upload) -> Result<ImportReport> {
    self.check_file_type(&upload.filename)?;
    let profile = self.profile(account_id).await?;
    self.import_for(&profile, upload).await
  }

  /// Import each upload independently. Only a missing profile or an empty
  /// batch fails the whole call; everything else is a per-file outcome.
  pub async fn import_batch(&self, account_id: Uuid, uploads: Vec<Upload>) -> Result<Vec<BatchItem>> {
    if uploads.is_empty() {
      return Err(Error::Validation("no files were provided".into()));
    }
    let profile = self.profile(account_id).await?;

    let mut items = Vec::with_capacity(uploads.len());
    for upload in uploads {
      let filename = upload.filename.clone();
      let outcome = match self.check_file_type(&filename) {
        Err(e) => BatchOutcome::Rejected { reason: format!("{e} Invalid file: {filename}") },
        Ok(()) => match self.import_for(&profile, upload).await {
          Ok(report) => BatchOutcome::Imported { report },
          Err(Error::Validation(reason)) => BatchOutcome::Rejected { reason },
          Err(Error::AlreadyImported(file_id)) => BatchOutcome::Duplicate { file_id },
          Err(e) => {
            warn!(%filename, error = %e, "batch item failed");
            BatchOutcome::Failed { reason: e.to_string() }
          }
        },
      };
      items.push(BatchItem { filename, outcome });
    }
    Ok(items)
  }

  /// Record an ownership claim on an existing file. No derivation runs.
  pub async fn claim_file(&self, account_id: Uuid, file_id: Uuid) -> Result<FileImport> {
    let file = self
      .store
      .get_file(file_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .ok_or(Error::FileNotFound(file_id))?;
    let profile = self.profile(account_id).await?;

    self.check_ownership(&profile, &file).await?;
    let claim = self
      .store
      .record_import(profile.profile_id, file.file_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    info!(%file_id, profile_id = %profile.profile_id, "file claimed");
    Ok(claim)
  }

  // ── Steps ─────────────────────────────────────────────────────────────

  fn check_file_type(&self, filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
      return Err(Error::Validation("a file name is required".into()));
    }
    if self.policy.waveform_only && !is_waveform(filename) {
      return Err(Error::Validation(format!(
        "Only .{} files are allowed.",
        WAVEFORM_EXTENSION.to_ascii_uppercase()
      )));
    }
    Ok(())
  }

  async fn profile(&self, account_id: Uuid) -> Result<UserProfile> {
    self
      .store
      .profile_for_account(account_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .ok_or(Error::NotRegistered)
  }

  async fn check_ownership(&self, profile: &UserProfile, file: &File) -> Result<()> {
    let existing = self
      .store
      .list_imports(file.file_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    if self.policy.ownership.blocks(&existing, profile.profile_id) {
      return Err(Error::AlreadyImported(file.file_id));
    }
    Ok(())
  }

  async fn import_for(&self, profile: &UserProfile, upload: Upload) -> Result<ImportReport> {
    let hash = content_hash(&upload.content);
    let existing = self
      .store
      .find_file_by_hash(&hash)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    if let Some(file) = &existing {
      self.check_ownership(profile, file).await?;
    }

    let (file, reused) = match existing {
      Some(file) => (file, true),
      None => {
        let stored_path = self
          .payloads
          .store(&hash, &upload.filename, upload.content.clone())
          .await?;
        let inserted = self
          .store
          .add_file(NewFile {
            title: title_or_filename(upload.title.as_deref(), &upload.filename),
            filename: upload.filename,
            stored_path,
            content_hash: hash.clone(),
            size_bytes: upload.content.len() as u64,
          })
          .await
          .map_err(|e| Error::Store(Box::new(e)))?;
        match inserted {
          Inserted::Created(file) => (file, false),
          // A concurrent import stored the same content first.
          Inserted::Duplicate => {
            let file = self
              .store
              .find_file_by_hash(&hash)
              .await
              .map_err(|e| Error::Store(Box::new(e)))?
              .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no file with hash {hash}"))
              })?;
            (file, true)
          }
        }
      }
    };

    let import = self
      .store
      .record_import(profile.profile_id, file.file_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    info!(
      file_id = %file.file_id,
      profile_id = %profile.profile_id,
      reused,
      "file imported"
    );

    let derivation =
      derive_subject(self.store, self.codec, &file, &self.payloads.resolve(&file)).await;
    let notices = vec![
      derivation.notice(&file.title),
      Notice::success("File imported and processed successfully."),
    ];

    Ok(ImportReport { file, import, reused, derivation, notices })
  }
}
