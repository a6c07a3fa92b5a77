//! Error types for `monk-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),

  #[error("you are not registered as a regular user")]
  NotRegistered,

  #[error("file {0} has already been imported")]
  AlreadyImported(Uuid),

  #[error("you do not have permission to view file {0}")]
  Forbidden(Uuid),

  #[error("file not found: {0}")]
  FileNotFound(Uuid),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("project not found: {0}")]
  ProjectNotFound(Uuid),

  #[error("user not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("you are not a member of project {0}")]
  NotAMember(Uuid),

  #[error("a subject with identifier {0:?} already exists")]
  DuplicateSubject(String),

  #[error("codec error: {0}")]
  Codec(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("payload storage error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
