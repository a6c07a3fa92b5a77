//! Per-request file access check.
//!
//! A profile may view a file if it holds an ownership record for it, or if
//! it is a member of a project containing a subject derived from it. The
//! decision is recomputed on every call.

use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, file::File, store::ResearchStore};

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
  Owner,
  ProjectMember,
}

/// Check whether `profile_id` may view `file_id`; [`Error::Forbidden`]
/// otherwise.
pub async fn check_file_access<S: ResearchStore>(
  store: &S,
  profile_id: Uuid,
  file_id: Uuid,
) -> Result<Grant> {
  let imports = store
    .list_imports(file_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if imports.iter().any(|i| i.profile_id == profile_id) {
    return Ok(Grant::Owner);
  }

  if store
    .shares_project_via_file(profile_id, file_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  {
    return Ok(Grant::ProjectMember);
  }

  Err(Error::Forbidden(file_id))
}

/// Resolve `file_id` and check access for the profile of `account_id`. An
/// unknown file is [`Error::FileNotFound`]; an account without a profile is
/// denied.
pub async fn authorize_file<S: ResearchStore>(
  store: &S,
  account_id: Uuid,
  file_id: Uuid,
) -> Result<(File, Grant)> {
  let file = store
    .get_file(file_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::FileNotFound(file_id))?;
  let Some(profile) = store
    .profile_for_account(account_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  else {
    return Err(Error::Forbidden(file_id));
  };

  let grant = check_file_access(store, profile.profile_id, file_id).await?;
  Ok((file, grant))
}
