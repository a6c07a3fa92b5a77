//! Research projects grouping profiles and subjects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result, store::ResearchStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub project_id:  Uuid,
  /// Ethics committee (REK) reference.
  pub rek_number:  Option<String>,
  pub description: Option<String>,
  /// Member profile ids.
  pub members:     Vec<Uuid>,
  /// Subject row ids.
  pub subjects:    Vec<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Project {
  pub fn has_member(&self, profile_id: Uuid) -> bool { self.members.contains(&profile_id) }
}

/// Input to project creation. Ids that match no profile or subject are
/// dropped by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
  #[serde(default)]
  pub rek_number:  Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub members:     Vec<Uuid>,
  #[serde(default)]
  pub subjects:    Vec<Uuid>,
}

/// Membership edit. An empty list leaves the corresponding set untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectEdit {
  #[serde(default)]
  pub members:  Vec<Uuid>,
  #[serde(default)]
  pub subjects: Vec<Uuid>,
}

// ─── Workflows ───────────────────────────────────────────────────────────────

pub async fn load<S: ResearchStore>(store: &S, project_id: Uuid) -> Result<Project> {
  store
    .get_project(project_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::ProjectNotFound(project_id))
}

pub async fn edit<S: ResearchStore>(
  store: &S,
  project_id: Uuid,
  edit: ProjectEdit,
) -> Result<Project> {
  load(store, project_id).await?;

  if !edit.members.is_empty() {
    store
      .replace_project_members(project_id, edit.members)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
  }
  if !edit.subjects.is_empty() {
    store
      .replace_project_subjects(project_id, edit.subjects)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
  }

  load(store, project_id).await
}

/// Remove `profile_id` from the members of `project_id`. The project itself
/// is kept even when its last member leaves.
pub async fn leave<S: ResearchStore>(store: &S, project_id: Uuid, profile_id: Uuid) -> Result<()> {
  load(store, project_id).await?;
  let removed = store
    .remove_project_member(project_id, profile_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if !removed {
    return Err(Error::NotAMember(project_id));
  }
  info!(%project_id, %profile_id, "profile left project");
  Ok(())
}
