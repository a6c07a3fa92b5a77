pub mod export;
pub mod files;
pub mod projects;
pub mod subjects;
pub mod users;

use monk_core::{account::UserProfile, store::ResearchStore};
use uuid::Uuid;

use crate::error::ApiError;

/// The profile of the acting account; accounts without one are rejected as
/// not registered.
pub(crate) async fn require_profile<S: ResearchStore>(
  store: &S,
  account_id: Uuid,
) -> Result<UserProfile, ApiError> {
  store
    .profile_for_account(account_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| monk_core::Error::NotRegistered.into())
}
