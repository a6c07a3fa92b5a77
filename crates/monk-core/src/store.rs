//! The `ResearchStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `monk-store-sqlite`).
//! Workflows in this crate and the HTTP layer depend on this abstraction, not
//! on any concrete backend. Relations that an ORM would expose implicitly
//! (membership sets, reverse foreign keys) are explicit lookups here.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  account::{Account, NewProfile, NewRegistration, UserProfile},
  file::{File, FileImport, NewFile},
  project::{NewProject, Project},
  subject::{NewSubject, NewVitals, Subject, Vitals},
};

/// Result of an insert guarded by a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Inserted<T> {
  Created(T),
  /// The unique key was already taken; nothing was written.
  Duplicate,
}

impl<T> Inserted<T> {
  pub fn created(self) -> Option<T> {
    match self {
      Self::Created(t) => Some(t),
      Self::Duplicate => None,
    }
  }
}

/// Abstraction over a monk storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ResearchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts & profiles ───────────────────────────────────────────────

  /// Create an account. `username` must already be normalised.
  fn add_account(
    &self,
    username: String,
    password_hash: String,
  ) -> impl Future<Output = Result<Inserted<Account>, Self::Error>> + Send + '_;

  fn get_account_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn add_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  /// Create an account and its profile in one step. A taken username yields
  /// [`Inserted::Duplicate`] and leaves nothing behind.
  fn add_registration(
    &self,
    input: NewRegistration,
  ) -> impl Future<Output = Result<Inserted<(Account, UserProfile)>, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// The profile linked to an account, if it has one.
  fn profile_for_account(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<UserProfile>, Self::Error>> + Send + '_;

  // ── Files & ownership ─────────────────────────────────────────────────

  /// Insert a file record. Content already stored under the same hash
  /// yields [`Inserted::Duplicate`].
  fn add_file(
    &self,
    input: NewFile,
  ) -> impl Future<Output = Result<Inserted<File>, Self::Error>> + Send + '_;

  fn get_file(
    &self,
    file_id: Uuid,
  ) -> impl Future<Output = Result<Option<File>, Self::Error>> + Send + '_;

  fn find_file_by_hash<'a>(
    &'a self,
    content_hash: &'a str,
  ) -> impl Future<Output = Result<Option<File>, Self::Error>> + Send + 'a;

  /// Files `profile_id` holds an ownership record for, newest first. With
  /// `derived_only`, only files that have at least one derived subject.
  fn list_owned_files(
    &self,
    profile_id: Uuid,
    derived_only: bool,
  ) -> impl Future<Output = Result<Vec<File>, Self::Error>> + Send + '_;

  /// Append an ownership record. Performs no existence check.
  fn record_import(
    &self,
    profile_id: Uuid,
    file_id: Uuid,
  ) -> impl Future<Output = Result<FileImport, Self::Error>> + Send + '_;

  fn list_imports(
    &self,
    file_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FileImport>, Self::Error>> + Send + '_;

  // ── Subjects & vitals ─────────────────────────────────────────────────

  /// Insert a subject. A taken `subject_id` yields [`Inserted::Duplicate`].
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Inserted<Subject>, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn list_subjects(&self)
  -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Subjects derived from `file_id`.
  fn subjects_for_file(
    &self,
    file_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn record_vitals(
    &self,
    input: NewVitals,
  ) -> impl Future<Output = Result<Vitals, Self::Error>> + Send + '_;

  /// Vitals for one subject, newest first.
  fn list_vitals(
    &self,
    subject: Uuid,
  ) -> impl Future<Output = Result<Vec<Vitals>, Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  fn add_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Projects `profile_id` is a member of.
  fn list_projects_for(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  fn projects_containing_subject(
    &self,
    subject: Uuid,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  /// Replace the member set. Unknown profile ids are ignored. Bumps
  /// `updated_at`.
  fn replace_project_members(
    &self,
    project_id: Uuid,
    members: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace the subject set. Unknown subject ids are ignored. Bumps
  /// `updated_at`.
  fn replace_project_subjects(
    &self,
    project_id: Uuid,
    subjects: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns `false` if `profile_id` was not a member.
  fn remove_project_member(
    &self,
    project_id: Uuid,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Access ────────────────────────────────────────────────────────────

  /// Whether `profile_id` is a member of some project that contains a
  /// subject derived from `file_id`.
  fn shares_project_via_file(
    &self,
    profile_id: Uuid,
    file_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
