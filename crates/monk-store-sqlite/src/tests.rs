//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use monk_core::{
  account::{NewProfile, NewRegistration, UserProfile},
  file::{File, NewFile},
  project::NewProject,
  store::{Inserted, ResearchStore},
  subject::{NewSubject, NewVitals, Subject},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn profile(s: &SqliteStore, username: &str) -> UserProfile {
  let account = s
    .add_account(username.into(), "$argon2id$fake".into())
    .await
    .unwrap()
    .created()
    .unwrap();
  s.add_profile(NewProfile {
    account_id:     account.account_id,
    name:           username.to_uppercase(),
    mobile:         "12345678".into(),
    specialization: None,
  })
  .await
  .unwrap()
}

async fn file(s: &SqliteStore, hash: &str) -> File {
  s.add_file(NewFile {
    title:        format!("{hash}.mwf"),
    filename:     format!("{hash}.mwf"),
    stored_path:  format!("{hash}.mwf"),
    content_hash: hash.into(),
    size_bytes:   42,
  })
  .await
  .unwrap()
  .created()
  .unwrap()
}

fn new_subject(key: &str, file_id: Option<Uuid>) -> NewSubject {
  NewSubject {
    subject_id: key.into(),
    name:       "Unknown".into(),
    gender:     "Unknown".into(),
    birth_date: NaiveDate::from_ymd_opt(1980, 5, 17),
    file_id,
  }
}

async fn subject(s: &SqliteStore, key: &str, file_id: Option<Uuid>) -> Subject {
  s.add_subject(new_subject(key, file_id))
    .await
    .unwrap()
    .created()
    .unwrap()
}

// ─── Accounts & profiles ─────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_username_is_reported_not_raised() {
  let s = store().await;
  let first = s.add_account("alice".into(), "h".into()).await.unwrap();
  assert!(matches!(first, Inserted::Created(_)));

  let second = s.add_account("alice".into(), "h2".into()).await.unwrap();
  assert_eq!(second, Inserted::Duplicate);

  let stored = s.get_account_by_username("alice").await.unwrap().unwrap();
  assert_eq!(stored.password_hash, "h");
}

#[tokio::test]
async fn profile_is_found_by_account() {
  let s = store().await;
  let p = profile(&s, "alice").await;

  let by_account = s.profile_for_account(p.account_id).await.unwrap();
  assert_eq!(by_account.as_ref(), Some(&p));
  assert_eq!(s.get_profile(p.profile_id).await.unwrap(), Some(p));
  assert!(s.profile_for_account(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn account_without_profile_has_none() {
  let s = store().await;
  let account = s
    .add_account("bob".into(), "h".into())
    .await
    .unwrap()
    .created()
    .unwrap();
  assert!(s.profile_for_account(account.account_id).await.unwrap().is_none());
  assert!(s.list_profiles().await.unwrap().is_empty());
}

fn registration(username: &str) -> NewRegistration {
  NewRegistration {
    username:       username.into(),
    password_hash:  "$argon2id$fake".into(),
    name:           username.to_uppercase(),
    mobile:         "12345678".into(),
    specialization: Some("cardiology".into()),
  }
}

#[tokio::test]
async fn registration_creates_account_and_profile_together() {
  let s = store().await;
  let (account, p) = s
    .add_registration(registration("alice"))
    .await
    .unwrap()
    .created()
    .unwrap();

  assert_eq!(p.account_id, account.account_id);
  assert_eq!(s.get_account_by_username("alice").await.unwrap(), Some(account.clone()));
  assert_eq!(s.profile_for_account(account.account_id).await.unwrap(), Some(p));
}

#[tokio::test]
async fn taken_username_registration_leaves_no_profile_behind() {
  let s = store().await;
  s.add_account("alice".into(), "h".into()).await.unwrap();
  profile(&s, "bob").await;

  assert_eq!(s.add_registration(registration("alice")).await.unwrap(), Inserted::Duplicate);
  assert_eq!(s.add_registration(registration("bob")).await.unwrap(), Inserted::Duplicate);

  let profiles = s.list_profiles().await.unwrap();
  assert_eq!(profiles.len(), 1);
  assert_eq!(profiles[0].name, "BOB");
}

// ─── Files & ownership ───────────────────────────────────────────────────────

#[tokio::test]
async fn file_round_trips_and_is_found_by_hash() {
  let s = store().await;
  let f = file(&s, "aa").await;

  assert_eq!(s.get_file(f.file_id).await.unwrap(), Some(f.clone()));
  assert_eq!(s.find_file_by_hash("aa").await.unwrap(), Some(f));
  assert!(s.find_file_by_hash("bb").await.unwrap().is_none());
}

#[tokio::test]
async fn same_content_hash_is_stored_once() {
  let s = store().await;
  let first = file(&s, "aa").await;

  let again = s
    .add_file(NewFile {
      title:        "copy".into(),
      filename:     "copy.mwf".into(),
      stored_path:  "aa.mwf".into(),
      content_hash: "aa".into(),
      size_bytes:   42,
    })
    .await
    .unwrap();

  assert_eq!(again, Inserted::Duplicate);
  assert_eq!(s.find_file_by_hash("aa").await.unwrap(), Some(first));
}

#[tokio::test]
async fn ownership_check_then_create_is_not_atomic() {
  // Two importers both observe "no record yet" before either inserts.
  let s = store().await;
  let a = profile(&s, "alice").await;
  let b = profile(&s, "bob").await;
  let f = file(&s, "aa").await;

  let seen_by_a = s.list_imports(f.file_id).await.unwrap();
  let seen_by_b = s.list_imports(f.file_id).await.unwrap();
  assert!(seen_by_a.is_empty() && seen_by_b.is_empty());

  s.record_import(a.profile_id, f.file_id).await.unwrap();
  s.record_import(b.profile_id, f.file_id).await.unwrap();

  assert_eq!(s.list_imports(f.file_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn owned_files_can_be_limited_to_derived_ones() {
  let s = store().await;
  let a = profile(&s, "alice").await;
  let plain = file(&s, "aa").await;
  let derived = file(&s, "bb").await;
  let foreign = file(&s, "cc").await;
  s.record_import(a.profile_id, plain.file_id).await.unwrap();
  s.record_import(a.profile_id, derived.file_id).await.unwrap();
  subject(&s, "2024-01-01T00:00:00 P1", Some(derived.file_id)).await;
  subject(&s, "2024-01-01T00:00:00 P2", Some(foreign.file_id)).await;

  let all = s.list_owned_files(a.profile_id, false).await.unwrap();
  assert_eq!(all.len(), 2);

  let only = s.list_owned_files(a.profile_id, true).await.unwrap();
  assert_eq!(only, vec![derived]);
}

#[tokio::test]
async fn repeated_imports_list_a_file_once() {
  let s = store().await;
  let a = profile(&s, "alice").await;
  let f = file(&s, "aa").await;
  s.record_import(a.profile_id, f.file_id).await.unwrap();
  s.record_import(a.profile_id, f.file_id).await.unwrap();

  assert_eq!(s.list_owned_files(a.profile_id, false).await.unwrap().len(), 1);
}

// ─── Subjects & vitals ───────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_subject_id_yields_one_row() {
  let s = store().await;
  let first = s
    .add_subject(new_subject("2024-01-01T00:00:00 P1", None))
    .await
    .unwrap();
  let second = s
    .add_subject(new_subject("2024-01-01T00:00:00 P1", None))
    .await
    .unwrap();

  assert!(matches!(first, Inserted::Created(_)));
  assert_eq!(second, Inserted::Duplicate);
  assert_eq!(s.list_subjects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn subject_keeps_birth_date_and_file_link() {
  let s = store().await;
  let f = file(&s, "aa").await;
  let created = subject(&s, "t P1", Some(f.file_id)).await;

  let fetched = s.get_subject(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.birth_date, NaiveDate::from_ymd_opt(1980, 5, 17));
  assert_eq!(s.subjects_for_file(f.file_id).await.unwrap(), vec![created]);
}

#[tokio::test]
async fn vitals_are_listed_per_subject() {
  let s = store().await;
  let x = subject(&s, "x", None).await;
  let y = subject(&s, "y", None).await;

  s.record_vitals(NewVitals {
    subject: x.id,
    heart_rate: Some(72),
    blood_pressure: Some("120/80".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  s.record_vitals(NewVitals { subject: y.id, oxygen: Some(98), ..Default::default() })
    .await
    .unwrap();

  let listed = s.list_vitals(x.id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].heart_rate, Some(72));
  assert_eq!(listed[0].blood_pressure.as_deref(), Some("120/80"));
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn project_ignores_unknown_ids() {
  let s = store().await;
  let a = profile(&s, "alice").await;
  let x = subject(&s, "x", None).await;

  let p = s
    .add_project(NewProject {
      rek_number:  Some("REK-1".into()),
      description: None,
      members:     vec![a.profile_id, Uuid::new_v4()],
      subjects:    vec![x.id, Uuid::new_v4()],
    })
    .await
    .unwrap();

  assert_eq!(p.members, vec![a.profile_id]);
  assert_eq!(p.subjects, vec![x.id]);
  assert_eq!(s.get_project(p.project_id).await.unwrap(), Some(p));
}

#[tokio::test]
async fn replacing_members_and_leaving() {
  let s = store().await;
  let a = profile(&s, "alice").await;
  let b = profile(&s, "bob").await;
  let p = s
    .add_project(NewProject { members: vec![a.profile_id], ..Default::default() })
    .await
    .unwrap();

  s.replace_project_members(p.project_id, vec![a.profile_id, b.profile_id])
    .await
    .unwrap();
  assert_eq!(s.list_projects_for(b.profile_id).await.unwrap().len(), 1);

  assert!(s.remove_project_member(p.project_id, b.profile_id).await.unwrap());
  assert!(!s.remove_project_member(p.project_id, b.profile_id).await.unwrap());
  assert!(s.list_projects_for(b.profile_id).await.unwrap().is_empty());

  let after = s.get_project(p.project_id).await.unwrap().unwrap();
  assert_eq!(after.members, vec![a.profile_id]);
  assert!(after.updated_at >= p.updated_at);
}

#[tokio::test]
async fn projects_containing_subject() {
  let s = store().await;
  let x = subject(&s, "x", None).await;
  let y = subject(&s, "y", None).await;
  let p = s
    .add_project(NewProject { subjects: vec![x.id], ..Default::default() })
    .await
    .unwrap();
  s.add_project(NewProject { subjects: vec![y.id], ..Default::default() })
    .await
    .unwrap();

  let found = s.projects_containing_subject(x.id).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].project_id, p.project_id);

  s.replace_project_subjects(p.project_id, vec![y.id]).await.unwrap();
  assert!(s.projects_containing_subject(x.id).await.unwrap().is_empty());
  assert_eq!(s.projects_containing_subject(y.id).await.unwrap().len(), 2);
}

// ─── Access ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn project_membership_shares_derived_files() {
  let s = store().await;
  let a = profile(&s, "alice").await;
  let b = profile(&s, "bob").await;
  let f = file(&s, "aa").await;
  let other = file(&s, "bb").await;
  let x = subject(&s, "t P1", Some(f.file_id)).await;

  assert!(!s.shares_project_via_file(b.profile_id, f.file_id).await.unwrap());

  s.add_project(NewProject {
    members: vec![a.profile_id, b.profile_id],
    subjects: vec![x.id],
    ..Default::default()
  })
  .await
  .unwrap();

  assert!(s.shares_project_via_file(b.profile_id, f.file_id).await.unwrap());
  assert!(!s.shares_project_via_file(b.profile_id, other.file_id).await.unwrap());
}
