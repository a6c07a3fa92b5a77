//! [`SqliteStore`], the SQLite implementation of [`ResearchStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use monk_core::{
  account::{Account, NewProfile, NewRegistration, UserProfile},
  file::{File, FileImport, NewFile},
  project::{NewProject, Project},
  store::{Inserted, ResearchStore},
  subject::{NewSubject, NewVitals, Subject, Vitals},
};

use crate::{
  Result,
  encode::{
    ACCOUNT_COLUMNS, FILE_COLUMNS, IMPORT_COLUMNS, PROFILE_COLUMNS, RawAccount, RawFile,
    RawImport, RawProfile, RawProject, RawSubject, RawVitals, SUBJECT_COLUMNS, VITALS_COLUMNS,
    encode_date, encode_dt, encode_uuid, is_unique_violation,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A monk store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load every project whose id is returned by `ids_sql` for `param`.
  async fn load_projects(&self, ids_sql: &'static str, param: Uuid) -> Result<Vec<Project>> {
    let param = encode_uuid(param);
    let raws = self
      .conn
      .call(move |conn| {
        let ids = string_column(conn, ids_sql, &param)?;
        let mut raws = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(raw) = load_project(conn, &id)? {
            raws.push(raw);
          }
        }
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }
}

// ─── Connection-thread helpers ───────────────────────────────────────────────

fn string_column(conn: &Connection, sql: &str, param: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map([param], |row| row.get::<_, String>(0))?
    .collect()
}

fn load_project(conn: &Connection, project_id: &str) -> rusqlite::Result<Option<RawProject>> {
  let Some(mut raw) = conn
    .query_row(
      "SELECT project_id, rek_number, description, created_at, updated_at
         FROM projects WHERE project_id = ?1",
      [project_id],
      |row| {
        Ok(RawProject {
          project_id:  row.get(0)?,
          rek_number:  row.get(1)?,
          description: row.get(2)?,
          created_at:  row.get(3)?,
          updated_at:  row.get(4)?,
          members:     Vec::new(),
          subjects:    Vec::new(),
        })
      },
    )
    .optional()?
  else {
    return Ok(None);
  };

  raw.members = string_column(
    conn,
    "SELECT profile_id FROM project_members WHERE project_id = ?1 ORDER BY profile_id",
    project_id,
  )?;
  raw.subjects = string_column(
    conn,
    "SELECT subject FROM project_subjects WHERE project_id = ?1 ORDER BY subject",
    project_id,
  )?;
  Ok(Some(raw))
}

/// Ids with no matching profile are skipped.
fn new_account(username: String, password_hash: String) -> Account {
  Account {
    account_id: Uuid::new_v4(),
    username,
    password_hash,
    created_at: Utc::now(),
  }
}

fn new_profile(input: NewProfile) -> UserProfile {
  UserProfile {
    profile_id:     Uuid::new_v4(),
    account_id:     input.account_id,
    name:           input.name,
    mobile:         input.mobile,
    specialization: input.specialization,
    created_at:     Utc::now(),
  }
}

fn insert_account(conn: &Connection, account: &Account) -> rusqlite::Result<usize> {
  conn.execute(
    "INSERT INTO accounts (account_id, username, password_hash, created_at)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      encode_uuid(account.account_id),
      account.username,
      account.password_hash,
      encode_dt(account.created_at),
    ],
  )
}

fn insert_profile(conn: &Connection, profile: &UserProfile) -> rusqlite::Result<usize> {
  conn.execute(
    "INSERT INTO user_profiles
       (profile_id, account_id, name, mobile, specialization, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(profile.profile_id),
      encode_uuid(profile.account_id),
      profile.name,
      profile.mobile,
      profile.specialization,
      encode_dt(profile.created_at),
    ],
  )
}

fn insert_members(conn: &Connection, project_id: &str, members: &[String]) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT OR IGNORE INTO project_members (project_id, profile_id)
     SELECT ?1, profile_id FROM user_profiles WHERE profile_id = ?2",
  )?;
  for member in members {
    stmt.execute(rusqlite::params![project_id, member])?;
  }
  Ok(())
}

/// Ids with no matching subject are skipped.
fn insert_subjects(conn: &Connection, project_id: &str, subjects: &[String]) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT OR IGNORE INTO project_subjects (project_id, subject)
     SELECT ?1, id FROM subjects WHERE id = ?2",
  )?;
  for subject in subjects {
    stmt.execute(rusqlite::params![project_id, subject])?;
  }
  Ok(())
}

fn touch_project(conn: &Connection, project_id: &str) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE projects SET updated_at = ?2 WHERE project_id = ?1",
    rusqlite::params![project_id, encode_dt(Utc::now())],
  )?;
  Ok(())
}

fn encode_ids(ids: &[Uuid]) -> Vec<String> { ids.iter().copied().map(encode_uuid).collect() }

// ─── ResearchStore impl ──────────────────────────────────────────────────────

impl ResearchStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts & profiles ───────────────────────────────────────────────

  async fn add_account(&self, username: String, password_hash: String) -> Result<Inserted<Account>> {
    let account = new_account(username, password_hash);
    let row = account.clone();

    let inserted = self
      .conn
      .call(move |conn| match insert_account(conn, &row) {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
      })
      .await?;

    Ok(if inserted { Inserted::Created(account) } else { Inserted::Duplicate })
  }

  async fn get_account_by_username<'a>(&'a self, username: &'a str) -> Result<Option<Account>> {
    let username = username.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
              [username],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn add_profile(&self, input: NewProfile) -> Result<UserProfile> {
    let profile = new_profile(input);
    let row = profile.clone();

    self
      .conn
      .call(move |conn| {
        insert_profile(conn, &row)?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn add_registration(
    &self,
    input: NewRegistration,
  ) -> Result<Inserted<(Account, UserProfile)>> {
    let account = new_account(input.username, input.password_hash);
    let profile = new_profile(NewProfile {
      account_id:     account.account_id,
      name:           input.name,
      mobile:         input.mobile,
      specialization: input.specialization,
    });
    let (account_row, profile_row) = (account.clone(), profile.clone());

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match insert_account(&tx, &account_row) {
          Ok(_) => {}
          // Dropping `tx` rolls back.
          Err(e) if is_unique_violation(&e) => return Ok(false),
          Err(e) => return Err(e.into()),
        }
        insert_profile(&tx, &profile_row)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(if inserted { Inserted::Created((account, profile)) } else { Inserted::Duplicate })
  }

  async fn get_profile(&self, profile_id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(profile_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE profile_id = ?1"),
              [id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn profile_for_account(&self, account_id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(account_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE account_id = ?1"),
              [id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROFILE_COLUMNS} FROM user_profiles ORDER BY name, created_at"
        ))?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  // ── Files & ownership ─────────────────────────────────────────────────

  async fn add_file(&self, input: NewFile) -> Result<Inserted<File>> {
    let file = File {
      file_id:      Uuid::new_v4(),
      title:        input.title,
      filename:     input.filename,
      stored_path:  input.stored_path,
      content_hash: input.content_hash,
      size_bytes:   input.size_bytes,
      uploaded_at:  Utc::now(),
    };

    let id_str      = encode_uuid(file.file_id);
    let title       = file.title.clone();
    let filename    = file.filename.clone();
    let stored_path = file.stored_path.clone();
    let hash        = file.content_hash.clone();
    let size        = i64::try_from(file.size_bytes).unwrap_or(i64::MAX);
    let at_str      = encode_dt(file.uploaded_at);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO files
             (file_id, title, filename, stored_path, content_hash, size_bytes, uploaded_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, title, filename, stored_path, hash, size, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted { Inserted::Created(file) } else { Inserted::Duplicate })
  }

  async fn get_file(&self, file_id: Uuid) -> Result<Option<File>> {
    let id_str = encode_uuid(file_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.file_id = ?1"),
              [id_str],
              RawFile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFile::into_file).transpose()
  }

  async fn find_file_by_hash<'a>(&'a self, content_hash: &'a str) -> Result<Option<File>> {
    let hash = content_hash.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FILE_COLUMNS} FROM files f WHERE f.content_hash = ?1"
              ),
              [hash],
              RawFile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFile::into_file).transpose()
  }

  async fn list_owned_files(&self, profile_id: Uuid, derived_only: bool) -> Result<Vec<File>> {
    let id_str = encode_uuid(profile_id);
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT {FILE_COLUMNS}
             FROM files f
             JOIN file_imports i ON i.file_id = f.file_id
            WHERE i.profile_id = ?1
              AND (?2 = 0 OR EXISTS (SELECT 1 FROM subjects s WHERE s.file_id = f.file_id))
            ORDER BY f.uploaded_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, derived_only], RawFile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFile::into_file).collect()
  }

  async fn record_import(&self, profile_id: Uuid, file_id: Uuid) -> Result<FileImport> {
    let import = FileImport {
      import_id: Uuid::new_v4(),
      profile_id,
      file_id,
      imported_at: Utc::now(),
    };

    let id_str      = encode_uuid(import.import_id);
    let profile_str = encode_uuid(profile_id);
    let file_str    = encode_uuid(file_id);
    let at_str      = encode_dt(import.imported_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO file_imports (import_id, profile_id, file_id, imported_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, profile_str, file_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(import)
  }

  async fn list_imports(&self, file_id: Uuid) -> Result<Vec<FileImport>> {
    let id_str = encode_uuid(file_id);
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {IMPORT_COLUMNS} FROM file_imports WHERE file_id = ?1 ORDER BY imported_at"
        ))?;
        let rows = stmt
          .query_map([id_str], RawImport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawImport::into_import).collect()
  }

  // ── Subjects & vitals ─────────────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Inserted<Subject>> {
    let subject = Subject {
      id:         Uuid::new_v4(),
      subject_id: input.subject_id,
      name:       input.name,
      gender:     input.gender,
      birth_date: input.birth_date,
      file_id:    input.file_id,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(subject.id);
    let key        = subject.subject_id.clone();
    let name       = subject.name.clone();
    let gender     = subject.gender.clone();
    let birth_date = subject.birth_date.map(encode_date);
    let file_str   = subject.file_id.map(encode_uuid);
    let at_str     = encode_dt(subject.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO subjects (id, subject_id, name, gender, birth_date, file_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, key, name, gender, birth_date, file_str, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted { Inserted::Created(subject) } else { Inserted::Duplicate })
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.id = ?1"),
              [id_str],
              RawSubject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects s ORDER BY s.created_at, s.subject_id"
        ))?;
        let rows = stmt
          .query_map([], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn subjects_for_file(&self, file_id: Uuid) -> Result<Vec<Subject>> {
    let id_str = encode_uuid(file_id);
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.file_id = ?1 ORDER BY s.created_at"
        ))?;
        let rows = stmt
          .query_map([id_str], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn record_vitals(&self, input: NewVitals) -> Result<Vitals> {
    let vitals = Vitals {
      vitals_id:        Uuid::new_v4(),
      subject:          input.subject,
      description:      input.description,
      heart_rate:       input.heart_rate,
      oxygen:           input.oxygen,
      body_temperature: input.body_temperature,
      respiration_rate: input.respiration_rate,
      blood_pressure:   input.blood_pressure,
      created_at:       Utc::now(),
    };

    let id_str      = encode_uuid(vitals.vitals_id);
    let subject_str = encode_uuid(vitals.subject);
    let description = vitals.description.clone();
    let pressure    = vitals.blood_pressure.clone();
    let (heart, oxygen, temp, resp) = (
      vitals.heart_rate,
      vitals.oxygen,
      vitals.body_temperature,
      vitals.respiration_rate,
    );
    let at_str      = encode_dt(vitals.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO vitals ({VITALS_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
          rusqlite::params![
            id_str,
            subject_str,
            description,
            heart,
            oxygen,
            temp,
            resp,
            pressure,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(vitals)
  }

  async fn list_vitals(&self, subject: Uuid) -> Result<Vec<Vitals>> {
    let id_str = encode_uuid(subject);
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VITALS_COLUMNS} FROM vitals WHERE subject = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map([id_str], RawVitals::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVitals::into_vitals).collect()
  }

  // ── Projects ──────────────────────────────────────────────────────────

  async fn add_project(&self, input: NewProject) -> Result<Project> {
    let id_str      = encode_uuid(Uuid::new_v4());
    let at_str      = encode_dt(Utc::now());
    let rek_number  = input.rek_number;
    let description = input.description;
    let members     = encode_ids(&input.members);
    let subjects    = encode_ids(&input.subjects);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO projects (project_id, rek_number, description, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, rek_number, description, at_str],
        )?;
        insert_members(&tx, &id_str, &members)?;
        insert_subjects(&tx, &id_str, &subjects)?;
        let raw = load_project(&tx, &id_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_project(),
      None => Err(crate::Error::Corrupt("project vanished after insert".into())),
    }
  }

  async fn get_project(&self, project_id: Uuid) -> Result<Option<Project>> {
    let id_str = encode_uuid(project_id);
    let raw = self
      .conn
      .call(move |conn| Ok(load_project(conn, &id_str)?))
      .await?;

    raw.map(RawProject::into_project).transpose()
  }

  async fn list_projects_for(&self, profile_id: Uuid) -> Result<Vec<Project>> {
    self
      .load_projects(
        "SELECT m.project_id FROM project_members m
           JOIN projects p ON p.project_id = m.project_id
          WHERE m.profile_id = ?1
          ORDER BY p.updated_at DESC",
        profile_id,
      )
      .await
  }

  async fn projects_containing_subject(&self, subject: Uuid) -> Result<Vec<Project>> {
    self
      .load_projects(
        "SELECT ps.project_id FROM project_subjects ps
           JOIN projects p ON p.project_id = ps.project_id
          WHERE ps.subject = ?1
          ORDER BY p.updated_at DESC",
        subject,
      )
      .await
  }

  async fn replace_project_members(&self, project_id: Uuid, members: Vec<Uuid>) -> Result<()> {
    let id_str  = encode_uuid(project_id);
    let members = encode_ids(&members);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM project_members WHERE project_id = ?1", [&id_str])?;
        insert_members(&tx, &id_str, &members)?;
        touch_project(&tx, &id_str)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn replace_project_subjects(&self, project_id: Uuid, subjects: Vec<Uuid>) -> Result<()> {
    let id_str   = encode_uuid(project_id);
    let subjects = encode_ids(&subjects);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM project_subjects WHERE project_id = ?1", [&id_str])?;
        insert_subjects(&tx, &id_str, &subjects)?;
        touch_project(&tx, &id_str)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_project_member(&self, project_id: Uuid, profile_id: Uuid) -> Result<bool> {
    let id_str      = encode_uuid(project_id);
    let profile_str = encode_uuid(profile_id);
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM project_members WHERE project_id = ?1 AND profile_id = ?2",
          rusqlite::params![id_str, profile_str],
        )?;
        if n > 0 {
          touch_project(&tx, &id_str)?;
        }
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(removed)
  }

  // ── Access ────────────────────────────────────────────────────────────

  async fn shares_project_via_file(&self, profile_id: Uuid, file_id: Uuid) -> Result<bool> {
    let profile_str = encode_uuid(profile_id);
    let file_str    = encode_uuid(file_id);
    let shared = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1
               FROM project_members m
               JOIN project_subjects ps ON ps.project_id = m.project_id
               JOIN subjects s          ON s.id = ps.subject
              WHERE m.profile_id = ?1 AND s.file_id = ?2
           )",
          rusqlite::params![profile_str, file_str],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(shared)
  }
}
