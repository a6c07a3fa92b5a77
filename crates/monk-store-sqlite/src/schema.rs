//! SQL schema for the monk SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,   -- lower-case
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_profiles (
    profile_id     TEXT PRIMARY KEY,
    account_id     TEXT NOT NULL UNIQUE REFERENCES accounts(account_id),
    name           TEXT NOT NULL,
    mobile         TEXT NOT NULL,
    specialization TEXT,
    created_at     TEXT NOT NULL
);

-- Payload bytes live on disk; stored_path is relative to the upload dir.
-- One row per distinct content.
CREATE TABLE IF NOT EXISTS files (
    file_id      TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    filename     TEXT NOT NULL,
    stored_path  TEXT NOT NULL,
    content_hash TEXT NOT NULL UNIQUE,
    size_bytes   INTEGER NOT NULL,
    uploaded_at  TEXT NOT NULL
);

-- Ownership records. No uniqueness: the import workflow checks before it
-- inserts, and that check is not serialised.
CREATE TABLE IF NOT EXISTS file_imports (
    import_id   TEXT PRIMARY KEY,
    profile_id  TEXT NOT NULL REFERENCES user_profiles(profile_id),
    file_id     TEXT NOT NULL REFERENCES files(file_id),
    imported_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id         TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    gender     TEXT NOT NULL,
    birth_date TEXT,                    -- YYYY-MM-DD
    file_id    TEXT REFERENCES files(file_id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vitals (
    vitals_id        TEXT PRIMARY KEY,
    subject          TEXT NOT NULL REFERENCES subjects(id),
    description      TEXT,
    heart_rate       INTEGER,
    oxygen           INTEGER,
    body_temperature REAL,
    respiration_rate INTEGER,
    blood_pressure   TEXT,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    project_id  TEXT PRIMARY KEY,
    rek_number  TEXT,
    description TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS project_members (
    project_id TEXT NOT NULL REFERENCES projects(project_id),
    profile_id TEXT NOT NULL REFERENCES user_profiles(profile_id),
    PRIMARY KEY (project_id, profile_id)
);

CREATE TABLE IF NOT EXISTS project_subjects (
    project_id TEXT NOT NULL REFERENCES projects(project_id),
    subject    TEXT NOT NULL REFERENCES subjects(id),
    PRIMARY KEY (project_id, subject)
);

CREATE INDEX IF NOT EXISTS file_imports_file_idx  ON file_imports(file_id);
CREATE INDEX IF NOT EXISTS file_imports_owner_idx ON file_imports(profile_id);
CREATE INDEX IF NOT EXISTS subjects_file_idx      ON subjects(file_id);
CREATE INDEX IF NOT EXISTS vitals_subject_idx     ON vitals(subject);
CREATE INDEX IF NOT EXISTS project_subjects_idx   ON project_subjects(subject);

PRAGMA user_version = 1;
";
