//! On-disk payload storage.
//!
//! Uploaded bytes are stored once per content hash as
//! `<upload_dir>/<sha256>.<ext>`; the database only records the relative
//! name. Derived artefacts (CSV conversions, anonymised copies) are written
//! next to the payload they came from.

use std::{
  io::{self, Write as _},
  path::{Path, PathBuf},
};

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::file::File;

#[derive(Debug, Clone)]
pub struct PayloadDir {
  root: PathBuf,
}

impl PayloadDir {
  /// Use `root` as the upload directory, creating it if needed.
  pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
    let root = root.into();
    tokio::fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Absolute location of a file's payload.
  pub fn resolve(&self, file: &File) -> PathBuf { self.root.join(&file.stored_path) }

  /// Write `bytes` under its content hash and return the relative name.
  /// An existing payload with the same name is left as is, including one
  /// that a concurrent writer finished first.
  pub async fn store(&self, content_hash: &str, filename: &str, bytes: Bytes) -> io::Result<String> {
    let name = stored_name(content_hash, filename);
    let path = self.root.join(&name);
    if tokio::fs::try_exists(&path).await? {
      debug!(path = %path.display(), "payload already on disk");
      return Ok(name);
    }

    // Readers must only ever see complete payloads. Each writer gets its own
    // scratch file.
    let root = self.root.clone();
    let target = path.clone();
    let len = bytes.len();
    let written = tokio::task::spawn_blocking(move || -> io::Result<bool> {
      let mut scratch = tempfile::Builder::new()
        .prefix(".upload-")
        .suffix(".partial")
        .tempfile_in(&root)?;
      scratch.write_all(&bytes)?;
      scratch.as_file().sync_all()?;
      match scratch.persist_noclobber(&target) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
      }
    })
    .await
    .map_err(io::Error::other)??;

    if written {
      debug!(path = %path.display(), len, "payload written");
    } else {
      debug!(path = %path.display(), "payload written concurrently");
    }
    Ok(name)
  }
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

fn stored_name(content_hash: &str, filename: &str) -> String {
  let ext = Path::new(filename)
    .extension()
    .and_then(|e| e.to_str())
    .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
  match ext {
    Some(ext) => format!("{content_hash}.{}", ext.to_ascii_lowercase()),
    None => content_hash.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_is_sha256_hex() {
    assert_eq!(
      content_hash(b"abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn stored_name_keeps_a_sane_extension() {
    assert_eq!(stored_name("ab", "Trace1.MWF"), "ab.mwf");
    assert_eq!(stored_name("ab", "notes"), "ab");
    assert_eq!(stored_name("ab", "evil.m/../x"), "ab");
  }

  #[tokio::test]
  async fn storing_twice_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    let payloads = PayloadDir::open(dir.path().join("uploads")).await.unwrap();

    let name = payloads.store("ab", "a.txt", Bytes::from_static(b"hello")).await.unwrap();
    let again = payloads.store("ab", "b.txt", Bytes::from_static(b"ignored")).await.unwrap();
    assert_eq!(name, again);

    let on_disk = tokio::fs::read(payloads.root().join(&name)).await.unwrap();
    assert_eq!(on_disk, b"hello");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_writers_of_one_payload_both_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let payloads = PayloadDir::open(dir.path().join("uploads")).await.unwrap();
    let content = Bytes::from(vec![7u8; 256 * 1024]);

    for round in 0..20 {
      let hash = format!("{round:02x}");
      let (a, b) = tokio::join!(
        payloads.store(&hash, "a.mwf", content.clone()),
        payloads.store(&hash, "b.mwf", content.clone()),
      );
      let (a, b) = (a.unwrap(), b.unwrap());
      assert_eq!(a, b);
      let on_disk = tokio::fs::read(payloads.root().join(&a)).await.unwrap();
      assert_eq!(on_disk.len(), content.len());
    }

    let mut entries = tokio::fs::read_dir(payloads.root()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
      let name = entry.file_name().to_string_lossy().into_owned();
      assert!(!name.ends_with(".partial"), "scratch file left behind: {name}");
    }
  }
}
