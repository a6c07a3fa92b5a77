//! Workflow and router tests against an in-memory store, a temporary upload
//! directory, and a fake codec.


use std::{
  path::{Path, PathBuf},
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use bytes::Bytes;
use monk_core::{
  account::{NewProfile, UserProfile},
  file::OwnershipMode,
  intake::Upload,
  payload::PayloadDir,
  store::ResearchStore,
};
use monk_store_sqlite::SqliteStore;
use monk_waveform::{WaveformCodec, WaveformHeader, header::ChannelInfo};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::{AppState, ServerConfig, auth::hash_password};

// ─── Fake codec ──────────────────────────────────────────────────────────────

/// A recording as understood by [`FakeCodec`]: a JSON document carrying the
/// header and the CSV conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FakeRecording {
  pub header: WaveformHeader,
  #[serde(default)]
  pub csv:    String,
  /// Makes otherwise identical recordings hash differently.
  #[serde(default)]
  pub nonce:  u32,
}

/// Codec over [`FakeRecording`] payloads that counts its invocations.
#[derive(Debug, Default)]
pub struct FakeCodec {
  calls: AtomicUsize,
}

impl FakeCodec {
  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  async fn load(&self, path: &Path) -> monk_waveform::Result<FakeRecording> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

impl WaveformCodec for FakeCodec {
  type Error = monk_waveform::Error;

  async fn read_header<'a>(&'a self, path: &'a Path) -> monk_waveform::Result<WaveformHeader> {
    Ok(self.load(path).await?.header)
  }

  async fn convert_to_csv<'a>(
    &'a self,
    path: &'a Path,
    output: &'a Path,
  ) -> monk_waveform::Result<()> {
    let recording = self.load(path).await?;
    tokio::fs::write(output, recording.csv).await?;
    Ok(())
  }

  async fn anonymize<'a>(&'a self, path: &'a Path, output: &'a Path) -> monk_waveform::Result<()> {
    let mut recording = self.load(path).await?;
    recording.header.patient_id = None;
    recording.header.patient_name = None;
    recording.header.birth_date = None;
    tokio::fs::write(output, serde_json::to_vec(&recording)?).await?;
    Ok(())
  }
}

pub const SAMPLE_CSV: &str = "\
Time,I,II,III
0.0,1.0,2.0,3.0
0.5,1.5,2.5,3.5
1.0,2.0,3.0,4.0
1.5,2.5,3.5,4.5
2.0,3.0,4.0,5.0
";

pub fn waveform_header(time: Option<&str>, patient: Option<&str>) -> WaveformHeader {
  WaveformHeader {
    patient_id:       patient.map(str::to_owned),
    measurement_time: time.map(str::to_owned),
    patient_name:     Some("Ola Nordmann".into()),
    patient_sex:      None,
    birth_date:       Some("1980-05-17".into()),
    channels:         ["I", "II", "III"]
      .into_iter()
      .map(|a| ChannelInfo { attribute: a.into(), sampling_rate_hz: Some(2.0) })
      .collect(),
  }
}

pub fn recording_bytes(header: WaveformHeader, nonce: u32) -> Bytes {
  let recording = FakeRecording { header, csv: SAMPLE_CSV.into(), nonce };
  Bytes::from(serde_json::to_vec(&recording).unwrap())
}

/// Upload of a waveform whose header is `{patientID, measurementTimeISO}`.
pub fn waveform(filename: &str, time: &str, patient: &str, nonce: u32) -> Upload {
  Upload {
    filename: filename.into(),
    title:    None,
    content:  recording_bytes(waveform_header(Some(time), Some(patient)), nonce),
  }
}

pub fn text(filename: &str, body: &str) -> Upload {
  Upload {
    filename: filename.into(),
    title:    None,
    content:  Bytes::from(body.to_owned()),
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

pub struct Harness {
  pub state: AppState<SqliteStore, FakeCodec>,
  _dir:      TempDir,
}

impl Harness {
  pub fn store(&self) -> &SqliteStore { &self.state.store }

  pub fn codec(&self) -> &FakeCodec { &self.state.codec }
}

pub async fn harness_with(ownership: OwnershipMode, waveform_only: bool) -> Harness {
  let dir = tempfile::tempdir().unwrap();
  let upload_dir = dir.path().join("uploads");
  let store = SqliteStore::open_in_memory().await.unwrap();
  let payloads = PayloadDir::open(&upload_dir).await.unwrap();

  let state = AppState {
    store:    Arc::new(store),
    codec:    Arc::new(FakeCodec::default()),
    payloads: Arc::new(payloads),
    config:   Arc::new(ServerConfig {
      host: "127.0.0.1".to_owned(),
      port: 8080,
      store_path: PathBuf::from(":memory:"),
      upload_dir,
      codec_program: PathBuf::from("unused"),
      ownership,
      waveform_only,
      default_rows: 10_000,
      max_upload_bytes: 1024 * 1024,
    }),
  };
  Harness { state, _dir: dir }
}

pub async fn harness() -> Harness { harness_with(OwnershipMode::Global, false).await }

/// Account plus profile. The password hash is only valid when `password`
/// is given; workflow tests skip the argon2 cost.
pub async fn user(store: &SqliteStore, username: &str, password: Option<&str>) -> UserProfile {
  let hash = match password {
    Some(p) => hash_password(p).unwrap(),
    None => "unusable".to_owned(),
  };
  let account = store
    .add_account(username.to_owned(), hash)
    .await
    .unwrap()
    .created()
    .unwrap();
  store
    .add_profile(NewProfile {
      account_id:     account.account_id,
      name:           username.to_uppercase(),
      mobile:         "12345678".into(),
      specialization: Some("cardiology".into()),
    })
    .await
    .unwrap()
}
