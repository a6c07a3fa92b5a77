//! [`CommandCodec`]: a [`WaveformCodec`] backed by an external converter
//! program.
//!
//! The program is invoked once per operation:
//!
//! ```text
//! <program> header <path>            # JSON header on stdout
//! <program> csv <path> <output>      # writes CSV to <output>
//! <program> anonymize <path> <output>
//! ```
//!
//! A non-zero exit status is reported with the program's stderr.

use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
  process::Stdio,
};

use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result, codec::WaveformCodec, header::WaveformHeader};

#[derive(Debug, Clone)]
pub struct CommandCodec {
  program: PathBuf,
}

impl CommandCodec {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self { program: program.into() }
  }

  pub fn program(&self) -> &Path { &self.program }

  async fn run(&self, args: &[&OsStr]) -> Result<Vec<u8>> {
    let output = Command::new(&self.program)
      .args(args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .output()
      .await
      .map_err(|source| Error::Spawn {
        program: self.program.display().to_string(),
        source,
      })?;

    debug!(
      program = %self.program.display(),
      operation = ?args.first(),
      status = ?output.status.code(),
      "codec program finished"
    );

    if !output.status.success() {
      return Err(Error::CommandFailed {
        status: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
      });
    }
    Ok(output.stdout)
  }
}

impl WaveformCodec for CommandCodec {
  type Error = Error;

  async fn read_header<'a>(&'a self, path: &'a Path) -> Result<WaveformHeader> {
    let stdout = self
      .run(&[OsStr::new("header"), path.as_os_str()])
      .await?;
    Ok(serde_json::from_slice(&stdout)?)
  }

  async fn convert_to_csv<'a>(
    &'a self,
    path: &'a Path,
    output: &'a Path,
  ) -> Result<()> {
    self
      .run(&[OsStr::new("csv"), path.as_os_str(), output.as_os_str()])
      .await?;
    Ok(())
  }

  async fn anonymize<'a>(&'a self, path: &'a Path, output: &'a Path) -> Result<()> {
    self
      .run(&[OsStr::new("anonymize"), path.as_os_str(), output.as_os_str()])
      .await?;
    Ok(())
  }
}
