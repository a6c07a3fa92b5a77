//! Error types for `monk-waveform`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to run codec program {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source:  std::io::Error,
  },

  #[error("codec program exited with status {status:?}: {stderr}")]
  CommandFailed {
    status: Option<i32>,
    stderr: String,
  },

  #[error("malformed header: {0}")]
  Header(#[from] serde_json::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("table has no columns")]
  EmptyTable,

  #[error("unknown channel: {0:?}")]
  UnknownChannel(String),

  #[error("interval selection needs a time column")]
  NoTimeAxis,

  #[error("invalid interval: {0}")]
  InvalidInterval(String),

  #[error("render error: {0}")]
  Render(String),
}

impl Error {
  /// Whether the error was caused by caller-supplied selection parameters
  /// rather than by the data or the codec.
  pub fn is_parameter_error(&self) -> bool {
    matches!(
      self,
      Self::UnknownChannel(_) | Self::NoTimeAxis | Self::InvalidInterval(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
