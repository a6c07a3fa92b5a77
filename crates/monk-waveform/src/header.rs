//! The parsed header of a waveform recording.
//!
//! Recordings routinely omit patient fields, so every such field is an
//! `Option`. Defaults are applied by the accessor methods.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder used for a missing patient name or sex.
pub const UNKNOWN: &str = "Unknown";

/// Marker some recorders write instead of leaving a field empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// One recorded channel (lead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
  /// Channel attribute, e.g. `"II"` or `"V5"`. Used as the column name in
  /// tabular output.
  pub attribute:        String,
  #[serde(default, rename = "samplingRateHz", skip_serializing_if = "Option::is_none")]
  pub sampling_rate_hz: Option<f64>,
}

/// Header metadata extracted by a [`crate::WaveformCodec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformHeader {
  #[serde(default, rename = "patientID")]
  pub patient_id:       Option<String>,
  #[serde(default, rename = "measurementTimeISO")]
  pub measurement_time: Option<String>,
  #[serde(default, rename = "patientName")]
  pub patient_name:     Option<String>,
  #[serde(default, rename = "patientSex")]
  pub patient_sex:      Option<String>,
  #[serde(default, rename = "birthDateISO")]
  pub birth_date:       Option<String>,
  #[serde(default)]
  pub channels:         Vec<ChannelInfo>,
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl WaveformHeader {
  /// The patient identifier, if the header carries a non-blank one.
  pub fn patient_id(&self) -> Option<&str> { present(&self.patient_id) }

  /// The ISO measurement timestamp, if the header carries a non-blank one.
  pub fn measurement_time(&self) -> Option<&str> {
    present(&self.measurement_time)
  }

  /// Patient name, or [`UNKNOWN`].
  pub fn patient_name(&self) -> &str {
    present(&self.patient_name).unwrap_or(UNKNOWN)
  }

  /// Patient sex, or [`UNKNOWN`].
  pub fn patient_sex(&self) -> &str {
    present(&self.patient_sex).unwrap_or(UNKNOWN)
  }

  /// The raw birth-date string, with the [`NOT_AVAILABLE`] marker treated as
  /// absent. Parsing is left to the caller.
  pub fn birth_date(&self) -> Option<&str> {
    present(&self.birth_date).filter(|d| *d != NOT_AVAILABLE)
  }

  pub fn channel_names(&self) -> impl Iterator<Item = &str> {
    self.channels.iter().map(|c| c.attribute.as_str())
  }
}

impl fmt::Display for WaveformHeader {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_owned());
    writeln!(f, "Patient ID:       {}", field(&self.patient_id))?;
    writeln!(f, "Patient name:     {}", field(&self.patient_name))?;
    writeln!(f, "Patient sex:      {}", field(&self.patient_sex))?;
    writeln!(f, "Birth date:       {}", field(&self.birth_date))?;
    writeln!(f, "Measurement time: {}", field(&self.measurement_time))?;
    writeln!(f, "Channels:         {}", self.channels.len())?;
    for channel in &self.channels {
      match channel.sampling_rate_hz {
        Some(hz) => writeln!(f, "  {} ({hz} Hz)", channel.attribute)?,
        None => writeln!(f, "  {}", channel.attribute)?,
      }
    }
    Ok(())
  }
}
