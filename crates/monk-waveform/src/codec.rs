//! The `WaveformCodec` trait, our boundary to the binary waveform format.
//!
//! Header parsing, tabular conversion, and anonymisation of recordings are
//! performed by an external codec. Higher layers depend on this trait, never
//! on a concrete codec.

use std::{
  future::Future,
  path::{Path, PathBuf},
};

use crate::header::WaveformHeader;

/// File extension (without the dot) of recordings the codec understands.
pub const WAVEFORM_EXTENSION: &str = "mwf";

/// Whether `name` carries the waveform extension, compared
/// case-insensitively.
pub fn is_waveform(name: &str) -> bool { has_extension(name, WAVEFORM_EXTENSION) }

/// Whether `name` ends in `.{ext}`, compared case-insensitively.
pub fn has_extension(name: &str, ext: &str) -> bool {
  Path::new(name)
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// `dir/stem.ext` → `dir/stem{suffix}.{ext}`.
pub fn sibling_path(path: &Path, suffix: &str, ext: &str) -> PathBuf {
  let stem = path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

/// Abstraction over a waveform codec.
///
/// Calls may be slow and blocking inside the codec; implementations must not
/// block the async runtime.
pub trait WaveformCodec: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Parse the header of the recording at `path`.
  fn read_header<'a>(
    &'a self,
    path: &'a Path,
  ) -> impl Future<Output = Result<WaveformHeader, Self::Error>> + Send + 'a;

  /// Convert the recording at `path` to a CSV file at `output`. The first
  /// column is the time in seconds, followed by one column per channel.
  fn convert_to_csv<'a>(
    &'a self,
    path: &'a Path,
    output: &'a Path,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Write an anonymised copy of the recording at `path` to `output`.
  fn anonymize<'a>(
    &'a self,
    path: &'a Path,
    output: &'a Path,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn waveform_extension_is_case_insensitive() {
    assert!(is_waveform("trace1.mwf"));
    assert!(is_waveform("TRACE1.MWF"));
    assert!(!is_waveform("notes.txt"));
    assert!(!is_waveform("mwf"));
    assert!(!is_waveform("trace.mwf.txt"));
  }

  #[test]
  fn sibling_path_keeps_directory() {
    let p = sibling_path(Path::new("/data/abc.mwf"), "_anonymized", "mwf");
    assert_eq!(p, PathBuf::from("/data/abc_anonymized.mwf"));
  }
}
