//! File-derived downloads and charts.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/files/{id}/raw` | `.mwf` only. `?anonymize=true` |
//! | `GET` | `/files/{id}/header` | `text/plain`. `?anonymize=true` |
//! | `GET` | `/files/{id}/csv` | `?channels=I,II&start=0&end=2.5&rows=500` |
//! | `GET` | `/files/{id}/chart` | As `csv`, plus `&combined=true&format=json\|svg` |
//!
//! Every request re-runs the access check. Conversion goes through the
//! codec into a temporary file next to the payload; tables are cleaned
//! lossily (see [`monk_waveform::table`]). The row cap applies to the
//! selected rows. CSV exports are uncapped unless `rows` is given; charts
//! fall back to `default_rows`.

use std::path::{Path as FsPath, PathBuf};

use axum::{
  Json,
  body::Body,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use monk_core::{access::authorize_file, file::File, store::ResearchStore};
use monk_waveform::{
  Chart, Interval, Layout, Selection, Table, WaveformCodec,
  codec::{has_extension, sibling_path},
  render::{DEFAULT_SIZE, render_svg},
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError};

// ─── Parameters ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
  #[serde(default)]
  pub anonymize: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
  #[default]
  Json,
  Svg,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
  /// Comma-separated channel names.
  pub channels: Option<String>,
  /// Interval start in seconds.
  pub start:    Option<f64>,
  /// Interval end in seconds.
  pub end:      Option<f64>,
  /// Keep at most this many selected rows.
  pub rows:     Option<usize>,
  #[serde(default)]
  pub combined: bool,
  #[serde(default)]
  pub format:   ChartFormat,
}

impl ExportParams {
  pub fn selection(&self) -> Result<Selection, ApiError> {
    let channels = self.channels.as_deref().map(|list| {
      list
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>()
    });
    let interval = if self.start.is_some() || self.end.is_some() {
      Some(Interval::new(self.start, self.end)?)
    } else {
      None
    };
    Ok(Selection {
      channels: channels.filter(|c| !c.is_empty()),
      interval,
    })
  }

  fn row_cap(&self, default_rows: Option<usize>) -> Result<Option<usize>, ApiError> {
    match self.rows {
      Some(0) => Err(ApiError::BadRequest("rows must be positive".into())),
      Some(n) => Ok(Some(n)),
      None => Ok(default_rows),
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn attachment(content_type: &str, filename: &str, body: impl Into<Body>) -> Response {
  let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
  (
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, content_type.to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    body.into(),
  )
    .into_response()
}

fn file_stem(file: &File) -> String {
  FsPath::new(&file.filename)
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| file.file_id.to_string())
}

fn require_waveform(file: &File) -> Result<(), ApiError> {
  if !file.is_waveform() {
    return Err(ApiError::BadRequest(format!(
      "{} is not a waveform recording",
      file.filename
    )));
  }
  Ok(())
}

/// Path of the recording to read: the payload, or an anonymised copy
/// written beside it.
async fn recording_path<S, C>(
  state: &AppState<S, C>,
  file: &File,
  anonymize: bool,
) -> Result<PathBuf, ApiError>
where
  S: ResearchStore,
  C: WaveformCodec,
{
  let path = state.payloads.resolve(file);
  if !anonymize {
    return Ok(path);
  }
  let output = sibling_path(&path, "_anonymized", monk_waveform::WAVEFORM_EXTENSION);
  state
    .codec
    .anonymize(&path, &output)
    .await
    .map_err(ApiError::upstream)?;
  debug!(file_id = %file.file_id, output = %output.display(), "anonymised copy written");
  Ok(output)
}

/// Load `file` as a table, converting through the codec unless it is
/// already CSV.
async fn load_table<S, C>(
  state: &AppState<S, C>,
  file: &File,
) -> Result<Table, ApiError>
where
  S: ResearchStore,
  C: WaveformCodec,
{
  let path = state.payloads.resolve(file);
  let bytes = if has_extension(&file.filename, "csv") {
    tokio::fs::read(&path).await.map_err(ApiError::upstream)?
  } else if file.is_waveform() {
    let scratch = tempfile::Builder::new()
      .prefix("convert-")
      .suffix(".csv")
      .tempfile_in(state.payloads.root())
      .map_err(ApiError::upstream)?;
    state
      .codec
      .convert_to_csv(&path, scratch.path())
      .await
      .map_err(ApiError::upstream)?;
    tokio::fs::read(scratch.path()).await.map_err(ApiError::upstream)?
  } else {
    return Err(ApiError::BadRequest(format!(
      "{} has no tabular representation",
      file.filename
    )));
  };

  Ok(Table::from_csv(bytes.as_slice(), None)?)
}

async fn selected_table<S, C>(
  state: &AppState<S, C>,
  file: &File,
  params: &ExportParams,
  default_rows: Option<usize>,
) -> Result<Table, ApiError>
where
  S: ResearchStore,
  C: WaveformCodec,
{
  // Parameters are checked before the codec runs.
  let selection = params.selection()?;
  let row_cap = params.row_cap(default_rows)?;
  let table = load_table(state, file).await?.select(&selection)?;
  Ok(match row_cap {
    Some(rows) => table.head(rows),
    None => table,
  })
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /files/{id}/raw[?anonymize=true]`
pub async fn raw<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
  Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let (file, _) = authorize_file(&*state.store, identity.account_id(), id).await?;
  require_waveform(&file)?;

  let path = recording_path(&state, &file, params.anonymize).await?;
  let bytes = tokio::fs::read(&path).await.map_err(ApiError::upstream)?;
  let name = if params.anonymize {
    format!("{}_anonymized.mwf", file_stem(&file))
  } else {
    file.filename.clone()
  };
  Ok(attachment("application/octet-stream", &name, bytes))
}

/// `GET /files/{id}/header[?anonymize=true]`
pub async fn header<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
  Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let (file, _) = authorize_file(&*state.store, identity.account_id(), id).await?;
  require_waveform(&file)?;

  let path = recording_path(&state, &file, params.anonymize).await?;
  let header = state
    .codec
    .read_header(&path)
    .await
    .map_err(ApiError::upstream)?;
  let name = format!("{}_header.txt", file_stem(&file));
  Ok(attachment("text/plain; charset=utf-8", &name, header.to_string()))
}

/// `GET /files/{id}/csv`
pub async fn csv<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
  Query(params): Query<ExportParams>,
) -> Result<Response, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let (file, _) = authorize_file(&*state.store, identity.account_id(), id).await?;
  let table = selected_table(&state, &file, &params, None).await?;
  let bytes = table.to_csv_bytes()?;
  let name = format!("{}_selected.csv", file_stem(&file));
  Ok(attachment("text/csv; charset=utf-8", &name, bytes))
}

/// `GET /files/{id}/chart`
pub async fn chart<S, C>(
  State(state): State<AppState<S, C>>,
  identity: Identity,
  Path(id): Path<Uuid>,
  Query(params): Query<ExportParams>,
) -> Result<Response, ApiError>
where
  S: ResearchStore + 'static,
  C: WaveformCodec + 'static,
{
  let (file, _) = authorize_file(&*state.store, identity.account_id(), id).await?;
  let table = selected_table(&state, &file, &params, Some(state.config.default_rows)).await?;
  let chart = Chart::build(&table, Layout::from_combined(params.combined));

  match params.format {
    ChartFormat::Json => Ok(Json(chart).into_response()),
    ChartFormat::Svg => {
      let svg = render_svg(&chart, DEFAULT_SIZE)?;
      Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn channel_list_is_split_and_trimmed() {
    let params = ExportParams { channels: Some(" I, II ,,".into()), ..Default::default() };
    let selection = params.selection().unwrap();
    assert_eq!(selection.channels, Some(vec!["I".to_owned(), "II".to_owned()]));
    assert!(selection.interval.is_none());
  }

  #[test]
  fn empty_channel_list_selects_everything() {
    let params = ExportParams { channels: Some(",".into()), ..Default::default() };
    assert_eq!(params.selection().unwrap().channels, None);
  }

  #[test]
  fn reversed_interval_is_a_bad_request() {
    let params = ExportParams { start: Some(2.0), end: Some(1.0), ..Default::default() };
    assert_eq!(params.selection().unwrap_err().status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn zero_rows_is_rejected() {
    let params = ExportParams { rows: Some(0), ..Default::default() };
    assert!(params.row_cap(Some(10)).is_err());
    assert!(params.row_cap(None).is_err());
  }

  #[test]
  fn row_cap_falls_back_to_the_handler_default() {
    assert_eq!(ExportParams::default().row_cap(Some(10)).unwrap(), Some(10));
    assert_eq!(ExportParams::default().row_cap(None).unwrap(), None);
    let params = ExportParams { rows: Some(3), ..Default::default() };
    assert_eq!(params.row_cap(None).unwrap(), Some(3));
  }
}
