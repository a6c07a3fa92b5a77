//! Tabular waveform data: parsing, numeric cleaning, selection, and CSV
//! export.
//!
//! Cleaning is lossy. Cells that do not parse as finite numbers become gaps;
//! gaps are linearly interpolated per column (trailing gaps carry the last
//! value forward, leading gaps stay), columns without a single numeric value
//! are dropped, and any row that still has a gap is dropped. Nothing is
//! reported about what was discarded.

use std::io;

use serde::Serialize;

use crate::{Error, Result};

/// Chart row cap applied when the caller does not pass one.
pub const DEFAULT_ROW_CAP: usize = 10_000;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A named numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
  pub name:   String,
  pub values: Vec<f64>,
}

/// A cleaned table: every column has the same length and no gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
  time:     Option<Column>,
  channels: Vec<Column>,
}

/// An inclusive time window in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
  start: f64,
  end:   f64,
}

/// Which part of a table to keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
  /// Channel names to keep. `None` or empty keeps every channel.
  pub channels: Option<Vec<String>>,
  pub interval: Option<Interval>,
}

// ─── Interval ────────────────────────────────────────────────────────────────

impl Interval {
  /// `start` defaults to 0 and `end` to unbounded.
  pub fn new(start: Option<f64>, end: Option<f64>) -> Result<Self> {
    let start = start.unwrap_or(0.0);
    let end = end.unwrap_or(f64::INFINITY);
    if start.is_nan() || end.is_nan() {
      return Err(Error::InvalidInterval("bounds must be numbers".into()));
    }
    if start < 0.0 || end < 0.0 {
      return Err(Error::InvalidInterval("bounds must not be negative".into()));
    }
    if start > end {
      return Err(Error::InvalidInterval(format!(
        "start {start} is after end {end}"
      )));
    }
    Ok(Self { start, end })
  }

  pub fn start(&self) -> f64 { self.start }

  pub fn end(&self) -> f64 { self.end }

  pub fn contains(&self, t: f64) -> bool { t >= self.start && t <= self.end }
}

// ─── Parsing and cleaning ────────────────────────────────────────────────────

fn is_time_header(name: &str) -> bool {
  name.trim().to_ascii_lowercase().starts_with("time")
}

fn parse_cell(cell: &str) -> Option<f64> {
  cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fill interior gaps linearly and trailing gaps with the last value.
fn interpolate(values: &mut [Option<f64>]) {
  let mut last: Option<(usize, f64)> = None;
  for i in 0..values.len() {
    let Some(v) = values[i] else { continue };
    if let Some((j, prev)) = last
      && i > j + 1
    {
      let span = (i - j) as f64;
      for (k, slot) in values.iter_mut().enumerate().take(i).skip(j + 1) {
        *slot = Some(prev + (v - prev) * (k - j) as f64 / span);
      }
    }
    last = Some((i, v));
  }
  if let Some((j, prev)) = last {
    for slot in &mut values[j + 1..] {
      *slot = Some(prev);
    }
  }
}

impl Table {
  /// Read CSV with a header row, keeping at most `row_cap` data rows before
  /// cleaning.
  pub fn from_csv<R: io::Read>(reader: R, row_cap: Option<usize>) -> Result<Self> {
    let mut rdr = csv::ReaderBuilder::new()
      .trim(csv::Trim::All)
      .flexible(true)
      .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    if headers.iter().all(|h| h.is_empty()) {
      return Err(Error::EmptyTable);
    }

    let mut raw: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
    for record in rdr.records().take(row_cap.unwrap_or(usize::MAX)) {
      let record = record?;
      for (i, column) in raw.iter_mut().enumerate() {
        column.push(record.get(i).and_then(parse_cell));
      }
    }

    Ok(Self::clean(headers, raw))
  }

  fn clean(headers: Vec<String>, raw: Vec<Vec<Option<f64>>>) -> Self {
    let time_idx = headers.iter().position(|h| is_time_header(h));

    let columns: Vec<(bool, String, Vec<Option<f64>>)> = headers
      .into_iter()
      .zip(raw)
      .enumerate()
      .map(|(i, (name, mut values))| {
        interpolate(&mut values);
        (Some(i) == time_idx, name, values)
      })
      .filter(|(_, _, values)| values.iter().any(Option::is_some))
      .collect();

    let rows = columns.first().map_or(0, |(_, _, v)| v.len());
    let complete: Vec<bool> = (0..rows)
      .map(|r| columns.iter().all(|(_, _, v)| v[r].is_some()))
      .collect();

    let mut time = None;
    let mut channels = Vec::new();
    for (is_time, name, values) in columns {
      let values: Vec<f64> = values
        .into_iter()
        .zip(&complete)
        .filter_map(|(v, keep)| if *keep { v } else { None })
        .collect();
      let column = Column { name, values };
      if is_time {
        time = Some(column);
      } else {
        channels.push(column);
      }
    }

    Self { time, channels }
  }

  // ── Accessors ────────────────────────────────────────────────────────────

  pub fn time(&self) -> Option<&Column> { self.time.as_ref() }

  pub fn channels(&self) -> &[Column] { &self.channels }

  pub fn channel_names(&self) -> impl Iterator<Item = &str> {
    self.channels.iter().map(|c| c.name.as_str())
  }

  /// Number of rows.
  pub fn len(&self) -> usize {
    self
      .time
      .as_ref()
      .or(self.channels.first())
      .map_or(0, |c| c.values.len())
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Horizontal-axis values: the time column if present, else row indices.
  pub fn x_values(&self) -> Vec<f64> {
    match &self.time {
      Some(t) => t.values.clone(),
      None => (0..self.len()).map(|i| i as f64).collect(),
    }
  }

  // ── Selection ────────────────────────────────────────────────────────────

  /// Apply `selection`, keeping the table's own channel order.
  pub fn select(&self, selection: &Selection) -> Result<Table> {
    let wanted = selection
      .channels
      .as_ref()
      .filter(|names| !names.is_empty());

    if let Some(names) = wanted {
      for name in names {
        if !self.channels.iter().any(|c| &c.name == name) {
          return Err(Error::UnknownChannel(name.clone()));
        }
      }
    }

    let keep_rows: Vec<bool> = match selection.interval {
      Some(interval) => {
        let time = self.time.as_ref().ok_or(Error::NoTimeAxis)?;
        time.values.iter().map(|t| interval.contains(*t)).collect()
      }
      None => vec![true; self.len()],
    };

    let filter_rows = |column: &Column| Column {
      name:   column.name.clone(),
      values: column
        .values
        .iter()
        .zip(&keep_rows)
        .filter_map(|(v, keep)| keep.then_some(*v))
        .collect(),
    };

    Ok(Table {
      time:     self.time.as_ref().map(filter_rows),
      channels: self
        .channels
        .iter()
        .filter(|c| wanted.is_none_or(|names| names.contains(&c.name)))
        .map(filter_rows)
        .collect(),
    })
  }

  /// The first `rows` rows.
  pub fn head(&self, rows: usize) -> Table {
    let truncate = |column: &Column| Column {
      name:   column.name.clone(),
      values: column.values.iter().take(rows).copied().collect(),
    };
    Table {
      time:     self.time.as_ref().map(truncate),
      channels: self.channels.iter().map(truncate).collect(),
    }
  }

  // ── Export ───────────────────────────────────────────────────────────────

  /// Write the table as CSV with a header row; the time column comes first.
  pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let columns: Vec<&Column> = self.time.iter().chain(&self.channels).collect();

    wtr.write_record(columns.iter().map(|c| c.name.as_str()))?;
    for row in 0..self.len() {
      wtr.write_record(columns.iter().map(|c| c.values[row].to_string()))?;
    }
    wtr.flush()?;
    Ok(())
  }

  pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    self.write_csv(&mut buf)?;
    Ok(buf)
  }
}
