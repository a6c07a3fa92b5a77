//! Waveform boundary for monk.
//!
//! The binary recording format is handled by an external codec behind the
//! [`WaveformCodec`] trait. This crate owns what happens on our side of that
//! boundary: the optional-field [`WaveformHeader`], the tabular pipeline
//! (parse, clean, select, export), and chart construction and rendering.
//!
//! # Quick start
//!
//! ```no_run
//! use monk_waveform::{Chart, Layout, Selection, Table};
//!
//! let csv = "time,II,V5\n0.0,1.2,0.8\n0.002,1.3,0.7\n";
//! let table = Table::from_csv(csv.as_bytes(), None).unwrap();
//! let chart = Chart::build(&table.select(&Selection::default()).unwrap(), Layout::Combined);
//! println!("{} channels", chart.channel_names().len());
//! ```

pub mod chart;
pub mod codec;
pub mod command;
pub mod error;
pub mod header;
pub mod render;
pub mod table;

pub use chart::{Chart, Layout};
pub use codec::{WAVEFORM_EXTENSION, WaveformCodec, is_waveform};
pub use command::CommandCodec;
pub use error::{Error, Result};
pub use header::WaveformHeader;
pub use table::{DEFAULT_ROW_CAP, Interval, Selection, Table};
