//! Chart structure built from a [`Table`].
//!
//! The chart is a plain data description; [`crate::render`] turns it into
//! SVG, and the API can return it as JSON for client-side plotting.

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// How channels are arranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
  /// Every channel overlaid in one panel.
  Combined,
  /// One panel per channel, sharing the horizontal axis.
  #[default]
  Stacked,
}

impl Layout {
  pub fn from_combined(combined: bool) -> Self {
    if combined { Self::Combined } else { Self::Stacked }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
  pub name:   String,
  pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
  pub y_label: Option<String>,
  pub traces:  Vec<Trace>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
  pub title:   String,
  pub layout:  Layout,
  pub x_label: String,
  pub panels:  Vec<Panel>,
}

impl Chart {
  pub fn build(table: &Table, layout: Layout) -> Self {
    let xs = table.x_values();
    let x_label = if table.time().is_some() { "Time" } else { "Index" }.to_owned();

    let traces = table.channels().iter().map(|column| Trace {
      name:   column.name.clone(),
      points: xs
        .iter()
        .zip(&column.values)
        .map(|(x, y)| [*x, *y])
        .collect(),
    });

    match layout {
      Layout::Combined => Self {
        title: "Combined Graph".to_owned(),
        layout,
        x_label,
        panels: vec![Panel {
          y_label: Some("Values".to_owned()),
          traces:  traces.collect(),
        }],
      },
      Layout::Stacked => Self {
        title: "Multiple Subplots Graph".to_owned(),
        layout,
        x_label,
        panels: traces
          .map(|trace| Panel {
            y_label: Some(trace.name.clone()),
            traces:  vec![trace],
          })
          .collect(),
      },
    }
  }

  /// Channel names in drawing order.
  pub fn channel_names(&self) -> Vec<&str> {
    self
      .panels
      .iter()
      .flat_map(|p| &p.traces)
      .map(|t| t.name.as_str())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Table {
    Table::from_csv("time,I,II,III\n0,1,2,3\n0.5,2,3,4\n".as_bytes(), None).unwrap()
  }

  #[test]
  fn combined_overlays_all_channels_in_one_panel() {
    let chart = Chart::build(&sample(), Layout::Combined);
    assert_eq!(chart.panels.len(), 1);
    assert_eq!(chart.channel_names(), ["I", "II", "III"]);
    assert_eq!(chart.x_label, "Time");
  }

  #[test]
  fn stacked_has_one_panel_per_channel() {
    let chart = Chart::build(&sample(), Layout::Stacked);
    assert_eq!(chart.panels.len(), 3);
    assert!(chart.panels.iter().all(|p| p.traces.len() == 1));
    assert_eq!(chart.panels[1].traces[0].points, [[0.0, 2.0], [0.5, 3.0]]);
  }

  #[test]
  fn rebuilding_with_same_parameters_is_identical() {
    let table = sample();
    assert_eq!(
      Chart::build(&table, Layout::Stacked),
      Chart::build(&table, Layout::Stacked)
    );
  }

  #[test]
  fn time_axis_label_ignores_the_column_spelling() {
    let table = Table::from_csv("Time[s],I\n0,1\n".as_bytes(), None).unwrap();
    assert_eq!(Chart::build(&table, Layout::Stacked).x_label, "Time");
  }

  #[test]
  fn index_axis_without_time_column() {
    let table = Table::from_csv("I\n5\n6\n".as_bytes(), None).unwrap();
    let chart = Chart::build(&table, Layout::Combined);
    assert_eq!(chart.x_label, "Index");
    assert_eq!(chart.panels[0].traces[0].points, [[0.0, 5.0], [1.0, 6.0]]);
  }
}
