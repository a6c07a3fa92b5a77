//! SVG rendering of a [`Chart`] with `plotters`.

use plotters::prelude::*;

use crate::{
  Error, Result,
  chart::Chart,
};

/// Default canvas size in pixels.
pub const DEFAULT_SIZE: (u32, u32) = (1000, 600);

const PALETTE: [RGBColor; 6] = [
  RGBColor(0x1f, 0x77, 0xb4),
  RGBColor(0xff, 0x7f, 0x0e),
  RGBColor(0x2c, 0xa0, 0x2c),
  RGBColor(0xd6, 0x27, 0x28),
  RGBColor(0x94, 0x67, 0xbd),
  RGBColor(0x8c, 0x56, 0x4b),
];

fn render_err<E: std::fmt::Display>(e: E) -> Error { Error::Render(e.to_string()) }

/// Min and max of `values`, padded by `pad` of the span. Degenerate input
/// yields a usable unit range.
fn bounds(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
  let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
    (lo.min(v), hi.max(v))
  });
  if !lo.is_finite() || !hi.is_finite() {
    return (0.0, 1.0);
  }
  if lo == hi {
    return (lo - 1.0, hi + 1.0);
  }
  let margin = (hi - lo) * pad;
  (lo - margin, hi + margin)
}

/// Render `chart` to an SVG document. Panels are stacked vertically and share
/// the horizontal range.
pub fn render_svg(chart: &Chart, size: (u32, u32)) -> Result<String> {
  let mut svg = String::new();
  {
    let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let body = root
      .titled(&chart.title, ("sans-serif", 20))
      .map_err(render_err)?;

    let areas = body.split_evenly((chart.panels.len().max(1), 1));
    let (x_min, x_max) = bounds(
      chart
        .panels
        .iter()
        .flat_map(|p| &p.traces)
        .flat_map(|t| t.points.iter().map(|p| p[0])),
      0.0,
    );

    let mut color_idx = 0;
    for (panel, area) in chart.panels.iter().zip(&areas) {
      let (y_min, y_max) = bounds(
        panel
          .traces
          .iter()
          .flat_map(|t| t.points.iter().map(|p| p[1])),
        0.1,
      );

      let mut ctx = ChartBuilder::on(area)
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(render_err)?;

      {
        let mut mesh = ctx.configure_mesh();
        mesh.x_desc(chart.x_label.as_str());
        if let Some(label) = &panel.y_label {
          mesh.y_desc(label.as_str());
        }
        mesh.draw().map_err(render_err)?;
      }

      for trace in &panel.traces {
        let color = PALETTE[color_idx % PALETTE.len()];
        color_idx += 1;
        ctx
          .draw_series(LineSeries::new(
            trace.points.iter().map(|p| (p[0], p[1])),
            ShapeStyle::from(&color).stroke_width(1),
          ))
          .map_err(render_err)?
          .label(trace.name.as_str())
          .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
      }

      ctx
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
  }
  Ok(svg)
}
