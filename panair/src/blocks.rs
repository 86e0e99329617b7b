//! This module assembles the bodies of input blocks out of fields: pairs of
//! header and value lines, and point data laid out two points per line.

use itertools::Itertools;
use nalgebra::Point3;

use crate::error::DeckResult;
use crate::fields::*;
use crate::network::{Network, WakeNetwork};

/// Marks the first label of a header line.
pub const HEADER_MARKER: char = '=';

/// Points that go in one physical line.
pub const POINTS_PER_LINE: usize = 2;

/// Column where network names start in network header lines.
const NAME_COLUMN: usize = 61;

/// Creates a header line out of labels.
pub fn header_line<S: AsRef<str>>(labels: &[S]) -> String {
  let mut header = String::new();
  for (i, label) in labels.iter().enumerate() {
    if i == 0 {
      header.push_str(&format_label(&format!("{}{}", HEADER_MARKER, label.as_ref())));
    } else {
      header.push_str(&format_label(label.as_ref()));
    }
  }
  header.push('\n');
  return header;
}

/// Creates a line of values.
pub fn value_line(fields: &[Field]) -> DeckResult<String> {
  let mut line = String::new();
  for field in fields {
    line.push_str(&field.encode()?);
  }
  line.push('\n');
  return Ok(line);
}

/// Creates a header line and the value line under it.
pub fn line_pair(pairs: &[(&str, Field)]) -> DeckResult<String> {
  let labels = pairs.iter().map(|(l, _)| *l).collect::<Vec<_>>();
  let fields = pairs.iter().map(|(_, f)| f.clone()).collect::<Vec<_>>();
  let values = value_line(&fields)?;
  return Ok(header_line(labels.as_slice()) + &values);
}

/// Writes the three coordinates of a point, thirty columns total.
pub fn coord_triple(p: &Point3<f64>) -> DeckResult<String> {
  return Ok(format_coord(p.x)? + &format_coord(p.y)? + &format_coord(p.z)?);
}

/// Writes points two to a line. A half-filled last line is also terminated.
pub fn point_lines<'a, I>(points: I) -> DeckResult<String>
  where I: IntoIterator<Item = &'a Point3<f64>> {
  let mut text = String::new();
  for chunk in &points.into_iter().chunks(POINTS_PER_LINE) {
    for p in chunk {
      text.push_str(&coord_triple(p)?);
    }
    text.push('\n');
  }
  return Ok(text);
}

/// Pads the fixed part of a header line and appends a name at its column.
fn named_header(fixed: &str, name: &str) -> String {
  return format!("{:<w$}{}\n", fixed, name, w = NAME_COLUMN);
}

/// Writes a network: its header, its dimensions, and then its points, column
/// by column, each column starting on a fresh line.
pub fn network_body(network: &Network) -> DeckResult<String> {
  let fixed = format_label(&format!("{}nm", HEADER_MARKER)) + "nn";
  let mut text = named_header(&fixed, &network.name);
  text.push_str(&value_line(&[
    Field::Setting(network.rows() as f64),
    Field::Setting(network.columns() as f64)
  ])?);
  for column in network.points.column_iter() {
    text.push_str(&point_lines(column.iter())?);
  }
  return Ok(text);
}

/// Writes a trailing wake definition.
pub fn wake_body(wake: &WakeNetwork) -> DeckResult<String> {
  let fixed = header_line(&["inat", "insd", "xwake", "twake"]);
  let mut text = named_header(fixed.trim_end_matches('\n'), &wake.name);
  text.push_str(&value_line(&[
    Field::Label(wake.inat.clone()),
    Field::Setting(wake.insd.into()),
    Field::Setting(wake.xwake),
    Field::Setting(wake.twake)
  ])?);
  return Ok(text);
}
