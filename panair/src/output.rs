//! This module implements the output deck reader. PANAIR wraps every output
//! block in a pair of marker lines, `0*b*<name>` and `0*e*<name>`; the reader
//! finds them and turns the lines in between into a table of numbers.

use std::fs;
use std::path::Path;

use log::debug;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{DeckError, DeckResult};
use crate::fields::decode_line;

/// The name of the output deck PANAIR writes in its working directory.
pub const OUTPUT_FILENAME: &str = "panair.out";

/// Precedes the name of a block in its begin marker.
pub const BEGIN_MARKER: &str = "0*b*";

/// Precedes the name of a block in its end marker.
pub const END_MARKER: &str = "0*e*";

/// A table of numbers read from an output block.
pub type NumericTable = DMatrix<f64>;

/// The output blocks we know the layout of.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum KnownBlock {
  /// Flow properties at the requested off-body points.
  OffBody
}

impl KnownBlock {
  /// The name between the block markers.
  pub const fn name(&self) -> &'static str {
    return match self {
      Self::OffBody => "off-body"
    };
  }

  /// How many lines of column headings come before the numbers.
  pub const fn header_lines(&self) -> usize {
    return match self {
      Self::OffBody => 6
    };
  }
}

/// Finds the lines strictly between the markers of the first block with a
/// given name. The end marker is the first one after the begin marker.
pub fn locate_block<'a>(text: &'a str, name: &str) -> DeckResult<Vec<&'a str>> {
  let begin_flag = format!("{}{}", BEGIN_MARKER, name);
  let end_flag = format!("{}{}", END_MARKER, name);
  let not_found = || DeckError::BlockNotFound(name.to_owned());
  let mut lines = text.lines();
  lines.by_ref()
    .find(|l| l.contains(&begin_flag))
    .ok_or_else(not_found)?;
  let mut inside: Vec<&str> = Vec::new();
  for line in lines {
    if line.contains(&end_flag) {
      return Ok(inside);
    }
    inside.push(line);
  }
  return Err(not_found());
}

/// Parses lines of whitespace-separated numbers into a table. Blank lines are
/// skipped; every other line must have as many numbers as the first one.
pub fn parse_table(lines: &[&str]) -> DeckResult<NumericTable> {
  let mut rows: Vec<Vec<f64>> = Vec::new();
  for line in lines.iter().filter(|l| !l.trim().is_empty()) {
    let row = decode_line(line)?;
    if let Some(first) = rows.first() {
      if first.len() != row.len() {
        return Err(DeckError::RaggedTable {
          row: rows.len(),
          expected: first.len(),
          found: row.len()
        });
      }
    }
    rows.push(row);
  }
  let ncols = rows.first().map_or(0, |r| r.len());
  return Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]));
}

/// An output deck, read in full.
#[derive(Clone, Debug)]
pub struct OutputDeck {
  /// The text of the deck.
  text: String
}

impl OutputDeck {
  /// Wraps the text of an output deck.
  pub fn from_text<S: Into<String>>(text: S) -> Self {
    return Self { text: text.into() };
  }

  /// Reads an output deck from a file.
  pub fn from_file<P: AsRef<Path>>(path: P) -> DeckResult<Self> {
    let text = fs::read_to_string(path.as_ref())?;
    debug!("Read output deck {}.", path.as_ref().display());
    return Ok(Self::from_text(text));
  }

  /// The lines of a block.
  pub fn block(&self, name: &str) -> DeckResult<Vec<&str>> {
    return locate_block(&self.text, name);
  }

  /// Parses a block into a table after skipping its heading lines.
  pub fn table(&self, name: &str, header_lines: usize) -> DeckResult<NumericTable> {
    let lines = self.block(name)?;
    let data = lines.get(header_lines..).unwrap_or(&[]);
    let table = parse_table(data)?;
    debug!(
      "Block \"{}\" has a {}x{} table.",
      name,
      table.nrows(),
      table.ncols()
    );
    return Ok(table);
  }

  /// Parses a block whose layout we know.
  pub fn known_table(&self, block: KnownBlock) -> DeckResult<NumericTable> {
    return self.table(block.name(), block.header_lines());
  }

  /// Flow properties at the off-body points, one row per point.
  pub fn offbody_data(&self) -> DeckResult<NumericTable> {
    return self.known_table(KnownBlock::OffBody);
  }

  /// Whether the deck shows the run got through: at least one output block
  /// was closed.
  pub fn check_successful(&self) -> bool {
    return self.text.contains(END_MARKER);
  }
}
