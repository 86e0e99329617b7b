//! This module defines the errors that can come up while writing input decks,
//! reading output decks or running the solver.

use std::error::Error;
use std::fmt::Display;
use std::io;

/// Everything that can go wrong in this library.
#[derive(Debug)]
#[non_exhaustive]
pub enum DeckError {
  /// A number is too large (or not finite) to fit in a fixed-width field.
  FormattingOverflow(f64),
  /// A block's begin or end marker was not found in an output deck.
  BlockNotFound(String),
  /// Reading or writing a deck failed.
  Io(io::Error),
  /// A token inside a numeric table could not be parsed.
  BadNumber(String),
  /// A numeric table row has a different number of columns than the first.
  RaggedTable {
    /// Index of the offending row.
    row: usize,
    /// Number of columns in the first row.
    expected: usize,
    /// Number of columns in the offending row.
    found: usize
  },
  /// The solver run did not finish successfully.
  ExternalProcessFailure(String),
  /// A case is missing data or has nonsensical inputs.
  InvalidCase(String)
}

impl Display for DeckError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::FormattingOverflow(x) => write!(
        f,
        "cannot fit {} in a fixed-width field",
        x
      ),
      Self::BlockNotFound(name) => write!(
        f,
        "block \"{}\" not found in output deck",
        name
      ),
      Self::Io(e) => e.fmt(f),
      Self::BadNumber(tok) => write!(f, "could not parse \"{}\" as a number", tok),
      Self::RaggedTable { row, expected, found } => write!(
        f,
        "table row {} has {} columns, expected {}",
        row,
        found,
        expected
      ),
      Self::ExternalProcessFailure(why) => write!(
        f,
        "solver run not successful: {}",
        why
      ),
      Self::InvalidCase(why) => write!(f, "invalid case: {}", why)
    };
  }
}

impl Error for DeckError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Io(e) => Some(e),
      _ => None
    };
  }
}

impl From<io::Error> for DeckError {
  fn from(value: io::Error) -> Self {
    return Self::Io(value);
  }
}

/// Shorthand for results in this library.
pub type DeckResult<T> = Result<T, DeckError>;
