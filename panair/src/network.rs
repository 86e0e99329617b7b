//! This module defines networks: the grids of surface points that make up a
//! PANAIR geometry, and the trailing wakes attached to them.

use nalgebra::{DMatrix, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{DeckError, DeckResult};

/// The PANAIR network type (boundary condition class), `kt` in the deck.
///
/// Networks that share a type go in the same points block.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
  Hash, derive_more::From, derive_more::Display
)]
pub struct NetworkKind(pub u32);

impl Default for NetworkKind {
  fn default() -> Self {
    return Self(1);
  }
}

/// A named grid of points. The grid has `nm` rows and `nn` columns and is
/// stored column-major, which is also the order the points go in the deck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Network {
  /// The network name, written at the end of its header line.
  pub name: String,
  /// The network type.
  pub kind: NetworkKind,
  /// The points, row by column.
  pub points: DMatrix<Point3<f64>>
}

impl Network {
  /// Creates a network from a grid of points.
  pub fn new<S: Into<String>>(
    name: S,
    kind: NetworkKind,
    points: DMatrix<Point3<f64>>
  ) -> Self {
    return Self { name: name.into(), kind, points };
  }

  /// Creates a network from a flat list of points, column by column, each
  /// column holding `rows` points.
  pub fn from_columns<S: Into<String>>(
    name: S,
    kind: NetworkKind,
    rows: usize,
    points: Vec<Point3<f64>>
  ) -> DeckResult<Self> {
    let name = name.into();
    if rows == 0 || points.len() % rows != 0 {
      return Err(DeckError::InvalidCase(format!(
        "network \"{}\" has {} points, not a multiple of {} rows",
        name,
        points.len(),
        rows
      )));
    }
    let cols = points.len() / rows;
    let grid = DMatrix::from_vec(rows, cols, points);
    return Ok(Self::new(name, kind, grid));
  }

  /// Number of points per column, `nm`.
  pub fn rows(&self) -> usize {
    return self.points.nrows();
  }

  /// Number of columns, `nn`.
  pub fn columns(&self) -> usize {
    return self.points.ncols();
  }
}

/// A trailing wake network definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WakeNetwork {
  /// The wake network name.
  pub name: String,
  /// The name of the network the wake is attached to.
  pub inat: String,
  /// The edge of `inat` the wake sheds from.
  pub insd: u32,
  /// The x coordinate the wake extends to.
  pub xwake: f64,
  /// Wake inclination option.
  pub twake: f64
}
