//! This library implements types and functions to write input decks for the
//! PANAIR panel-method solver and to read back the data in its output decks.
//!
//! Both kinds of deck are plain text. Input decks are made of named blocks of
//! ten-column fields; output decks wrap every block of results in marker
//! lines. The library also includes a polyline coarsening routine used to thin
//! out the profiles of axisymmetric bodies before they become networks, and a
//! `Case` type that puts everything together with sane defaults.
//!
//! Running the solver is left to the user of the library through the
//! `SolverRunner` trait.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub mod blocks;
pub mod case;
pub mod deck;
pub mod error;
pub mod fields;
pub mod network;
pub mod output;
pub mod simplify;

/// Imports the most relevant exports from the library.
pub mod prelude {
  pub use crate::case::*;
  pub use crate::deck::*;
  pub use crate::error::*;
  pub use crate::fields::{Field, FIELD_WIDTH};
  pub use crate::network::*;
  pub use crate::output::*;
  pub use crate::simplify::*;
}

#[cfg(test)]
mod tests;
