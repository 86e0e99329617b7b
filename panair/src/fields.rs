//! This module implements the fixed-width field codec: how single values are
//! written into the ten-column fields of a PANAIR input deck, and how lines of
//! an output deck are broken back into numbers.
//!
//! There are three kinds of field:
//!   - coordinates, written with as many decimals as fit in the field;
//!   - settings, written in their shortest form and left-justified;
//!   - labels, left-justified and never truncated.

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, DeckResult};

/// The width of a field, in characters.
pub const FIELD_WIDTH: usize = 10;

/// Magnitudes at or above this can't be written in a fixed-precision field.
pub const OVERFLOW_CEILING: f64 = 100000.0;

/// A single value, tagged with how it should be written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Field {
  /// A coordinate, written with adaptive fixed precision.
  Coord(f64),
  /// A numeric setting, written in free form.
  Setting(f64),
  /// A short string such as a label or a named option.
  Label(String)
}

impl From<&str> for Field {
  fn from(value: &str) -> Self {
    return Self::Label(value.to_owned());
  }
}

impl From<String> for Field {
  fn from(value: String) -> Self {
    return Self::Label(value);
  }
}

impl From<f64> for Field {
  fn from(value: f64) -> Self {
    return Self::Setting(value);
  }
}

impl From<u32> for Field {
  fn from(value: u32) -> Self {
    return Self::Setting(value.into());
  }
}

impl Field {
  /// Writes this field out.
  pub fn encode(&self) -> DeckResult<String> {
    return match self {
      Self::Coord(x) => format_coord(*x),
      Self::Setting(x) => Ok(format_setting(*x)),
      Self::Label(s) => Ok(format_label(s))
    };
  }
}

/// Returns the number of decimal places a coordinate gets so that it fits in
/// a field of a given width exactly.
///
/// One column goes to the decimal point, one to the sign if the sign bit is
/// set, and one per integer digit. If rounding would carry the number into one
/// more integer digit, a decimal is given up for it.
pub fn fixed_precision(x: f64, width: usize) -> DeckResult<usize> {
  let magnitude = x.abs();
  if !(magnitude < OVERFLOW_CEILING) {
    return Err(DeckError::FormattingOverflow(x));
  }
  let sign = usize::from(x.is_sign_negative());
  let mut int_digits: i32 = 1;
  for threshold in [10.0, 100.0, 1000.0, 10000.0] {
    if magnitude >= threshold {
      int_digits += 1;
    }
  }
  loop {
    let precision = width
      .checked_sub(sign + 1 + int_digits as usize)
      .ok_or(DeckError::FormattingOverflow(x))?;
    let scale = 10.0_f64.powi(precision as i32);
    let rounded = (magnitude * scale).round() / scale;
    if rounded < 10.0_f64.powi(int_digits) {
      return Ok(precision);
    }
    int_digits += 1;
  }
}

/// Writes a coordinate into a field, using every column available.
pub fn format_coord(x: f64) -> DeckResult<String> {
  let precision = fixed_precision(x, FIELD_WIDTH)?;
  return Ok(format!("{:<w$.p$}", x, w = FIELD_WIDTH, p = precision));
}

/// Writes a setting in its shortest round-trip form, padded to the field width.
///
/// Integral values keep a trailing ".0", and numbers far from unity switch to
/// exponent form with a signed two-digit exponent (`1e-05`, `2.5e+16`).
pub fn format_setting(x: f64) -> String {
  return format!("{:<w$}", setting_repr(x), w = FIELD_WIDTH);
}

/// The unpadded text of a setting.
pub fn setting_repr(x: f64) -> String {
  if x.is_nan() {
    return "nan".to_owned();
  }
  if x.is_infinite() {
    return if x > 0.0 { "inf" } else { "-inf" }.to_owned();
  }
  let shortest = format!("{:?}", x);
  return match shortest.split_once('e') {
    Some((mantissa, exponent)) => {
      let (sign, digits) = match exponent.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exponent)
      };
      format!("{}e{}{:0>2}", mantissa, sign, digits)
    },
    None => shortest
  };
}

/// Writes a label, left-justified. Longer labels are kept whole.
pub fn format_label(s: &str) -> String {
  return format!("{:<w$}", s, w = FIELD_WIDTH);
}

/// Breaks a line into whitespace-separated numbers.
pub fn decode_line(line: &str) -> DeckResult<Vec<f64>> {
  return line
    .split_whitespace()
    .map(|tok| {
      tok.parse::<f64>().map_err(|_| DeckError::BadNumber(tok.to_owned()))
    })
    .collect();
}
