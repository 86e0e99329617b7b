//! This module implements case files: TOML descriptions of a PANAIR case whose
//! point data lives in CSV files next to them.

use std::error::Error;
use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::Point3;
use panair::prelude::*;
use serde::{Deserialize, Serialize};

/// Symmetry planes.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Symmetry {
  /// Symmetric about the xz plane.
  pub(crate) xz: bool,
  /// Symmetric about the xy plane.
  pub(crate) xy: bool
}

impl Default for Symmetry {
  fn default() -> Self {
    return Self { xz: true, xy: false };
  }
}

/// A network whose points are in a CSV file, one `x,y,z` per line, column by
/// column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct NetworkEntry {
  /// Network name.
  pub(crate) name: String,
  /// Network type.
  #[serde(default, alias = "type")]
  pub(crate) kind: NetworkKind,
  /// Points per column.
  pub(crate) rows: usize,
  /// The CSV file with the points.
  pub(crate) points: PathBuf
}

/// A sensor line of off-body points.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Sensor {
  /// Distance from the axis, in body lengths.
  pub(crate) r_over_l: f64,
  /// Body length.
  pub(crate) length: f64,
  /// Mach number for the sensor's Mach cone; the case's if absent.
  pub(crate) mach: Option<f64>
}

/// A case file.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CaseFile {
  /// Case title.
  pub(crate) title: String,
  /// Case description.
  pub(crate) description: String,
  /// Mach number and angles.
  pub(crate) aero: Option<AeroState>,
  /// Symmetry planes.
  pub(crate) symmetry: Symmetry,
  /// The networks.
  #[serde(alias = "network")]
  pub(crate) networks: Vec<NetworkEntry>,
  /// A CSV file with off-body points.
  pub(crate) offbody: Option<PathBuf>,
  /// A sensor line, instead of off-body points from a file.
  pub(crate) sensor: Option<Sensor>
}

/// Reads a CSV of points with a fixed number of coordinates each.
pub(crate) fn read_rows<const N: usize>(path: &Path) -> Result<Vec<[f64; N]>, Box<dyn Error>> {
  let mut rdr = csv::ReaderBuilder::new()
    .has_headers(false)
    .comment(Some(b'#'))
    .trim(csv::Trim::All)
    .from_path(path)?;
  let mut rows = Vec::new();
  for record in rdr.deserialize::<Vec<f64>>() {
    let record = record?;
    let row: [f64; N] = record.as_slice().try_into().map_err(|_| format!(
      "{}: expected {} values per line, got {}",
      path.display(),
      N,
      record.len()
    ))?;
    rows.push(row);
  }
  debug!("Read {} rows from {}.", rows.len(), path.display());
  return Ok(rows);
}

/// Reads a CSV of `x,y,z` points.
fn read_points(path: &Path) -> Result<Vec<Point3<f64>>, Box<dyn Error>> {
  return Ok(read_rows::<3>(path)?.into_iter().map(Point3::from).collect());
}

impl CaseFile {
  /// Reads a case file.
  pub(crate) fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)?;
    return Ok(toml::from_str(&contents)?);
  }

  /// Builds the case, reading point files relative to `base`.
  pub(crate) fn into_case(self, base: &Path) -> Result<Case, Box<dyn Error>> {
    let mut case = Case::new(self.title).with_description(self.description);
    case.set_symmetry(self.symmetry.xz, self.symmetry.xy);
    if let Some(aero) = self.aero {
      case.set_aero_state(aero.mach, aero.alpha, aero.beta);
    }
    for entry in self.networks {
      let points = read_points(&base.join(&entry.points))?;
      let net = Network::from_columns(entry.name, entry.kind, entry.rows, points)?;
      case.add_network(net);
    }
    if let Some(ref offbody) = self.offbody {
      case.add_offbody_points(read_points(&base.join(offbody))?);
    } else if let Some(sensor) = self.sensor {
      let mach = sensor.mach
        .or(self.aero.map(|a| a.mach))
        .ok_or("a sensor needs a Mach number")?;
      case.set_sensor(mach, sensor.r_over_l, sensor.length)?;
    }
    return Ok(case);
  }
}
