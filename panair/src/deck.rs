//! This module implements the input deck writer. Every input block has its own
//! method, which renders the block body and files it under the block name;
//! the deck is written out once everything has been specified.
//!
//! Calling a block method twice replaces the body but keeps the block where it
//! first went, so the order of the deck is the order of first registration.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::blocks::*;
use crate::error::DeckResult;
use crate::fields::Field;
use crate::network::{Network, NetworkKind, WakeNetwork};

/// Begins every block line.
pub const BLOCK_DELIMITER: char = '$';

/// The last line of every deck.
pub const END_SENTINEL: &str = "$end";

/// An ordered map from block names to block bodies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMap {
  /// The blocks, in order.
  entries: Vec<(String, String)>,
  /// Position of each block in `entries`.
  index: BTreeMap<String, usize>
}

impl BlockMap {
  /// Instantiates an empty map.
  pub fn new() -> Self {
    return Self::default();
  }

  /// Files a body under a name. An existing block keeps its position.
  pub fn insert<S: Into<String>>(&mut self, name: S, body: String) {
    let name = name.into();
    if let Some(&i) = self.index.get(&name) {
      self.entries[i].1 = body;
    } else {
      self.index.insert(name.clone(), self.entries.len());
      self.entries.push((name, body));
    }
  }

  /// Gets the body of a block.
  pub fn get(&self, name: &str) -> Option<&str> {
    return self.index.get(name).map(|&i| self.entries[i].1.as_str());
  }

  /// Iterates over names and bodies, in order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    return self.entries.iter().map(|(n, b)| (n.as_str(), b.as_str()));
  }

  /// Number of blocks.
  pub fn len(&self) -> usize {
    return self.entries.len();
  }

  /// Whether there are no blocks at all.
  pub fn is_empty(&self) -> bool {
    return self.entries.is_empty();
  }
}

/// Printout control options. See the PANAIR manual for what each one does.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PrintoutControl {
  pub isings: u32,
  pub igeomp: u32,
  pub isingp: u32,
  pub icontp: u32,
  pub ibconp: u32,
  pub iedgep: u32,
  pub ipraic: u32,
  pub nexdgn: u32,
  pub ioutpr: u32,
  pub ifmcpr: u32,
  pub icostp: u32
}

/// Reference point and lengths for force and moment coefficients.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ReferenceData {
  pub xref: f64,
  pub yref: f64,
  pub zref: f64,
  pub sref: f64,
  pub bref: f64,
  pub cref: f64,
  pub dref: f64
}

/// A PANAIR input deck under construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDeck {
  /// The blocks specified so far.
  blocks: BlockMap
}

/// Labels a list of values `name(0)`, `name(1)`, ...
fn indexed_labels(name: &str, n: usize) -> Vec<String> {
  return (0..n).map(|i| format!("{}({})", name, i)).collect();
}

/// Turns settings into fields.
fn settings(values: &[f64]) -> Vec<Field> {
  return values.iter().copied().map(Field::Setting).collect();
}

impl InputDeck {
  /// Instantiates an empty deck.
  pub fn new() -> Self {
    return Self::default();
  }

  /// The blocks specified so far.
  pub fn blocks(&self) -> &BlockMap {
    return &self.blocks;
  }

  /// Case title and a line of extra information.
  pub fn title(&mut self, title: &str, info: &str) {
    self.blocks.insert("TITLE", format!("{}\n{}\n", title, info));
  }

  /// Data check option; zero runs the full solution.
  pub fn datacheck(&mut self, ndtchk: u32) -> DeckResult<()> {
    let body = line_pair(&[("ndtchk", ndtchk.into())])?;
    self.blocks.insert("DATACHECK", body);
    return Ok(());
  }

  /// Symmetry about the xz and xy planes.
  pub fn symmetric(&mut self, xzpln: u32, xypln: u32) -> DeckResult<()> {
    let body = line_pair(&[("xzpln", xzpln.into()), ("xypln", xypln.into())])?;
    self.blocks.insert("SYMMETRIC", body);
    return Ok(());
  }

  /// Freestream Mach number.
  pub fn mach(&mut self, amach: f64) -> DeckResult<()> {
    let body = line_pair(&[("amach", amach.into())])?;
    self.blocks.insert("MACH NUMBER", body);
    return Ok(());
  }

  /// Number of solution cases.
  pub fn cases(&mut self, nacase: u32) -> DeckResult<()> {
    let body = line_pair(&[("nacase", nacase.into())])?;
    self.blocks.insert("CASES", body);
    return Ok(());
  }

  /// Compressibility angle of attack and the angle of attack of each case.
  pub fn angles_of_attack(&mut self, alpc: f64, alphas: &[f64]) -> DeckResult<()> {
    let body = sweep_body("alpc", alpc, "alpha", alphas)?;
    self.blocks.insert("ANGLES OF ATTACK", body);
    return Ok(());
  }

  /// Compressibility yaw angle and the yaw angle of each case.
  pub fn yaw_angle(&mut self, betc: f64, betas: &[f64]) -> DeckResult<()> {
    let body = sweep_body("betc", betc, "beta", betas)?;
    self.blocks.insert("YAW ANGLE", body);
    return Ok(());
  }

  /// Reference data for coefficients.
  pub fn reference_data(&mut self, r: &ReferenceData) -> DeckResult<()> {
    let body = line_pair(&[
      ("xref", r.xref.into()),
      ("yref", r.yref.into()),
      ("zref", r.zref.into())
    ])? + &line_pair(&[
      ("sref", r.sref.into()),
      ("bref", r.bref.into()),
      ("cref", r.cref.into()),
      ("dref", r.dref.into())
    ])?;
    self.blocks.insert("REFERENCE DATA", body);
    return Ok(());
  }

  /// Printout control options.
  pub fn printout(&mut self, p: &PrintoutControl) -> DeckResult<()> {
    let body = line_pair(&[
      ("isings", p.isings.into()),
      ("igeomp", p.igeomp.into()),
      ("isingp", p.isingp.into()),
      ("icontp", p.icontp.into()),
      ("ibconp", p.ibconp.into()),
      ("iedgep", p.iedgep.into())
    ])? + &line_pair(&[
      ("ipraic", p.ipraic.into()),
      ("nexdgn", p.nexdgn.into()),
      ("ioutpr", p.ioutpr.into()),
      ("ifmcpr", p.ifmcpr.into()),
      ("icostp", p.icostp.into())
    ])?;
    self.blocks.insert("PRINTOUT CONTROL", body);
    return Ok(());
  }

  /// A points block: every network of one type.
  pub fn points(&mut self, kt: NetworkKind, networks: &[&Network]) -> DeckResult<()> {
    let mut body = line_pair(&[("kn", Field::Setting(networks.len() as f64))])?;
    body.push_str(&line_pair(&[("kt", kt.0.into())])?);
    for net in networks {
      body.push_str(&network_body(net)?);
    }
    debug!("Points block for kt={} has {} networks.", kt, networks.len());
    self.blocks.insert(format!("POINTS kt={}", kt), body);
    return Ok(());
  }

  /// Adds networks of any types, one points block per type. Types go in the
  /// order they first appear in, and networks keep their relative order.
  pub fn add_networks(&mut self, networks: &[Network]) -> DeckResult<()> {
    let mut groups: Vec<(NetworkKind, Vec<&Network>)> = Vec::new();
    for net in networks {
      match groups.iter().position(|(k, _)| *k == net.kind) {
        Some(i) => groups[i].1.push(net),
        None => groups.push((net.kind, vec![net]))
      }
    }
    for (kind, members) in groups {
      self.points(kind, &members)?;
    }
    return Ok(());
  }

  /// Trailing wake networks of one type.
  pub fn trailing_wake_networks(
    &mut self,
    kt: NetworkKind,
    matchw: u32,
    wakes: &[WakeNetwork]
  ) -> DeckResult<()> {
    let mut body = line_pair(&[("kn", Field::Setting(wakes.len() as f64))])?;
    body.push_str(&line_pair(&[("kt", kt.0.into()), ("matchw", matchw.into())])?);
    for wake in wakes {
      body.push_str(&wake_body(wake)?);
    }
    self.blocks.insert(format!("TRAILING matchw={}", matchw), body);
    return Ok(());
  }

  /// Flow-field output options.
  pub fn flow_field_properties(&mut self, nflowv: f64, tpoff: f64) -> DeckResult<()> {
    let body = line_pair(&[("nflowv", nflowv.into()), ("tpoff", tpoff.into())])?;
    self.blocks.insert("FLOW-FIELD PROPERTIES", body);
    return Ok(());
  }

  /// Points to compute off-body flow properties at.
  pub fn offbody_points(&mut self, points: &[Point3<f64>]) -> DeckResult<()> {
    let mut body = line_pair(&[("isk1", Field::Setting(points.len() as f64))])?;
    body.push_str(&header_line(&["xof", "yof", "zof", "xof", "yof", "zof"]));
    body.push_str(&point_lines(points)?);
    self.blocks.insert("XYZ OF OFF-BODY POINTS", body);
    return Ok(());
  }

  /// Renders the complete deck.
  pub fn render(&self) -> String {
    let mut text = String::new();
    for (name, body) in self.blocks.iter() {
      text.push(BLOCK_DELIMITER);
      text.push_str(name);
      text.push('\n');
      text.push_str(body);
    }
    text.push_str(END_SENTINEL);
    return text;
  }

  /// Writes the deck to a file, creating or truncating it.
  pub fn write_inputfile<P: AsRef<Path>>(&self, path: P) -> DeckResult<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(self.render().as_bytes())?;
    writer.flush()?;
    debug!(
      "Wrote {} blocks to {}.",
      self.blocks.len(),
      path.as_ref().display()
    );
    return Ok(());
  }
}

/// Body for the angle sweep blocks: the compressibility angle on one line and
/// the angle of every case on the next.
fn sweep_body(
  first: &str,
  value: f64,
  each: &str,
  values: &[f64]
) -> DeckResult<String> {
  let single = line_pair(&[(first, value.into())])?;
  let labels = indexed_labels(each, values.len());
  return Ok(single + &header_line(labels.as_slice()) + &value_line(&settings(values))?);
}
