//! This module implements a case: everything needed to describe one PANAIR
//! run with sane defaults for the many settings a simple analysis doesn't
//! care about. A case builds the input deck and hands the actual run over to
//! a [`SolverRunner`], which is supplied by the caller.

use std::path::Path;

use log::{debug, info};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::deck::{InputDeck, PrintoutControl};
use crate::error::{DeckError, DeckResult};
use crate::network::Network;
use crate::output::{NumericTable, OutputDeck, OUTPUT_FILENAME};

/// Number of points along a pressure sensor line.
pub const SENSOR_POINTS: usize = 1600;

/// How a case gets the solver to run. Implementors own process management;
/// the case only cares whether the run worked.
pub trait SolverRunner {
  /// Runs the solver in a directory, feeding it the input deck's filename.
  /// Returns whether the process itself succeeded.
  fn run_external(&self, work_dir: &Path, input_filename: &str) -> DeckResult<bool>;

  /// Whether a finished run left a complete output deck behind.
  fn check_completion(&self, work_dir: &Path) -> bool {
    return OutputDeck::from_file(work_dir.join(OUTPUT_FILENAME))
      .map(|deck| deck.check_successful())
      .unwrap_or(false);
  }
}

/// The aerodynamic state of a case.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroState {
  /// Freestream Mach number.
  pub mach: f64,
  /// Angle of attack, in degrees.
  pub alpha: f64,
  /// Sideslip angle, in degrees.
  pub beta: f64
}

/// A PANAIR case.
#[derive(Clone, Debug)]
pub struct Case {
  /// Identifies the case; also names the input deck.
  title: String,
  /// A short description, written under the title.
  description: String,
  /// The aerodynamic state, which must be set before running.
  aero_state: Option<AeroState>,
  /// Symmetry about the xz and xy planes.
  symmetry: (bool, bool),
  /// The networks, unique by name.
  networks: Vec<Network>,
  /// Points to compute off-body properties at.
  offbody_points: Option<Vec<Point3<f64>>>
}

impl Case {
  /// Creates an empty case, symmetric about the xz plane.
  pub fn new<S: Into<String>>(title: S) -> Self {
    return Self {
      title: title.into(),
      description: String::new(),
      aero_state: None,
      symmetry: (true, false),
      networks: Vec::new(),
      offbody_points: None
    };
  }

  /// Sets the description.
  pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
    self.description = description.into();
    return self;
  }

  /// Sets Mach number and angles.
  pub fn set_aero_state(&mut self, mach: f64, alpha: f64, beta: f64) {
    self.aero_state = Some(AeroState { mach, alpha, beta });
  }

  /// Sets symmetry about the xz and xy planes.
  pub fn set_symmetry(&mut self, xz: bool, xy: bool) {
    self.symmetry = (xz, xy);
  }

  /// Adds a network, replacing any network with the same name in place.
  pub fn add_network(&mut self, network: Network) {
    match self.networks.iter().position(|n| n.name == network.name) {
      Some(i) => self.networks[i] = network,
      None => self.networks.push(network)
    }
  }

  /// Removes all networks.
  pub fn clear_networks(&mut self) {
    self.networks.clear();
  }

  /// The networks, in the order they were added.
  pub fn networks(&self) -> &[Network] {
    return &self.networks;
  }

  /// Sets the off-body points.
  pub fn add_offbody_points(&mut self, points: Vec<Point3<f64>>) {
    self.offbody_points = Some(points);
  }

  /// Places off-body points along a sensor line under an axisymmetric body
  /// of a given length, at a distance of `r_over_l` lengths from its axis. The
  /// line starts just ahead of the body's Mach cone and spans 1.74 lengths.
  pub fn set_sensor(&mut self, mach: f64, r_over_l: f64, length: f64) -> DeckResult<()> {
    if !(mach > 1.0) {
      return Err(DeckError::InvalidCase(format!(
        "a sensor line needs supersonic flow, got Mach {}",
        mach
      )));
    }
    let mu = (1.0/mach).asin();
    let r = r_over_l*length;
    let x_start = r/mu.tan() - 0.01*length;
    let x_end = x_start + 1.74*length;
    let step = (x_end - x_start)/(SENSOR_POINTS - 1) as f64;
    let points = (0..SENSOR_POINTS)
      .map(|i| Point3::new(x_start + step*i as f64, 0.0, -r))
      .collect();
    self.add_offbody_points(points);
    return Ok(());
  }

  /// The input deck filename: the title, spaces replaced by underscores.
  pub fn input_filename(&self) -> String {
    return format!("{}.INP", self.title.replace(' ', "_"));
  }

  /// Builds the input deck.
  pub fn generate_inputfile(&self) -> DeckResult<InputDeck> {
    let state = self.aero_state.ok_or_else(|| {
      DeckError::InvalidCase("aero state inputs must be provided".to_owned())
    })?;
    if self.networks.is_empty() {
      return Err(DeckError::InvalidCase(
        "network inputs must be provided".to_owned()
      ));
    }
    let mut deck = InputDeck::new();
    deck.title(&self.title, &self.description);
    deck.datacheck(0)?;
    deck.symmetric(self.symmetry.0.into(), self.symmetry.1.into())?;
    deck.mach(state.mach)?;
    deck.cases(1)?;
    deck.angles_of_attack(state.alpha, &[state.alpha])?;
    deck.yaw_angle(state.beta, &[state.beta])?;
    deck.printout(&PrintoutControl { ioutpr: 1, ..Default::default() })?;
    deck.add_networks(&self.networks)?;
    if let Some(ref points) = self.offbody_points {
      deck.flow_field_properties(1.0, 0.0)?;
      deck.offbody_points(points)?;
    }
    return Ok(deck);
  }

  /// Writes the input deck into a directory and runs the solver there.
  pub fn run<R: SolverRunner + ?Sized>(
    &self,
    work_dir: &Path,
    runner: &R
  ) -> DeckResult<Results> {
    let filename = self.input_filename();
    self.generate_inputfile()?.write_inputfile(work_dir.join(&filename))?;
    info!("Running PANAIR on {}...", filename);
    if !runner.run_external(work_dir, &filename)? {
      return Err(DeckError::ExternalProcessFailure(
        "the solver process failed".to_owned()
      ));
    }
    if !runner.check_completion(work_dir) {
      return Err(DeckError::ExternalProcessFailure(format!(
        "no complete {} in {}",
        OUTPUT_FILENAME,
        work_dir.display()
      )));
    }
    debug!("Run of \"{}\" finished.", self.title);
    return Results::from_dir(work_dir);
  }
}

/// The results of a finished run.
#[derive(Clone, Debug)]
pub struct Results {
  /// The output deck.
  output: OutputDeck
}

impl Results {
  /// Reads the results left in a working directory.
  pub fn from_dir(work_dir: &Path) -> DeckResult<Self> {
    let output = OutputDeck::from_file(work_dir.join(OUTPUT_FILENAME))?;
    return Ok(Self { output });
  }

  /// The output deck.
  pub fn output(&self) -> &OutputDeck {
    return &self.output;
  }

  /// Flow properties at the off-body points.
  pub fn offbody_data(&self) -> DeckResult<NumericTable> {
    return self.output.offbody_data();
  }
}
