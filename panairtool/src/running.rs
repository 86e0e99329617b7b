//! This defines how the PANAIR executable is actually run, and how its working
//! directory is prepared.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use panair::prelude::*;
use subprocess::{Exec, Redirection};

/// Where the solver's console output is saved, inside the working directory.
pub(crate) const LOG_FILENAME: &str = "panair.log";

/// Scratch files from previous runs start with this.
const SCRATCH_PREFIX: &str = "rwms";

/// Runs a PANAIR executable as a subprocess.
#[derive(Clone, Debug)]
pub(crate) struct SubprocessSolver {
  /// Path to the executable.
  pub(crate) exe: PathBuf
}

impl SolverRunner for SubprocessSolver {
  fn run_external(&self, work_dir: &Path, input_filename: &str) -> DeckResult<bool> {
    // PANAIR asks for the deck name on standard input
    let answer = format!("{}\n", input_filename);
    debug!(
      "Running {} in {}...",
      self.exe.display(),
      work_dir.display()
    );
    let capture = Exec::cmd(&self.exe)
      .cwd(work_dir)
      .stdin(answer.as_str())
      .stderr(Redirection::Merge)
      .capture()
      .map_err(|e| DeckError::ExternalProcessFailure(e.to_string()))?;
    fs::write(work_dir.join(LOG_FILENAME), &capture.stdout)?;
    debug!("Solver exited with {:?}.", capture.exit_status);
    return Ok(capture.exit_status.success());
  }
}

/// Creates the working directory if needed and, unless told to keep them,
/// removes scratch files left by earlier runs. Returns whether the directory
/// already existed.
pub(crate) fn prepare_dir(dir: &Path, keep: bool) -> io::Result<bool> {
  if !dir.exists() {
    fs::create_dir_all(dir)?;
    return Ok(false);
  }
  if !keep {
    for entry in fs::read_dir(dir)? {
      let entry = entry?;
      let is_scratch = entry.file_name()
        .to_str()
        .is_some_and(|n| n.starts_with(SCRATCH_PREFIX));
      if is_scratch && entry.path().is_file() {
        debug!("Removing {}.", entry.path().display());
        fs::remove_file(entry.path())?;
      }
    }
  }
  return Ok(true);
}
