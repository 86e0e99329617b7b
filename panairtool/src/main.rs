//! A command-line front-end for the PANAIR solver: writes input decks from
//! case files, runs cases, extracts off-body data from output decks and
//! coarsens axisymmetric profiles.

#![allow(clippy::needless_return)] // i'll never forgive rust for this
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub(crate) mod case_file;
pub(crate) mod running;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::*;
use panair::prelude::*;

use crate::case_file::{read_rows, CaseFile};
use crate::running::{prepare_dir, SubprocessSolver};

/// The arguments passed to the tool.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
struct Cli {
  /// Output extra/debug info.
  #[arg(short = 'v', long = "verbose", global = true)]
  verbose: bool,
  /// What to do.
  #[command(subcommand)]
  command: Command
}

/// The subcommands.
#[derive(Clone, Debug, Subcommand)]
enum Command {
  /// Writes the input deck for a case.
  Write {
    /// Directory to write the deck to.
    #[arg(short = 'd', long = "dir", default_value = ".")]
    dir: PathBuf,
    /// The case file.
    case: PathBuf
  },
  /// Runs a case and writes its off-body data as CSV.
  Run {
    /// The PANAIR executable.
    #[arg(short = 'x', long = "exe", default_value = "panair")]
    exe: PathBuf,
    /// Working directory for the run.
    #[arg(short = 'd', long = "dir", default_value = "panair_files")]
    dir: PathBuf,
    /// Don't rerun if the working directory exists, just read its results.
    #[arg(short = 'k', long = "keep")]
    keep: bool,
    /// Path to write off-body data to. If absent, writes to standard output.
    #[arg(short = 'o')]
    output: Option<PathBuf>,
    /// The case file.
    case: PathBuf
  },
  /// Extracts the off-body data from an output deck.
  Offbody {
    /// Write JSON instead of CSV.
    #[arg(long = "json")]
    json: bool,
    /// Path to write output to. If absent, writes to standard output.
    #[arg(short = 'o')]
    output: Option<PathBuf>,
    /// The output deck (usually panair.out).
    file: PathBuf
  },
  /// Coarsens an axisymmetric profile given as a CSV of x,r pairs.
  Coarsen {
    /// Total distance the skipped points may be from their chord.
    #[arg(short = 't', long = "tol")]
    tol: f64,
    /// Longest chord allowed when skipping points.
    #[arg(short = 'm', long = "max-length", default_value_t = f64::INFINITY)]
    max_length: f64,
    /// Path to write output to. If absent, writes to standard output.
    #[arg(short = 'o')]
    output: Option<PathBuf>,
    /// The profile file.
    file: PathBuf
  }
}

/// Opens an output file, or standard output.
fn open_output(path: &Option<PathBuf>) -> io::Result<BufWriter<Box<dyn Write>>> {
  return Ok(BufWriter::new(if let Some(p) = path {
    Box::new(File::create(p)?)
  } else {
    Box::new(io::stdout())
  }));
}

/// Loads a case file.
fn load_case(path: &Path) -> Result<Case, Box<dyn Error>> {
  info!("Reading case {}...", path.display());
  let base = path.parent().unwrap_or(Path::new("."));
  return CaseFile::load(path)?.into_case(base);
}

/// Writes a table as CSV or JSON.
fn write_table(
  table: &NumericTable,
  output: &Option<PathBuf>,
  json: bool
) -> Result<(), Box<dyn Error>> {
  let mut out = open_output(output)?;
  let rows = table.row_iter()
    .map(|r| r.iter().copied().collect::<Vec<f64>>())
    .collect::<Vec<_>>();
  if json {
    serde_json::to_writer_pretty(&mut out, &rows)?;
    writeln!(out)?;
  } else {
    let mut wtr = csv::WriterBuilder::new().from_writer(out);
    for row in rows.iter() {
      wtr.write_record(row.iter().map(|x| x.to_string()))?;
    }
    wtr.flush()?;
  }
  return Ok(());
}

/// Does what the command line says.
fn run(args: Cli) -> Result<(), Box<dyn Error>> {
  match args.command {
    Command::Write { dir, case } => {
      let case = load_case(&case)?;
      let path = dir.join(case.input_filename());
      case.generate_inputfile()?.write_inputfile(&path)?;
      info!("Wrote {}.", path.display());
    },
    Command::Run { exe, dir, keep, output, case } => {
      let case = load_case(&case)?;
      let existed = prepare_dir(&dir, keep)?;
      let results = if keep && existed {
        info!("Reading results already in {}.", dir.display());
        Results::from_dir(&dir)?
      } else {
        let exe = exe.canonicalize().unwrap_or(exe);
        case.run(&dir, &SubprocessSolver { exe })?
      };
      info!("PANAIR run finished.");
      write_table(&results.offbody_data()?, &output, false)?;
    },
    Command::Offbody { json, output, file } => {
      let deck = OutputDeck::from_file(&file)?;
      let data = deck.offbody_data()?;
      info!("Found {} off-body points.", data.nrows());
      write_table(&data, &output, json)?;
    },
    Command::Coarsen { tol, max_length, output, file } => {
      let rows = read_rows::<2>(&file)?;
      let (xs, rs): (Vec<f64>, Vec<f64>) = rows.iter()
        .map(|r| (r[0], r[1]))
        .unzip();
      let (cx, cr) = coarsen_axisymmetric(&xs, &rs, tol, max_length)?;
      info!("Coarsened {} points down to {}.", xs.len(), cx.len());
      let mut wtr = csv::WriterBuilder::new().from_writer(open_output(&output)?);
      for (x, r) in cx.iter().zip(cr.iter()) {
        wtr.write_record([x.to_string(), r.to_string()])?;
      }
      wtr.flush()?;
    }
  }
  return Ok(());
}

fn main() {
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  if let Err(e) = run(args) {
    error!("{}", e);
    std::process::exit(1);
  }
}
