use std::fs;
use std::path::Path;

use nalgebra::{DMatrix, Point2, Point3};

use crate::blocks::*;
use crate::fields::*;
use crate::prelude::*;

/// A network of `rows` x `cols` points at the origin.
fn flat_network(name: &str, kt: u32, rows: usize, cols: usize) -> Network {
  let grid = DMatrix::from_element(rows, cols, Point3::origin());
  return Network::new(name, NetworkKind(kt), grid);
}

/// Lines of an output deck with an off-body block holding two points.
const OFFBODY_DECK: &str = "\
 panair output
0*b*off-body
 heading 1
 heading 2
 heading 3
 heading 4
 heading 5
 heading 6
   1.0   0.0  -0.1   0.012
   2.0   0.0  -0.1  -0.004
0*e*off-body
 end of run
";

#[test]
fn test_coord_width() {
  let magnitudes = [
    0.0, 1e-9, 0.5, 1.0, 9.99999, 9.999999999, 10.0, 99.5, 123.456, 999.999,
    1000.0, 9999.9, 10000.0, 54321.123456, 99999.9999, 99999.99999
  ];
  for m in magnitudes.iter() {
    for x in [*m, -*m] {
      let s = format_coord(x).unwrap();
      assert_eq!(s.len(), FIELD_WIDTH, "bad width for {}: \"{}\"", x, s);
    }
  }
}

#[test]
fn test_coord_precision() {
  let direct = |x: f64, s: &str| assert_eq!(format_coord(x).unwrap(), s);
  direct(0.0, "0.00000000");
  direct(1.5, "1.50000000");
  direct(-1.5, "-1.5000000");
  direct(-0.0, "-0.0000000");
  direct(12.25, "12.2500000");
  direct(-123.5, "-123.50000");
  direct(4096.0, "4096.00000");
  direct(12345.5, "12345.5000");
  direct(-12345.5, "-12345.500");
  // rounding carries into another digit
  direct(9.999999999, "10.0000000");
  direct(99999.99999, "100000.000");
  assert_eq!(fixed_precision(1.0, FIELD_WIDTH).unwrap(), 8);
  assert_eq!(fixed_precision(-10.0, FIELD_WIDTH).unwrap(), 6);
}

#[test]
fn test_coord_overflow() {
  let must_fail = |x: f64| assert!(matches!(
    format_coord(x),
    Err(DeckError::FormattingOverflow(_))
  ));
  must_fail(100000.0);
  must_fail(-100000.0);
  must_fail(1e6);
  must_fail(f64::INFINITY);
  must_fail(f64::NAN);
  assert!(format_coord(99999.9999).is_ok());
  assert!(format_coord(-99999.9999).is_ok());
}

#[test]
fn test_settings_and_labels() {
  let repr = |x: f64, s: &str| assert_eq!(setting_repr(x), s);
  repr(0.0, "0.0");
  repr(1.5, "1.5");
  repr(-2.0, "-2.0");
  repr(1e-5, "1e-05");
  repr(2.5e-7, "2.5e-07");
  repr(1e16, "1e+16");
  repr(1e15, "1000000000000000.0");
  assert_eq!(format_setting(1.5), "1.5       ");
  assert_eq!(format_label("abc"), "abc       ");
  assert_eq!(format_label("0123456789abc"), "0123456789abc");
  assert_eq!(Field::from(3_u32).encode().unwrap(), "3.0       ");
}

#[test]
fn test_decode_line() {
  let row = decode_line("  1.0  -2.5e3\t4 ").unwrap();
  assert_eq!(row, vec![1.0, -2500.0, 4.0]);
  assert!(decode_line("   ").unwrap().is_empty());
  match decode_line("1.0 x") {
    Err(DeckError::BadNumber(tok)) => assert_eq!(tok, "x"),
    other => panic!("expected a bad number, got {:?}", other)
  }
}

#[test]
fn test_line_pair() {
  assert_eq!(header_line(&["ndtchk"]), "=ndtchk   \n");
  let text = line_pair(&[("xzpln", 1_u32.into()), ("xypln", 0_u32.into())])
    .unwrap();
  assert_eq!(text, "=xzpln    xypln     \n1.0       0.0       \n");
}

#[test]
fn test_network_rows() {
  let body_lines = |net: &Network| {
    return network_body(net)
      .unwrap()
      .lines()
      .skip(2)
      .map(|l| l.len())
      .collect::<Vec<_>>();
  };
  // odd rows: each column ends in a half-filled line
  assert_eq!(body_lines(&flat_network("odd", 1, 3, 2)), vec![60, 30, 60, 30]);
  // even rows: every line is full
  assert_eq!(body_lines(&flat_network("even", 1, 2, 3)), vec![60, 60, 60]);
  let text = network_body(&flat_network("upper", 1, 3, 2)).unwrap();
  let header = text.lines().next().unwrap();
  assert_eq!(header.len(), 61 + "upper".len());
  assert!(header.starts_with("=nm       nn "));
  assert!(header.ends_with(" upper"));
  assert_eq!(text.lines().nth(1).unwrap(), "3.0       2.0       ");
}

#[test]
fn test_empty_network() {
  let net = flat_network("nothing", 1, 3, 0);
  let text = network_body(&net).unwrap();
  assert_eq!(text.lines().count(), 2);
  assert!(text.ends_with("3.0       0.0       \n"));
}

#[test]
fn test_network_from_columns() {
  let points = (0..6).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
  let net = Network::from_columns("n", NetworkKind(1), 3, points).unwrap();
  assert_eq!((net.rows(), net.columns()), (3, 2));
  assert_eq!(net.points[(0, 1)].x, 3.0);
  let bad = (0..5).map(|_| Point3::origin()).collect();
  assert!(Network::from_columns("n", NetworkKind(1), 3, bad).is_err());
}

#[test]
fn test_block_map_overwrite() {
  let mut map = BlockMap::new();
  map.insert("A", "1".to_owned());
  map.insert("B", "2".to_owned());
  map.insert("A", "3".to_owned());
  let entries = map.iter().collect::<Vec<_>>();
  assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
  assert_eq!(map.get("B"), Some("2"));
  assert_eq!(map.len(), 2);
}

#[test]
fn test_small_deck() {
  let mut deck = InputDeck::new();
  deck.title("test case", "Ted");
  deck.datacheck(0).unwrap();
  deck.mach(1.5).unwrap();
  deck.angles_of_attack(0.0, &[-1.0, 0.0, 1.0]).unwrap();
  let expected = concat!(
    "$TITLE\n",
    "test case\n",
    "Ted\n",
    "$DATACHECK\n",
    "=ndtchk   \n",
    "0.0       \n",
    "$MACH NUMBER\n",
    "=amach    \n",
    "1.5       \n",
    "$ANGLES OF ATTACK\n",
    "=alpc     \n",
    "0.0       \n",
    "=alpha(0) alpha(1)  alpha(2)  \n",
    "-1.0      0.0       1.0       \n",
    "$end"
  );
  assert_eq!(deck.render(), expected);
  // redoing a block keeps its place
  deck.mach(2.0).unwrap();
  let names = deck.blocks().iter().map(|(n, _)| n).collect::<Vec<_>>();
  assert_eq!(names, vec!["TITLE", "DATACHECK", "MACH NUMBER", "ANGLES OF ATTACK"]);
  assert!(deck.render().contains("=amach    \n2.0       \n"));
}

#[test]
fn test_network_grouping() {
  let networks = vec![
    flat_network("first", 1, 2, 2),
    flat_network("wake", 18, 2, 2),
    flat_network("second", 1, 3, 3)
  ];
  let mut deck = InputDeck::new();
  deck.add_networks(&networks).unwrap();
  let names = deck.blocks().iter().map(|(n, _)| n).collect::<Vec<_>>();
  assert_eq!(names, vec!["POINTS kt=1", "POINTS kt=18"]);
  let body = deck.blocks().get("POINTS kt=1").unwrap();
  assert!(body.starts_with("=kn       \n2.0       \n=kt       \n1.0       \n"));
  let first = body.find(" first").unwrap();
  let second = body.find(" second").unwrap();
  assert!(first < second);
  assert!(!body.contains(" wake"));
}

#[test]
fn test_overflowing_block_leaves_deck_alone() {
  let mut deck = InputDeck::new();
  let far = vec![Point3::new(1e6, 0.0, 0.0)];
  assert!(deck.offbody_points(&far).is_err());
  assert!(deck.blocks().is_empty());
}

#[test]
fn test_offbody_and_wakes() {
  let mut deck = InputDeck::new();
  let points = vec![Point3::new(1.0, 0.0, -0.5); 3];
  deck.offbody_points(&points).unwrap();
  let body = deck.blocks().get("XYZ OF OFF-BODY POINTS").unwrap();
  let lines = body.lines().collect::<Vec<_>>();
  assert_eq!(lines[0], "=isk1     ");
  assert_eq!(lines[1], "3.0       ");
  assert_eq!(lines[2].trim_end(), "=xof      yof       zof       xof       yof       zof");
  assert_eq!(lines[3], "1.000000000.00000000-0.5000000".repeat(2));
  assert_eq!(lines[4].len(), 30);
  let wake = WakeNetwork {
    name: "left".to_owned(),
    inat: "upper".to_owned(),
    insd: 3,
    xwake: 10.0,
    twake: 0.0
  };
  deck.trailing_wake_networks(NetworkKind(18), 0, &[wake]).unwrap();
  let body = deck.blocks().get("TRAILING matchw=0").unwrap();
  let lines = body.lines().collect::<Vec<_>>();
  assert_eq!(lines[2], "=kt       matchw    ");
  assert_eq!(lines[3], "18.0      0.0       ");
  assert_eq!(lines[4].len(), 61 + "left".len());
  assert!(lines[4].starts_with("=inat     insd      xwake     twake "));
  assert_eq!(lines[5], "upper     3.0       10.0      0.0       ");
}

#[test]
fn test_deck_determinism_and_file() {
  let build = || {
    let mut case = Case::new("det case");
    case.set_aero_state(1.6, 2.0, 0.0);
    case.add_network(flat_network("front", 1, 3, 3));
    return case.generate_inputfile().unwrap();
  };
  assert_eq!(build().render(), build().render());
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("det.INP");
  build().write_inputfile(&path).unwrap();
  assert_eq!(fs::read_to_string(&path).unwrap(), build().render());
  let nowhere = dir.path().join("missing").join("det.INP");
  assert!(matches!(build().write_inputfile(nowhere), Err(DeckError::Io(_))));
}

#[test]
fn test_block_extraction() {
  let text = "junk\n 0*b*foo\n1.0 2.0 3.0\n4.0 5.0 6.0\n 0*e*foo\ntrailer\n";
  let deck = OutputDeck::from_text(text);
  let table = deck.table("foo", 0).unwrap();
  assert_eq!(table, DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
  // skipping headers
  let table = deck.table("foo", 1).unwrap();
  assert_eq!((table.nrows(), table.ncols()), (1, 3));
  assert_eq!(table[(0, 2)], 6.0);
  // skipping everything
  let table = deck.table("foo", 5).unwrap();
  assert_eq!((table.nrows(), table.ncols()), (0, 0));
}

#[test]
fn test_block_not_found() {
  let not_found = |text: &str| assert!(matches!(
    locate_block(text, "foo"),
    Err(DeckError::BlockNotFound(name)) if name == "foo"
  ));
  not_found("");
  not_found("0*b*bar\n0*e*bar\n");
  not_found("0*b*foo\n1.0\n");
  not_found("0*e*foo\n1.0\n0*b*foo\n");
  // first begin pairs with the first end after it
  let lines = locate_block("0*b*foo\na\n0*e*foo\n0*b*foo\nb\n0*e*foo\n", "foo")
    .unwrap();
  assert_eq!(lines, vec!["a"]);
}

#[test]
fn test_ragged_table() {
  let deck = OutputDeck::from_text("0*b*t\n1 2 3\n\n4 5\n0*e*t\n");
  assert!(matches!(
    deck.table("t", 0),
    Err(DeckError::RaggedTable { row: 1, expected: 3, found: 2 })
  ));
}

#[test]
fn test_offbody_data() {
  let deck = OutputDeck::from_text(OFFBODY_DECK);
  let data = deck.offbody_data().unwrap();
  assert_eq!((data.nrows(), data.ncols()), (2, 4));
  assert_eq!(data[(1, 3)], -0.004);
  assert!(deck.check_successful());
  assert!(!OutputDeck::from_text("0*b*off-body\n").check_successful());
}

/// Indices of the kept points within the original polyline.
fn kept_indices(original: &[Point2<f64>], kept: &[Point2<f64>]) -> Vec<usize> {
  let mut indices = Vec::new();
  let mut start = 0;
  for p in kept {
    let i = start + original[start..].iter().position(|q| q == p).unwrap();
    indices.push(i);
    start = i + 1;
  }
  return indices;
}

/// Distance from `q` to the line through `a` and `b`.
fn line_distance(a: &Point2<f64>, b: &Point2<f64>, q: &Point2<f64>) -> f64 {
  let d = b - a;
  return (d.y*(q.x - a.x) - d.x*(q.y - a.y)).abs()/d.norm();
}

#[test]
fn test_coarsen_straight_line() {
  let line = (0..=10).map(|i| Point2::new(i as f64, 0.0)).collect::<Vec<_>>();
  let kept = coarsen(&line, 0.1, 100.0);
  assert_eq!(kept, vec![line[0], line[10]]);
  // the length limit splits the line
  let kept = coarsen(&line, 0.1, 3.5);
  let xs = kept.iter().map(|p| p.x).collect::<Vec<_>>();
  assert_eq!(xs, vec![0.0, 3.0, 6.0, 9.0, 10.0]);
}

#[test]
fn test_coarsen_zero_tolerance() {
  let zigzag = (0..9)
    .map(|i| Point2::new(i as f64, (i % 2) as f64))
    .collect::<Vec<_>>();
  assert_eq!(coarsen(&zigzag, 0.0, 100.0), zigzag);
}

#[test]
fn test_coarsen_endpoints() {
  for n in 0..3 {
    let short = (0..n).map(|i| Point2::new(i as f64, 1.0)).collect::<Vec<_>>();
    assert_eq!(coarsen(&short, 0.5, 1.0), short);
  }
  for n in 3..40 {
    let curve = (0..n)
      .map(|i| {
        let t = i as f64*0.3;
        Point2::new(t, t.sin() + 0.2*(3.0*t).cos())
      })
      .collect::<Vec<_>>();
    for tol in [0.0, 0.01, 0.1, 1.0] {
      let kept = coarsen(&curve, tol, 2.0);
      assert!(kept.len() <= curve.len());
      assert_eq!(kept.first(), curve.first());
      assert_eq!(kept.last(), curve.last());
    }
  }
}

#[test]
fn test_coarsen_tolerance_bound() {
  let tol = 0.05;
  let curve = (0..200)
    .map(|i| {
      let x = i as f64*0.05;
      Point2::new(x, (0.7*x).sin()*x.sqrt())
    })
    .collect::<Vec<_>>();
  let kept = coarsen(&curve, tol, f64::INFINITY);
  assert!(kept.len() < curve.len());
  let indices = kept_indices(&curve, &kept);
  for pair in indices.windows(2) {
    let (a, b) = (&curve[pair[0]], &curve[pair[1]]);
    for q in &curve[pair[0]+1..pair[1]] {
      assert!(line_distance(a, b, q) <= tol);
    }
  }
}

#[test]
fn test_coarsen_axisymmetric() {
  let xs = vec![0.0, 1.0, 2.0, 3.0, 4.0];
  let rs = vec![0.0, 0.5, 1.0, 1.5, 2.0];
  let (cx, cr) = coarsen_axisymmetric(&xs, &rs, 0.01, 100.0).unwrap();
  assert_eq!(cx, vec![0.0, 4.0]);
  assert_eq!(cr, vec![0.0, 2.0]);
  assert!(coarsen_axisymmetric(&xs, &rs[1..], 0.01, 100.0).is_err());
}

#[test]
fn test_case_inputs() {
  let mut case = Case::new("my case").with_description("some body");
  assert_eq!(case.input_filename(), "my_case.INP");
  assert!(matches!(case.generate_inputfile(), Err(DeckError::InvalidCase(_))));
  case.set_aero_state(1.6, 0.0, 0.0);
  assert!(matches!(case.generate_inputfile(), Err(DeckError::InvalidCase(_))));
  case.add_network(flat_network("front", 1, 3, 3));
  case.add_network(flat_network("back", 1, 3, 3));
  case.add_network(flat_network("front", 1, 5, 3));
  assert_eq!(case.networks().len(), 2);
  assert_eq!(case.networks()[0].rows(), 5);
  assert!(case.set_sensor(0.8, 0.1, 1.0).is_err());
  case.set_sensor(1.6, 0.1, 1.0).unwrap();
  let deck = case.generate_inputfile().unwrap();
  let names = deck.blocks().iter().map(|(n, _)| n).collect::<Vec<_>>();
  assert_eq!(names, vec![
    "TITLE", "DATACHECK", "SYMMETRIC", "MACH NUMBER", "CASES",
    "ANGLES OF ATTACK", "YAW ANGLE", "PRINTOUT CONTROL", "POINTS kt=1",
    "FLOW-FIELD PROPERTIES", "XYZ OF OFF-BODY POINTS"
  ]);
  let offbody = deck.blocks().get("XYZ OF OFF-BODY POINTS").unwrap();
  assert!(offbody.starts_with("=isk1     \n1600.0    \n"));
  let printout = deck.blocks().get("PRINTOUT CONTROL").unwrap();
  assert!(printout.ends_with("0.0       0.0       1.0       0.0       0.0       \n"));
}

/// Pretends to be PANAIR by writing a canned output deck.
struct CannedRunner {
  /// Whether the pretend process succeeds.
  succeed: bool
}

impl SolverRunner for CannedRunner {
  fn run_external(&self, work_dir: &Path, input_filename: &str) -> DeckResult<bool> {
    assert!(work_dir.join(input_filename).is_file());
    if self.succeed {
      fs::write(work_dir.join(OUTPUT_FILENAME), OFFBODY_DECK)?;
    }
    return Ok(self.succeed);
  }
}

#[test]
fn test_case_run() {
  let mut case = Case::new("run case");
  case.set_aero_state(2.0, 0.0, 0.0);
  case.add_network(flat_network("body", 1, 2, 2));
  let dir = tempfile::tempdir().unwrap();
  let results = case.run(dir.path(), &CannedRunner { succeed: true }).unwrap();
  assert_eq!(results.offbody_data().unwrap().nrows(), 2);
  let other = tempfile::tempdir().unwrap();
  assert!(matches!(
    case.run(other.path(), &CannedRunner { succeed: false }),
    Err(DeckError::ExternalProcessFailure(_))
  ));
}
