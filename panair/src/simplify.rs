//! This module implements polyline coarsening: dropping points from a curve
//! (typically the x-r profile of an axisymmetric body) while keeping it within
//! a tolerance of the original, and without creating segments that are too
//! long.
//!
//! It's a greedy forward sweep. From the last kept point, the chord is pushed
//! forward as long as the points it skips stay close to it.

use log::debug;
use nalgebra::Point2;

use crate::error::{DeckError, DeckResult};

/// How much the error of an overlong chord is inflated by, in tolerances.
const OVERLENGTH_PENALTY: f64 = 10.0;

/// Perpendicular distance from `q` to the line through `a` and `b`. Falls back
/// to the distance to `a` when the two coincide.
fn distance_to_line(a: &Point2<f64>, b: &Point2<f64>, q: &Point2<f64>) -> f64 {
  let d = b - a;
  let len = d.norm();
  if len == 0.0 {
    return (q - a).norm();
  }
  return (d.y * (q.x - a.x) - d.x * (q.y - a.y)).abs() / len;
}

/// Total distance of the interior points of a span to its chord.
fn chord_error(span: &[Point2<f64>]) -> f64 {
  if span.len() < 3 {
    return 0.0;
  }
  let (first, last) = (&span[0], &span[span.len()-1]);
  return span[1..span.len()-1]
    .iter()
    .map(|q| distance_to_line(first, last, q))
    .sum();
}

/// Length of the chord of a span.
fn chord_length(span: &[Point2<f64>]) -> f64 {
  return match (span.first(), span.last()) {
    (Some(f), Some(l)) => (l - f).norm(),
    _ => 0.0
  };
}

/// Coarsens a polyline. The result is a subsequence of the input that starts
/// with its first point and ends with its last one.
///
/// Skipped points add up to less than `tol` of distance to the chord that
/// replaces them, and a chord is not grown past `max_length` (though the
/// shortest chord, skipping a single point, may be longer).
pub fn coarsen(points: &[Point2<f64>], tol: f64, max_length: f64) -> Vec<Point2<f64>> {
  if points.len() < 3 {
    return points.to_vec();
  }
  let last = points.len() - 1;
  // span error, with the length limit folded in
  let error = |l: usize, r: usize| {
    let span = &points[l..=r.min(last)];
    let mut e = chord_error(span);
    if chord_length(span) > max_length {
      e += tol*OVERLENGTH_PENALTY;
    }
    return e;
  };
  let mut kept = vec![points[0]];
  let mut left = 0;
  let mut right = 2;
  while right <= last {
    let mut e = chord_error(&points[left..=right]);
    if e > tol {
      // can't skip even one point, keep them all
      kept.extend_from_slice(&points[left+1..=right]);
    } else {
      while e < tol && right <= last {
        right += 1;
        e = error(left, right);
      }
      right -= 1;
      kept.push(points[right]);
    }
    left = right;
    right = left + 2;
  }
  if left != last {
    kept.push(points[last]);
  }
  debug!("Coarsened polyline from {} to {} points.", points.len(), kept.len());
  return kept;
}

/// Coarsens an axisymmetric profile given as separate axial and radial
/// coordinates.
pub fn coarsen_axisymmetric(
  xs: &[f64],
  rs: &[f64],
  tol: f64,
  max_length: f64
) -> DeckResult<(Vec<f64>, Vec<f64>)> {
  if xs.len() != rs.len() {
    return Err(DeckError::InvalidCase(format!(
      "{} axial coordinates but {} radii",
      xs.len(),
      rs.len()
    )));
  }
  let points = xs.iter()
    .zip(rs)
    .map(|(&x, &r)| Point2::new(x, r))
    .collect::<Vec<_>>();
  let kept = coarsen(&points, tol, max_length);
  return Ok(kept.iter().map(|p| (p.x, p.y)).unzip());
}
