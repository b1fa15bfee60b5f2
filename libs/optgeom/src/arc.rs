//! Discretization of circular arcs.

use super::{Point, Polygon};

/// Default maximum chord deviation from the true arc, in micrometres.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Returns the number of chords needed to approximate an arc of `radius`
/// sweeping `sweep` radians with deviation at most `tolerance`.
pub fn num_segments(radius: f64, sweep: f64, tolerance: f64) -> usize {
    let radius = radius.abs();
    if radius <= tolerance || tolerance <= 0. {
        return ((sweep.abs() / (std::f64::consts::PI / 64.)).ceil() as usize).max(1);
    }
    // The sagitta of one chord is r * (1 - cos(d / 2)).
    let step = 2. * (1. - tolerance / radius).acos();
    ((sweep.abs() / step).ceil() as usize).max(1)
}

/// Returns points along an arc about `center`, starting at angle `start`
/// and sweeping `sweep` radians (counter-clockwise when positive).
///
/// Both endpoints are included, so at least two points are returned.
pub fn arc_points(center: Point, radius: f64, start: f64, sweep: f64, tolerance: f64) -> Vec<Point> {
    let n = num_segments(radius, sweep, tolerance);
    (0..=n)
        .map(|i| center + Point::from_polar(radius, start + sweep * i as f64 / n as f64))
        .collect()
}

/// Returns the polygon enclosed between two concentric arcs.
///
/// The outer arc is traced from `start` to `start + sweep`, then the inner arc back again.
/// An inner radius of zero produces a circular sector.
pub fn ring_sector(
    center: Point,
    inner_radius: f64,
    outer_radius: f64,
    start: f64,
    sweep: f64,
    tolerance: f64,
) -> Polygon {
    let mut points = arc_points(center, outer_radius, start, sweep, tolerance);
    if inner_radius > 0. {
        let mut inner = arc_points(center, inner_radius, start, sweep, tolerance);
        inner.reverse();
        points.extend(inner);
    } else {
        points.push(center);
    }
    Polygon { points }
}
