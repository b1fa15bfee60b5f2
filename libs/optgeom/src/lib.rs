//! Core geometric types for photonic layout.
//!
//! All coordinates are in micrometres and stored as `f64`, since waveguide
//! bends and grating teeth are curved and must not accumulate rounding error
//! before export. Angles are in radians unless a name says otherwise.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::bbox::BoundBox;
use self::transform::{Transform, Transformation, Translate};

pub mod arc;
pub mod bbox;
pub mod hull;
pub mod port;
pub mod transform;

pub use port::Port;

/// Absolute tolerance used for geometric comparisons, in micrometres.
pub const EPSILON: f64 = 1e-9;

/// Rounds `pos` up to the next multiple of `grid`.
///
/// Non-positive grids leave `pos` unchanged.
pub fn snap_up(pos: f64, grid: f64) -> f64 {
    if grid <= 0. {
        return pos;
    }
    let snapped = (pos / grid).ceil() * grid;
    // Values already on the grid should stay put despite float noise.
    if (snapped - grid - pos).abs() < EPSILON {
        snapped - grid
    } else {
        snapped
    }
}

/// Rounds `pos` down to the previous multiple of `grid`.
///
/// Non-positive grids leave `pos` unchanged.
pub fn snap_down(pos: f64, grid: f64) -> f64 {
    if grid <= 0. {
        return pos;
    }
    let snapped = (pos / grid).floor() * grid;
    if (snapped + grid - pos).abs() < EPSILON {
        snapped + grid
    } else {
        snapped
    }
}

/// Normalizes `angle` into the half-open range `(-pi, pi]`.
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

/// An enumeration of geometric errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// A length, radius, or gap was outside its valid range.
    #[error("invalid {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    /// A straight segment cannot reach the requested coordinate.
    #[error("cannot reach {axis} = {target} from {from} heading {angle} rad")]
    Unreachable {
        axis: char,
        target: f64,
        from: f64,
        angle: f64,
    },
}

/// A point in two-dimensional layout-space.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, (0, 0).
    #[inline]
    pub fn zero() -> Self {
        Self { x: 0., y: 0. }
    }

    /// Creates a point at distance `r` from the origin in direction `angle`.
    pub fn from_polar(r: f64, angle: f64) -> Self {
        Self::new(r * angle.cos(), r * angle.sin())
    }

    /// Returns the Euclidean distance to `other`.
    pub fn dist(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns the point rotated by `angle` about the origin.
    pub fn rotated(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Returns the point scaled by `k` about the origin.
    #[inline]
    pub fn scaled(&self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    /// Returns `true` if both coordinates are within [`EPSILON`] of `other`'s.
    pub fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign<Point> for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign<Point> for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from(value: (f64, f64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

/// A closed n-sided polygon with arbitrary number of vertices.
///
/// Closure from the last point back to the first is implied;
/// the initial point need not be repeated at the end.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    /// Creates a new polygon from its vertices.
    pub fn new(points: impl Into<Vec<Point>>) -> Self {
        Self {
            points: points.into(),
        }
    }

    /// Returns the signed area of the polygon.
    ///
    /// Counter-clockwise polygons have positive area.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.;
        }
        let mut acc = 0.;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            acc += p.x * q.y - q.x * p.y;
        }
        acc / 2.
    }

    /// Returns `true` if `pt` lies strictly inside the polygon, by the even-odd rule.
    pub fn contains(&self, pt: Point) -> bool {
        let n = self.points.len();
        if n < 3 || !self.bbox().contains(pt) {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (self.points[i], self.points[j]);
            if (pi.y > pt.y) != (pj.y > pt.y) {
                let xsolve = (pj.x - pi.x) * (pt.y - pi.y) / (pj.y - pi.y) + pi.x;
                if pt.x < xsolve {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

impl Translate for Polygon {
    fn translate(&mut self, p: Point) {
        for pt in self.points.iter_mut() {
            pt.translate(p);
        }
    }
}

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    /// The lower-left corner.
    pub p0: Point,
    /// The upper-right corner.
    pub p1: Point,
}

impl Rect {
    /// Creates a new rectangle, sorting the corners.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// Creates a rectangle spanning `(0, 0)` to `(w, h)`.
    pub fn with_size(w: f64, h: f64) -> Self {
        Self::new(Point::zero(), Point::new(w, h))
    }

    /// Returns the center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2., (self.p0.y + self.p1.y) / 2.)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.p1.x - self.p0.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.p1.y - self.p0.y
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.p0.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.p1.x
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.p0.y
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.p1.y
    }

    /// Returns `true` if `other` lies entirely within this rectangle.
    pub fn encloses(&self, other: &Rect) -> bool {
        self.p0.x <= other.p0.x + EPSILON
            && self.p0.y <= other.p0.y + EPSILON
            && self.p1.x + EPSILON >= other.p1.x
            && self.p1.y + EPSILON >= other.p1.y
    }

    /// Converts the rectangle into a counter-clockwise [`Polygon`].
    pub fn to_polygon(&self) -> Polygon {
        Polygon {
            points: vec![
                self.p0,
                Point::new(self.p1.x, self.p0.y),
                self.p1,
                Point::new(self.p0.x, self.p1.y),
            ],
        }
    }
}

impl Translate for Rect {
    fn translate(&mut self, p: Point) {
        self.p0.translate(p);
        self.p1.translate(p);
    }
}

/// The primary geometric primitive comprising raw layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[enum_dispatch(ShapeTrait)]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
}

impl Shape {
    pub fn as_rect(&self) -> Option<Rect> {
        if let Shape::Rect(rect) = self {
            Some(*rect)
        } else {
            None
        }
    }

    /// Converts the shape to a [`Polygon`], the most general of shapes.
    pub fn to_polygon(&self) -> Polygon {
        match self {
            Self::Rect(r) => r.to_polygon(),
            Self::Polygon(p) => p.clone(),
        }
    }

    /// Returns the shape's vertices.
    pub fn points(&self) -> Vec<Point> {
        self.to_polygon().points
    }
}

/// Common shape operations, dispatched from the [`Shape`] enum to its variants by [mod@enum_dispatch].
#[enum_dispatch]
pub trait ShapeTrait {
    /// Returns the unsigned area enclosed by the shape.
    fn area(&self) -> f64;
    /// Returns `true` if the shape contains [`Point`] `pt`.
    fn contains(&self, pt: Point) -> bool;
}

impl ShapeTrait for Rect {
    fn area(&self) -> f64 {
        self.width() * self.height()
    }
    fn contains(&self, pt: Point) -> bool {
        self.bbox().contains(pt)
    }
}

impl ShapeTrait for Polygon {
    fn area(&self) -> f64 {
        Polygon::area(self).abs()
    }
    fn contains(&self, pt: Point) -> bool {
        Polygon::contains(self, pt)
    }
}

impl Transform for Shape {
    fn transform(&self, trans: Transformation) -> Self {
        match self {
            // Rotated rectangles are no longer axis-aligned.
            Self::Rect(r) if !trans.is_manhattan() => Self::Polygon(r.to_polygon().transform(trans)),
            Self::Rect(s) => Self::Rect(s.transform(trans)),
            Self::Polygon(s) => Self::Polygon(s.transform(trans)),
        }
    }
}

impl Translate for Shape {
    fn translate(&mut self, p: Point) {
        match self {
            Self::Rect(s) => s.translate(p),
            Self::Polygon(s) => s.translate(p),
        }
    }
}
