//! Waveguides built from straight segments and circular bends.

use std::f64::consts::FRAC_PI_2;

use optgeom::arc::{ring_sector, DEFAULT_TOLERANCE};
use optgeom::bbox::{Bbox, BoundBox};
use optgeom::{wrap_angle, GeometryError, Point, Polygon, Port};

use crate::layout::group::Group;
use crate::layout::Draw;

/// Below this magnitude a direction component is treated as zero.
const PARALLEL_TOL: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Straight {
        start: Point,
        angle: f64,
        length: f64,
    },
    Bend {
        center: Point,
        radius: f64,
        /// Polar angle of the start point as seen from `center`.
        start: f64,
        sweep: f64,
    },
}

impl Segment {
    fn length(&self) -> f64 {
        match *self {
            Segment::Straight { length, .. } => length,
            Segment::Bend { radius, sweep, .. } => radius * sweep.abs(),
        }
    }

    fn polygon(&self, width: f64) -> Polygon {
        match *self {
            Segment::Straight {
                start,
                angle,
                length,
            } => {
                let end = start + Point::from_polar(length, angle);
                let half = Point::from_polar(width / 2., angle + FRAC_PI_2);
                Polygon::new(vec![start - half, end - half, end + half, start + half])
            }
            Segment::Bend {
                center,
                radius,
                start,
                sweep,
            } => ring_sector(
                center,
                radius - width / 2.,
                radius + width / 2.,
                start,
                sweep,
                DEFAULT_TOLERANCE,
            ),
        }
    }
}

/// A waveguide of constant width, grown from a starting port.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveguide {
    in_port: Port,
    current: Port,
    segments: Vec<Segment>,
}

impl Waveguide {
    /// Starts a waveguide at `port`, heading in the port's direction.
    pub fn make_at_port(port: Port) -> Self {
        Self {
            in_port: port,
            current: port,
            segments: Vec::new(),
        }
    }

    /// Extends the waveguide straight ahead by `length`.
    pub fn add_straight_segment(&mut self, length: f64) -> Result<&mut Self, GeometryError> {
        if length < 0. {
            return Err(GeometryError::InvalidDimension {
                name: "straight segment length",
                value: length,
            });
        }
        if length > 0. {
            self.segments.push(Segment::Straight {
                start: self.current.origin,
                angle: self.current.angle,
                length,
            });
            self.current = self.current.longitudinal_offset(length);
        }
        Ok(self)
    }

    /// Extends the waveguide straight ahead until its end lies at `x`.
    pub fn add_straight_segment_until_x(&mut self, x: f64) -> Result<&mut Self, GeometryError> {
        let dir = self.current.direction().x;
        let from = self.current.origin.x;
        self.add_straight_until('x', x, from, dir)
    }

    /// Extends the waveguide straight ahead until its end lies at `y`.
    pub fn add_straight_segment_until_y(&mut self, y: f64) -> Result<&mut Self, GeometryError> {
        let dir = self.current.direction().y;
        let from = self.current.origin.y;
        self.add_straight_until('y', y, from, dir)
    }

    fn add_straight_until(
        &mut self,
        axis: char,
        target: f64,
        from: f64,
        dir: f64,
    ) -> Result<&mut Self, GeometryError> {
        let unreachable = GeometryError::Unreachable {
            axis,
            target,
            from,
            angle: self.current.angle,
        };
        if dir.abs() < PARALLEL_TOL {
            return Err(unreachable);
        }
        let length = (target - from) / dir;
        if length < -optgeom::EPSILON {
            return Err(unreachable);
        }
        self.add_straight_segment(length.max(0.))
    }

    /// Adds a circular bend of `radius`, turning by `angle` radians.
    ///
    /// Positive angles turn left (counter-clockwise).
    pub fn add_bend(&mut self, angle: f64, radius: f64) -> Result<&mut Self, GeometryError> {
        if radius <= 0. {
            return Err(GeometryError::InvalidDimension {
                name: "bend radius",
                value: radius,
            });
        }
        if angle == 0. {
            return Ok(self);
        }
        let side = angle.signum();
        let heading = self.current.angle;
        let center = self.current.origin + Point::from_polar(radius, heading + side * FRAC_PI_2);
        let start = heading - side * FRAC_PI_2;
        self.segments.push(Segment::Bend {
            center,
            radius,
            start,
            sweep: angle,
        });
        self.current = Port {
            origin: center + Point::from_polar(radius, start + angle),
            angle: wrap_angle(heading + angle),
            width: self.current.width,
        };
        Ok(self)
    }

    /// Shifts the waveguide sideways until its end lies at `x`, using two opposite
    /// quarter bends of `radius` joined by a straight.
    ///
    /// The waveguide must be heading vertically, and it leaves with the same heading.
    /// The shift must be zero or at least twice `radius`.
    pub fn add_jog_until_x(&mut self, x: f64, radius: f64) -> Result<&mut Self, GeometryError> {
        let from = self.current.origin.x;
        let dx = x - from;
        if dx.abs() < optgeom::EPSILON {
            return Ok(self);
        }
        let dir = self.current.direction();
        if dir.y.abs() < PARALLEL_TOL || dir.x.abs() > PARALLEL_TOL {
            return Err(GeometryError::Unreachable {
                axis: 'x',
                target: x,
                from,
                angle: self.current.angle,
            });
        }
        let turn = -dx.signum() * dir.y.signum() * FRAC_PI_2;
        self.add_bend(turn, radius)?
            .add_straight_segment_until_x(x - dx.signum() * radius)?
            .add_bend(-turn, radius)
    }

    /// The port at the growing end of the waveguide.
    #[inline]
    pub fn current_port(&self) -> Port {
        self.current
    }

    /// The port the waveguide started from.
    #[inline]
    pub fn in_port(&self) -> Port {
        self.in_port
    }

    /// The heading at the growing end of the waveguide.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.current.angle
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.current.width
    }

    /// Total path length along the centerline.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Returns one polygon per segment.
    pub fn polygons(&self) -> Vec<Polygon> {
        let width = self.current.width;
        self.segments.iter().map(|s| s.polygon(width)).collect()
    }
}

impl Draw for Waveguide {
    fn draw(&self) -> crate::error::Result<Group> {
        Ok(self.polygons().into_iter().collect())
    }
}

impl BoundBox for Waveguide {
    fn bbox(&self) -> Bbox {
        self.polygons()
            .iter()
            .fold(Bbox::empty(), |acc, p| acc.union(p.bbox()))
    }
}
