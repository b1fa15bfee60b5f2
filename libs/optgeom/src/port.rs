//! Optical ports: the location, heading, and width of a waveguide end.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use super::{wrap_angle, Point};
use crate::transform::{Transform, Transformation, Translate};

/// A waveguide endpoint.
///
/// `angle` is the direction in which light leaves the structure through
/// this port, in radians, always normalised to `(-pi, pi]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub origin: Point,
    pub angle: f64,
    pub width: f64,
}

impl Port {
    pub fn new(origin: impl Into<Point>, angle: f64, width: f64) -> Self {
        Self {
            origin: origin.into(),
            angle: wrap_angle(angle),
            width,
        }
    }

    /// Returns the unit vector pointing along the port direction.
    pub fn direction(&self) -> Point {
        Point::from_polar(1., self.angle)
    }

    /// Returns a copy of the port rotated by `angle` about `center`.
    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self::new(
            (self.origin - center).rotated(angle) + center,
            self.angle + angle,
            self.width,
        )
    }

    /// Returns the same port facing the opposite way.
    pub fn inverted_direction(&self) -> Self {
        Self::new(self.origin, self.angle + PI, self.width)
    }

    /// Returns a copy of the port moved `offset` along its direction.
    pub fn longitudinal_offset(&self, offset: f64) -> Self {
        Self {
            origin: self.origin + self.direction().scaled(offset),
            ..*self
        }
    }

    /// Returns a copy of the port moved `offset` perpendicular to its direction.
    ///
    /// Positive offsets move to the left of the direction of travel.
    pub fn parallel_offset(&self, offset: f64) -> Self {
        Self {
            origin: self.origin + Point::from_polar(offset, self.angle + FRAC_PI_2),
            ..*self
        }
    }

    /// Returns `true` if `other` sits at the same place, facing the same way.
    pub fn approx_eq(&self, other: &Port) -> bool {
        const TOL: f64 = 1e-6;
        self.origin.dist(other.origin) < TOL
            && wrap_angle(self.angle - other.angle).abs() < TOL
            && (self.width - other.width).abs() < TOL
    }
}

impl Transform for Port {
    fn transform(&self, trans: Transformation) -> Self {
        Self::new(
            self.origin.transform(trans),
            self.angle + trans.angle(),
            self.width,
        )
    }
}

impl Translate for Port {
    fn translate(&mut self, p: Point) {
        self.origin.translate(p);
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn angle_is_normalised() {
        let port = Port::new((0., 0.), 3. * PI / 2., 0.45);
        assert_float_eq!(port.angle, -FRAC_PI_2, abs <= 1e-12);
        let inv = port.inverted_direction();
        assert_float_eq!(inv.angle, FRAC_PI_2, abs <= 1e-12);
    }

    #[test]
    fn offsets_follow_direction() {
        let port = Port::new((1., 1.), FRAC_PI_2, 0.5);
        let fwd = port.longitudinal_offset(10.);
        assert_float_eq!(fwd.origin.x, 1., abs <= 1e-12);
        assert_float_eq!(fwd.origin.y, 11., abs <= 1e-12);

        // Left of +y is -x.
        let side = port.parallel_offset(2.);
        assert_float_eq!(side.origin.x, -1., abs <= 1e-12);
        assert_float_eq!(side.origin.y, 1., abs <= 1e-12);
    }

    #[test]
    fn rotation_about_center() {
        let port = Port::new((2., 0.), 0., 0.5);
        let rot = port.rotated(FRAC_PI_2, Point::new(1., 0.));
        assert!(rot.approx_eq(&Port::new((1., 1.), FRAC_PI_2, 0.5)));
    }
}
