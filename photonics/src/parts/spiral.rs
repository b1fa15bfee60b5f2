//! Interleaved double spirals built from semicircular bends.

use std::f64::consts::PI;

use optgeom::bbox::{Bbox, BoundBox};
use optgeom::{GeometryError, Port};

use super::waveguide::Waveguide;
use crate::layout::group::Group;
use crate::layout::Draw;

/// A double spiral: an inward arm, a central S-turn, and an outward arm
/// interleaved with the inward one.
///
/// The output leaves in the same direction as the input,
/// displaced to its right by the spiral's diameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Spiral {
    wg: Waveguide,
    num: f64,
    gap: f64,
    inner_gap: f64,
}

impl Spiral {
    /// Builds a spiral starting at `port`.
    ///
    /// `num` counts turns per arm in steps of one half, `gap` is the spacing between
    /// neighbouring waveguide edges, and `inner_gap` is the diameter of the central region.
    pub fn make_at_port(
        port: Port,
        num: f64,
        gap: f64,
        inner_gap: f64,
    ) -> Result<Self, GeometryError> {
        if !(num >= 0.) {
            return Err(GeometryError::InvalidDimension {
                name: "spiral turns",
                value: num,
            });
        }
        if !(gap >= 0.) {
            return Err(GeometryError::InvalidDimension {
                name: "spiral gap",
                value: gap,
            });
        }
        if !(inner_gap > 0.) {
            return Err(GeometryError::InvalidDimension {
                name: "spiral inner gap",
                value: inner_gap,
            });
        }

        let pitch = port.width + gap;
        let half_turns = (2. * num).round() as usize;
        let inner_radius = inner_gap / 2.;
        let radius = |k: usize| inner_radius + k as f64 * pitch + pitch / 2.;

        let mut wg = Waveguide::make_at_port(port);
        for k in (0..half_turns).rev() {
            wg.add_bend(-PI, radius(k))?;
        }
        wg.add_bend(-PI, inner_radius / 2.)?
            .add_bend(PI, inner_radius / 2.)?;
        for k in 0..half_turns {
            wg.add_bend(PI, radius(k))?;
        }

        Ok(Self {
            wg,
            num,
            gap,
            inner_gap,
        })
    }

    /// Half the sideways offset between the input and output of a spiral of waveguide
    /// `width` built with the given parameters.
    pub fn outer_radius(width: f64, num: f64, gap: f64, inner_gap: f64) -> f64 {
        inner_gap / 2. + (2. * num).round() * (width + gap)
    }

    #[inline]
    pub fn in_port(&self) -> Port {
        self.wg.in_port()
    }

    #[inline]
    pub fn out_port(&self) -> Port {
        self.wg.current_port()
    }

    /// Path length through the spiral.
    #[inline]
    pub fn length(&self) -> f64 {
        self.wg.length()
    }

    /// The vertical extent of the spiral.
    pub fn size(&self) -> f64 {
        self.bbox().height()
    }

    #[inline]
    pub fn num(&self) -> f64 {
        self.num
    }

    #[inline]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    #[inline]
    pub fn inner_gap(&self) -> f64 {
        self.inner_gap
    }
}

impl Draw for Spiral {
    fn draw(&self) -> crate::error::Result<Group> {
        self.wg.draw()
    }
}

impl BoundBox for Spiral {
    fn bbox(&self) -> Bbox {
        self.wg.bbox()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn output_is_displaced_by_diameter() -> Result<(), GeometryError> {
        for num in [0., 0.5, 1., 1.5, 3.] {
            let spiral = Spiral::make_at_port(Port::new((0., 0.), 0., 0.45), num, 5., 5.)?;
            let n = (2. * num).round();
            let outer = 2.5 + n * 5.45;
            let out = spiral.out_port();
            assert_float_eq!(out.origin.x, 0., abs <= 1e-9);
            // Input heads +x, so the right-hand side is -y.
            assert_float_eq!(out.origin.y, -2. * outer, abs <= 1e-9);
            assert_float_eq!(out.angle, 0., abs <= 1e-9);
        }
        Ok(())
    }

    #[test]
    fn outer_radius_is_half_the_offset() -> Result<(), GeometryError> {
        for (num, inner_gap) in [(0., 5.), (1., 5.), (2.5, 8.), (6., 5.)] {
            let spiral = Spiral::make_at_port(Port::new((0., 0.), FRAC_PI_2, 0.45), num, 5., inner_gap)?;
            let offset = spiral.out_port().origin.x - spiral.in_port().origin.x;
            assert_float_eq!(
                Spiral::outer_radius(0.45, num, 5., inner_gap),
                offset / 2.,
                abs <= 1e-9
            );
        }
        Ok(())
    }

    #[test]
    fn length_sums_semicircles() -> Result<(), GeometryError> {
        let spiral = Spiral::make_at_port(Port::new((0., 0.), FRAC_PI_2, 0.45), 1., 5., 5.)?;
        let radii = [2.5 + 5.45 / 2., 2.5 + 1.5 * 5.45];
        let expected = 2. * PI * (radii[0] + radii[1]) + 2. * PI * 1.25;
        assert_float_eq!(spiral.length(), expected, abs <= 1e-9);
        Ok(())
    }

    #[test]
    fn size_spans_both_arms() -> Result<(), GeometryError> {
        let spiral = Spiral::make_at_port(Port::new((0., 0.), PI, 0.45), 2., 5., 5.)?;
        // Heading -x puts the spiral above its input.
        let outer = 2.5 + 4. * 5.45;
        assert_float_eq!(spiral.size(), 2. * outer + 0.45, abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn rejects_bad_parameters() {
        let port = Port::new((0., 0.), 0., 0.45);
        assert!(Spiral::make_at_port(port, -1., 5., 5.).is_err());
        assert!(Spiral::make_at_port(port, 1., -5., 5.).is_err());
        assert!(Spiral::make_at_port(port, 1., 5., 0.).is_err());
    }
}
