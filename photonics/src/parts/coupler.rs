//! Directional couplers made of two S-bent arms.

use std::f64::consts::FRAC_PI_2;

use optgeom::bbox::{Bbox, BoundBox};
use optgeom::{GeometryError, Port};

use super::waveguide::Waveguide;
use crate::layout::group::Group;
use crate::layout::Draw;

/// Angle swept by each half of the S-bends leading into the coupling region.
const S_BEND_ANGLE: f64 = FRAC_PI_2;

/// A directional coupler with two arms that approach each other,
/// run parallel for the coupling length, and separate again.
///
/// Index 0 of [`left_ports`](Self::left_ports) and [`right_ports`](Self::right_ports)
/// is the lower arm; index 1 is the upper arm, to the left of the direction of travel.
/// All four ports point along the direction of travel.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalCoupler {
    arms: [Waveguide; 2],
    length: f64,
    gap: f64,
    bend_radius: f64,
}

impl DirectionalCoupler {
    /// Builds a coupler whose lower input port is `port`.
    pub fn make_at_port(
        port: Port,
        length: f64,
        gap: f64,
        bend_radius: f64,
    ) -> Result<Self, GeometryError> {
        if length < 0. {
            return Err(GeometryError::InvalidDimension {
                name: "coupling length",
                value: length,
            });
        }
        if gap < 0. {
            return Err(GeometryError::InvalidDimension {
                name: "coupling gap",
                value: gap,
            });
        }

        let offset = port.width + gap + 4. * bend_radius * (1. - S_BEND_ANGLE.cos());
        let arm = |start: Port, side: f64| -> Result<Waveguide, GeometryError> {
            let mut wg = Waveguide::make_at_port(start);
            wg.add_bend(side * S_BEND_ANGLE, bend_radius)?
                .add_bend(-side * S_BEND_ANGLE, bend_radius)?
                .add_straight_segment(length)?
                .add_bend(-side * S_BEND_ANGLE, bend_radius)?
                .add_bend(side * S_BEND_ANGLE, bend_radius)?;
            Ok(wg)
        };
        let lower = arm(port, 1.)?;
        let upper = arm(port.parallel_offset(offset), -1.)?;

        Ok(Self {
            arms: [lower, upper],
            length,
            gap,
            bend_radius,
        })
    }

    /// The input ports, lower arm first.
    pub fn left_ports(&self) -> [Port; 2] {
        [self.arms[0].in_port(), self.arms[1].in_port()]
    }

    /// The output ports, lower arm first.
    pub fn right_ports(&self) -> [Port; 2] {
        [self.arms[0].current_port(), self.arms[1].current_port()]
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    #[inline]
    pub fn bend_radius(&self) -> f64 {
        self.bend_radius
    }
}

impl Draw for DirectionalCoupler {
    fn draw(&self) -> crate::error::Result<Group> {
        let mut group = self.arms[0].draw()?;
        group.extend(self.arms[1].draw()?);
        Ok(group)
    }
}

impl BoundBox for DirectionalCoupler {
    fn bbox(&self) -> Bbox {
        self.arms[0].bbox().union(self.arms[1].bbox())
    }
}
