//! The Cornerstone silicon photonics process.

use photonics::parts::grating::GratingParams;
use photonics::pdk::{LabelParams, Pdk, PdkLayers};

use crate::constants::*;

pub mod constants;
pub mod layers;

#[derive(Debug, Clone, Copy, Default)]
pub struct CornerstonePdk;

impl CornerstonePdk {
    pub fn new() -> Self {
        Self
    }

    /// The grating coupler used for every optical input and output on the mask.
    pub fn grating_params() -> GratingParams {
        GratingParams {
            width: GRATING_COUPLER_WIDTH,
            full_opening_angle: GRATING_FAN_ANGLE_DEG.to_radians(),
            grating_period: GRATING_PERIOD,
            grating_ff: GRATING_FILL_FACTOR,
            n_gratings: GRATING_NO_PERIODS,
            taper_length: GRATING_TAPER_LENGTH,
            angle: -std::f64::consts::FRAC_PI_2,
        }
    }
}

impl Pdk for CornerstonePdk {
    fn name(&self) -> &'static str {
        "cornerstone"
    }

    fn layers(&self) -> PdkLayers {
        Self::layers()
    }

    fn bend_radius(&self) -> f64 {
        BEND_RADIUS
    }

    fn grating_pitch(&self) -> f64 {
        GRATING_PITCH
    }

    fn num_channels(&self) -> usize {
        VGA_NUM_CHANNELS
    }

    fn taper_route(&self) -> f64 {
        GRATING_TAPER_ROUTE
    }

    fn grating_params(&self) -> GratingParams {
        Self::grating_params()
    }

    fn teeth_params(&self) -> GratingParams {
        Self::grating_params().with_opening_scaled(TEETH_OPENING_SCALE)
    }

    fn label(&self) -> LabelParams {
        LabelParams {
            origin: LABEL_ORIGIN.into(),
            height: LABEL_HEIGHT,
            angle: LABEL_ANGLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;
    use optgeom::Point;

    use super::*;

    #[test]
    fn teeth_fan_is_wider() {
        let pdk = CornerstonePdk::new();
        let outline = pdk.grating_params();
        let teeth = pdk.teeth_params();
        assert_float_eq!(
            teeth.full_opening_angle,
            1.65f64.to_radians(),
            abs <= 1e-12
        );
        assert_eq!(teeth.n_gratings, outline.n_gratings);
        assert_eq!(teeth.grating_period, outline.grating_period);
    }

    #[test]
    fn label_sits_below_gratings() {
        let label = CornerstonePdk.label();
        assert_eq!(label.origin, Point::new(80., -385.));
        assert!(label.origin.y < -(GRATING_TAPER_LENGTH + GRATING_PERIOD * 50.));
    }
}
