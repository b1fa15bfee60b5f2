//! Fabrication constants for the Cornerstone 220nm silicon-on-insulator run.
//!
//! Lengths are in micrometres.

pub const WAVEGUIDE_WIDTH: f64 = 0.45;
pub const BEND_RADIUS: f64 = 10.;
/// Channels in the fibre array used to probe grating couplers.
pub const VGA_NUM_CHANNELS: usize = 127;

pub const GRATING_COUPLER_WIDTH: f64 = WAVEGUIDE_WIDTH;
/// Full opening angle of the grating fan, in degrees.
pub const GRATING_FAN_ANGLE_DEG: f64 = 1.5;
pub const GRATING_PERIOD: f64 = 0.67;
pub const GRATING_FILL_FACTOR: f64 = 0.5;
pub const GRATING_NO_PERIODS: usize = 60;
pub const GRATING_TAPER_LENGTH: f64 = 350.;
pub const GRATING_PITCH: f64 = 127.;
pub const GRATING_TAPER_ROUTE: f64 = 10.;
/// Widening of the shallow-etch teeth fan relative to the grating outline.
pub const TEETH_OPENING_SCALE: f64 = 1.1;

pub const LABEL_ORIGIN: (f64, f64) = (80., -385.);
pub const LABEL_HEIGHT: f64 = 10.;
/// Labels run vertically, alongside the grating bodies.
pub const LABEL_ANGLE: f64 = std::f64::consts::FRAC_PI_2;
