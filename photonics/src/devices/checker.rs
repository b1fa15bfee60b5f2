//! Placement checks for grating couplers probed by a fibre array.

use crate::log::warn;
use crate::parts::grating::CornerstoneGratingCoupler;

/// Absolute tolerance when comparing x separations against the pitch.
const PITCH_TOL: f64 = 1e-6;

fn round9(v: f64) -> f64 {
    (v * 1e9).round() / 1e9
}

/// Returns `true` if `x` is a whole multiple of `pitch`, within tolerance.
pub fn on_pitch(x: f64, pitch: f64) -> bool {
    let rem = x.abs() % pitch;
    rem < PITCH_TOL || pitch - rem < PITCH_TOL
}

/// Compares the port positions of two gratings and warns when they could not be
/// probed together: different heights, or an x separation off the fibre pitch.
///
/// Returns the separation `(x_diff, y_diff)` from `b` to `a`.
pub fn check_gratings(
    pitch: f64,
    a: &CornerstoneGratingCoupler,
    b: &CornerstoneGratingCoupler,
) -> (f64, f64) {
    let (pa, pb) = (a.port().origin, b.port().origin);
    let y_diff = round9(pa.y) - round9(pb.y);
    let x_diff = round9(pa.x) - round9(pb.x);

    if y_diff != 0. {
        warn!(
            "gratings {} and {} have a y separation of {}",
            a.cell().name(),
            b.cell().name(),
            y_diff
        );
    }
    if !on_pitch(x_diff, pitch) {
        warn!(
            "gratings {} and {} have an x separation of {}; recommended is a multiple of {}",
            a.cell().name(),
            b.cell().name(),
            x_diff.abs(),
            pitch
        );
    }

    (x_diff, y_diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_multiples() {
        assert!(on_pitch(0., 127.));
        assert!(on_pitch(-254., 127.));
        assert!(on_pitch(381.0000000001, 127.));
        assert!(on_pitch(380.9999999999, 127.));
        assert!(!on_pitch(128., 127.));
    }

    #[test]
    fn rounding_removes_float_noise() {
        assert_eq!(round9(0.1 + 0.2) - round9(0.3), 0.);
    }
}
