//! Spiral delay lines between two grating couplers.

use std::f64::consts::{FRAC_PI_2, PI};

use optgeom::Point;

use super::checker::check_gratings;
use super::terminate;
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::layout::cell::Cell;
use crate::layout::context::Library;
use crate::parts::grating::{CornerstoneGratingCoupler, GratingParams};
use crate::parts::{Spiral, Text, Waveguide};

/// Generates a spiral of `number` turns fed and collected by grating couplers.
///
/// The return route clears the spiral and drops onto the first fibre-array column
/// to its right.
pub fn spiral_winding(
    lib: &mut Library,
    params: &GratingParams,
    number: f64,
    gap_size: f64,
    inner_gap_size: f64,
    position: Point,
    name: &str,
) -> Result<Cell> {
    with_err_context(
        spiral_winding_inner(lib, params, number, gap_size, inner_gap_size, position, name),
        || ErrorContext::GenDevice {
            name: name.into(),
            kind: "spiral winding",
        },
    )
}

fn spiral_winding_inner(
    lib: &mut Library,
    params: &GratingParams,
    number: f64,
    gap_size: f64,
    inner_gap_size: f64,
    position: Point,
    name: &str,
) -> Result<Cell> {
    let pdk = lib.pdk();
    let layers = pdk.layers();
    let label = pdk.label();
    let radius = pdk.bend_radius();
    let pitch = pdk.grating_pitch();
    let route = pdk.taper_route();

    let mut cell = Cell::new(lib.alloc_name(name));
    cell.add_to_layer(
        layers.label,
        Text::new(
            position + label.origin,
            label.height,
            label.angle,
            format!(
                "{name}\nNo_loops_{number:?}\nGapbetween_waveguides_{gap_size:?}\nInner_circle_radius_{inner_gap_size:?}"
            ),
        ),
    )?;

    let left = CornerstoneGratingCoupler::create(lib, position, params)?;

    let mut wg1 = Waveguide::make_at_port(left.port());
    wg1.add_straight_segment(route)?.add_bend(FRAC_PI_2, radius)?;

    let spiral = Spiral::make_at_port(wg1.current_port(), number, gap_size, inner_gap_size)?;
    let spiral_size = spiral.size();

    let mut wg2 = Waveguide::make_at_port(spiral.out_port());
    wg2.add_straight_segment(route)?.add_bend(-PI, radius)?;

    let column = (1..pdk.num_channels())
        .map(|j| j as f64 * pitch)
        .find(|x| spiral_size / 2. < *x)
        .ok_or_else(|| {
            ErrorSource::InvalidArgs(format!(
                "spiral of size {spiral_size} does not fit within {} fibre channels",
                pdk.num_channels()
            ))
        })?;
    wg2.add_straight_segment_until_x(position.x + column - radius)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_y(position.y)?;

    let right = terminate(lib, wg2.current_port(), params)?;

    cell.add_cell(left.cell().clone());
    cell.add_cell(right.cell().clone());
    cell.add_to_layer(layers.waveguide, &wg1)?;
    cell.add_to_layer(layers.waveguide, &wg2)?;
    cell.add_to_layer(layers.waveguide, &spiral)?;

    check_gratings(pitch, &left, &right);

    Ok(cell)
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;
    use crate::test_util::{grating_ports, test_library};

    #[test]
    fn small_spiral_returns_on_first_column() {
        let mut lib = test_library();
        let params = lib.pdk().grating_params();
        let cell = spiral_winding(&mut lib, &params, 1., 5., 5., Point::zero(), "spiral").unwrap();

        let ports = grating_ports(&cell);
        assert_eq!(ports.len(), 2);
        assert_float_eq!(ports[0].x, 0., abs <= 1e-6);
        assert_float_eq!(ports[1].x, 127., abs <= 1e-6);
        assert_float_eq!(ports[1].y, 0., abs <= 1e-6);
    }

    #[test]
    fn large_spiral_skips_columns() {
        let mut lib = test_library();
        let params = lib.pdk().grating_params();
        // 2R = 2 * (100 + 2 * 20 * 10.45) = 1036, so half the size clears 4 pitches.
        let cell =
            spiral_winding(&mut lib, &params, 20., 10., 200., Point::zero(), "big").unwrap();

        let ports = grating_ports(&cell);
        assert_float_eq!(ports[1].x, 5. * 127., abs <= 1e-6);
    }

    #[test]
    fn label_lists_spiral_parameters() {
        let mut lib = test_library();
        let params = lib.pdk().grating_params();
        let cell = spiral_winding(&mut lib, &params, 1.5, 5., 5., Point::zero(), "s").unwrap();

        let label = cell.annotations().next().unwrap();
        assert_eq!(
            label.string.as_str(),
            "s\nNo_loops_1.5\nGapbetween_waveguides_5.0\nInner_circle_radius_5.0"
        );
    }

    #[test]
    fn invalid_spiral_reports_device() {
        let mut lib = test_library();
        let params = lib.pdk().grating_params();
        let err = spiral_winding(&mut lib, &params, 1., 5., 0., Point::zero(), "bad").unwrap_err();
        assert!(matches!(err.source(), ErrorSource::Geometry(_)));
        assert!(err.context().iter().any(|ctx| matches!(
            ctx,
            ErrorContext::GenDevice { name, .. } if name.as_str() == "bad"
        )));
    }
}
