//! Grating coupler loopbacks.

use std::f64::consts::FRAC_PI_2;

use optgeom::Point;

use super::checker::check_gratings;
use super::terminate;
use crate::error::{with_err_context, ErrorContext, Result};
use crate::layout::cell::Cell;
use crate::layout::context::Library;
use crate::parts::grating::{CornerstoneGratingCoupler, GratingParams};
use crate::parts::{Text, Waveguide};

/// Generates two grating couplers one pitch apart, joined by a waveguide.
pub fn grating_coupler(
    lib: &mut Library,
    params: &GratingParams,
    position: Point,
    name: &str,
) -> Result<Cell> {
    with_err_context(grating_coupler_inner(lib, params, position, name), || {
        ErrorContext::GenDevice {
            name: name.into(),
            kind: "grating loopback",
        }
    })
}

fn grating_coupler_inner(
    lib: &mut Library,
    params: &GratingParams,
    position: Point,
    name: &str,
) -> Result<Cell> {
    let pdk = lib.pdk();
    let layers = pdk.layers();
    let label = pdk.label();
    let radius = pdk.bend_radius();
    let pitch = pdk.grating_pitch();

    let mut cell = Cell::new(lib.alloc_name(name));
    cell.add_to_layer(
        layers.label,
        Text::new(
            position + label.origin,
            label.height,
            label.angle,
            name,
        ),
    )?;

    let left = CornerstoneGratingCoupler::create(lib, position, params)?;
    cell.add_cell(left.cell().clone());

    let mut wg = Waveguide::make_at_port(left.port());
    wg.add_straight_segment(pdk.taper_route())?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_x(position.x + pitch - radius)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_y(position.y)?;
    cell.add_to_layer(layers.waveguide, &wg)?;

    let right = terminate(lib, wg.current_port(), params)?;
    cell.add_cell(right.cell().clone());

    check_gratings(pitch, &left, &right);

    Ok(cell)
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;
    use crate::layout::layers::LayerSpec;
    use crate::test_util::{grating_ports, test_library};

    #[test]
    fn loopback_lands_one_pitch_away() {
        let mut lib = test_library();
        let params = lib.pdk().grating_params();
        let cell = grating_coupler(&mut lib, &params, Point::new(254., 0.), "loop").unwrap();

        assert_eq!(cell.name().as_str(), "loop");
        let ports = grating_ports(&cell);
        assert_eq!(ports.len(), 2);
        assert_float_eq!(ports[0].x, 254., abs <= 1e-6);
        assert_float_eq!(ports[1].x, 254. + 127., abs <= 1e-6);
        for port in ports {
            assert_float_eq!(port.y, 0., abs <= 1e-6);
        }
    }

    #[test]
    fn loopback_is_labelled() {
        let mut lib = test_library();
        let params = lib.pdk().grating_params();
        let cell = grating_coupler(&mut lib, &params, Point::zero(), "loop").unwrap();

        let label = cell.annotations().next().unwrap();
        assert_eq!(label.string.as_str(), "loop");
        assert_eq!(label.loc, Point::new(80., -385.));
        assert_eq!(label.layer, LayerSpec(100, 0));
    }

    #[test]
    fn grating_names_are_unique() {
        let mut lib = test_library();
        let params = lib.pdk().grating_params();
        grating_coupler(&mut lib, &params, Point::zero(), "a").unwrap();
        grating_coupler(&mut lib, &params, Point::zero(), "b").unwrap();

        let mut names: Vec<_> = lib.cells().map(|c| c.name().clone()).collect();
        assert_eq!(names.len(), 4);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
