//! Asymmetric Mach-Zehnder interferometers with spiral delay arms.

use std::f64::consts::{FRAC_PI_2, PI};

use optgeom::Point;
use serde::{Deserialize, Serialize};

use super::checker::check_gratings;
use super::terminate;
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::layout::cell::Cell;
use crate::layout::context::Library;
use crate::parts::grating::{CornerstoneGratingCoupler, GratingParams};
use crate::parts::{DirectionalCoupler, Spiral, Waveguide};

/// The first fibre-array column, counted from the input grating, that an output may use.
const FIRST_OUTPUT_COLUMN: usize = 3;

/// Absolute tolerance when testing whether a column clears the second coupler.
const COLUMN_TOL: f64 = 1e-6;

/// Geometry of an asymmetric spiral MZI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MziParams {
    /// Length of the straight coupling region of both directional couplers.
    pub coupling_length: f64,
    /// Edge-to-edge gap between the coupled waveguides.
    pub coupling_gap: f64,
    /// Turns of the spiral in the upper arm.
    pub upper_spiral_no: f64,
    /// Turns of the spiral in the lower arm.
    pub lower_spiral_no: f64,
    pub spiral_gap: f64,
    pub spiral_inner_gap: f64,
}

/// Generates an MZI whose arms are spirals of different lengths, between
/// two input and two output grating couplers.
///
/// The inputs sit at `position` and one pitch to its right. The outputs land on
/// the first pair of fibre-array columns past the second coupler.
pub fn asymmetric_spiral_mzi(
    lib: &mut Library,
    params: &GratingParams,
    mzi: &MziParams,
    position: Point,
    name: &str,
) -> Result<Cell> {
    with_err_context(
        asymmetric_spiral_mzi_inner(lib, params, mzi, position, name),
        || ErrorContext::GenDevice {
            name: name.into(),
            kind: "asymmetric spiral MZI",
        },
    )
}

fn asymmetric_spiral_mzi_inner(
    lib: &mut Library,
    params: &GratingParams,
    mzi: &MziParams,
    position: Point,
    name: &str,
) -> Result<Cell> {
    let pdk = lib.pdk();
    let layers = pdk.layers();
    let radius = pdk.bend_radius();
    let pitch = pdk.grating_pitch();
    let route = pdk.taper_route();

    let in1 = CornerstoneGratingCoupler::create(lib, position, params)?;
    let in2 = CornerstoneGratingCoupler::create(lib, position + Point::new(pitch, 0.), params)?;

    let mut wg2 = Waveguide::make_at_port(in2.port());
    wg2.add_straight_segment(route)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment(route)?;

    let dc1 = DirectionalCoupler::make_at_port(
        wg2.current_port(),
        mzi.coupling_length,
        mzi.coupling_gap,
        radius,
    )?;
    let [dc1_lower_in, dc1_upper_in] = dc1.left_ports();
    let [dc1_lower_out, dc1_upper_out] = dc1.right_ports();

    let mut wg1 = Waveguide::make_at_port(in1.port());
    wg1.add_straight_segment_until_y(dc1_upper_in.origin.y - radius)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_x(dc1_upper_in.origin.x)?;

    // Both arms dive below the couplers, just right of the second input grating,
    // with the upper arm nested inside the lower one.
    let wall_x = position.x + pitch + 2. * radius;
    let shelf_y = position.y - route;

    let mut wg3 = Waveguide::make_at_port(dc1_lower_out);
    wg3.add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_y(shelf_y)?
        .add_jog_until_x(wall_x, radius)?;

    let mut wg4 = Waveguide::make_at_port(dc1_upper_out);
    wg4.add_straight_segment(route)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_y(shelf_y - 2. * radius)?
        .add_jog_until_x(wall_x + 2. * radius, radius)?;

    let high_radius = Spiral::outer_radius(
        wg4.width(),
        mzi.upper_spiral_no,
        mzi.spiral_gap,
        mzi.spiral_inner_gap,
    );
    let low_radius = Spiral::outer_radius(
        wg3.width(),
        mzi.lower_spiral_no,
        mzi.spiral_gap,
        mzi.spiral_inner_gap,
    );

    // The upper spiral hangs below the shelf and hands back upwards.
    let turn_y = wg4.current_port().origin.y - 3. * radius - high_radius;
    wg4.add_straight_segment_until_y(turn_y)?
        .add_bend(PI, radius)?;
    let high_spiral = Spiral::make_at_port(
        wg4.current_port(),
        mzi.upper_spiral_no,
        mzi.spiral_gap,
        mzi.spiral_inner_gap,
    )?;

    let spiral_x = high_spiral.out_port().origin.x;
    let rise_min = dc1_upper_out.origin.x + route + 3. * radius;
    let rise_x = if spiral_x < rise_min {
        (spiral_x + 2. * radius).max(rise_min)
    } else if spiral_x <= rise_min + 2. * radius {
        spiral_x
    } else {
        rise_min
    };
    let mut wg6 = Waveguide::make_at_port(high_spiral.out_port());
    wg6.add_straight_segment_until_y(turn_y + high_radius + radius)?
        .add_jog_until_x(rise_x, radius)?;

    // The lower arm runs along the floor beneath the upper spiral.
    let floor_y = turn_y - high_radius.max(radius) - 2. * radius;
    wg3.add_straight_segment_until_y(floor_y + radius)?
        .add_bend(FRAC_PI_2, radius)?
        .add_straight_segment_until_x(wall_x + 2. * radius + low_radius)?;
    let low_spiral = Spiral::make_at_port(
        wg3.current_port(),
        mzi.lower_spiral_no,
        mzi.spiral_gap,
        mzi.spiral_inner_gap,
    )?;

    let return_x = rise_x + 2. * radius;
    let outer_x = (spiral_x + 2. * radius)
        .max(return_x + 2. * radius)
        .max(low_spiral.out_port().origin.x + low_radius + 2. * radius);
    let mut wg5 = Waveguide::make_at_port(low_spiral.out_port());
    wg5.add_straight_segment_until_x(outer_x - radius)?
        .add_bend(FRAC_PI_2, radius)?
        .add_straight_segment_until_y(shelf_y - 2. * radius)?
        .add_jog_until_x(return_x, radius)?
        .add_straight_segment_until_y(dc1_lower_in.origin.y - radius)?
        .add_bend(-FRAC_PI_2, radius)?;

    let dc2 = DirectionalCoupler::make_at_port(
        wg5.current_port(),
        mzi.coupling_length,
        mzi.coupling_gap,
        radius,
    )?;
    let [_, dc2_upper_in] = dc2.left_ports();
    let [dc2_lower_out, dc2_upper_out] = dc2.right_ports();

    wg6.add_straight_segment_until_y(dc2_upper_in.origin.y + radius)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_x(dc2_upper_in.origin.x - 2. * radius)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_y(dc2_upper_in.origin.y + radius)?
        .add_bend(FRAC_PI_2, radius)?;

    let column = output_column(
        position.x,
        dc2_lower_out
            .origin
            .x
            .max(dc2_upper_out.origin.x)
            .max(outer_x + radius),
        radius,
        pitch,
        pdk.num_channels(),
    )?;

    let mut wg7 = Waveguide::make_at_port(dc2_lower_out);
    wg7.add_straight_segment_until_x(position.x + column as f64 * pitch - radius)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_y(position.y)?;

    let mut wg8 = Waveguide::make_at_port(dc2_upper_out);
    wg8.add_straight_segment_until_x(position.x + (column + 1) as f64 * pitch - radius)?
        .add_bend(-FRAC_PI_2, radius)?
        .add_straight_segment_until_y(position.y)?;

    let out1 = terminate(lib, wg7.current_port(), params)?;
    let out2 = terminate(lib, wg8.current_port(), params)?;

    let mut cell = Cell::new(lib.alloc_name(name));
    cell.add_cell(in1.cell().clone());
    cell.add_cell(in2.cell().clone());
    for wg in [&wg1, &wg2, &wg3, &wg4, &wg5, &wg6, &wg7, &wg8] {
        cell.add_to_layer(layers.waveguide, wg)?;
    }
    cell.add_to_layer(layers.waveguide, &dc1)?;
    cell.add_to_layer(layers.waveguide, &dc2)?;
    cell.add_to_layer(layers.waveguide, &low_spiral)?;
    cell.add_to_layer(layers.waveguide, &high_spiral)?;
    cell.add_cell(out1.cell().clone());
    cell.add_cell(out2.cell().clone());

    check_gratings(pitch, &in1, &in2);
    check_gratings(pitch, &in1, &out1);
    check_gratings(pitch, &in1, &out2);

    Ok(cell)
}

/// Finds the first column `k`, at least [`FIRST_OUTPUT_COLUMN`], whose bend into the
/// grating starts at or beyond `clear_x`. Column `k + 1` must also exist.
fn output_column(
    x0: f64,
    clear_x: f64,
    radius: f64,
    pitch: f64,
    num_channels: usize,
) -> Result<usize> {
    (FIRST_OUTPUT_COLUMN..num_channels.saturating_sub(1))
        .find(|&k| x0 + k as f64 * pitch - radius >= clear_x - COLUMN_TOL)
        .ok_or_else(|| {
            ErrorSource::InvalidArgs(format!(
                "MZI output at x = {clear_x} does not fit within {num_channels} fibre channels"
            ))
            .into()
        })
}
