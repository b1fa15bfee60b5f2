//! Fixtures shared by unit tests.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use optgeom::{Point, Rect};

use crate::layout::cell::Cell;
use crate::layout::context::Library;
use crate::layout::layers::LayerSpec;
use crate::parts::grating::GratingParams;
use crate::pdk::{LabelParams, Pdk, PdkLayers};

/// A process with round numbers, close to the Cornerstone rules.
pub(crate) struct TestPdk;

impl Pdk for TestPdk {
    fn name(&self) -> &'static str {
        "test"
    }

    fn layers(&self) -> PdkLayers {
        PdkLayers {
            waveguide: LayerSpec(3, 0),
            grating: LayerSpec(4, 0),
            outline: LayerSpec(99, 0),
            label: LayerSpec(100, 0),
        }
    }

    fn bend_radius(&self) -> f64 {
        10.
    }

    fn grating_pitch(&self) -> f64 {
        127.
    }

    fn num_channels(&self) -> usize {
        127
    }

    fn taper_route(&self) -> f64 {
        10.
    }

    fn grating_params(&self) -> GratingParams {
        GratingParams {
            width: 0.45,
            full_opening_angle: 1.5f64.to_radians(),
            grating_period: 0.67,
            grating_ff: 0.5,
            n_gratings: 60,
            taper_length: 350.,
            angle: -FRAC_PI_2,
        }
    }

    fn label(&self) -> LabelParams {
        LabelParams {
            origin: Point::new(80., -385.),
            height: 10.,
            angle: FRAC_PI_2,
        }
    }
}

pub(crate) fn test_library() -> Library {
    Library::new(TestPdk)
}

/// A frozen cell holding a single `width` x `height` rectangle at the origin.
pub(crate) fn leaf(name: &str, width: f64, height: f64) -> Arc<Cell> {
    let mut cell = Cell::new(name);
    cell.add_element(
        LayerSpec(1, 0),
        Rect::new(Point::zero(), Point::new(width, height)),
    );
    cell.freeze()
}

/// The port locations of the grating couplers instantiated directly in `cell`,
/// sorted by x.
pub(crate) fn grating_ports(cell: &Cell) -> Vec<Point> {
    use optgeom::bbox::BoundBox;

    let mut ports: Vec<Point> = cell
        .insts()
        .filter(|inst| inst.cell().name().starts_with("GC_period_"))
        .map(|inst| {
            let bbox = inst.bbox();
            Point::new(bbox.center().x, bbox.p1.y)
        })
        .collect();
    ports.sort_by(|a, b| a.x.total_cmp(&b.x));
    ports
}
