//! Device generators: complete, grating-coupled test structures.
//!
//! Every generator places its first grating coupler at `position`, with grating bodies
//! extending towards -y and ports facing +y. Routes land subsequent gratings on the
//! fibre-array pitch at the same height.

use optgeom::Port;

use crate::error::Result;
use crate::layout::context::Library;
use crate::parts::grating::{CornerstoneGratingCoupler, CouplerOverrides, GratingParams};

pub mod checker;
pub mod loopback;
pub mod mzi;
pub mod spiral_winding;

pub use checker::check_gratings;
pub use loopback::grating_coupler;
pub use mzi::{asymmetric_spiral_mzi, MziParams};
pub use spiral_winding::spiral_winding;

/// Terminates a route at `port` with a grating coupler of the run's width.
pub(crate) fn terminate(
    lib: &mut Library,
    port: Port,
    params: &GratingParams,
) -> Result<CornerstoneGratingCoupler> {
    CornerstoneGratingCoupler::at_port(
        lib,
        port,
        params,
        CouplerOverrides {
            width: Some(params.width),
            angle: None,
        },
    )
}
