//! Process design kit interface.
//!
//! A PDK supplies the layers and fabrication constants that device generators need.

use optgeom::Point;

use crate::layout::layers::LayerSpec;
use crate::parts::grating::GratingParams;

/// The layers a photonic mask draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdkLayers {
    /// Full-etch waveguide layer.
    pub waveguide: LayerSpec,
    /// Shallow-etch grating layer.
    pub grating: LayerSpec,
    /// Cell outlines and the design-space frame.
    pub outline: LayerSpec,
    pub label: LayerSpec,
}

/// Placement of device labels relative to the first grating coupler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelParams {
    /// Offset of the label from the first grating's port.
    pub origin: Point,
    pub height: f64,
    /// Rotation of device labels, in radians.
    pub angle: f64,
}

pub trait Pdk: Send + Sync {
    fn name(&self) -> &'static str;

    fn layers(&self) -> PdkLayers;

    fn bend_radius(&self) -> f64;

    /// Center-to-center spacing of the fibre array that probes grating couplers.
    fn grating_pitch(&self) -> f64;

    /// Number of channels in the fibre array.
    fn num_channels(&self) -> usize;

    /// Length of the straight waveguide leaving each grating coupler before any bend.
    fn taper_route(&self) -> f64;

    /// Parameters of the grating couplers used throughout the mask.
    fn grating_params(&self) -> GratingParams;

    /// Parameters of the shallow-etch teeth drawn over each grating coupler.
    fn teeth_params(&self) -> GratingParams {
        self.grating_params().with_opening_scaled(1.1)
    }

    fn label(&self) -> LabelParams;
}
