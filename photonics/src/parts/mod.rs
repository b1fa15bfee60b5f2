//! Photonic building blocks that are chained together port to port.

pub mod coupler;
pub mod grating;
pub mod spiral;
pub mod text;
pub mod waveguide;

pub use coupler::DirectionalCoupler;
pub use grating::{CornerstoneGratingCoupler, GratingCoupler, GratingParams};
pub use spiral::Spiral;
pub use text::Text;
pub use waveguide::Waveguide;
