use photonics::layout::layers::LayerSpec;
use photonics::pdk::PdkLayers;

use crate::CornerstonePdk;

pub const WAVEGUIDE: LayerSpec = LayerSpec::new(3, 0);
pub const GRATING: LayerSpec = LayerSpec::new(4, 0);
pub const CELL_OUTLINE: LayerSpec = LayerSpec::new(99, 0);
pub const LABEL: LayerSpec = LayerSpec::new(100, 0);

impl CornerstonePdk {
    pub fn layers() -> PdkLayers {
        PdkLayers {
            waveguide: WAVEGUIDE,
            grating: GRATING,
            outline: CELL_OUTLINE,
            label: LABEL,
        }
    }
}
