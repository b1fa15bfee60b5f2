//! GDS layer specifications.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A GDS layer and datatype pair.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct LayerSpec(pub i16, pub i16);

impl LayerSpec {
    #[inline]
    pub const fn new(layer: i16, datatype: i16) -> Self {
        Self(layer, datatype)
    }

    #[inline]
    pub fn layer(&self) -> i16 {
        self.0
    }

    #[inline]
    pub fn datatype(&self) -> i16 {
        self.1
    }
}

impl Display for LayerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

impl From<(i16, i16)> for LayerSpec {
    fn from(value: (i16, i16)) -> Self {
        Self(value.0, value.1)
    }
}

impl From<gds21::GdsLayerSpec> for LayerSpec {
    fn from(other: gds21::GdsLayerSpec) -> Self {
        Self(other.layer, other.xtype)
    }
}

#[allow(clippy::from_over_into)]
impl Into<gds21::GdsLayerSpec> for LayerSpec {
    fn into(self) -> gds21::GdsLayerSpec {
        gds21::GdsLayerSpec {
            layer: self.0,
            xtype: self.1,
        }
    }
}
