//! Text labels.

use optgeom::Point;

use crate::deps::arcstr::ArcStr;
use crate::layout::group::{Group, Label};
use crate::layout::Draw;

/// A text label, drawn as a GDS text annotation on the layer it is added to.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub origin: Point,
    pub height: f64,
    /// Rotation in radians.
    pub angle: f64,
    pub text: ArcStr,
}

impl Text {
    pub fn new(origin: impl Into<Point>, height: f64, angle: f64, text: impl Into<ArcStr>) -> Self {
        Self {
            origin: origin.into(),
            height,
            angle,
            text: text.into(),
        }
    }
}

impl Draw for Text {
    fn draw(&self) -> crate::error::Result<Group> {
        let mut group = Group::new();
        group.add_label(Label {
            string: self.text.clone(),
            loc: self.origin,
            height: self.height,
            angle: self.angle,
        });
        Ok(group)
    }
}
