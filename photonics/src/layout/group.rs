//! Loose collections of drawn geometry.

use optgeom::bbox::{Bbox, BoundBox};
use optgeom::transform::Translate;
use optgeom::{Point, Shape};

use crate::deps::arcstr::ArcStr;

/// A label that has not yet been assigned a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub string: ArcStr,
    pub loc: Point,
    pub height: f64,
    /// Rotation of the text in radians.
    pub angle: f64,
}

/// The output of [`Draw`](super::Draw): shapes and labels awaiting a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub shapes: Vec<Shape>,
    pub labels: Vec<Label>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: impl Into<Shape>) {
        self.shapes.push(shape.into());
    }

    pub fn add_label(&mut self, label: Label) {
        self.labels.push(label);
    }

    /// Moves the contents of `other` into this group.
    pub fn extend(&mut self, other: Group) {
        self.shapes.extend(other.shapes);
        self.labels.extend(other.labels);
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.labels.is_empty()
    }
}

impl<S: Into<Shape>> FromIterator<S> for Group {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            shapes: iter.into_iter().map(Into::into).collect(),
            labels: Vec::new(),
        }
    }
}

impl BoundBox for Group {
    fn bbox(&self) -> Bbox {
        let bbox = self
            .shapes
            .iter()
            .fold(Bbox::empty(), |acc, s| acc.union(s.bbox()));
        self.labels
            .iter()
            .fold(bbox, |acc, l| acc.union(l.loc.bbox()))
    }
}

impl Translate for Group {
    fn translate(&mut self, p: Point) {
        for s in self.shapes.iter_mut() {
            s.translate(p);
        }
        for l in self.labels.iter_mut() {
            l.loc.translate(p);
        }
    }
}
