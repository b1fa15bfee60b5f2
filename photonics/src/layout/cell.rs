//! Types related to the creation and instantiation of [`Cell`]s.

use std::sync::{Arc, OnceLock};

use derivative::Derivative;
use derive_builder::Builder;
use optgeom::bbox::{Bbox, BoundBox};
use optgeom::transform::{Transform, Transformation, Translate};
use optgeom::{Point, Shape};
use serde::{Deserialize, Serialize};

use super::layers::LayerSpec;
use super::Draw;
use crate::deps::arcstr::ArcStr;
use crate::error::Result;

/// The layout view of a cell.
///
/// Cells are assembled mutably, then shared as an [`Arc<Cell>`]
/// once placed inside other cells.
#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct Cell {
    /// The cell's name.
    name: ArcStr,
    /// A list of instances contained in the cell.
    insts: Vec<Instance>,
    /// A list of primitive/geometric elements.
    elems: Vec<Element>,
    /// A list of text annotations.
    annotations: Vec<TextElement>,

    /// Bounding box, computed on first use.
    #[derivative(Debug = "ignore")]
    cache: OnceLock<Bbox>,
}

impl Clone for Cell {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            insts: self.insts.clone(),
            elems: self.elems.clone(),
            annotations: self.annotations.clone(),
            cache: OnceLock::new(),
        }
    }
}

/// An instance of a cell in a layout.
#[derive(Debug, Clone, Builder)]
pub struct Instance {
    /// The instance name.
    #[builder(default, setter(into))]
    pub(crate) name: ArcStr,
    /// A pointer to the reference cell.
    pub(crate) cell: Arc<Cell>,
    /// The location of the cell's origin in the parent.
    #[builder(default)]
    pub(crate) loc: Point,
    /// The counter-clockwise rotation of the cell about its origin, in radians.
    #[builder(default)]
    pub(crate) angle: f64,
}

impl Instance {
    /// Creates a new [`InstanceBuilder`].
    #[inline]
    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::default()
    }

    /// Creates an unrotated instance of `cell` at `loc`, named after the cell.
    pub fn new(cell: Arc<Cell>, loc: Point) -> Self {
        Self {
            name: cell.name().clone(),
            cell,
            loc,
            angle: 0.,
        }
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn cell(&self) -> &Arc<Cell> {
        &self.cell
    }

    #[inline]
    pub fn loc(&self) -> Point {
        self.loc
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The transformation from the instantiated cell's frame to the parent's frame.
    pub fn transformation(&self) -> Transformation {
        Transformation::with_loc_and_angle(self.loc, self.angle)
    }
}

impl BoundBox for Instance {
    fn bbox(&self) -> Bbox {
        match self.cell.bbox().into_rect() {
            Some(rect) => rect.to_polygon().transform(self.transformation()).bbox(),
            None => Bbox::empty(),
        }
    }
}

impl Translate for Instance {
    fn translate(&mut self, p: Point) {
        self.loc.translate(p);
    }
}

/// A primitive geometric element.
///
/// Combines a geometric [`Shape`] with a [`LayerSpec`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Element {
    /// The layer where the element is located.
    pub layer: LayerSpec,
    /// The element's shape.
    pub inner: Shape,
}

impl Element {
    /// Creates a new [`Element`].
    pub fn new(layer: impl Into<LayerSpec>, shape: impl Into<Shape>) -> Self {
        Self {
            layer: layer.into(),
            inner: shape.into(),
        }
    }

    pub fn into_inner(self) -> Shape {
        self.inner
    }
}

impl BoundBox for Element {
    #[inline]
    fn bbox(&self) -> Bbox {
        self.inner.bbox()
    }
}

impl Transform for Element {
    fn transform(&self, trans: Transformation) -> Self {
        Self {
            layer: self.layer,
            inner: self.inner.transform(trans),
        }
    }
}

impl Translate for Element {
    fn translate(&mut self, p: Point) {
        self.inner.translate(p);
    }
}

/// A text annotation.
///
/// Multi-line strings are stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextElement {
    /// The string value of the annotation.
    pub string: ArcStr,
    /// The location of the annotation
    pub loc: Point,
    /// The layer on which the annotation resides.
    pub layer: LayerSpec,
    /// The nominal text height, in micrometres.
    pub height: f64,
    /// The rotation of the text, in radians.
    pub angle: f64,
}

impl Translate for TextElement {
    fn translate(&mut self, p: Point) {
        self.loc.translate(p);
    }
}

impl Transform for TextElement {
    fn transform(&self, trans: Transformation) -> Self {
        Self {
            string: self.string.clone(),
            loc: self.loc.transform(trans),
            layer: self.layer,
            height: self.height,
            angle: self.angle + trans.angle(),
        }
    }
}

impl Cell {
    /// Creates a new, empty [`Cell`] with name `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn insts(&self) -> impl Iterator<Item = &Instance> {
        self.insts.iter()
    }

    #[inline]
    pub fn elems(&self) -> impl Iterator<Item = &Element> {
        self.elems.iter()
    }

    #[inline]
    pub fn annotations(&self) -> impl Iterator<Item = &TextElement> {
        self.annotations.iter()
    }

    /// Returns the elements drawn on `layer`.
    pub fn elems_on(&self, layer: LayerSpec) -> impl Iterator<Item = &Element> {
        self.elems.iter().filter(move |e| e.layer == layer)
    }

    /// Adds a single shape on `layer`.
    pub fn add_element(&mut self, layer: impl Into<LayerSpec>, shape: impl Into<Shape>) {
        self.elems.push(Element::new(layer, shape));
        self.invalidate();
    }

    /// Adds every shape in `shapes` on `layer`.
    pub fn add_shapes<S: Into<Shape>>(
        &mut self,
        layer: impl Into<LayerSpec>,
        shapes: impl IntoIterator<Item = S>,
    ) {
        let layer = layer.into();
        self.elems
            .extend(shapes.into_iter().map(|s| Element::new(layer, s)));
        self.invalidate();
    }

    /// Draws `obj` and adds its shapes and labels to `layer`.
    pub fn add_to_layer(&mut self, layer: impl Into<LayerSpec>, obj: impl Draw) -> Result<()> {
        let layer = layer.into();
        let group = obj.draw()?;
        self.add_shapes(layer, group.shapes);
        for label in group.labels {
            self.add_annotation(TextElement {
                string: label.string,
                loc: label.loc,
                layer,
                height: label.height,
                angle: label.angle,
            });
        }
        Ok(())
    }

    pub fn add_annotation(&mut self, annotation: TextElement) {
        self.annotations.push(annotation);
        self.invalidate();
    }

    /// Adds `cell` as a sub-cell, placed at the origin without rotation.
    pub fn add_cell(&mut self, cell: Arc<Cell>) {
        self.add_inst(Instance::new(cell, Point::zero()));
    }

    pub fn add_inst(&mut self, inst: Instance) {
        self.insts.push(inst);
        self.invalidate();
    }

    /// Consumes the cell, sharing it for instantiation elsewhere.
    #[inline]
    pub fn freeze(self) -> Arc<Cell> {
        Arc::new(self)
    }

    /// Returns `true` if the cell has no instances, elements, or annotations.
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty() && self.elems.is_empty() && self.annotations.is_empty()
    }

    fn invalidate(&mut self) {
        self.cache = OnceLock::new();
    }

    fn compute_bbox(&self) -> Bbox {
        let mut bbox = Bbox::empty();
        for elem in self.elems.iter() {
            bbox = bbox.union(elem.bbox());
        }
        for annotation in self.annotations.iter() {
            bbox = bbox.union(annotation.loc.bbox());
        }
        for inst in self.insts.iter() {
            bbox = bbox.union(inst.bbox());
        }
        bbox
    }
}

impl BoundBox for Cell {
    /// The union of the cell's own geometry, annotation anchors, and
    /// the transformed bounding boxes of its instances.
    fn bbox(&self) -> Bbox {
        *self.cache.get_or_init(|| self.compute_bbox())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use float_eq::assert_float_eq;
    use optgeom::Rect;

    use super::*;

    #[test]
    fn bbox_includes_rotated_instances() {
        let mut child = Cell::new("child");
        child.add_element(LayerSpec(1, 0), Rect::new(Point::zero(), Point::new(10., 2.)));
        let child = child.freeze();

        let mut parent = Cell::new("parent");
        parent.add_inst(
            Instance::builder()
                .name("rotated")
                .cell(child.clone())
                .loc(Point::new(100., 0.))
                .angle(FRAC_PI_2)
                .build()
                .unwrap(),
        );
        parent.add_cell(child);

        let bbox = parent.bbox();
        assert_float_eq!(bbox.p0.x, 0., abs <= 1e-9);
        assert_float_eq!(bbox.p1.x, 100., abs <= 1e-9);
        assert_float_eq!(bbox.p1.y, 10., abs <= 1e-9);
    }

    #[test]
    fn bbox_tracks_mutation() {
        let mut cell = Cell::new("growing");
        assert!(cell.bbox().is_empty());
        cell.add_element(LayerSpec(1, 0), Rect::with_size(1., 1.));
        assert_float_eq!(cell.bbox().width(), 1., abs <= 1e-12);
        cell.add_annotation(TextElement {
            string: "label".into(),
            loc: Point::new(5., -5.),
            layer: LayerSpec(100, 0),
            height: 10.,
            angle: 0.,
        });
        assert_float_eq!(cell.bbox().width(), 5., abs <= 1e-12);
        assert_float_eq!(cell.bbox().height(), 6., abs <= 1e-12);

        let debug = format!("{cell:?}");
        assert!(debug.contains("growing"));
        assert!(!debug.contains("cache"));
    }
}
