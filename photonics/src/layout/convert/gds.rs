//! Utilities for GDS conversion.
//!
//! Converts the layout data model to [`gds21`] structures.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use derivative::Derivative;
use optgeom::{Point, Shape};
use serde::{Deserialize, Serialize};

use super::error::{ErrorHelper, ExportContext};
use crate::deps::arcstr::{self, ArcStr};
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::layout::cell::{Cell, Element, Instance, TextElement};
use crate::layout::error::{LayoutError, LayoutResult};
use crate::layout::layers::LayerSpec;
use crate::log::debug;

/// Database units per micrometre.
const DB_PER_UM: f64 = 1e3;

/// Rotations smaller than this, in degrees, are exported without a transform.
const ANGLE_TOL_DEG: f64 = 1e-9;

/// A GDSII exporter.
///
/// Converts a cell hierarchy to a GDSII library ([`gds21::GdsLibrary`]).
/// Each cell is exported once, after every cell it instantiates.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct GdsExporter<'a> {
    /// The top level cell.
    ///
    /// The name of this cell will be preserved.
    #[derivative(Debug = "ignore")]
    top: &'a Cell,
    backtrace: Vec<ExportContext>,
    names_used: HashSet<ArcStr>,
    /// Exported struct names, keyed by cell address.
    names: HashMap<*const Cell, ArcStr>,
    #[derivative(Debug = "ignore")]
    structs: Vec<gds21::GdsStruct>,
}

/// Additional [`Cell`] methods for GDSII conversion.
impl Cell {
    /// Converts the cell and everything it instantiates to a GDSII library.
    pub fn to_gds_lib(&self, lib_name: &str) -> Result<gds21::GdsLibrary> {
        let inner = || -> Result<gds21::GdsLibrary> {
            Ok(GdsExporter::new(self)
                .export_lib(lib_name)
                .map_err(ErrorSource::Layout)?)
        };
        with_err_context(inner(), || {
            ErrorContext::Task(arcstr::format!(
                "converting cell {} to GDS library",
                self.name()
            ))
        })
    }

    /// Saves the cell hierarchy to a GDS file, using the cell name as the library name.
    pub fn save_gds(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let inner = || -> Result<()> {
            self.to_gds_lib(self.name())?
                .save(path)
                .map_err(LayoutError::from)
                .map_err(ErrorSource::Layout)?;
            Ok(())
        };
        with_err_context(inner(), || {
            ErrorContext::CreateFile(path.to_path_buf())
        })
    }
}

/// A structural summary of a GDS file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdsSummary {
    /// The library name.
    pub name: String,
    /// Each struct's name and element count, in file order.
    pub structs: Vec<(String, usize)>,
}

impl GdsSummary {
    /// The number of elements in the struct named `name`, if present.
    pub fn num_elems(&self, name: &str) -> Option<usize> {
        self.structs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, count)| *count)
    }

    #[inline]
    pub fn num_structs(&self) -> usize {
        self.structs.len()
    }
}

/// Loads the GDS file at `path` and summarizes its structs.
pub fn import_summary(path: impl AsRef<Path>) -> Result<GdsSummary> {
    let path = path.as_ref();
    let inner = || -> Result<GdsSummary> {
        let lib = gds21::GdsLibrary::load(path)
            .map_err(LayoutError::from)
            .map_err(ErrorSource::Layout)?;
        Ok(GdsSummary {
            name: lib.name.to_string(),
            structs: lib
                .structs
                .iter()
                .map(|s| (s.name.to_string(), s.elems.len()))
                .collect(),
        })
    };
    with_err_context(inner(), || ErrorContext::ReadFile(path.to_path_buf()))
}

impl<'a> GdsExporter<'a> {
    /// Creates an exporter rooted at `top`.
    pub fn new(top: &'a Cell) -> Self {
        Self {
            top,
            backtrace: Vec::new(),
            names_used: HashSet::new(),
            names: HashMap::new(),
            structs: Vec::new(),
        }
    }

    /// Exports to a [`gds21::GdsLibrary`].
    pub fn export_lib(mut self, lib_name: &str) -> LayoutResult<gds21::GdsLibrary> {
        self.backtrace
            .push(ExportContext::Library(ArcStr::from(lib_name)));
        let mut gdslib = gds21::GdsLibrary::new(lib_name);
        // User units are 1µm, database units 1nm.
        gdslib.units = gds21::GdsUnits::new(1e-3, 1e-9);

        self.names_used.insert(self.top.name().clone());
        let top = self.top;
        self.export_cell(top)?;
        self.backtrace.pop();

        debug!(
            "exported {} GDS structs under top cell {}",
            self.structs.len(),
            top.name()
        );
        gdslib.structs = self.structs;
        Ok(gdslib)
    }

    /// Converts a [`Cell`] to a [`gds21::GdsStruct`], exporting its children first.
    fn export_cell(&mut self, cell: &Cell) -> LayoutResult<()> {
        let key = cell as *const Cell;
        if self.names.contains_key(&key) {
            return Ok(());
        }
        let name = self.get_cell_name(cell);
        self.names.insert(key, name.clone());
        self.backtrace.push(ExportContext::Cell(name.clone()));

        for inst in cell.insts() {
            self.export_cell(inst.cell())?;
        }

        let mut elems = Vec::new();
        for inst in cell.insts() {
            elems.push(self.export_instance(inst)?.into());
        }

        self.backtrace.push(ExportContext::Geometry);
        for elem in cell.elems() {
            elems.push(self.export_element(elem)?);
        }
        self.backtrace.pop();

        self.backtrace.push(ExportContext::Annotations);
        for annotation in cell.annotations() {
            elems.push(self.export_annotation(annotation)?);
        }
        self.backtrace.pop();

        let mut strukt = gds21::GdsStruct::new(name.to_string());
        strukt.elems = elems;
        self.structs.push(strukt);

        self.backtrace.pop();
        Ok(())
    }

    /// Converts an [`Instance`] to a GDS instance ([`gds21::GdsStructRef`]).
    fn export_instance(&mut self, inst: &Instance) -> LayoutResult<gds21::GdsStructRef> {
        self.backtrace
            .push(ExportContext::Instance(inst.name().clone()));
        let key = &**inst.cell() as *const Cell;
        let name = self.unwrap(
            self.names.get(&key).cloned(),
            format!("cell {} was not exported", inst.cell().name()),
        )?;
        let gdsinst = gds21::GdsStructRef {
            name: name.to_string().into(),
            xy: self.export_point(&inst.loc())?,
            strans: export_angle(inst.angle()).map(|angle| gds21::GdsStrans {
                angle: Some(angle),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.backtrace.pop();
        Ok(gdsinst)
    }

    /// Converts an [`Element`] into a [`gds21::GdsElement`].
    pub fn export_element(&mut self, elem: &Element) -> LayoutResult<gds21::GdsElement> {
        let layerspec = export_layerspec(elem.layer);
        self.export_shape(&elem.inner, &layerspec)
    }

    /// Converts a [`Shape`] to a [`gds21::GdsElement`].
    ///
    /// GDS shapes include an explicit repetition of their origin for closure.
    /// So an N-sided polygon is described by a (N+1)-point vector.
    pub fn export_shape(
        &mut self,
        shape: &Shape,
        layerspec: &gds21::GdsLayerSpec,
    ) -> LayoutResult<gds21::GdsElement> {
        let points = match shape {
            Shape::Rect(r) => vec![
                r.p0,
                Point::new(r.p1.x, r.p0.y),
                r.p1,
                Point::new(r.p0.x, r.p1.y),
            ],
            Shape::Polygon(poly) => poly.points.clone(),
        };
        self.assert(
            points.len() >= 3,
            format!("polygon with {} points cannot be exported", points.len()),
        )?;
        let mut xy = points
            .iter()
            .map(|p| self.export_point(p))
            .collect::<LayoutResult<Vec<_>>>()?;
        // Add the origin a second time, to "close" the polygon
        xy.push(xy[0].clone());
        Ok(gds21::GdsBoundary {
            layer: layerspec.layer,
            datatype: layerspec.xtype,
            xy,
            ..Default::default()
        }
        .into())
    }

    /// Converts a [`TextElement`] to a [`gds21::GdsElement`].
    ///
    /// The text height is stored as the magnification.
    pub fn export_annotation(
        &mut self,
        text_elem: &TextElement,
    ) -> LayoutResult<gds21::GdsElement> {
        let layerspec = export_layerspec(text_elem.layer);
        Ok(gds21::GdsTextElem {
            string: text_elem.string.to_string().into(),
            layer: layerspec.layer,
            texttype: layerspec.xtype,
            xy: self.export_point(&text_elem.loc)?,
            strans: Some(gds21::GdsStrans {
                angle: export_angle(text_elem.angle),
                mag: Some(text_elem.height),
                ..Default::default()
            }),
            ..Default::default()
        }
        .into())
    }

    /// Converts a [`Point`] in micrometres to a GDS21 [`gds21::GdsPoint`] in nanometres.
    pub fn export_point(&mut self, pt: &Point) -> LayoutResult<gds21::GdsPoint> {
        let x = self.export_coord(pt.x)?;
        let y = self.export_coord(pt.y)?;
        Ok(gds21::GdsPoint::new(x, y))
    }

    fn export_coord(&self, v: f64) -> LayoutResult<i32> {
        let db = (v * DB_PER_UM).round();
        self.assert(
            db.is_finite() && db >= i32::MIN as f64 && db <= i32::MAX as f64,
            format!("coordinate {v} is out of range for GDS export"),
        )?;
        Ok(db as i32)
    }

    /// Renames the cell with the given name to avoid duplicate cell names.
    ///
    /// Does not rename the top cell. However, to ensure no other cell takes
    /// the top cell's name, the top cell name must be inserted into the
    /// `names_used` set prior to calling this function.
    fn get_cell_name(&mut self, cell: &Cell) -> ArcStr {
        let name = cell.name();
        let name = if self.names_used.contains(name) && !self.is_top(cell) {
            let mut i = 1;
            loop {
                let newname = arcstr::format!("{}_{}", name, i);
                if !self.names_used.contains(&newname) {
                    break newname;
                }
                i += 1;
            }
        } else {
            name.clone()
        };

        self.names_used.insert(name.clone());
        name
    }

    /// Checks if `cell` is the top cell.
    fn is_top(&self, cell: &Cell) -> bool {
        std::ptr::eq(self.top, cell)
    }
}

impl ErrorHelper for GdsExporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Export {
            message: msg.into(),
            trace: self.backtrace.clone(),
        }
    }
}

fn export_layerspec(spec: LayerSpec) -> gds21::GdsLayerSpec {
    spec.into()
}

/// Converts an angle in radians to a GDS rotation in degrees, if non-zero.
fn export_angle(angle: f64) -> Option<f64> {
    let deg = angle.to_degrees();
    (deg.abs() > ANGLE_TOL_DEG).then_some(deg)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use optgeom::Rect;

    use super::*;

    fn leaf(name: &str) -> Arc<Cell> {
        let mut cell = Cell::new(name);
        cell.add_element(LayerSpec(1, 0), Rect::new(Point::zero(), Point::new(1., 2.)));
        cell.freeze()
    }

    #[test]
    fn children_export_before_parents() {
        let child = leaf("child");
        let mut top = Cell::new("top");
        top.add_cell(child.clone());
        top.add_cell(child);

        let lib = top.to_gds_lib("lib").unwrap();
        let names: Vec<String> = lib.structs.iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["child".to_string(), "top".to_string()]);
        assert_eq!(lib.structs[1].elems.len(), 2);
    }

    #[test]
    fn duplicate_names_are_suffixed() {
        let mut top = Cell::new("dup");
        top.add_cell(leaf("dup"));
        top.add_cell(leaf("dup"));

        let lib = top.to_gds_lib("lib").unwrap();
        let mut names: Vec<String> = lib.structs.iter().map(|s| s.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["dup", "dup_1", "dup_2"]);
        assert_eq!(lib.structs.last().unwrap().name.to_string(), "dup");
    }

    #[test]
    fn rects_become_closed_boundaries() {
        let top = Cell::new("t");
        let mut exporter = GdsExporter::new(&top);
        let shape = Shape::from(Rect::new(Point::zero(), Point::new(0.5, 0.25)));
        let elem = exporter
            .export_shape(&shape, &LayerSpec(3, 0).into())
            .unwrap();
        match elem {
            gds21::GdsElement::GdsBoundary(b) => {
                assert_eq!(b.layer, 3);
                assert_eq!(b.xy.len(), 5);
                assert_eq!(b.xy[0], b.xy[4]);
                assert_eq!(b.xy[2], gds21::GdsPoint::new(500, 250));
            }
            other => panic!("unexpected element {other:?}"),
        }
    }

    #[test]
    fn out_of_range_coordinates_fail() {
        let mut cell = Cell::new("far");
        cell.add_element(
            LayerSpec(1, 0),
            Rect::new(Point::zero(), Point::new(1e7, 1.)),
        );
        assert!(cell.to_gds_lib("lib").is_err());
    }

    #[test]
    fn angles_export_in_degrees() {
        assert_eq!(export_angle(0.), None);
        let deg = export_angle(std::f64::consts::FRAC_PI_2).unwrap();
        assert!((deg - 90.).abs() < 1e-9);
    }
}
