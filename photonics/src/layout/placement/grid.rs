//! Row-by-row packing of device cells.

use std::sync::Arc;

use derive_builder::Builder;
use optgeom::bbox::{Bbox, BoundBox};
use optgeom::transform::Translate;
use optgeom::{snap_down, snap_up, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::deps::arcstr::ArcStr;
use crate::error::Result;
use crate::layout::cell::{Cell, Instance, TextElement};
use crate::layout::context::Library;
use crate::layout::layers::LayerSpec;
use crate::log::info;

/// A row of cells, with an optional heading.
#[derive(Debug, Clone, Default)]
struct Row {
    text: Option<ArcStr>,
    cells: Vec<Arc<Cell>>,
}

/// Packs cells into rows running top to bottom, each filled left to right.
///
/// Each cell is placed so that the lower left corner of its bounding box
/// sits on the row's baseline, after the previous cell.
#[derive(Debug, Clone, Builder)]
pub struct GridLayout {
    /// Text drawn above the first row.
    #[builder(default, setter(strip_option, into))]
    title: Option<ArcStr>,
    /// Layer of the frame drawn around the packed cells.
    #[builder(setter(into))]
    frame_layer: LayerSpec,
    /// Layer of the title and row headings.
    #[builder(setter(into))]
    text_layer: LayerSpec,
    /// If `true`, each row is as tall as its tallest cell;
    /// otherwise every row is as tall as the tallest cell overall.
    #[builder(default)]
    tight: bool,
    #[builder(default = "10.")]
    vertical_spacing: f64,
    /// Grid to which each row's baseline is snapped down.
    #[builder(default = "1.")]
    vertical_alignment: f64,
    #[builder(default = "10.")]
    horizontal_spacing: f64,
    /// Grid to which each cell's left edge is snapped up.
    #[builder(default = "10.")]
    horizontal_alignment: f64,
    #[builder(default = "10.")]
    text_size: f64,
    #[builder(default = "15.")]
    row_text_size: f64,

    #[builder(setter(skip))]
    rows: Vec<Row>,
}

/// The location at which each packed cell was instantiated, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mapping(pub Vec<(String, Point)>);

impl Mapping {
    /// The location of the cell named `name`.
    pub fn get(&self, name: &str) -> Option<Point> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Point)> {
        self.0.iter()
    }
}

impl GridLayout {
    #[inline]
    pub fn builder() -> GridLayoutBuilder {
        GridLayoutBuilder::default()
    }

    /// Appends `cell` to the current row.
    pub fn add_to_row(&mut self, cell: Arc<Cell>) {
        if self.rows.is_empty() {
            self.rows.push(Row::default());
        }
        if let Some(row) = self.rows.last_mut() {
            row.cells.push(cell);
        }
    }

    /// Starts a new row, with an optional heading.
    pub fn begin_new_row(&mut self, text: Option<String>) {
        self.rows.push(Row {
            text: text.map(ArcStr::from),
            cells: Vec::new(),
        });
    }

    /// The number of rows containing at least one cell.
    pub fn num_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.cells.is_empty()).count()
    }

    /// Packs every row into a new cell named `cell_name`, registered with `lib`.
    ///
    /// The frame's lower left corner lands on the origin.
    pub fn generate_layout(
        &self,
        lib: &mut Library,
        cell_name: &str,
    ) -> Result<(Arc<Cell>, Mapping)> {
        let rows: Vec<&Row> = self.rows.iter().filter(|r| !r.cells.is_empty()).collect();
        let max_height = rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.bbox().height())
            .fold(0., f64::max);

        let mut insts = Vec::new();
        let mut texts = Vec::new();
        let mut cursor_y = 0.;

        for (i, row) in rows.iter().enumerate() {
            if let Some(text) = &row.text {
                texts.push(self.text(
                    text.clone(),
                    Point::new(0., cursor_y - self.row_text_size),
                    self.row_text_size,
                ));
                cursor_y -= self.row_text_size + self.vertical_spacing;
            }

            let height = if self.tight {
                row.cells
                    .iter()
                    .map(|c| c.bbox().height())
                    .fold(0., f64::max)
            } else {
                max_height
            };
            let row_y = snap_down(cursor_y - height, self.vertical_alignment);

            let mut x = 0.;
            for cell in row.cells.iter() {
                let bbox = cell.bbox();
                let (loc, width) = match bbox.into_rect() {
                    Some(rect) => (Point::new(x, row_y) - rect.p0, rect.width()),
                    None => (Point::new(x, row_y), 0.),
                };
                insts.push(Instance::new(cell.clone(), loc));
                x = snap_up(x + width + self.horizontal_spacing, self.horizontal_alignment);
            }
            cursor_y = row_y - self.vertical_spacing;

            info!(
                "placed row {} of {} ({} cells, width {:.1})",
                i + 1,
                rows.len(),
                row.cells.len(),
                x
            );
        }

        if let Some(title) = &self.title {
            texts.push(self.text(
                title.clone(),
                Point::new(0., self.text_size + self.vertical_spacing),
                self.text_size,
            ));
        }

        let mut frame = insts
            .iter()
            .fold(Bbox::empty(), |acc, inst| acc.union(inst.bbox()));
        frame = texts
            .iter()
            .fold(frame, |acc, t| acc.union(t.loc.bbox()));
        frame.p0.x -= self.horizontal_spacing;
        frame.p1.x += self.horizontal_spacing;
        frame.p0.y -= self.vertical_spacing;
        frame.p1.y += self.vertical_spacing;

        let mut cell = Cell::new(lib.alloc_name(cell_name));
        let mut mapping = Mapping::default();
        if let Some(frame) = frame.into_rect() {
            let offset = Point::zero() - frame.p0;
            for inst in insts.iter_mut() {
                inst.translate(offset);
            }
            for text in texts.iter_mut() {
                text.translate(offset);
            }
            cell.add_element(
                self.frame_layer,
                Rect::new(Point::zero(), Point::new(frame.width(), frame.height())),
            );
        }
        for inst in insts {
            mapping.0.push((inst.name().to_string(), inst.loc()));
            cell.add_inst(inst);
        }
        for text in texts {
            cell.add_annotation(text);
        }

        Ok((lib.add_cell(cell), mapping))
    }

    fn text(&self, string: ArcStr, loc: Point, height: f64) -> TextElement {
        TextElement {
            string,
            loc,
            layer: self.text_layer,
            height,
            angle: 0.,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;
    use crate::test_util::{leaf, test_library};

    fn layout(tight: bool) -> GridLayout {
        GridLayout::builder()
            .title("title")
            .frame_layer(LayerSpec(99, 0))
            .text_layer(LayerSpec(100, 0))
            .tight(tight)
            .build()
            .unwrap()
    }

    #[test]
    fn cells_fill_rows_left_to_right() {
        let mut lib = test_library();
        let mut grid = layout(true);
        grid.begin_new_row(None);
        grid.add_to_row(leaf("a", 25., 40.));
        grid.add_to_row(leaf("b", 25., 20.));
        grid.begin_new_row(Some("second".to_string()));
        grid.add_to_row(leaf("c", 5., 5.));

        let (cell, mapping) = grid.generate_layout(&mut lib, "grid").unwrap();
        assert_eq!(mapping.len(), 3);

        let a = mapping.get("a").unwrap();
        let b = mapping.get("b").unwrap();
        let c = mapping.get("c").unwrap();
        // 25 + 10 spacing, snapped up to 40.
        assert_float_eq!(b.x - a.x, 40., abs <= 1e-9);
        // Both share a baseline.
        assert_float_eq!(a.y, b.y, abs <= 1e-9);
        // Second row: its own height, the heading, and two spacings below the first.
        assert_float_eq!(a.y - c.y, 5. + 15. + 2. * 10., abs <= 1e-9);
        assert_float_eq!(c.x, a.x, abs <= 1e-9);

        let bbox = cell.bbox();
        assert_float_eq!(bbox.p0.x, 0., abs <= 1e-9);
        assert_float_eq!(bbox.p0.y, 0., abs <= 1e-9);
    }

    #[test]
    fn loose_rows_use_tallest_cell() {
        let mut lib = test_library();
        let mut tight = layout(true);
        let mut loose = layout(false);
        for grid in [&mut tight, &mut loose] {
            grid.add_to_row(leaf("tall", 10., 100.));
            grid.begin_new_row(None);
            grid.add_to_row(leaf("short", 10., 10.));
            grid.begin_new_row(None);
            grid.add_to_row(leaf("short2", 10., 10.));
        }
        let (_, tight_map) = tight.generate_layout(&mut lib, "tight").unwrap();
        let (_, loose_map) = loose.generate_layout(&mut lib, "loose").unwrap();

        let pitch = |m: &Mapping| m.get("short").unwrap().y - m.get("short2").unwrap().y;
        assert_float_eq!(pitch(&tight_map), 20., abs <= 1e-9);
        assert_float_eq!(pitch(&loose_map), 110., abs <= 1e-9);
    }

    #[test]
    fn title_sits_above_first_row() {
        let mut lib = test_library();
        let mut grid = layout(true);
        grid.add_to_row(leaf("a", 30., 40.));

        let (cell, mapping) = grid.generate_layout(&mut lib, "grid").unwrap();
        let a = mapping.get("a").unwrap();
        let title = cell
            .annotations()
            .find(|t| t.string.as_str() == "title")
            .unwrap();
        assert_float_eq!(title.height, 10., abs <= 1e-9);
        assert_eq!(title.layer, LayerSpec(100, 0));
        assert_float_eq!(title.loc.x, a.x, abs <= 1e-9);
        // One text height plus a spacing above the top of the row.
        assert_float_eq!(title.loc.y - (a.y + 40.), 20., abs <= 1e-9);

        let bbox = cell.bbox();
        assert_float_eq!(bbox.height(), 40. + 20. + 2. * 10., abs <= 1e-9);
        assert_float_eq!(bbox.p1.y - title.loc.y, 10., abs <= 1e-9);
    }

    #[test]
    fn empty_rows_are_skipped() {
        let mut lib = test_library();
        let mut grid = layout(true);
        grid.begin_new_row(Some("empty".to_string()));
        grid.begin_new_row(None);
        grid.add_to_row(leaf("only", 10., 10.));
        assert_eq!(grid.num_rows(), 1);

        let (cell, _) = grid.generate_layout(&mut lib, "grid").unwrap();
        assert!(cell.annotations().all(|t| t.string.as_str() != "empty"));
        assert_eq!(cell.elems_on(LayerSpec(99, 0)).count(), 1);
    }
}
