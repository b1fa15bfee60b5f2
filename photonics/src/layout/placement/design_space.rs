//! The blank region a mask's devices must fit inside.

use optgeom::bbox::BoundBox;
use optgeom::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorSource, Result};
use crate::layout::cell::Cell;
use crate::log::{info, warn};

/// A rectangular design region with its lower left corner at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignSpace {
    pub bounds: Rect,
}

impl Default for DesignSpace {
    fn default() -> Self {
        Self::new(6000., 3000.)
    }
}

impl DesignSpace {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            bounds: Rect::new(Point::zero(), Point::new(width, height)),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Returns `true` if everything drawn in `cell` lies within the bounds.
    pub fn contains(&self, cell: &Cell) -> bool {
        match cell.bbox().into_rect() {
            Some(rect) => self.bounds.encloses(&rect),
            None => true,
        }
    }

    /// Checks that `cell` fits inside the design space.
    ///
    /// An overflow is logged as a warning, or returned as an error if `strict` is set.
    pub fn check(&self, cell: &Cell, strict: bool) -> Result<()> {
        let bbox = cell.bbox();
        if self.contains(cell) {
            info!(
                "layout {} ({:.1} x {:.1}) fits in design space ({} x {})",
                cell.name(),
                bbox.width(),
                bbox.height(),
                self.width(),
                self.height()
            );
            return Ok(());
        }

        let err = ErrorSource::DesignSpaceOverflow {
            width: bbox.width(),
            height: bbox.height(),
            max_width: self.width(),
            max_height: self.height(),
        };
        if strict {
            return Err(err.into());
        }
        warn!("{}", err);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layers::LayerSpec;

    fn cell_spanning(p0: Point, p1: Point) -> Cell {
        let mut cell = Cell::new("c");
        cell.add_element(LayerSpec(1, 0), Rect::new(p0, p1));
        cell
    }

    #[test]
    fn default_is_six_by_three_mm() {
        let space = DesignSpace::default();
        assert_eq!(space.width(), 6000.);
        assert_eq!(space.height(), 3000.);
    }

    #[test]
    fn overflow_warns_unless_strict() {
        let space = DesignSpace::new(100., 50.);
        let fits = cell_spanning(Point::new(1., 1.), Point::new(100., 50.));
        let wide = cell_spanning(Point::zero(), Point::new(101., 10.));

        assert!(space.check(&fits, true).is_ok());
        assert!(space.check(&wide, false).is_ok());
        let err = space.check(&wide, true).unwrap_err();
        assert!(matches!(
            err.source(),
            ErrorSource::DesignSpaceOverflow { max_width, .. } if *max_width == 100.
        ));
    }

    #[test]
    fn empty_cells_fit() {
        assert!(DesignSpace::new(1., 1.).contains(&Cell::new("empty")));
    }
}
