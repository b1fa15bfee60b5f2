//! The layout data model.

use optgeom::{Polygon, Rect, Shape};

use self::group::Group;

pub mod cell;
pub mod context;
pub mod convert;
pub mod error;
pub mod group;
pub mod layers;
pub mod placement;

/// A trait implemented by objects that can be drawn
/// onto a layer of a layout cell.
pub trait Draw {
    /// Draws the object.
    fn draw(&self) -> crate::error::Result<Group>;
}

impl Draw for Shape {
    fn draw(&self) -> crate::error::Result<Group> {
        Ok(std::iter::once(self.clone()).collect())
    }
}

impl Draw for Polygon {
    fn draw(&self) -> crate::error::Result<Group> {
        Ok(std::iter::once(self.clone()).collect())
    }
}

impl Draw for Rect {
    fn draw(&self) -> crate::error::Result<Group> {
        Ok(std::iter::once(*self).collect())
    }
}

impl Draw for Group {
    fn draw(&self) -> crate::error::Result<Group> {
        Ok(self.clone())
    }
}

impl<T: Draw> Draw for &T {
    fn draw(&self) -> crate::error::Result<Group> {
        T::draw(*self)
    }
}
