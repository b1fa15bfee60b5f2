pub mod design_space;
pub mod grid;

pub use design_space::DesignSpace;
pub use grid::{GridLayout, GridLayoutBuilder, Mapping};
