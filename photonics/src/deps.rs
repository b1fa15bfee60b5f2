//! Re-exports of crates used in public interfaces.

pub use arcstr;
pub use gds21;
pub use optgeom;
