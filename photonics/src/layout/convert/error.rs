//! Conversion error types.

use std::fmt::Display;

use crate::deps::arcstr::ArcStr;

/// Where in the cell tree a converter was when it failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportContext {
    Library(ArcStr),
    Cell(ArcStr),
    Instance(ArcStr),
    Geometry,
    Annotations,
}

impl Display for ExportContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Library(name) => write!(f, "library {name}"),
            Self::Cell(name) => write!(f, "cell {name}"),
            Self::Instance(name) => write!(f, "instance {name}"),
            Self::Geometry => write!(f, "geometry"),
            Self::Annotations => write!(f, "annotations"),
        }
    }
}

/// Shorthand for reporting failures from a tree-walking converter,
/// which attaches its current position in the tree to every error.
pub trait ErrorHelper {
    type Error;

    fn err(&self, msg: impl Into<String>) -> Self::Error;

    /// Returns the contents of `opt`, or fails with `msg`.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        opt.ok_or_else(|| self.err(msg))
    }

    /// Fails with `msg` unless `cond` holds.
    fn assert(&self, cond: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        if cond {
            Ok(())
        } else {
            Err(self.err(msg))
        }
    }
}
