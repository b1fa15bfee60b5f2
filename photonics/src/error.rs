use std::fmt::{Debug, Display};
use std::path::PathBuf;

use optgeom::GeometryError;
use thiserror::Error;

use crate::deps::arcstr::ArcStr;
use crate::layout::error::LayoutError;

pub type Result<T> = std::result::Result<T, PhotonicsError>;

pub struct PhotonicsError {
    pub(crate) source: ErrorSource,
    pub(crate) context: Vec<ErrorContext>,
}

impl PhotonicsError {
    pub fn source(&self) -> &ErrorSource {
        &self.source
    }
}

impl std::error::Error for PhotonicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Display for PhotonicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Error:\n{}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for item in self.context.iter() {
                writeln!(f, "\twhile {}", item)?;
            }
        }
        Ok(())
    }
}

impl Debug for PhotonicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for (i, item) in self.context.iter().enumerate() {
                writeln!(f, "\t{}: {:?}", i, item)?;
            }
        }
        Ok(())
    }
}

impl<T> From<T> for PhotonicsError
where
    T: Into<ErrorSource>,
{
    fn from(value: T) -> Self {
        Self {
            source: value.into(),
            context: Vec::new(),
        }
    }
}

impl PhotonicsError {
    pub fn new(source: impl Into<ErrorSource>) -> Self {
        Self {
            source: source.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<ErrorContext>) -> Self {
        self.context.push(ctx.into());
        self
    }

    #[inline]
    pub fn into_inner(self) -> ErrorSource {
        self.source
    }

    /// The contexts attached to the error, innermost first.
    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }
}

#[inline]
pub fn with_err_context<T, E, C>(result: std::result::Result<T, E>, ctx: C) -> Result<T>
where
    C: FnOnce() -> ErrorContext,
    E: Into<PhotonicsError>,
{
    result.map_err(|err| err.into().with_context(ctx()))
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorContext {
    /// Generating the named device cell.
    GenDevice { name: ArcStr, kind: &'static str },
    /// Building a part such as a spiral or coupler.
    BuildPart(&'static str),
    CreateDir(PathBuf),
    CreateFile(PathBuf),
    ReadFile(PathBuf),
    Task(ArcStr),
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorContext::*;
        match self {
            GenDevice { name, kind } => write!(f, "generating {kind} device ({name})"),
            BuildPart(part) => write!(f, "building {part}"),
            CreateDir(path) => write!(f, "creating directory {path:?}"),
            CreateFile(path) => write!(f, "creating file {path:?}"),
            ReadFile(path) => write!(f, "reading file {path:?}"),
            Task(task) => write!(f, "{task}"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorSource {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("error while generating layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("layout of size {width} x {height} does not fit in design space of size {max_width} x {max_height}")]
    DesignSpaceOverflow {
        width: f64,
        height: f64,
        max_width: f64,
        max_height: f64,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing TOML: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("error writing JSON: {0}")]
    JsonWriting(#[from] serde_json::Error),
}
