//! Layout error types.

use thiserror::Error;

use super::convert::error::ExportContext;

/// An error converting layouts to or from GDS.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Export failed at the given position in the cell tree, outermost first.
    #[error("GDS export failed: {message} (in {})", fmt_trace(.trace))]
    Export {
        message: String,
        trace: Vec<ExportContext>,
    },
    /// The GDS library could not be read or written.
    #[error("GDS I/O failed: {0}")]
    Gds(#[from] gds21::GdsError),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

fn fmt_trace(trace: &[ExportContext]) -> String {
    trace
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_errors_show_their_trace() {
        let err = LayoutError::Export {
            message: "bad point".to_string(),
            trace: vec![
                ExportContext::Library("lib".into()),
                ExportContext::Cell("top".into()),
                ExportContext::Geometry,
            ],
        };
        assert_eq!(
            err.to_string(),
            "GDS export failed: bad point (in library lib / cell top / geometry)"
        );
    }
}
