//! Error and diagnostic types for scanmesh

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Any of these aborts mesh generation without producing a mesh.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed source: {0}")]
    MalformedSource(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an I/O failure on the given source path
    pub fn source_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for scanmesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Number of diagnostics kept verbatim in a stage report
pub const MAX_DIAGNOSTIC_SAMPLES: usize = 16;

/// Which index of a face was outside its array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Index into the geometry (position) array
    Geometry,
    /// Index into the wedge (texture coordinate) array
    Wedge,
}

/// Recoverable problems. These skip a single item and let the pipeline continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The wedge index list ended before the face list; processing stopped at `face`.
    TruncatedWedgeData { face: usize },
    /// A face referenced an index outside its array; the face was skipped.
    OutOfRangeIndex { face: usize, kind: IndexKind },
    /// A vertex had a NaN or infinite coordinate and was removed.
    InvalidVertex { index: usize },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::TruncatedWedgeData { face } => {
                write!(f, "wedge index list ends before face {}", face)
            }
            Diagnostic::OutOfRangeIndex { face, kind } => {
                let kind = match kind {
                    IndexKind::Geometry => "geometry",
                    IndexKind::Wedge => "wedge",
                };
                write!(f, "face {} has an out-of-range {} index", face, kind)
            }
            Diagnostic::InvalidVertex { index } => {
                write!(f, "vertex {} has a non-finite coordinate", index)
            }
        }
    }
}
