//! Error types shared by the coverage and export commands.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The coverage report could not be opened.
    #[error("coverage report not found: {}", path.display())]
    ReportNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report is not well-formed XML.
    #[error("invalid XML in coverage report: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The XML is well-formed but does not have the expected shape.
    #[error("malformed coverage report: {0}")]
    MalformedReport(String),

    /// A filesystem operation failed while exporting a project.
    #[error("copy failed at {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export target already exists; copies never merge into existing trees.
    #[error("output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedReport(message.into())
    }

    pub(crate) fn copy(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Copy {
            path: path.into(),
            source,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.into())
    }
}
