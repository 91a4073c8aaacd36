//! Error-related types for a [`Book`](crate::Book) conversion.
//!
//! Only document-level structural corruption is reported through these types.
//! Per-item resolution gaps (an unresolvable chapter locator, a missing content
//! fragment) are recorded as [`Gap`](crate::settings::Gap) values instead, so a
//! partial book can still be assembled.

use std::error::Error;
use std::io;
use std::path::PathBuf;

/// Alias for `Result<T, BookError>`.
pub type BookResult<T> = Result<T, BookError>;

/// Alias for `Result<T, OracleError>`.
pub type OracleResult<T> = Result<T, OracleError>;

/// Unified error type.
/// Possible errors when assembling or measuring a [`Book`](crate::Book).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum BookError {
    /// Access to a document or media file has failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// A document is structurally unusable, such as malformed markup
    /// or a timing grouping without a text reference.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The rendering oracle failed to answer a query.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// A concurrently executed parsing task did not complete.
    #[error("[Task]: {0}")]
    Task(String),
}

/// Possible errors when reading a document set from disk.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    /// The file exists (or is referenced), although it is unable to be read.
    #[error("[CannotRead - `{path:?}`]: {source}")]
    CannotRead {
        /// The root cause of the error.
        source: io::Error,
        /// The path responsible for triggering the error.
        path: PathBuf,
    },

    /// An explicitly requested character encoding label is not recognized.
    #[error("[UnknownEncoding - `{path:?}`]: Unrecognized encoding label `{label}`")]
    UnknownEncoding {
        /// The rejected label.
        label: String,
        /// The document the label was applied to.
        path: PathBuf,
    },

    /// The conversion input is not a navigation (`ncc.html`) document.
    #[error("[NotNccFile - `{0:?}`]: Input must be an NCC file")]
    NotNccFile(PathBuf),
}

/// Possible structural errors within a document.
///
/// Each variant is fatal for the document it originates from.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// Document content unexpectedly causes an internal parser error.
    ///
    /// This may originate from malformed content within a file, such as improper XML.
    #[error("[Unparsable - `{path:?}`]: {source}")]
    Unparsable {
        /// The root cause of the error.
        source: Box<dyn Error + Send + Sync + 'static>,
        /// The document responsible for triggering the error.
        path: PathBuf,
    },

    /// The navigation document has no recognizable body content.
    ///
    /// This indicates a wrong-format or corrupt input rather than a content gap.
    #[error("[NoBodyContent - `{0:?}`]: Navigation document has no body content")]
    NoBodyContent(PathBuf),

    /// A `par` grouping within a timing document has no `text` reference,
    /// so it can never be resolved to content.
    #[error("[MissingTextReference - `{path:?}`]: `par` #{position} has no `text` reference")]
    MissingTextReference {
        /// The timing document.
        path: PathBuf,
        /// Zero-based position of the grouping in document order.
        position: usize,
    },
}

/// An error reported by a [`RenderingOracle`](crate::fontfit::RenderingOracle).
#[derive(thiserror::Error, Debug)]
#[error("[Oracle]: {0}")]
pub struct OracleError(#[from] pub Box<dyn Error + Send + Sync + 'static>);

impl OracleError {
    /// Wraps any error raised by an oracle implementation.
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self(error.into())
    }
}
