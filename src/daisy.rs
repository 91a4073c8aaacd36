//! DAISY 2.02 talking-book pipeline.
//!
//! # Overview
//! A conversion flows strictly through four stages:
//! 1. [`ncc`]: The navigation document yields metadata, chapters and the page list.
//! 2. [`smil`]: Every distinct timing document referenced by a chapter yields
//!    its ordered [`MediaSegment`](crate::book::MediaSegment) list.
//! 3. [`resolve`]: Segments are partitioned into contiguous chapter ranges,
//!    assigned internal ids and marked as page numbers.
//! 4. [`xhtml`]: The content element of every selected segment is located
//!    and its rendering attributes are filled in.
//!
//! Each stage is also callable on its own.

pub mod ncc;
pub mod resolve;
pub mod smil;
pub mod xhtml;

use crate::book::Book;
use crate::errors::{BookError, BookResult, ResourceError};
use crate::settings::Context;
use crate::util::encoding;
use log::{debug, info};
use std::path::Path;
use tokio::task::JoinError;

/// The file name every DAISY 2.02 navigation document carries.
pub const NCC_FILE: &str = "ncc.html";

/// Checks that `path` names an existing navigation document.
///
/// # Errors
/// - [`ResourceError::NotNccFile`]: The file name is not `ncc.html`
///   (case-insensitive).
/// - [`ResourceError::CannotRead`]: The file does not exist or is inaccessible.
pub fn verify_input(path: &Path) -> Result<(), ResourceError> {
    let is_ncc = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(NCC_FILE));

    if !is_ncc {
        return Err(ResourceError::NotNccFile(path.to_path_buf()));
    }
    std::fs::metadata(path)
        .map(|_| ())
        .map_err(|source| ResourceError::CannotRead {
            source,
            path: path.to_path_buf(),
        })
}

pub(crate) async fn parse(ncc_path: &Path, ctx: &Context) -> BookResult<Book> {
    info!("Parsing DAISY 2.02 book {}", ncc_path.display());

    let document = read_document(ncc_path, ctx.settings.encoding.as_deref()).await?;
    let navigation = ncc::parse(ncc_path, &document.text, ctx)?;
    let timing = smil::parse_all(&navigation.chapters, ctx).await?;
    let mut book = resolve::resolve(navigation, timing, ctx);
    xhtml::resolve_content(&mut book, ctx).await?;

    info!("Done parsing DAISY 2.02 book");
    Ok(book)
}

/// A document decoded to text.
pub(crate) struct Decoded {
    pub(crate) text: String,
    /// The encoding label actually used.
    pub(crate) encoding: &'static str,
}

/// Reads and decodes the document at `path` with an explicit encoding
/// `label`, or a sniffed encoding if [`None`].
pub(crate) async fn read_document(path: &Path, label: Option<&str>) -> Result<Decoded, ResourceError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ResourceError::CannotRead {
            source,
            path: path.to_path_buf(),
        })?;
    let (text, used) =
        encoding::decode(&bytes, label).ok_or_else(|| ResourceError::UnknownEncoding {
            label: label.unwrap_or_default().to_owned(),
            path: path.to_path_buf(),
        })?;

    debug!("Decoded {} as {}", path.display(), used.name());
    Ok(Decoded {
        text,
        encoding: used.name(),
    })
}

fn task_error(error: JoinError) -> BookError {
    BookError::Task(error.to_string())
}
