pub(crate) mod entities;
pub(crate) mod tree;
pub(crate) mod xml;

use crate::errors::FormatError;
use crate::parser::tree::Document;
use std::path::Path;

pub(crate) type ParserResult<T> = Result<T, FormatError>;

/// Parses decoded markup into a [`Document`], attributing failures to `path`.
pub(crate) fn parse_document(text: &str, path: &Path) -> ParserResult<Document> {
    Document::parse(text).map_err(|error| FormatError::Unparsable {
        source: Box::new(error),
        path: path.to_path_buf(),
    })
}
