//! Publication metadata read from the navigation document.

/// Data associated with a talking book, such as its title and authors.
///
/// Set once by the navigation parser and immutable afterward.
/// Missing fields resolve to empty values rather than failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub(crate) title: String,
    pub(crate) language: String,
    pub(crate) authors: Vec<String>,
    pub(crate) date: String,
    pub(crate) date_scheme: String,
}

impl Metadata {
    /// The `dc:title` value.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The `dc:language` tag.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Every `dc:creator` value, in document order.
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// The `dc:date` value as written.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The scheme of [`Self::date`], e.g. `yyyy-mm-dd`.
    pub fn date_scheme(&self) -> &str {
        &self.date_scheme
    }
}
