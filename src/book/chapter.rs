//! Chapters and the locators pointing at their first segment.

use crate::book::segment::{Anchor, MediaSegment};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// A reference to a document, optionally narrowed to a fragment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locator {
    document: PathBuf,
    fragment: Option<String>,
}

impl Locator {
    /// Creates a locator; an empty fragment is treated as absent.
    pub fn new(document: impl Into<PathBuf>, fragment: Option<String>) -> Self {
        Self {
            document: document.into(),
            fragment: fragment.filter(|fragment| !fragment.is_empty()),
        }
    }

    /// The referenced document.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// The fragment, without the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The fragment-exact [`Anchor`], or [`None`] if no fragment is present.
    pub fn as_anchor(&self) -> Option<Anchor> {
        self.fragment
            .as_ref()
            .map(|fragment| Anchor::new(&self.document, fragment.as_str()))
    }
}

impl From<Anchor> for Locator {
    fn from(anchor: Anchor) -> Self {
        Self::new(anchor.document(), Some(anchor.fragment().to_owned()))
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.fragment {
            Some(fragment) => write!(f, "{}#{fragment}", self.document.display()),
            None => write!(f, "{}", self.document.display()),
        }
    }
}

/// A chapter heading of the navigation document and the
/// contiguous range of segments narrating it.
#[derive(Clone, Debug, PartialEq)]
pub struct Chapter {
    pub(crate) title: String,
    pub(crate) level: u8,
    pub(crate) locator: Locator,
    pub(crate) contents: Vec<MediaSegment>,
}

impl Chapter {
    pub(crate) fn new(title: String, level: u8, locator: Locator) -> Self {
        Self {
            title,
            level,
            locator,
            contents: Vec::new(),
        }
    }

    /// The heading text.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// One-based nesting depth (`h1` = `1`).
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Where the chapter starts.
    ///
    /// After resolution, a locator written without a fragment is
    /// rewritten to the fragment-exact id of its first segment.
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The segments narrating this chapter, in document order.
    pub fn contents(&self) -> &[MediaSegment] {
        &self.contents
    }

    /// Mutable access to the segments for stages filling in rendering fields.
    pub fn contents_mut(&mut self) -> &mut [MediaSegment] {
        &mut self.contents
    }

    /// Total narration time in seconds.
    pub fn duration(&self) -> f64 {
        self.contents.iter().map(MediaSegment::duration).sum()
    }
}
