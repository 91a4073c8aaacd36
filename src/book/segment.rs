//! Timed media segments and the identifiers used to cross-reference them.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// A fragment identifier qualified by the document declaring it
/// (`document#fragment`).
///
/// Identifiers are scoped per document; comparing the composite value
/// rather than a concatenated string avoids accidental collisions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Anchor {
    document: PathBuf,
    fragment: String,
}

impl Anchor {
    /// Creates an anchor for `fragment` (without the leading `#`) within `document`.
    pub fn new(document: impl Into<PathBuf>, fragment: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            fragment: fragment.into(),
        }
    }

    /// The document declaring the identifier.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// The identifier, without the leading `#`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.document.display(), self.fragment)
    }
}

/// The book-wide key of a [`MediaSegment`]: `<chapter>-<position>`.
///
/// Stable across downstream consumers, which use it for
/// file names and timing lookups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId {
    /// Zero-based chapter index.
    pub chapter: usize,
    /// Zero-based position within the chapter.
    pub position: usize,
}

impl Display for SegmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.chapter, self.position)
    }
}

/// An audio clip within a timing grouping.
#[derive(Clone, Debug, PartialEq)]
pub struct Audio {
    /// Resolved path of the audio file.
    pub src: PathBuf,
    /// Clip start offset in seconds.
    pub clip_begin: f64,
    /// Clip end offset in seconds.
    pub clip_end: f64,
}

impl Audio {
    /// Length of the clip in seconds.
    ///
    /// Zero-length clips are legal and yield `0.0`.
    pub fn duration(&self) -> f64 {
        self.clip_end - self.clip_begin
    }
}

/// Rendering attributes of the content element a segment points at.
///
/// `src` and `selector` are known once timing documents are parsed;
/// the remaining fields are filled in by the content resolver, and the
/// font sizes by [`FontFit`](crate::fontfit::FontFit).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Html {
    /// Resolved path of the content document.
    pub src: PathBuf,
    /// Fragment selector within [`Self::src`], including the leading `#`
    /// (empty if the text reference carried none).
    pub selector: String,
    /// Serialized markup of the element, presentation attributes removed.
    pub raw_html: Option<String>,
    /// Displayable plain text.
    pub text_content: Option<String>,
    /// Language inherited from the element or its nearest ancestor.
    pub lang: String,
    /// Text direction inherited from the element or its nearest ancestor.
    pub dir: String,
    /// Local tag name of the element (e.g. `img`, `span`).
    pub tag_name: Option<String>,
    /// Media referenced by an image element, inlined as a data URI.
    pub media: Option<String>,
    /// Encoding label used to decode the content document.
    pub encoding: Option<String>,
    /// The text contains a URL-like substring.
    pub text_has_urls: bool,
    /// Largest font size (px) at which this segment fits its frame.
    pub maximum_font_size: Option<u32>,
    /// Font size (px) applied when rendering.
    pub rendered_font_size: Option<u32>,
    /// Settled container dimensions `(width, height)` in pixels.
    pub container_size: Option<(u32, u32)>,
}

impl Html {
    pub(crate) fn new(src: PathBuf, selector: String) -> Self {
        Self {
            src,
            selector,
            ..Self::default()
        }
    }

    /// The selector without its leading `#`.
    pub fn fragment(&self) -> &str {
        self.selector.strip_prefix('#').unwrap_or(&self.selector)
    }

    /// Returns `true` once the content resolver located the element.
    pub fn is_resolved(&self) -> bool {
        self.raw_html.is_some()
    }

    /// Returns `true` if the element is an image.
    pub fn is_image(&self) -> bool {
        self.tag_name.as_deref() == Some("img")
    }
}

/// The atomic timed unit of narration:
/// zero or more [`Audio`] clips paired with one content anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaSegment {
    pub(crate) ids: Vec<Anchor>,
    pub(crate) internal_id: Option<SegmentId>,
    pub(crate) audios: Vec<Audio>,
    pub(crate) duration: f64,
    pub(crate) is_page_number: bool,
    /// Content anchor and rendering attributes.
    pub html: Html,
}

impl MediaSegment {
    pub(crate) fn new(ids: Vec<Anchor>, audios: Vec<Audio>, html: Html) -> Self {
        let duration = audios.iter().map(Audio::duration).sum();

        Self {
            ids,
            internal_id: None,
            audios,
            duration,
            is_page_number: false,
            html,
        }
    }

    /// Every identifier found within the source grouping, qualified by
    /// the timing document path.
    pub fn ids(&self) -> &[Anchor] {
        &self.ids
    }

    /// Returns `true` if `anchor` identifies this segment.
    pub fn has_id(&self, anchor: &Anchor) -> bool {
        self.ids.contains(anchor)
    }

    /// The book-wide identifier, assigned once the segment belongs to a chapter.
    pub fn internal_id(&self) -> Option<SegmentId> {
        self.internal_id
    }

    /// Audio clips in document order.
    pub fn audios(&self) -> &[Audio] {
        &self.audios
    }

    /// Sum of all clip durations in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns `true` if this segment narrates a page number.
    pub fn is_page_number(&self) -> bool {
        self.is_page_number
    }
}
