//! Conversion settings and the explicit pipeline [`Context`].

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Mutex;

/// Settings applied while assembling and measuring a [`Book`](crate::Book).
///
/// To create a mutable settings instance, see
/// [`Settings::builder`] or [`Settings::default`].
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// The character encoding label (e.g. `utf-8`, `windows-1252`)
    /// used to decode every document.
    ///
    /// When [`None`], the encoding of each document is sniffed from its
    /// byte order mark, XML declaration or `<meta charset>` declaration,
    /// falling back to UTF-8 and finally Windows-1252.
    ///
    /// Default: [`None`]
    pub encoding: Option<String>,
    /// One-based chapter numbers to include when selecting segments.
    /// An empty list selects every chapter.
    ///
    /// Default: empty
    pub chapters: Vec<usize>,
    /// Include segments marking page numbers when selecting segments.
    ///
    /// Default: `false`
    pub include_page_numbers: bool,
    /// Only a leading portion of the selected segments is processed.
    ///
    /// Default: `false`
    pub preview_mode: bool,
    /// Number of segments kept in [`preview_mode`](Self::preview_mode).
    /// [`None`] keeps all of them.
    ///
    /// Default: `Some(5)`
    pub preview_slides: Option<usize>,
    /// Font sizing behavior.
    pub font: FontSettings,
}

impl Settings {
    /// Returns a builder to create a [`Settings`] instance.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder(Self::default())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            encoding: None,
            chapters: Vec::new(),
            include_page_numbers: false,
            preview_mode: false,
            preview_slides: Some(5),
            font: FontSettings::default(),
        }
    }
}

impl From<SettingsBuilder> for Settings {
    fn from(value: SettingsBuilder) -> Self {
        value.build()
    }
}

/// Font sizing settings consumed by [`FontFit`](crate::fontfit::FontFit).
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct FontSettings {
    /// A fixed font size in pixels.
    /// When set, the font-fit search is skipped entirely.
    ///
    /// Default: [`None`]
    pub fixed_size: Option<u32>,
    /// Search for the largest font size that fits every selected segment.
    ///
    /// Default: `true`
    pub autosize: bool,
    /// Pixels subtracted from the searched batch size.
    ///
    /// Default: `0`
    pub reduce_autosized_by: u32,
    /// The smallest size the search may settle on.
    ///
    /// Default: `1`
    pub min_size: u32,
    /// The largest size the search may settle on.
    ///
    /// Default: `512`
    pub max_size: u32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            fixed_size: None,
            autosize: true,
            reduce_autosized_by: 0,
            min_size: 1,
            max_size: 512,
        }
    }
}

/// Builder to construct a [`Settings`] instance.
///
/// # Examples
/// ```
/// # use rdaisy::settings::Settings;
/// let settings = Settings::builder()
///     .encoding("windows-1252")
///     .chapters([1, 3])
///     .include_page_numbers(true)
///     .fixed_font_size(32)
///     .build();
///
/// assert_eq!(Some("windows-1252"), settings.encoding.as_deref());
/// assert_eq!(Some(32), settings.font.fixed_size);
/// ```
#[derive(Debug, Clone)]
pub struct SettingsBuilder(Settings);

impl SettingsBuilder {
    /// Turn this builder into a [`Settings`] instance.
    pub fn build(self) -> Settings {
        self.0
    }

    /// See [`Settings::encoding`].
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.0.encoding = Some(label.into());
        self
    }

    /// See [`Settings::chapters`].
    pub fn chapters(mut self, chapters: impl IntoIterator<Item = usize>) -> Self {
        self.0.chapters = chapters.into_iter().collect();
        self
    }

    /// See [`Settings::include_page_numbers`].
    pub fn include_page_numbers(mut self, include: bool) -> Self {
        self.0.include_page_numbers = include;
        self
    }

    /// See [`Settings::preview_mode`] and [`Settings::preview_slides`].
    pub fn preview(mut self, slides: Option<usize>) -> Self {
        self.0.preview_mode = true;
        self.0.preview_slides = slides;
        self
    }

    /// See [`FontSettings::fixed_size`].
    ///
    /// Setting a fixed size disables [`FontSettings::autosize`].
    pub fn fixed_font_size(mut self, size: u32) -> Self {
        self.0.font.fixed_size = Some(size);
        self.0.font.autosize = false;
        self
    }

    /// See [`FontSettings::autosize`].
    pub fn autosize_font(mut self, autosize: bool) -> Self {
        self.0.font.autosize = autosize;
        self
    }

    /// See [`FontSettings::reduce_autosized_by`].
    pub fn reduce_autosized_font_by(mut self, pixels: u32) -> Self {
        self.0.font.reduce_autosized_by = pixels;
        self
    }

    /// See [`FontSettings::min_size`] and [`FontSettings::max_size`].
    pub fn font_bounds(mut self, min_size: u32, max_size: u32) -> Self {
        self.0.font.min_size = min_size.max(1);
        self.0.font.max_size = max_size.max(self.0.font.min_size);
        self
    }
}

/// A non-fatal resolution gap encountered during conversion.
///
/// Gaps are logged as they happen and collected in [`Diagnostics`];
/// processing continues and produces a partial book.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gap {
    /// A navigation heading has no anchor and was skipped.
    HeadingWithoutAnchor {
        /// The heading text.
        title: String,
    },
    /// A chapter locator matched no timing segment.
    UnresolvedChapter {
        /// Zero-based chapter position.
        chapter: usize,
        /// The locator as written in the navigation document, resolved to a path.
        locator: String,
    },
    /// A content fragment was not found in its document.
    UnresolvedFragment {
        /// The content document.
        document: PathBuf,
        /// The missing element id.
        fragment: String,
    },
    /// An `audio` clip of a timing document is unusable and was dropped.
    InvalidClip {
        /// The timing document.
        path: PathBuf,
        /// The offending attribute: `src`, `clip-begin` or `clip-end`.
        attribute: &'static str,
        /// The unreadable value, [`None`] if the attribute is missing.
        value: Option<String>,
    },
    /// Media referenced by a content element could not be inlined.
    UnreadableMedia {
        /// The media file.
        path: PathBuf,
    },
}

impl Display for Gap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeadingWithoutAnchor { title } => {
                write!(f, "heading `{title}` has no anchor")
            }
            Self::UnresolvedChapter { chapter, locator } => {
                write!(f, "chapter {chapter} (`{locator}`) cannot be resolved")
            }
            Self::UnresolvedFragment { document, fragment } => {
                write!(f, "element #{fragment} not found in {}", document.display())
            }
            Self::InvalidClip {
                path,
                attribute,
                value: Some(value),
            } => {
                write!(f, "clip {attribute} `{value}` in {} is unreadable", path.display())
            }
            Self::InvalidClip { path, attribute, .. } => {
                write!(f, "clip in {} has no {attribute}", path.display())
            }
            Self::UnreadableMedia { path } => {
                write!(f, "media {} cannot be read", path.display())
            }
        }
    }
}

/// Collection of [`Gap`] values reported during a conversion run.
#[derive(Debug, Default)]
pub struct Diagnostics(Mutex<Vec<Gap>>);

impl Diagnostics {
    pub(crate) fn report(&self, gap: Gap) {
        // A poisoned lock still holds every gap reported before the panic.
        let mut gaps = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        gaps.push(gap);
    }

    /// Returns a snapshot of every gap reported so far, in report order.
    pub fn gaps(&self) -> Vec<Gap> {
        self.0
            .lock()
            .map(|gaps| gaps.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Returns `true` if no gap has been reported.
    pub fn is_empty(&self) -> bool {
        self.gaps().is_empty()
    }
}

/// Per-run state threaded explicitly through every pipeline stage.
#[derive(Debug, Default)]
pub struct Context {
    /// Settings of this run.
    pub settings: Settings,
    /// Gaps reported by the stages of this run.
    pub diagnostics: Diagnostics,
}

impl Context {
    /// Creates a context for a single conversion run.
    pub fn new(settings: impl Into<Settings>) -> Self {
        Self {
            settings: settings.into(),
            diagnostics: Diagnostics::default(),
        }
    }
}
