//! The assembled [`Book`] model.
//!
//! # Overview
//! A [`Book`] owns its [`Metadata`], its ordered [`Chapter`] list and
//! the page list. Each chapter owns the contiguous run of
//! [`MediaSegment`] values narrating it, so the union of all chapter
//! contents is the full ordered segment list of the timing documents.
//!
//! ## Components
//! - [`metadata`]: Title, language, authors and date.
//! - [`chapter`]: Chapters and their [`Locator`].
//! - [`segment`]: Timed segments, audio clips and rendering attributes.

pub mod chapter;
pub mod metadata;
pub mod segment;

pub use self::chapter::{Chapter, Locator};
pub use self::metadata::Metadata;
pub use self::segment::{Anchor, Audio, Html, MediaSegment, SegmentId};

use crate::daisy;
use crate::errors::BookResult;
use crate::settings::{Context, Settings};
use std::collections::HashMap;
use std::path::Path;

/// A DAISY 2.02 talking book resolved into chapters and timed segments.
///
/// # Examples
/// - Opening a book and listing its chapters:
/// ```no_run
/// # use rdaisy::Book;
/// # use rdaisy::errors::BookResult;
/// # async fn run() -> BookResult<()> {
/// let book = Book::open("books/sample/ncc.html").await?;
///
/// for (i, chapter) in book.chapters().iter().enumerate() {
///     println!("{}. {} ({} segments)", i + 1, chapter.title(), chapter.contents().len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Book {
    pub(crate) metadata: Metadata,
    pub(crate) chapters: Vec<Chapter>,
    pub(crate) page_list: Vec<Locator>,
}

impl Book {
    /// Opens and resolves the book whose navigation document is `ncc_path`,
    /// using default [`Settings`].
    ///
    /// # Errors
    /// - [`ResourceError`](crate::errors::ResourceError): The input is not an
    ///   NCC file, or a document cannot be read.
    /// - [`FormatError`](crate::errors::FormatError): A document is structurally
    ///   unusable.
    pub async fn open(ncc_path: impl AsRef<Path>) -> BookResult<Self> {
        Self::open_with(ncc_path, &Context::default()).await
    }

    /// Opens and resolves a book with the settings and diagnostics of `ctx`.
    ///
    /// See [`Self::open`] for more details.
    pub async fn open_with(ncc_path: impl AsRef<Path>, ctx: &Context) -> BookResult<Self> {
        let ncc_path = ncc_path.as_ref();
        daisy::verify_input(ncc_path)?;
        daisy::parse(ncc_path, ctx).await
    }

    /// Metadata of the publication.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Chapters in navigation-document order.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Mutable access to the chapters for stages filling in segment fields.
    pub fn chapters_mut(&mut self) -> &mut [Chapter] {
        &mut self.chapters
    }

    /// Targets of the page list, in navigation-document order.
    pub fn page_list(&self) -> &[Locator] {
        &self.page_list
    }

    /// Iterates over every segment of every chapter in book order.
    pub fn segments(&self) -> impl Iterator<Item = &MediaSegment> + '_ {
        self.chapters.iter().flat_map(|chapter| chapter.contents.iter())
    }

    /// Iterates over the segments chosen by `settings`:
    /// - Only the listed one-based [`chapters`](Settings::chapters) (all if empty).
    /// - Page-number segments only if
    ///   [`include_page_numbers`](Settings::include_page_numbers).
    /// - At most [`preview_slides`](Settings::preview_slides) in preview mode.
    pub fn selected_segments<'a>(
        &'a self,
        settings: &'a Settings,
    ) -> impl Iterator<Item = &'a MediaSegment> + 'a {
        self.chapters
            .iter()
            .enumerate()
            .filter(|(i, _)| is_chapter_selected(settings, *i))
            .flat_map(|(_, chapter)| chapter.contents.iter())
            .filter(|segment| settings.include_page_numbers || !segment.is_page_number)
            .take(preview_limit(settings))
    }

    /// Mutable variant of [`Self::selected_segments`].
    pub fn selected_segments_mut<'a>(
        &'a mut self,
        settings: &'a Settings,
    ) -> impl Iterator<Item = &'a mut MediaSegment> + 'a {
        self.chapters
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| is_chapter_selected(settings, *i))
            .flat_map(|(_, chapter)| chapter.contents.iter_mut())
            .filter(|segment| settings.include_page_numbers || !segment.is_page_number)
            .take(preview_limit(settings))
    }

    /// The title made safe for use as a file name.
    ///
    /// Reserved and control characters become `!`, surrounding dots and
    /// whitespace are trimmed, and an empty result falls back to `book`.
    pub fn safe_filename(&self) -> String {
        const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

        let replaced = self
            .metadata
            .title
            .chars()
            .map(|c| {
                if RESERVED.contains(&c) || c.is_control() {
                    '!'
                } else {
                    c
                }
            })
            .collect::<String>();
        let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

        if trimmed.is_empty() {
            String::from("book")
        } else {
            trimmed.to_owned()
        }
    }

    /// The book language: [`Metadata::language`] when present, otherwise the
    /// most common `lang` among resolved segments.
    pub fn dominant_lang(&self) -> Option<&str> {
        if !self.metadata.language.is_empty() {
            return Some(&self.metadata.language);
        }
        most_common(self.segments().map(|segment| segment.html.lang.as_str()))
    }

    /// The most common text direction among resolved segments.
    pub fn dominant_dir(&self) -> Option<&str> {
        most_common(self.segments().map(|segment| segment.html.dir.as_str()))
    }
}

fn is_chapter_selected(settings: &Settings, index: usize) -> bool {
    settings.chapters.is_empty() || settings.chapters.contains(&(index + 1))
}

fn preview_limit(settings: &Settings) -> usize {
    match (settings.preview_mode, settings.preview_slides) {
        (true, Some(slides)) => slides,
        _ => usize::MAX,
    }
}

/// Most frequent non-empty value; ties go to the value seen first.
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (order, value) in values.filter(|value| !value.is_empty()).enumerate() {
        counts.entry(value).or_insert((0, order)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}
