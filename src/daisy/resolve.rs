//! Cross-reference resolution between chapters, segments and pages.
//!
//! # Overview
//! All timing-document segment lists are flattened into one global list.
//! Each chapter locator is matched against the segment ids, strictly after
//! the previous chapter's match, so chapter starts are increasing and every
//! chapter owns the contiguous run of segments up to the next chapter.

use crate::book::{Anchor, Book, Chapter, Locator, MediaSegment, SegmentId};
use crate::daisy::ncc::Navigation;
use crate::settings::{Context, Gap};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::Path;

/// Positions of every segment id within the global segment list.
pub struct AnchorIndex<'a> {
    positions: HashMap<&'a Anchor, Vec<usize>>,
    /// The first id declared by each timing document.
    documents: HashMap<&'a Path, &'a Anchor>,
}

impl<'a> AnchorIndex<'a> {
    /// Indexes `segments` in list order.
    pub fn new(segments: &'a [MediaSegment]) -> Self {
        let mut positions: HashMap<&Anchor, Vec<usize>> = HashMap::new();
        let mut documents = HashMap::new();

        for (position, segment) in segments.iter().enumerate() {
            for anchor in segment.ids() {
                let entries = positions.entry(anchor).or_default();
                // Ids repeated within one segment count once
                if entries.last() != Some(&position) {
                    entries.push(position);
                }
                documents.entry(anchor.document()).or_insert(anchor);
            }
        }
        Self {
            positions,
            documents,
        }
    }

    /// The first position holding `anchor`.
    pub fn first(&self, anchor: &Anchor) -> Option<usize> {
        self.positions.get(anchor)?.first().copied()
    }

    /// The first position holding `anchor`, strictly after `previous`.
    pub fn first_after(&self, anchor: &Anchor, previous: Option<usize>) -> Option<usize> {
        let positions = self.positions.get(anchor)?;
        let from = previous.map_or(0, |previous| previous + 1);

        positions
            .get(positions.partition_point(|position| *position < from))
            .copied()
    }

    /// The first id declared by `document`, scanning from the start of the list.
    pub fn first_in_document(&self, document: &Path) -> Option<&'a Anchor> {
        self.documents.get(document).copied()
    }
}

/// Assembles a [`Book`] from the navigation content and the segment lists
/// of its timing documents, given in first-reference order.
///
/// - A chapter whose locator carries no fragment is rewritten to the first
///   id of its timing document.
/// - A chapter that cannot be resolved gets no contents and is reported
///   to `ctx`; the other chapters are unaffected.
/// - Each page-list entry marks the first segment holding its id.
pub fn resolve(navigation: Navigation, timing: Vec<Vec<MediaSegment>>, ctx: &Context) -> Book {
    let Navigation {
        metadata,
        mut chapters,
        page_list,
    } = navigation;
    let mut segments = timing.into_iter().flatten().collect::<Vec<_>>();
    info!(
        "Resolving {} chapters against {} segments",
        chapters.len(),
        segments.len(),
    );

    let (starts, pages) = {
        let index = AnchorIndex::new(&segments);
        (
            resolve_starts(&index, &mut chapters, ctx),
            resolve_pages(&index, &page_list),
        )
    };

    for position in pages {
        segments[position].is_page_number = true;
    }
    assign_contents(&mut chapters, segments, &starts);

    for (chapter_index, chapter) in chapters.iter_mut().enumerate() {
        for (position, segment) in chapter.contents.iter_mut().enumerate() {
            segment.internal_id = Some(SegmentId {
                chapter: chapter_index,
                position,
            });
        }
    }

    Book {
        metadata,
        chapters,
        page_list,
    }
}

/// Resolves the global start position of every chapter.
fn resolve_starts(index: &AnchorIndex<'_>, chapters: &mut [Chapter], ctx: &Context) -> Vec<Option<usize>> {
    let mut previous = None;

    chapters
        .iter_mut()
        .enumerate()
        .map(|(chapter_index, chapter)| {
            if chapter.locator.fragment().is_none() {
                if let Some(anchor) = index.first_in_document(chapter.locator.document()) {
                    chapter.locator = Locator::from(anchor.clone());
                }
            }
            let start = chapter
                .locator
                .as_anchor()
                .and_then(|anchor| index.first_after(&anchor, previous));

            match start {
                Some(start) => previous = Some(start),
                None => {
                    error!("Cannot resolve chapter {chapter_index} `{}`", chapter.locator);
                    ctx.diagnostics.report(Gap::UnresolvedChapter {
                        chapter: chapter_index,
                        locator: chapter.locator.to_string(),
                    });
                }
            }
            start
        })
        .collect()
}

fn resolve_pages(index: &AnchorIndex<'_>, page_list: &[Locator]) -> Vec<usize> {
    page_list
        .iter()
        .filter_map(|page| {
            let position = page.as_anchor().and_then(|anchor| index.first(&anchor));

            if position.is_none() {
                debug!("Page `{page}` matches no segment");
            }
            position
        })
        .collect()
}

/// Moves each run of `segments` into the chapter starting it.
///
/// A resolved chapter ends right before the next resolved chapter,
/// the last one at the end of the list.
fn assign_contents(chapters: &mut [Chapter], mut segments: Vec<MediaSegment>, starts: &[Option<usize>]) {
    for (chapter, start) in chapters.iter_mut().zip(starts).rev() {
        if let Some(start) = *start {
            chapter.contents = segments.split_off(start);
        }
    }
    if !segments.is_empty() {
        warn!(
            "{} segments precede the first chapter and are not part of any chapter",
            segments.len(),
        );
    }
}
