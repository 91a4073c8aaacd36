//! Discrete font-fit search.
//!
//! # Overview
//! The largest font size at which a segment fits its fixed frame is found by
//! hill-climbing one pixel at a time, guided by a [`RenderingOracle`]:
//! 1. The oracle is queried at the current size; [`FitOutcome::Fits`] ends the search.
//! 2. Otherwise the size steps by one pixel against the reported overflow.
//! 3. The outcomes of the two most recent steps are tracked; once they disagree,
//!    no integer size fits exactly and the search settles on the size that was
//!    [`FitOutcome::TooSmall`], so the result never overflows.
//!
//! A batch of segments shares a single size: the minimum of all per-segment maxima.

mod page;

pub use self::page::{CONTAINER_CLASS, RenderPage, TEXT_CLASS};

use crate::book::Book;
use crate::errors::{BookResult, OracleResult};
use crate::settings::{Context, FontSettings};
use log::{debug, info};
use std::collections::VecDeque;

/// The outcome of rendering a [`RenderPage`] at a given font size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FitOutcome {
    /// The text box exactly fills its container.
    Fits,
    /// The text box overflows its container.
    TooBig,
    /// The text box leaves slack within its container.
    TooSmall,
}

/// The sole source of layout truth for the font-fit search,
/// typically backed by a browser session.
///
/// Queries are issued sequentially; an implementation holding a single
/// rendering context needs no synchronization of its own.
#[async_trait::async_trait]
pub trait RenderingOracle: Send {
    /// Renders `page` and compares the text box to its container.
    ///
    /// `font_size` overrides the text box font size in pixels;
    /// [`None`] renders with the size the stylesheets compute.
    async fn measure(&mut self, page: &RenderPage, font_size: Option<u32>) -> OracleResult<FitOutcome>;

    /// The font size in pixels the stylesheets compute for the text box of `page`.
    async fn computed_font_size(&mut self, page: &RenderPage) -> OracleResult<u32>;

    /// The settled `(width, height)` of the container of `page` in pixels.
    async fn container_size(
        &mut self,
        page: &RenderPage,
        font_size: Option<u32>,
    ) -> OracleResult<(u32, u32)>;
}

/// Finds the largest size within `min_size..=max_size` at which `page` fits,
/// starting from the size its stylesheets compute.
///
/// Terminates at the bounds: a page still [`FitOutcome::TooBig`] at
/// `min_size` yields `min_size`, one still [`FitOutcome::TooSmall`] at
/// `max_size` yields `max_size`.
pub async fn find_max_font_size<O>(
    oracle: &mut O,
    page: &RenderPage,
    min_size: u32,
    max_size: u32,
) -> OracleResult<u32>
where
    O: RenderingOracle + ?Sized,
{
    let max_size = max_size.max(min_size);
    let mut size = oracle
        .computed_font_size(page)
        .await?
        .clamp(min_size, max_size);

    if page.is_blank() {
        return Ok(size);
    }
    let mut outcome = oracle.measure(page, Some(size)).await?;
    // (size, outcome) of the two most recent non-initial queries
    let mut history: VecDeque<(u32, FitOutcome)> = VecDeque::with_capacity(2);

    loop {
        if outcome == FitOutcome::Fits {
            return Ok(size);
        }
        if history.len() == 2 && history[0].1 != history[1].1 {
            let settled = history
                .iter()
                .find(|(_, outcome)| *outcome == FitOutcome::TooSmall)
                .map_or(size, |(size, _)| *size);
            return Ok(settled);
        }
        size = match outcome {
            FitOutcome::TooBig if size <= min_size => return Ok(min_size),
            FitOutcome::TooSmall if size >= max_size => return Ok(max_size),
            FitOutcome::TooBig => size - 1,
            _ => size + 1,
        };
        outcome = oracle.measure(page, Some(size)).await?;

        if history.len() == 2 {
            history.pop_front();
        }
        history.push_back((size, outcome));
    }
}

/// The single size shared by a batch: the minimum of the per-segment maxima.
///
/// Returns [`None`] for an empty batch.
pub fn batch_font_size(maxima: impl IntoIterator<Item = u32>) -> Option<u32> {
    maxima.into_iter().min()
}

/// Applies a common font size to the selected segments of a [`Book`].
///
/// # Examples
/// ```no_run
/// # use rdaisy::Book;
/// # use rdaisy::errors::BookResult;
/// # use rdaisy::fontfit::{FontFit, RenderingOracle};
/// # use rdaisy::settings::Context;
/// # async fn run(oracle: &mut impl RenderingOracle, ctx: &Context) -> BookResult<()> {
/// let mut book = Book::open_with("books/sample/ncc.html", ctx).await?;
/// let size = FontFit::new(oracle, ["body { font-size: 48px; }"])
///     .run(&mut book, ctx)
///     .await?;
///
/// println!("Rendering at {size:?} px");
/// # Ok(())
/// # }
/// ```
pub struct FontFit<'a, O: RenderingOracle + ?Sized> {
    oracle: &'a mut O,
    stylesheets: Vec<String>,
}

impl<'a, O: RenderingOracle + ?Sized> FontFit<'a, O> {
    /// Creates a font-fit run staging every page with `stylesheets`.
    pub fn new(oracle: &'a mut O, stylesheets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            oracle,
            stylesheets: stylesheets.into_iter().map(Into::into).collect(),
        }
    }

    /// Sizes every segment selected by the settings of `ctx`.
    ///
    /// - [`FontSettings::fixed_size`] set: that size is applied without searching.
    /// - [`FontSettings::autosize`] set: every segment records its
    ///   [`maximum_font_size`](crate::book::Html::maximum_font_size); the batch
    ///   size, reduced by [`FontSettings::reduce_autosized_by`] and kept within
    ///   [`FontSettings::min_size`], is applied.
    /// - Otherwise each segment keeps the size its stylesheets compute.
    ///
    /// The applied size and settled container dimensions are recorded on
    /// every segment. Returns the common size, or [`None`] if no common size
    /// was applied.
    ///
    /// # Errors
    /// [`BookError::Oracle`](crate::errors::BookError::Oracle): The oracle failed a query.
    pub async fn run(&mut self, book: &mut Book, ctx: &Context) -> BookResult<Option<u32>> {
        let font = &ctx.settings.font;

        let common = match (font.fixed_size, font.autosize) {
            (Some(size), _) => Some(size),
            (None, true) => self.autosize(book, ctx, font).await?,
            (None, false) => None,
        };
        info!("Applying font size {common:?}");

        for segment in book.selected_segments_mut(&ctx.settings) {
            let page = RenderPage::for_segment(&segment.html, &self.stylesheets, common);
            let rendered = match common {
                Some(size) => size,
                None => self.oracle.computed_font_size(&page).await?,
            };
            segment.html.rendered_font_size = Some(rendered);
            segment.html.container_size = Some(self.oracle.container_size(&page, common).await?);
        }
        Ok(common)
    }

    async fn autosize(
        &mut self,
        book: &mut Book,
        ctx: &Context,
        font: &FontSettings,
    ) -> BookResult<Option<u32>> {
        let mut maxima = Vec::new();

        for segment in book.selected_segments_mut(&ctx.settings) {
            let page = RenderPage::for_segment(&segment.html, &self.stylesheets, None);
            let maximum =
                find_max_font_size(&mut *self.oracle, &page, font.min_size, font.max_size).await?;

            if let Some(id) = segment.internal_id() {
                debug!("Maximum font size for {id}: {maximum}px");
            }
            segment.html.maximum_font_size = Some(maximum);
            maxima.push(maximum);
        }

        Ok(batch_font_size(maxima).map(|size| {
            size.saturating_sub(font.reduce_autosized_by)
                .max(font.min_size)
        }))
    }
}
