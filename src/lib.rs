//! # rdaisy
//! Structural resolution of DAISY 2.02 talking books.
//!
//! A talking book is a document set: a navigation document (`ncc.html`),
//! timing documents (`*.smil`) pairing audio clips with content fragments,
//! and content documents (`*.html`) holding the displayed text.
//! `rdaisy` resolves the set into a single [`Book`]: chapters, each owning
//! the contiguous run of timed [`MediaSegment`](book::MediaSegment) values
//! narrating it, with per-segment rendering attributes.
//!
//! The [`fontfit`] module then finds the largest font size at which every
//! segment fits a fixed frame, using an injected
//! [`RenderingOracle`](fontfit::RenderingOracle).
//!
//! ## Logging
//! Every stage reports progress and non-fatal gaps through the [`log`] facade.
//! No logger is installed by this crate.
//!
//! ## Examples
//! Opening a book and listing its chapters:
//! ```no_run
//! # use rdaisy::Book;
//! # use rdaisy::errors::BookResult;
//! # async fn run() -> BookResult<()> {
//! let book = Book::open("books/sample/ncc.html").await?;
//!
//! println!("{}", book.metadata().title());
//! for chapter in book.chapters() {
//!     println!(
//!         "{} [{}]",
//!         chapter.title(),
//!         rdaisy::util::str::to_hhmmss(chapter.duration()),
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//! Selecting chapters and collecting resolution gaps:
//! ```no_run
//! # use rdaisy::Book;
//! # use rdaisy::errors::BookResult;
//! # use rdaisy::settings::{Context, Settings};
//! # async fn run() -> BookResult<()> {
//! let ctx = Context::new(
//!     Settings::builder()
//!         .encoding("windows-1252")
//!         .chapters([2, 3])
//!         .include_page_numbers(true),
//! );
//! let book = Book::open_with("books/sample/ncc.html", &ctx).await?;
//!
//! for segment in book.selected_segments(&ctx.settings) {
//!     println!("{:?}: {:?}", segment.internal_id(), segment.html.text_content);
//! }
//! for gap in ctx.diagnostics.gaps() {
//!     eprintln!("{gap}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod book;
pub mod daisy;
pub mod errors;
pub mod fontfit;
pub mod settings;
pub mod util;

mod parser;

pub use self::book::Book;
pub use self::settings::{Context, Settings};
