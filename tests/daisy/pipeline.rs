use crate::daisy::util::{self, SIMPLE_BOOK};
use rdaisy::book::Anchor;
use rdaisy::errors::{BookError, FormatError, ResourceError};
use rdaisy::settings::{Context, Gap, Settings};
use rdaisy::util::str::to_hhmmss;
use rdaisy::Book;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const SIMPLE_DIR: &str = "tests/books/simple";

#[tokio::test]
async fn test_metadata() {
    let (book, _) = util::open_simple(Settings::default()).await;
    let metadata = book.metadata();

    assert_eq!("A Simple Book", metadata.title());
    assert_eq!("en", metadata.language());
    assert_eq!(["Jane Narrator"], metadata.authors());
    assert_eq!("2004-02-11", metadata.date());
    assert_eq!("yyyy-mm-dd", metadata.date_scheme());
    assert_eq!("A Simple Book", book.safe_filename());
    assert_eq!(Some("en"), book.dominant_lang());
}

#[tokio::test]
async fn test_chapter_partition() {
    let (book, ctx) = util::open_simple(Settings::default()).await;

    #[rustfmt::skip]
    let expected = [
        ("Chapter One", 1, vec!["0-0", "0-1"]),
        ("Chapter Two", 2, vec!["1-0", "1-1", "1-2", "1-3"]),
    ];
    assert_eq!(expected.len(), book.chapters().len());

    for ((title, level, ids), chapter) in expected.into_iter().zip(book.chapters()) {
        let internal_ids = chapter
            .contents()
            .iter()
            .map(|segment| segment.internal_id().unwrap().to_string())
            .collect::<Vec<_>>();

        assert_eq!(title, chapter.title());
        assert_eq!(level, chapter.level());
        assert_eq!(ids, internal_ids);
    }
    assert!(ctx.diagnostics.is_empty(), "{:?}", ctx.diagnostics.gaps());
}

#[tokio::test]
async fn test_segments_in_document_order() {
    let (book, _) = util::open_simple(Settings::default()).await;
    let smil = Path::new(SIMPLE_DIR).join("content.smil");

    // Every grouping belongs to exactly one chapter, in timing-document order
    let pars = book
        .segments()
        .map(|segment| segment.ids()[0].clone())
        .collect::<Vec<_>>();
    let expected = (1..=6)
        .map(|i| Anchor::new(&smil, format!("par_{i}")))
        .collect::<Vec<_>>();
    assert_eq!(expected, pars);

    let unique = book
        .segments()
        .filter_map(|segment| segment.internal_id())
        .collect::<HashSet<_>>();
    assert_eq!(6, unique.len());

    // Ids from the whole grouping subtree are collected
    let fourth = book.segments().nth(3).unwrap();
    assert!(fourth.has_id(&Anchor::new(&smil, "aud_4b")));
}

#[tokio::test]
async fn test_page_numbers() {
    let (book, _) = util::open_simple(Settings::default()).await;

    let flags = book
        .segments()
        .map(|segment| segment.is_page_number())
        .collect::<Vec<_>>();
    assert_eq!(vec![false, true, false, false, false, false], flags);
    assert_eq!(1, book.page_list().len());
}

#[tokio::test]
async fn test_durations() {
    let (book, _) = util::open_simple(Settings::default()).await;

    #[rustfmt::skip]
    let expected = [
        (3.0, "00:03.000"),
        (69.0, "01:09.000"),
    ];

    for ((seconds, formatted), chapter) in expected.into_iter().zip(book.chapters()) {
        assert_eq!(seconds, chapter.duration());
        assert_eq!(formatted, to_hhmmss(chapter.duration()));
    }
    let audio = &book.chapters()[1].contents()[1].audios()[1];
    assert_eq!(Path::new(SIMPLE_DIR).join("audio/part1.mp3"), audio.src);
}

#[tokio::test]
async fn test_content_resolution() {
    let (book, _) = util::open_simple(Settings::default()).await;
    let segments = book.segments().collect::<Vec<_>>();

    // Page numbers are not selected by default
    assert!(!segments[1].html.is_resolved());

    let heading = &segments[2].html;
    assert_eq!(Some("Chapter Two"), heading.text_content.as_deref());
    assert_eq!(Some(r#"<h2 id="t3">Chapter Two</h2>"#), heading.raw_html.as_deref());
    assert_eq!(Some("h2"), heading.tag_name.as_deref());
    assert_eq!(Some("windows-1252"), heading.encoding.as_deref());
    assert_eq!("en", heading.lang);

    let paragraph = &segments[3].html;
    assert_eq!(Some("Café au lait\u{a0}!"), paragraph.text_content.as_deref());
    assert_eq!("fr", paragraph.lang);

    let image = &segments[4].html;
    assert!(image.is_image());
    assert_eq!(Some("A single dot"), image.text_content.as_deref());
    assert_eq!(
        Some("data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAICRAEAOw=="),
        image.media.as_deref(),
    );

    let link = &segments[5].html;
    assert!(link.text_has_urls);
    assert_eq!("ltr", link.dir);
    assert_eq!(
        Some(r#"<p id="t6" dir="ltr">See <font>www.daisy.org</font> for more.</p>"#),
        link.raw_html.as_deref(),
    );
}

#[tokio::test]
async fn test_selection() {
    #[rustfmt::skip]
    let expected = [
        (vec![true, true, true, true, true, true], Settings::builder().include_page_numbers(true).build()),
        (vec![true, false, false, false, false, false], Settings::builder().chapters([1]).build()),
        (vec![false, false, true, true, false, false], Settings::builder().chapters([2]).preview(Some(2)).build()),
    ];

    for (expected, settings) in expected {
        let (book, _) = util::open_simple(settings).await;
        let resolved = book
            .segments()
            .map(|segment| segment.html.is_resolved())
            .collect::<Vec<_>>();

        assert_eq!(expected, resolved);
    }
}

#[tokio::test]
async fn test_explicit_encoding() {
    let (book, _) = util::open_simple(Settings::builder().encoding("utf-8").build()).await;
    let paragraph = &book.segments().nth(3).unwrap().html;

    // Windows-1252 bytes read as UTF-8 are replaced
    assert_eq!(Some("Caf\u{FFFD} au lait\u{a0}!"), paragraph.text_content.as_deref());
    assert_eq!(Some("UTF-8"), paragraph.encoding.as_deref());

    let ctx = Context::new(Settings::builder().encoding("no-such-encoding"));
    assert!(matches!(
        Book::open_with(SIMPLE_BOOK, &ctx).await,
        Err(BookError::Resource(ResourceError::UnknownEncoding { .. }))
    ));
}

#[tokio::test]
async fn test_not_ncc_file() {
    #[rustfmt::skip]
    let inputs = [
        PathBuf::from(SIMPLE_DIR).join("content.html"),
        PathBuf::from("tests/books/missing/ncc.html"),
    ];

    let not_ncc = Book::open(&inputs[0]).await;
    assert!(matches!(not_ncc, Err(BookError::Resource(ResourceError::NotNccFile(_)))));

    let missing = Book::open(&inputs[1]).await;
    assert!(matches!(missing, Err(BookError::Resource(ResourceError::CannotRead { .. }))));
}

#[tokio::test]
async fn test_fatal_format_errors() {
    let dir = tempfile::tempdir().unwrap();
    let ncc = dir.path().join("ncc.html");

    // No body content
    util::write_files(dir.path(), &[("ncc.html", "<html><head><title>x</title></head></html>")]);
    assert!(matches!(
        Book::open(&ncc).await,
        Err(BookError::Format(FormatError::NoBodyContent(_)))
    ));

    // A grouping without a text reference
    let ncc_content = util::ncc(r#"<h1><a href="a.smil#p1">One</a></h1>"#);
    util::write_files(
        dir.path(),
        &[
            ("ncc.html", &ncc_content),
            ("a.smil", r#"<smil><body><par id="p1"><audio src="a.mp3" clip-begin="0s" clip-end="1s"/></par></body></smil>"#),
        ],
    );
    assert!(matches!(
        Book::open(&ncc).await,
        Err(BookError::Format(FormatError::MissingTextReference { position: 0, .. }))
    ));
}

#[tokio::test]
async fn test_resolution_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let ncc_content = util::ncc(
        r#"<h1><a href="smil/a.smil">One</a></h1>
        <h2>Unanchored</h2>
        <h2><a href="smil/a.smil#nowhere">Lost</a></h2>
        <h1><a href="smil/b.smil#b2">Two</a></h1>
        <span class="page-normal"><a href="smil/b.smil#unmatched">7</a></span>"#,
    );
    let a_smil = util::smil(&[("a1", "../text/c.html#x1"), ("a2", "../text/c.html#x2")]);
    let b_smil = util::smil(&[("b1", "../text/c.html#x3"), ("b2", "../text/c.html#gone")]);
    util::write_files(
        dir.path(),
        &[
            ("ncc.html", &ncc_content),
            ("smil/a.smil", &a_smil),
            ("smil/b.smil", &b_smil),
            ("text/c.html", r#"<html><body><p id="x1">1</p><p id="x2">2</p><p id="x3">3</p></body></html>"#),
        ],
    );

    let ctx = Context::default();
    let book = Book::open_with(dir.path().join("ncc.html"), &ctx).await.unwrap();

    let counts = book
        .chapters()
        .iter()
        .map(|chapter| chapter.contents().len())
        .collect::<Vec<_>>();
    // `b1` precedes the last chapter and therefore extends the first one
    assert_eq!(vec![3, 0, 1], counts);
    assert_eq!(Some("a1"), book.chapters()[0].locator().fragment());
    assert!(book.segments().all(|segment| !segment.is_page_number()));

    let smil_dir = dir.path().join("smil");
    let text_dir = dir.path().join("text");
    assert_eq!(
        vec![
            Gap::HeadingWithoutAnchor {
                title: String::from("Unanchored"),
            },
            Gap::UnresolvedChapter {
                chapter: 1,
                locator: format!("{}#nowhere", smil_dir.join("a.smil").display()),
            },
            Gap::UnresolvedFragment {
                document: text_dir.join("c.html"),
                fragment: String::from("gone"),
            },
        ],
        ctx.diagnostics.gaps(),
    );
    let last = &book.chapters()[2].contents()[0];
    assert!(!last.html.is_resolved());
}

#[tokio::test]
async fn test_invalid_clips_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let ncc_content = util::ncc(r#"<h1><a href="a.smil#p1">One</a></h1>"#);
    util::write_files(
        dir.path(),
        &[
            ("ncc.html", &ncc_content),
            (
                "a.smil",
                r#"<smil><body>
<par id="p1"><text src="c.html#x1"/><audio src="a.mp3" clip-begin="npt=0s"/></par>
<par id="p2"><text src="c.html#x2"/><audio src="a.mp3" clip-begin="npt=1,5s" clip-end="npt=3s"/><audio src="a.mp3" clip-begin="npt=3s" clip-end="npt=4s"/></par>
</body></smil>"#,
            ),
            ("c.html", r#"<html><body><p id="x1">1</p><p id="x2">2</p></body></html>"#),
        ],
    );

    let ctx = Context::default();
    let book = Book::open_with(dir.path().join("ncc.html"), &ctx).await.unwrap();
    let chapter = &book.chapters()[0];

    assert_eq!(2, chapter.contents().len());
    assert_eq!(1.0, chapter.duration());
    assert!(book.segments().all(|segment| segment.html.is_resolved()));

    let smil = dir.path().join("a.smil");
    assert_eq!(
        vec![
            Gap::InvalidClip {
                path: smil.clone(),
                attribute: "clip-end",
                value: None,
            },
            Gap::InvalidClip {
                path: smil,
                attribute: "clip-begin",
                value: Some(String::from("npt=1,5s")),
            },
        ],
        ctx.diagnostics.gaps(),
    );
}
