//! Navigation (`ncc.html`) document parsing.

use crate::book::{Chapter, Locator, Metadata};
use crate::errors::FormatError;
use crate::parser::tree::{Document, NodeId};
use crate::parser::{ParserResult, parse_document};
use crate::settings::{Context, Gap};
use crate::util::uri;
use log::{debug, warn};
use std::path::Path;

/// Classes marking page-number containers.
const PAGE_CLASSES: &[&str] = &["page-normal", "page-front", "page-special"];

/// The content of a navigation document.
#[derive(Clone, Debug, PartialEq)]
pub struct Navigation {
    /// Publication metadata.
    pub metadata: Metadata,
    /// Chapters in document order, contents still empty.
    pub chapters: Vec<Chapter>,
    /// Page-marker targets in document order.
    pub page_list: Vec<Locator>,
}

/// Parses the decoded navigation document located at `path`.
///
/// Every `href` is resolved against the directory of `path`.
/// Headings without an anchor are skipped and reported to `ctx`.
///
/// # Errors
/// - [`FormatError::Unparsable`]: The markup cannot be read.
/// - [`FormatError::NoBodyContent`]: The document has no body element,
///   or the body holds no element at all.
pub fn parse(path: &Path, text: &str, ctx: &Context) -> Result<Navigation, FormatError> {
    let document = parse_document(text, path)?;
    let body = find_body(&document, path)?;
    let parent_dir = uri::parent(path);

    let navigation = Navigation {
        metadata: parse_metadata(&document),
        chapters: parse_chapters(&document, body, parent_dir, ctx),
        page_list: parse_page_list(&document, body, parent_dir),
    };
    debug!(
        "{}: {} chapters, {} pages",
        path.display(),
        navigation.chapters.len(),
        navigation.page_list.len(),
    );
    Ok(navigation)
}

fn find_body(document: &Document, path: &Path) -> ParserResult<NodeId> {
    document
        .elements_named(document.root(), "body")
        .map(|(id, _)| id)
        .find(|body| {
            document
                .children(*body)
                .iter()
                .any(|child| document.element(*child).is_some())
        })
        .ok_or_else(|| FormatError::NoBodyContent(path.to_path_buf()))
}

fn parse_chapters(
    document: &Document,
    body: NodeId,
    parent_dir: &Path,
    ctx: &Context,
) -> Vec<Chapter> {
    let mut chapters = Vec::new();

    for (heading, element) in document.descendant_elements(body) {
        let Some(level) = heading_level(element.local_name()) else {
            continue;
        };
        let title = collapse_whitespace(&document.text_content(heading));
        let href = document
            .elements_named(heading, "a")
            .find_map(|(_, anchor)| anchor.attribute("href"));

        match href {
            Some(href) => {
                let (path, fragment) = uri::resolve_with_fragment(parent_dir, href);
                let locator = Locator::new(path, Some(fragment.to_owned()));
                chapters.push(Chapter::new(title, level, locator));
            }
            None => {
                warn!("Skipping heading `{title}`: no anchor found");
                ctx.diagnostics.report(Gap::HeadingWithoutAnchor { title });
            }
        }
    }
    chapters
}

/// `h1`..`h6` -> `1`..`6`
fn heading_level(local_name: &str) -> Option<u8> {
    match local_name.as_bytes() {
        [b'h', digit @ b'1'..=b'6'] => Some(digit - b'0'),
        _ => None,
    }
}

fn parse_page_list(document: &Document, body: NodeId, parent_dir: &Path) -> Vec<Locator> {
    document
        .descendant_elements(body)
        .filter(|(_, element)| PAGE_CLASSES.iter().any(|class| element.has_class(class)))
        .filter_map(|(marker, _)| {
            document
                .elements_named(marker, "a")
                .find_map(|(_, anchor)| anchor.attribute("href"))
        })
        .map(|href| {
            let (path, fragment) = uri::resolve_with_fragment(parent_dir, href);
            Locator::new(path, Some(fragment.to_owned()))
        })
        .collect()
}

fn parse_metadata(document: &Document) -> Metadata {
    let mut metadata = Metadata::default();

    for (_, element) in document.descendant_elements(document.root()) {
        if element.local_name() != "meta" {
            continue;
        }
        let (Some(name), Some(content)) = (element.attribute("name"), element.attribute("content"))
        else {
            continue;
        };
        let content = content.trim();

        match name.to_ascii_lowercase().as_str() {
            "dc:title" if metadata.title.is_empty() => metadata.title = content.to_owned(),
            "dc:language" if metadata.language.is_empty() => {
                metadata.language = content.to_owned();
            }
            "dc:creator" if !content.is_empty() => metadata.authors.push(content.to_owned()),
            "dc:date" if metadata.date.is_empty() => {
                metadata.date = content.to_owned();
                metadata.date_scheme = element
                    .attribute("scheme")
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_owned();
            }
            _ => {}
        }
    }
    metadata
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::path::PathBuf;

    const NCC: &str = r#"<?xml version="1.0" encoding="windows-1252"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <title>Fallback title</title>
  <meta name="dc:title" content=" The Book "/>
  <meta name="dc:creator" content="Ann Author"/>
  <meta name="dc:creator" content="Bob Writer"/>
  <meta name="dc:date" content="2001-04-05" scheme="yyyy-mm-dd"/>
  <meta name="dc:language" content="en"/>
  <meta name="ncc:totalTime" content="0:01:02"/>
</head>
<body>
  <h1 class="title" id="nav1"><a href="c1.smil#t1">The   Book</a></h1>
  <span class="page-front" id="p_i"><a href="c1.smil#pf1">i</a></span>
  <h2 id="nav2"><a href="smil/c2.smil">Part &amp; Two</a></h2>
  <h3 id="nav3">No anchor</h3>
  <span class="page-normal" id="p1"><a href="c1.smil#pn1">1</a></span>
  <div class="group"><h6><a href="c3.smil#x">Deep</a></h6></div>
  <p class="page-normal">no link</p>
</body>
</html>"#;

    fn parse_ncc() -> (Navigation, Context) {
        let ctx = Context::new(Settings::default());
        let navigation = parse(Path::new("book/ncc.html"), NCC, &ctx).unwrap();
        (navigation, ctx)
    }

    #[test]
    fn test_metadata() {
        let (navigation, _) = parse_ncc();
        let metadata = navigation.metadata;

        assert_eq!("The Book", metadata.title());
        assert_eq!("en", metadata.language());
        assert_eq!(["Ann Author", "Bob Writer"], metadata.authors());
        assert_eq!("2001-04-05", metadata.date());
        assert_eq!("yyyy-mm-dd", metadata.date_scheme());
    }

    #[test]
    fn test_chapters() {
        let (navigation, ctx) = parse_ncc();

        #[rustfmt::skip]
        let expected = [
            ("The Book", 1, "book/c1.smil", Some("t1")),
            ("Part & Two", 2, "book/smil/c2.smil", None),
            ("Deep", 6, "book/c3.smil", Some("x")),
        ];
        assert_eq!(expected.len(), navigation.chapters.len());

        for ((title, level, document, fragment), chapter) in expected.into_iter().zip(&navigation.chapters) {
            assert_eq!(title, chapter.title());
            assert_eq!(level, chapter.level());
            assert_eq!(Path::new(document), chapter.locator().document());
            assert_eq!(fragment, chapter.locator().fragment());
        }

        let gaps = ctx.diagnostics.gaps();
        assert_eq!(
            vec![Gap::HeadingWithoutAnchor { title: String::from("No anchor") }],
            gaps,
        );
    }

    #[test]
    fn test_page_list() {
        let (navigation, _) = parse_ncc();

        assert_eq!(
            vec![
                Locator::new(PathBuf::from("book/c1.smil"), Some(String::from("pf1"))),
                Locator::new(PathBuf::from("book/c1.smil"), Some(String::from("pn1"))),
            ],
            navigation.page_list,
        );
    }

    #[test]
    fn test_missing_metadata() {
        let ctx = Context::default();
        let navigation = parse(
            Path::new("ncc.html"),
            "<html><head><title> Only  title </title></head><body><h1><a href='a.smil#b'>A</a></h1></body></html>",
            &ctx,
        )
        .unwrap();

        // The document title is not a substitute for `dc:title`
        assert_eq!("", navigation.metadata.title());
        assert_eq!("", navigation.metadata.language());
        assert!(navigation.metadata.authors().is_empty());
    }

    #[test]
    fn test_no_body_content() {
        let ctx = Context::default();

        #[rustfmt::skip]
        let inputs = [
            "<html><head><title>t</title></head></html>",
            "<html><body>   </body></html>",
            "<smil><body/></smil>",
        ];

        for input in inputs {
            assert!(matches!(
                parse(Path::new("ncc.html"), input, &ctx),
                Err(FormatError::NoBodyContent(_))
            ));
        }
    }

    #[test]
    fn test_heading_level() {
        #[rustfmt::skip]
        let expected = [
            (Some(1), "h1"),
            (Some(6), "h6"),
            (None, "h7"),
            (None, "head"),
            (None, "hr"),
            (None, "h"),
        ];

        for (expected, name) in expected {
            assert_eq!(expected, heading_level(name));
        }
    }
}
