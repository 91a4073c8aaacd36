//! Content (XHTML) resolution.
//!
//! Fills in the rendering attributes of every selected segment from the
//! element its content anchor points at. Segments are grouped per content
//! document so each document is read and parsed once.

use crate::book::{Book, Html};
use crate::daisy::{self, task_error};
use crate::errors::BookResult;
use crate::parser::parse_document;
use crate::parser::tree::{Document, NodeId};
use crate::settings::{Context, Gap};
use crate::util::{media, str as text, uri};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Presentation-only attributes removed before serialization.
const PRESENTATION_ATTRIBUTES: &[&str] = &["face", "size", "style"];

/// Rendering attributes extracted for one content element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentElement {
    /// Serialized markup with presentation attributes removed
    /// and images inlined.
    pub raw_html: String,
    /// Normalized displayable text.
    pub text_content: String,
    /// Inherited `lang` (or `xml:lang`), empty if none.
    pub lang: String,
    /// Inherited `dir`, empty if none.
    pub dir: String,
    /// Local tag name.
    pub tag_name: String,
    /// The image itself as a data URI, if the element is an image.
    pub media: Option<String>,
    /// The text contains a URL-like substring.
    pub text_has_urls: bool,
}

impl ContentElement {
    fn apply(self, html: &mut Html, encoding: &str) {
        html.raw_html = Some(self.raw_html);
        html.text_content = Some(self.text_content);
        html.lang = self.lang;
        html.dir = self.dir;
        html.tag_name = Some(self.tag_name);
        html.media = self.media;
        html.encoding = Some(encoding.to_owned());
        html.text_has_urls = self.text_has_urls;
    }
}

/// The outcome of resolving every requested fragment of one document.
struct DocumentContent {
    encoding: &'static str,
    /// One entry per requested fragment, [`None`] if not found.
    elements: Vec<Option<ContentElement>>,
    gaps: Vec<Gap>,
}

/// Resolves the content of every segment selected by the settings of `ctx`.
///
/// Documents are processed concurrently; results are written back in
/// segment order. An element that cannot be found leaves its segment
/// untouched and is reported to `ctx`.
///
/// # Errors
/// A content document that cannot be read or parsed is fatal,
/// after every other document has been processed.
pub async fn resolve_content(book: &mut Book, ctx: &Context) -> BookResult<()> {
    let settings = &ctx.settings;
    // (document, [(segment, fragment)])
    let mut groups: Vec<(PathBuf, Vec<(usize, String)>)> = Vec::new();
    let mut group_of: HashMap<PathBuf, usize> = HashMap::new();
    let mut segment_count = 0;

    for (segment, media_segment) in book.selected_segments(settings).enumerate() {
        let html = &media_segment.html;
        let group = *group_of.entry(html.src.clone()).or_insert_with(|| {
            groups.push((html.src.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[group].1.push((segment, html.fragment().to_owned()));
        segment_count += 1;
    }
    info!(
        "Resolving content of {segment_count} segments in {} documents",
        groups.len(),
    );

    let handles = groups
        .into_iter()
        .map(|(path, requests)| {
            let encoding = settings.encoding.clone();
            tokio::spawn(async move {
                let fragments = requests.iter().map(|(_, fragment)| fragment.as_str()).collect::<Vec<_>>();
                let content = read_content(&path, &fragments, encoding.as_deref()).await;
                (requests, content)
            })
        })
        .collect::<Vec<_>>();

    let mut resolved: Vec<Option<(ContentElement, &'static str)>> = vec![None; segment_count];
    let mut failure = None;

    for handle in handles {
        let (requests, content) = handle.await.map_err(task_error)?;

        match content {
            Ok(content) => {
                for gap in content.gaps {
                    ctx.diagnostics.report(gap);
                }
                for ((segment, _), element) in requests.into_iter().zip(content.elements) {
                    resolved[segment] = element.map(|element| (element, content.encoding));
                }
            }
            Err(error) if failure.is_none() => failure = Some(error),
            Err(_) => {}
        }
    }
    if let Some(error) = failure {
        return Err(error);
    }

    for (segment, media_segment) in book.selected_segments_mut(settings).enumerate() {
        if let Some((element, encoding)) = resolved[segment].take() {
            element.apply(&mut media_segment.html, encoding);
        }
    }
    Ok(())
}

async fn read_content(
    path: &Path,
    fragments: &[&str],
    encoding: Option<&str>,
) -> BookResult<DocumentContent> {
    let decoded = daisy::read_document(path, encoding).await?;
    let mut document = parse_document(&decoded.text, path)?;
    let mut gaps = Vec::new();
    let mut elements = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        let element = resolve_element(&mut document, path, fragment, &mut gaps).await;

        if element.is_none() {
            warn!("Element #{fragment} not found in {}", path.display());
            gaps.push(Gap::UnresolvedFragment {
                document: path.to_path_buf(),
                fragment: (*fragment).to_owned(),
            });
        }
        elements.push(element);
    }
    debug!(
        "{}: resolved {} of {} elements",
        path.display(),
        elements.iter().flatten().count(),
        elements.len(),
    );

    Ok(DocumentContent {
        encoding: decoded.encoding,
        elements,
        gaps,
    })
}

/// Extracts the element identified by `fragment` within `document`.
///
/// Presentation attributes are stripped in place, so later segments
/// pointing into the same subtree observe the stripped tree.
pub(crate) async fn resolve_element(
    document: &mut Document,
    path: &Path,
    fragment: &str,
    gaps: &mut Vec<Gap>,
) -> Option<ContentElement> {
    if fragment.is_empty() {
        return None;
    }
    let id = document.find_by_id(fragment)?;

    let lang = document
        .inherited_attribute(id, &["lang", "xml:lang"])
        .unwrap_or_default()
        .to_owned();
    let dir = document
        .inherited_attribute(id, &["dir"])
        .unwrap_or_default()
        .to_owned();

    document.strip_attributes(id, PRESENTATION_ATTRIBUTES);
    let media = inline_images(document, id, uri::parent(path), gaps).await;

    let element = document.element(id)?;
    let tag_name = element.local_name().to_owned();
    let raw_text = if tag_name == "img" {
        element.attribute("alt").unwrap_or_default().to_owned()
    } else {
        document.text_content(id)
    };
    let text_content = text::normalize_text(&raw_text);

    Some(ContentElement {
        raw_html: document.serialize(id),
        text_has_urls: text::contains_url(&text_content),
        text_content,
        lang,
        dir,
        tag_name,
        media,
    })
}

/// Rewrites the `src` of every image in the subtree of `id` into a data URI.
///
/// Returns the data URI of `id` itself if it is an image.
async fn inline_images(
    document: &mut Document,
    id: NodeId,
    parent_dir: &Path,
    gaps: &mut Vec<Gap>,
) -> Option<String> {
    let images = std::iter::once(id)
        .chain(document.descendants(id))
        .filter_map(|node| {
            let element = document.element(node)?;
            let src = element.attribute("src")?;
            (element.local_name() == "img" && !src.starts_with("data:"))
                .then(|| (node, src.to_owned()))
        })
        .collect::<Vec<_>>();

    let mut own_media = None;

    for (node, src) in images {
        let path = uri::resolve(parent_dir, &src);

        match media::read_data_uri(&path).await {
            Ok(data_uri) => {
                if node == id {
                    own_media = Some(data_uri.clone());
                }
                document.set_attribute(node, "src", data_uri);
            }
            Err(error) => {
                warn!("Cannot inline {}: {error}", path.display());
                gaps.push(Gap::UnreadableMedia { path });
            }
        }
    }
    own_media
}
