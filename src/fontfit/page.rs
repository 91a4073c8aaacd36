use crate::book::Html;
use crate::parser::xml;

/// Class of the fixed-size frame the text must fit in.
pub const CONTAINER_CLASS: &str = "rdaisy-container";
/// Class of the box holding the segment markup.
pub const TEXT_CLASS: &str = "rdaisy-text";

/// A self-contained page staging one segment for a
/// [`RenderingOracle`](super::RenderingOracle).
///
/// The page holds a container ([`CONTAINER_CLASS`]) carrying the segment's
/// `lang` and `dir`, wrapping a text box ([`TEXT_CLASS`]) with the segment markup.
/// Stylesheets are inlined; nothing is loaded from the filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderPage {
    markup: String,
    text: String,
}

impl RenderPage {
    /// Stages `html` with `stylesheets`, optionally forcing the text box
    /// to `font_size` pixels.
    ///
    /// Images are staged as a paragraph holding their alternate text,
    /// and `<font>` elements are rendered as `<span>`.
    pub fn for_segment(html: &Html, stylesheets: &[String], font_size: Option<u32>) -> Self {
        let text = html.text_content.clone().unwrap_or_default();
        let content = if html.is_image() {
            format!("<p>{}</p>", xml::escape_text(&text))
        } else {
            html.raw_html.clone().unwrap_or_default()
        };
        let content = content.replace("<font", "<span").replace("</font>", "</span>");

        let mut style = stylesheets.join("\n");
        if let Some(size) = font_size {
            style.push_str(&format!("\n.{TEXT_CLASS} {{ font-size: {size}px !important; }}"));
        }
        let url_class = if html.text_has_urls { " url" } else { "" };

        let markup = format!(
            "<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{style}\n</style>\n</head>\n<body>\n\
             <div class=\"{CONTAINER_CLASS}\" lang=\"{lang}\" dir=\"{dir}\">\n\
             <div class=\"{TEXT_CLASS}{url_class}\">\n{content}\n</div>\n\
             </div>\n</body>\n</html>\n",
            lang = xml::escape_attribute(&html.lang),
            dir = xml::escape_attribute(&html.dir),
        );
        Self { markup, text }
    }

    /// The complete page markup.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The displayable text of the staged segment.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` if the text box holds only whitespace,
    /// in which case it fits at any size.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
