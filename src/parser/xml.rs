use crate::parser::entities;
use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesRef, BytesStart};
use std::borrow::Cow;

pub(crate) type ByteReader<'a> = Reader<&'a [u8]>;

/// Creates a reader tolerant of the HTML-flavored markup found in talking books:
/// mismatched or dangling end tags, and bare `&` characters.
pub(crate) fn reader(text: &str) -> ByteReader<'_> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;
    reader
}

pub(crate) trait XmlElement {
    /// The qualified name, lowercased (e.g. `h1`, `meta`, `xml:lang`).
    fn lowercase_name(&self) -> String;

    /// Every well-formed attribute as `(lowercase name, unescaped value)`.
    ///
    /// Unquoted and value-less attributes are accepted.
    fn owned_attributes(&self) -> Vec<(String, String)>;
}

impl XmlElement for BytesStart<'_> {
    fn lowercase_name(&self) -> String {
        String::from_utf8_lossy(self.name().as_ref()).to_ascii_lowercase()
    }

    fn owned_attributes(&self) -> Vec<(String, String)> {
        self.html_attributes()
            .filter_map(Result::ok)
            .map(|attribute| {
                let key = String::from_utf8_lossy(attribute.key.as_ref()).to_ascii_lowercase();
                let value = unescape(&String::from_utf8_lossy(&attribute.value)).into_owned();
                (key, value)
            })
            .collect()
    }
}

pub(crate) fn end_name(end: &BytesEnd) -> String {
    String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase()
}

/// Resolves a reference event; unknown entities are kept literally.
pub(crate) fn resolve_reference(reference: &BytesRef) -> Cow<'static, str> {
    let body = String::from_utf8_lossy(reference);

    match entities::resolve(&body) {
        Some(c) => Cow::Owned(c.to_string()),
        None => Cow::Owned(format!("&{body};")),
    }
}

/// Replaces character and entity references within `raw`.
///
/// Unknown references and dangling `&` characters are kept literally.
pub(crate) fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut unescaped = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        unescaped.push_str(&rest[..start]);
        rest = &rest[start..];

        let resolved = rest
            .find(';')
            .and_then(|end| entities::resolve(&rest[1..end]).map(|c| (c, end)));

        match resolved {
            Some((c, end)) => {
                unescaped.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                unescaped.push('&');
                rest = &rest[1..];
            }
        }
    }
    unescaped.push_str(rest);
    Cow::Owned(unescaped)
}

/// Escapes text content (`&`, `<`, `>`).
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    quick_xml::escape::partial_escape(text)
}

/// Escapes an attribute value, quotes included.
pub(crate) fn escape_attribute(value: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(value)
}
