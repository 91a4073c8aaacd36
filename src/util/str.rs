pub(crate) trait StringExt {
    fn trim_in_place(&mut self);
}

impl StringExt for String {
    fn trim_in_place(&mut self) {
        self.truncate(self.trim_end().len());

        let start = self.len() - self.trim_start().len();
        if start > 0 {
            self.drain(..start);
        }
    }
}

pub(crate) trait StrExt {
    fn starts_with_ignore_case(&self, start: &str) -> bool;
}

impl StrExt for str {
    fn starts_with_ignore_case(&self, start: &str) -> bool {
        self.len() >= start.len()
            && self.is_char_boundary(start.len())
            && self[..start.len()].eq_ignore_ascii_case(start)
    }
}

/// Replaces ideographic spaces (`U+3000`) with regular spaces and trims the result.
///
/// Ideographic spaces do not collapse under normal text layout,
/// which corrupts the measured width of rendered text.
pub(crate) fn normalize_text(text: &str) -> String {
    let mut normalized = text.replace('\u{3000}', " ");
    normalized.trim_in_place();
    normalized
}

/// Returns `true` if `text` contains a URL-like substring,
/// such as `https://example.org` or `www.example.org`.
pub(crate) fn contains_url(text: &str) -> bool {
    const SCHEMES: &[&str] = &["http://", "https://", "ftp://", "mailto:"];

    text.split_whitespace().any(|word| {
        let word = word.trim_start_matches(['(', '[', '<', '"', '\'']);

        SCHEMES.iter().any(|scheme| {
            word.starts_with_ignore_case(scheme) && word.len() > scheme.len()
        }) || (word.starts_with_ignore_case("www.")
            && word[4..].trim_end_matches(['.', ',', ')', ']', '>', '"', '\'']).contains('.'))
    })
}

/// Formats seconds as `[hh:]mm:ss.fff`; hours are only shown when non-zero.
///
/// # Examples
/// `3723.5` -> `01:02:03.500`, `62.25` -> `01:02.250`
pub fn to_hhmmss(seconds: f64) -> String {
    // Rounded first so a carry propagates into minutes and hours
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = millis / 3_600_000;
    let minutes = (millis / 60_000) % 60;
    let secs = (millis / 1000) % 60;
    let millis = millis % 1000;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{secs:02}.{millis:03}")
    }
}
