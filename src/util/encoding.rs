use encoding_rs::Encoding;

/// Number of leading bytes searched for an encoding declaration.
const PRESCAN_LEN: usize = 1024;

/// Decodes `bytes` with an explicit `label`, or sniffs the encoding.
///
/// Returns the decoded text and the encoding actually used,
/// or [`None`] if `label` is not a recognized encoding label.
///
/// Sniffing order:
/// 1. Byte order mark (UTF-8, UTF-16LE/BE).
/// 2. Declared encoding (`<?xml encoding="..."?>` or `<meta charset>`).
/// 3. UTF-8, if the data is valid UTF-8.
/// 4. Windows-1252 (common in older talking books, superset of ISO-8859-1).
pub(crate) fn decode(bytes: &[u8], label: Option<&str>) -> Option<(String, &'static Encoding)> {
    let encoding = match label {
        Some(label) => Encoding::for_label(label.trim().as_bytes())?,
        None => sniff(bytes),
    };
    // `decode` still honors a BOM over the requested encoding
    let (text, used, _) = encoding.decode(bytes);
    Some((text.into_owned(), used))
}

pub(crate) fn sniff(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if let Some(encoding) = declared_encoding(&bytes[..bytes.len().min(PRESCAN_LEN)]) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        encoding_rs::UTF_8
    } else {
        encoding_rs::WINDOWS_1252
    }
}

/// Finds the value of the first `encoding=` or `charset=` declaration.
fn declared_encoding(head: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    ["encoding=", "charset="].iter().find_map(|key| {
        let start = head.find(key)? + key.len();
        let value = head[start..]
            .trim_start_matches(['"', '\'', ' '])
            .split(|c: char| c == '"' || c == '\'' || c == ';' || c == '?' || c == '>' || c.is_whitespace())
            .next()?;
        Encoding::for_label(value.as_bytes())
            // A UTF-16 declaration in an ASCII-compatible prescan is a lie
            .filter(|encoding| *encoding != encoding_rs::UTF_16LE && *encoding != encoding_rs::UTF_16BE)
    })
}
