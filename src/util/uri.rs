use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

pub(crate) fn decode(encoded: &str) -> Cow<'_, str> {
    percent_encoding::percent_decode_str(encoded).decode_utf8_lossy()
}

/// Splits `href` into its main part and fragment (without `#`).
///
/// A trailing `#` yields an empty fragment.
pub(crate) fn split_fragment(href: &str) -> (&str, &str) {
    href.rfind('#')
        .map(|index| (&href[..index], &href[index + 1..]))
        .unwrap_or((href, ""))
}

/// The directory a document resides in.
pub(crate) fn parent(document: &Path) -> &Path {
    document.parent().unwrap_or(Path::new(""))
}

/// Resolve a percent-encoded `href` (without fragment) against
/// the directory of the document referencing it, normalizing if necessary.
///
/// Query strings are dropped as they carry no meaning for local files.
pub(crate) fn resolve(parent_dir: &Path, href: &str) -> PathBuf {
    let main_href = href.find('?').map_or(href, |position| &href[..position]);
    let decoded = decode(main_href);

    let mut buf = if Path::new(decoded.as_ref()).is_absolute() {
        PathBuf::from(decoded.as_ref())
    } else {
        parent_dir.join(decoded.as_ref())
    };
    normalize_path(&mut buf);
    buf
}

/// Resolve an `href` that may carry a `#fragment`.
pub(crate) fn resolve_with_fragment<'a>(parent_dir: &Path, href: &'a str) -> (PathBuf, &'a str) {
    let (main_href, fragment) = split_fragment(href);
    (resolve(parent_dir, main_href), fragment)
}

fn normalize_path(original: &mut PathBuf) {
    let mut stack = Vec::new();

    for component in original.components() {
        match component {
            Component::ParentDir => {
                match stack.last() {
                    // If the component is the root, disallow popping.
                    // No content must come before the root when present.
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    // Leading `..` of a relative path cannot be collapsed
                    None | Some(Component::ParentDir) => stack.push(component),
                    Some(_) => {
                        stack.pop();
                    }
                }
            }
            Component::CurDir => {}
            _ => stack.push(component),
        }
    }

    *original = PathBuf::from_iter(stack);
}
