//! Timing (SMIL 1.0) document parsing.
//!
//! Every `par` grouping becomes one [`MediaSegment`], in document order.
//! Nested timing structure is flattened.

use crate::book::{Anchor, Audio, Chapter, Html, MediaSegment};
use crate::daisy::{self, task_error};
use crate::errors::{BookResult, FormatError};
use crate::parser::tree::{Document, Element, NodeId};
use crate::parser::{ParserResult, parse_document};
use crate::settings::{Context, Gap};
use crate::util::uri;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::iter;
use std::path::{Path, PathBuf};

/// Parses the decoded timing document located at `path`.
///
/// Every `src` is resolved against the directory of `path`,
/// and every segment id is qualified by `path`.
///
/// An `audio` clip lacking `src`, `clip-begin` or `clip-end`, or with an
/// unreadable offset, is dropped and pushed to `gaps` as [`Gap::InvalidClip`].
///
/// # Errors
/// - [`FormatError::Unparsable`]: The markup cannot be read.
/// - [`FormatError::MissingTextReference`]: A `par` has no `text` reference.
pub fn parse(path: &Path, text: &str, gaps: &mut Vec<Gap>) -> Result<Vec<MediaSegment>, FormatError> {
    let document = parse_document(text, path)?;
    let parser = SmilParser {
        document: &document,
        path,
        parent_dir: uri::parent(path),
    };

    let segments = document
        .elements_named(document.root(), "par")
        .enumerate()
        .map(|(position, (par, _))| parser.parse_par(position, par, gaps))
        .collect::<ParserResult<Vec<_>>>()?;

    debug!("{}: {} segments", path.display(), segments.len());
    Ok(segments)
}

/// Parses every distinct timing document referenced by `chapters`.
///
/// Documents are parsed concurrently; the returned lists are ordered by
/// first reference, independent of completion order.
/// Every document is parsed to completion before the first error is returned.
/// Dropped clips are reported to `ctx`.
pub async fn parse_all(chapters: &[Chapter], ctx: &Context) -> BookResult<Vec<Vec<MediaSegment>>> {
    let documents = referenced_documents(chapters);
    info!("Parsing {} timing documents", documents.len());

    let handles = documents
        .into_iter()
        .map(|path| {
            let encoding = ctx.settings.encoding.clone();
            tokio::spawn(async move {
                let document = daisy::read_document(&path, encoding.as_deref()).await?;
                let mut gaps = Vec::new();
                let segments = parse(&path, &document.text, &mut gaps)?;
                BookResult::Ok((segments, gaps))
            })
        })
        .collect::<Vec<_>>();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.map_err(task_error)?);
    }
    results
        .into_iter()
        .map(|result| {
            let (segments, gaps) = result?;
            for gap in gaps {
                ctx.diagnostics.report(gap);
            }
            Ok(segments)
        })
        .collect()
}

/// Timing documents in first-reference order, each listed once.
fn referenced_documents(chapters: &[Chapter]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();

    chapters
        .iter()
        .map(|chapter| chapter.locator().document())
        .filter(|document| seen.insert(*document))
        .map(Path::to_path_buf)
        .collect()
}

struct SmilParser<'a> {
    document: &'a Document,
    path: &'a Path,
    parent_dir: &'a Path,
}

impl SmilParser<'_> {
    fn parse_par(&self, position: usize, par: NodeId, gaps: &mut Vec<Gap>) -> ParserResult<MediaSegment> {
        let src = self
            .document
            .elements_named(par, "text")
            .find_map(|(_, text)| text.attribute("src"))
            .ok_or_else(|| FormatError::MissingTextReference {
                path: self.path.to_path_buf(),
                position,
            })?;
        let (content, fragment) = uri::resolve_with_fragment(self.parent_dir, src);
        let selector = if fragment.is_empty() {
            String::new()
        } else {
            format!("#{fragment}")
        };

        let audios = self
            .document
            .elements_named(par, "audio")
            .filter_map(|(_, audio)| {
                self.parse_audio(audio)
                    .map_err(|gap| {
                        warn!("Dropping audio: {gap}");
                        gaps.push(gap);
                    })
                    .ok()
            })
            .collect();

        Ok(MediaSegment::new(
            self.collect_ids(par),
            audios,
            Html::new(content, selector),
        ))
    }

    /// Every `id` within the subtree of `par`, itself included.
    fn collect_ids(&self, par: NodeId) -> Vec<Anchor> {
        iter::once(par)
            .chain(self.document.descendants(par))
            .filter_map(|id| self.document.element(id)?.attribute("id"))
            .map(|id| Anchor::new(self.path, id))
            .collect()
    }

    fn parse_audio(&self, audio: &Element) -> Result<Audio, Gap> {
        Ok(Audio {
            src: uri::resolve(self.parent_dir, self.require(audio, "src")?),
            clip_begin: self.clip_value(audio, "clip-begin")?,
            clip_end: self.clip_value(audio, "clip-end")?,
        })
    }

    fn require<'e>(&self, audio: &'e Element, attribute: &'static str) -> Result<&'e str, Gap> {
        audio.attribute(attribute).ok_or_else(|| Gap::InvalidClip {
            path: self.path.to_path_buf(),
            attribute,
            value: None,
        })
    }

    fn clip_value(&self, audio: &Element, attribute: &'static str) -> Result<f64, Gap> {
        let value = self.require(audio, attribute)?;

        parse_clip_value(value).ok_or_else(|| Gap::InvalidClip {
            path: self.path.to_path_buf(),
            attribute,
            value: Some(value.to_owned()),
        })
    }
}

/// Parses a SMIL 1.0 clip offset into seconds.
///
/// Accepted forms, with an optional `npt=` prefix:
/// - Timecount: `12.3s`, `12.3`, `450ms`, `1.5min`, `2h`
/// - Clock value: `hh:mm:ss.fff`, `mm:ss.fff`
pub fn parse_clip_value(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_prefix("npt=").unwrap_or(value).trim();

    let seconds = if value.contains(':') {
        parse_clock_value(value)?
    } else {
        match value.strip_suffix("ms") {
            Some(millis) => millis.trim().parse::<f64>().ok()? / 1000.0,
            None => {
                let (number, scale) = [("min", 60.0), ("h", 3600.0), ("s", 1.0)]
                    .into_iter()
                    .find_map(|(unit, scale)| value.strip_suffix(unit).map(|number| (number, scale)))
                    .unwrap_or((value, 1.0));

                number.trim().parse::<f64>().ok()? * scale
            }
        }
    };

    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

fn parse_clock_value(value: &str) -> Option<f64> {
    let parts = value
        .split(':')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        [minutes, seconds] => Some(minutes * 60.0 + seconds),
        _ => None,
    }
}
