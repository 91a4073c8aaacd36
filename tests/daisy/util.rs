use rdaisy::fontfit::{FitOutcome, RenderPage, RenderingOracle};
use rdaisy::errors::OracleResult;
use rdaisy::settings::{Context, Settings};
use rdaisy::Book;
use std::path::Path;

/// Two chapters over one timing document of six `par` groupings (2 + 4),
/// with the second grouping marked as a page number.
pub const SIMPLE_BOOK: &str = "tests/books/simple/ncc.html";

pub async fn open_simple(settings: Settings) -> (Book, Context) {
    let ctx = Context::new(settings);
    let book = Book::open_with(SIMPLE_BOOK, &ctx).await.unwrap();
    (book, ctx)
}

/// Writes `files` (relative path, content) below `dir`.
pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (file, content) in files {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

pub fn ncc(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><meta name="dc:title" content="Fixture" /></head>
<body>{body}</body>
</html>"#
    )
}

pub fn smil(pars: &[(&str, &str)]) -> String {
    let pars = pars
        .iter()
        .map(|(id, text)| {
            format!(
                r#"<par id="{id}"><text src="{text}"/><audio src="a.mp3" clip-begin="npt=0s" clip-end="npt=1s"/></par>"#
            )
        })
        .collect::<String>();
    format!("<smil><body><seq>{pars}</seq></body></smil>")
}

/// An oracle backed by a threshold per page:
/// sizes at or above the threshold overflow, sizes below leave slack.
pub struct ThresholdOracle<F> {
    pub start: u32,
    pub threshold: F,
    pub queries: usize,
}

impl<F: Fn(&RenderPage) -> u32 + Send> ThresholdOracle<F> {
    pub fn new(start: u32, threshold: F) -> Self {
        Self {
            start,
            threshold,
            queries: 0,
        }
    }
}

#[async_trait::async_trait]
impl<F: Fn(&RenderPage) -> u32 + Send> RenderingOracle for ThresholdOracle<F> {
    async fn measure(&mut self, page: &RenderPage, font_size: Option<u32>) -> OracleResult<FitOutcome> {
        self.queries += 1;
        let size = font_size.unwrap_or(self.start);

        Ok(if size >= (self.threshold)(page) {
            FitOutcome::TooBig
        } else {
            FitOutcome::TooSmall
        })
    }

    async fn computed_font_size(&mut self, _: &RenderPage) -> OracleResult<u32> {
        Ok(self.start)
    }

    async fn container_size(&mut self, _: &RenderPage, font_size: Option<u32>) -> OracleResult<(u32, u32)> {
        Ok((1920, font_size.unwrap_or(self.start) * 10))
    }
}
