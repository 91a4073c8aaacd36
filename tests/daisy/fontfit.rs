use crate::daisy::util::{self, ThresholdOracle};
use rdaisy::book::Html;
use rdaisy::fontfit::{FontFit, RenderPage, find_max_font_size};
use rdaisy::settings::{Context, Settings};

fn page(text: &str) -> RenderPage {
    let html = Html {
        raw_html: Some(format!("<p>{text}</p>")),
        text_content: Some(text.to_owned()),
        tag_name: Some(String::from("p")),
        ..Html::default()
    };
    RenderPage::for_segment(&html, &[], None)
}

/// Thresholds of the first three segments of the simple book.
fn simple_threshold(page: &RenderPage) -> u32 {
    match page.text() {
        "Chapter One" => 13,
        "1" => 10,
        "Chapter Two" => 16,
        _ => 100,
    }
}

#[tokio::test]
async fn test_search_from_any_start() {
    let page = page("Some narrated text");

    for start in 1..=30 {
        let mut oracle = ThresholdOracle::new(start, |_: &RenderPage| 10);
        let size = find_max_font_size(&mut oracle, &page, 1, 512).await.unwrap();

        assert_eq!(9, size, "start {start}");
        assert!(oracle.queries > 0);
    }
}

#[tokio::test]
async fn test_never_fits() {
    let page = page("Far too much text");

    for (min, max) in [(1, 512), (6, 20), (12, 12)] {
        let mut oracle = ThresholdOracle::new(16, |_: &RenderPage| 0);
        let size = find_max_font_size(&mut oracle, &page, min, max).await.unwrap();

        assert_eq!(min, size);
    }
}

#[tokio::test]
async fn test_batch_autosize() {
    let settings = Settings::builder()
        .include_page_numbers(true)
        .preview(Some(3))
        .build();
    let (mut book, ctx) = util::open_simple(settings).await;
    let mut oracle = ThresholdOracle::new(20, simple_threshold);

    let size = FontFit::new(&mut oracle, ["body { margin: 0; }"])
        .run(&mut book, &ctx)
        .await
        .unwrap();
    assert_eq!(Some(9), size);

    let segments = book.segments().collect::<Vec<_>>();
    #[rustfmt::skip]
    let expected = [
        Some(12),
        Some(9),
        Some(15),
    ];

    for (expected, segment) in expected.into_iter().zip(&segments) {
        assert_eq!(expected, segment.html.maximum_font_size);
        assert_eq!(Some(9), segment.html.rendered_font_size);
        assert_eq!(Some((1920, 90)), segment.html.container_size);
    }
    // Beyond the preview nothing is measured
    for segment in &segments[3..] {
        assert_eq!(None, segment.html.maximum_font_size);
        assert_eq!(None, segment.html.rendered_font_size);
    }
}

#[tokio::test]
async fn test_reduce_autosized() {
    #[rustfmt::skip]
    let expected = [
        // (expected, reduce by, min size)
        (Some(7), 2, 1),
        (Some(8), 5, 8),
        (Some(1), 20, 1),
    ];

    for (expected, reduce_by, min_size) in expected {
        let settings = Settings::builder()
            .include_page_numbers(true)
            .preview(Some(3))
            .reduce_autosized_font_by(reduce_by)
            .font_bounds(min_size, 512)
            .build();
        let (mut book, ctx) = util::open_simple(settings).await;
        let mut oracle = ThresholdOracle::new(20, simple_threshold);

        let size = FontFit::new(&mut oracle, Vec::<String>::new())
            .run(&mut book, &ctx)
            .await
            .unwrap();
        assert_eq!(expected, size, "reduce by {reduce_by}, min {min_size}");
    }
}

#[tokio::test]
async fn test_fixed_size() {
    let (mut book, ctx) = util::open_simple(Settings::builder().fixed_font_size(20).build()).await;
    let mut oracle = ThresholdOracle::new(30, simple_threshold);

    let size = FontFit::new(&mut oracle, Vec::<String>::new())
        .run(&mut book, &ctx)
        .await
        .unwrap();

    assert_eq!(Some(20), size);
    assert_eq!(0, oracle.queries);
    for segment in book.selected_segments(&ctx.settings) {
        assert_eq!(None, segment.html.maximum_font_size);
        assert_eq!(Some(20), segment.html.rendered_font_size);
        assert_eq!(Some((1920, 200)), segment.html.container_size);
    }
}

#[tokio::test]
async fn test_computed_size() {
    let ctx = Context::new(Settings::builder().autosize_font(false));
    let (mut book, _) = util::open_simple(ctx.settings.clone()).await;
    let mut oracle = ThresholdOracle::new(24, simple_threshold);

    let size = FontFit::new(&mut oracle, Vec::<String>::new())
        .run(&mut book, &ctx)
        .await
        .unwrap();

    assert_eq!(None, size);
    assert_eq!(0, oracle.queries);
    assert_eq!(5, book.selected_segments(&ctx.settings).count());
    for segment in book.selected_segments(&ctx.settings) {
        assert_eq!(Some(24), segment.html.rendered_font_size);
        assert_eq!(Some((1920, 240)), segment.html.container_size);
    }
}
