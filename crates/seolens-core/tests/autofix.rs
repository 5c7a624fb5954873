//! Auto-fix engine on whole documents

mod common;

use common::{WEAK_PAGE, good_page};
use seolens_core::{
    AnalysisOptions, AutoFixConfig, AutoFixEngine, ContentContext, Dimension, FixKind, FixRequest,
    analyze,
};

fn fix_with_fresh_analysis(engine: &AutoFixEngine, html: &str) -> String {
    let report = analyze(html, &AnalysisOptions::default());
    engine
        .apply(html, &FixRequest::new(&report.recommendations))
        .html
}

#[test]
fn test_weak_page_gets_one_h1_and_keeps_title() {
    let engine = AutoFixEngine::default();
    let fixed = fix_with_fresh_analysis(&engine, WEAK_PAGE);

    assert!(!WEAK_PAGE.contains("<h1"));
    assert_eq!(fixed.matches("<h1").count(), 1);
    assert!(fixed.contains("<title>Test</title>"));
}

#[test]
fn test_image_alt_and_lazy_loading() {
    let html = r#"<html><head><title>Gallery</title></head><body><img src="my_photo.jpg"></body></html>"#;
    let engine = AutoFixEngine::default();
    let fixed = fix_with_fresh_analysis(&engine, html);

    assert!(fixed.contains(r#"alt="My Photo""#));
    assert!(fixed.contains(r#"loading="lazy""#));
}

#[test]
fn test_fixes_are_idempotent() {
    let engine = AutoFixEngine::default();
    let pages = [
        WEAK_PAGE.to_string(),
        r#"<html><head></head><body><h1>A</h1><h1>B</h1><img src="/a/b/team-photo.png"></body></html>"#
            .to_string(),
        "<p>fragment only</p>".to_string(),
        good_page(),
    ];

    for page in &pages {
        let once = fix_with_fresh_analysis(&engine, page);
        let twice = fix_with_fresh_analysis(&engine, &once);
        assert_eq!(once, twice, "second pass changed {page}");
    }
}

#[test]
fn test_fixes_raise_technical_scores() {
    let before = analyze(WEAK_PAGE, &AnalysisOptions::default());
    let fixed = fix_with_fresh_analysis(&AutoFixEngine::default(), WEAK_PAGE);
    let after = analyze(&fixed, &AnalysisOptions::default());

    assert!(after.overall_score > before.overall_score);
    assert_eq!(after.dimension(Dimension::Performance).unwrap().score, 100);
    assert!(after.dimension(Dimension::Headings).unwrap().score > 60);
}

#[test]
fn test_default_lang_is_configurable() {
    let engine = AutoFixEngine::new(AutoFixConfig::default().with_default_lang("de").unwrap()).unwrap();
    let fixed = fix_with_fresh_analysis(&engine, WEAK_PAGE);
    assert!(fixed.contains(r#"<html lang="de">"#));

    let fixed = fix_with_fresh_analysis(&AutoFixEngine::default(), WEAK_PAGE);
    assert!(fixed.contains(r#"<html lang="ru">"#));
}

#[test]
fn test_context_fills_missing_elements() {
    let html = "<html><head></head><body><p>Body</p></body></html>";
    let context = ContentContext {
        title: Some("Weekend baking guide".to_string()),
        description: Some("Everything you need for a relaxed weekend bake.".to_string()),
        url: Some("https://example.com/weekend".to_string()),
        ..Default::default()
    };
    let report = analyze(html, &AnalysisOptions::default());
    let outcome = AutoFixEngine::default().apply(
        html,
        &FixRequest::new(&report.recommendations).with_context(Some(&context)),
    );

    assert!(outcome.html.contains("<title>Weekend baking guide</title>"));
    assert!(outcome.html.contains(
        r#"<meta name="description" content="Everything you need for a relaxed weekend bake.">"#
    ));
    assert!(outcome.html.contains(r#"property="og:url""#));
    assert!(outcome.html.contains("application/ld+json"));
    assert!(outcome.changed());
}

#[test]
fn test_good_page_is_left_alone() {
    let html = good_page();
    let report = analyze(&html, &AnalysisOptions::default());
    let outcome = AutoFixEngine::default().apply(&html, &FixRequest::new(&report.recommendations));

    assert!(!outcome.changed());
    assert_eq!(outcome.html, html);
}

#[test]
fn test_image_fix_output_is_deterministic() {
    let html = r#"<html><head><title>Gallery</title></head><body><img src="a.jpg" width="10" height="20" class="c" id="i" title="t" data-x="1"></body></html>"#;
    let engine = AutoFixEngine::default();

    let first = fix_with_fresh_analysis(&engine, html);
    let second = fix_with_fresh_analysis(&engine, html);

    assert_eq!(first, second);
    assert!(first.contains(
        r#"<img src="a.jpg" width="10" height="20" class="c" id="i" title="t" data-x="1" alt="A" loading="lazy">"#
    ));
}

#[test]
fn test_svg_title_does_not_count_as_page_title() {
    let html = "<html><head></head><body><h1>Page</h1><svg><title>Menu</title></svg></body></html>";
    let report = analyze(html, &AnalysisOptions::default());
    assert!(
        report
            .recommendations
            .iter()
            .any(|r| r.fix == Some(FixKind::MissingTitle))
    );

    let fixed = AutoFixEngine::default()
        .apply(html, &FixRequest::new(&report.recommendations))
        .html;
    assert!(fixed.contains("<title>Page</title>"));
    assert!(fixed.contains("<svg><title>Menu</title></svg>"));
}
