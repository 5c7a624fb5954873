//! Composite scoring against whole documents

mod common;

use common::{WEAK_PAGE, good_page};
use seolens_core::{AnalysisOptions, Dimension, RecommendationType, analyze};

#[test]
fn test_weak_page_dimension_scores() {
    let report = analyze(WEAK_PAGE, &AnalysisOptions::default());

    let title = report.dimension(Dimension::Title).unwrap();
    assert_eq!(title.score, 70);
    assert!(title.issues[0].starts_with("Title too short"));

    let headings = report.dimension(Dimension::Headings).unwrap();
    assert_eq!(headings.score, 60);
    assert!(headings.issues.iter().any(|i| i == "Missing H1 heading"));

    let meta = report.dimension(Dimension::MetaDescription).unwrap();
    assert_eq!(meta.score, 0);
}

#[test]
fn test_good_page_scores_high() {
    let html = good_page();
    let report = analyze(&html, &AnalysisOptions::default());

    assert!(report.overall_score >= 85, "score was {}", report.overall_score);
    assert_eq!(report.dimension(Dimension::Title).unwrap().score, 100);
    assert_eq!(report.dimension(Dimension::MetaDescription).unwrap().score, 100);
    assert_eq!(report.dimension(Dimension::OpenGraph).unwrap().score, 100);
    assert_eq!(report.dimension(Dimension::TwitterCards).unwrap().score, 100);
    assert!(!report.has_critical_issues());
}

#[test]
fn test_weak_page_scores_below_good_page() {
    let weak = analyze(WEAK_PAGE, &AnalysisOptions::default());
    let good = analyze(&good_page(), &AnalysisOptions::default());
    assert!(weak.overall_score < good.overall_score);
    assert!(weak.has_critical_issues());
}

#[test]
fn test_scores_are_bounded() {
    let inputs = [
        String::new(),
        "plain text without markup".to_string(),
        "<<<>>>".to_string(),
        "<html><body>".repeat(200),
        format!("<body>{}</body>", "<img src=a.png>".repeat(120)),
        good_page(),
    ];
    for html in &inputs {
        let report = analyze(html, &AnalysisOptions::default());
        assert!(report.overall_score <= 100);
        assert!(report.basic_score <= 100);
        for result in report.per_dimension.values() {
            assert!(result.score <= 100);
        }
    }
}

#[test]
fn test_recommendations_are_sorted() {
    let report = analyze(WEAK_PAGE, &AnalysisOptions::default());
    let keys: Vec<_> = report
        .recommendations
        .iter()
        .map(|r| r.priority_key())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(report.recommendations[0].kind, RecommendationType::Critical);
}

#[test]
fn test_priority_actions_lead_with_critical_items() {
    let report = analyze(WEAK_PAGE, &AnalysisOptions::default());
    let critical = report.critical_count();
    assert!(critical > 0);
    assert!(report.priority_actions.len() >= critical);
    assert_eq!(
        report.priority_actions[0],
        report.recommendations[0].recommendation
    );
}

#[test]
fn test_keywords_affect_title_score() {
    let html = good_page();
    let matching = analyze(&html, &AnalysisOptions::default().with_keywords(["sourdough"]));
    let missing = analyze(&html, &AnalysisOptions::default().with_keywords(["croissant"]));

    assert_eq!(matching.dimension(Dimension::Title).unwrap().score, 100);
    assert_eq!(missing.dimension(Dimension::Title).unwrap().score, 90);
}
