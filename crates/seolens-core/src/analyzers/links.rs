use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, Impact, RecommendationType as Kind};

const GENERIC_ANCHORS: &[&str] = &[
    "click here",
    "read more",
    "here",
    "more",
    "подробнее",
    "здесь",
];

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::Links);
    let links = &input.facts.links;

    let internal = links.iter().filter(|l| l.is_internal).count();
    let external: Vec<_> = links.iter().filter(|l| l.is_external).collect();
    let empty_anchors = links.iter().filter(|l| l.anchor_text.is_empty()).count();
    let unqualified_external = external
        .iter()
        .filter(|l| {
            !l.rel.as_deref().is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|r| matches!(r, "nofollow" | "noopener" | "noreferrer"))
            })
        })
        .count();
    let generic = links
        .iter()
        .filter(|l| GENERIC_ANCHORS.contains(&l.anchor_text.to_lowercase().as_str()))
        .count();

    card.finding("total", links.len());
    card.finding("internal", internal);
    card.finding("external", external.len());
    card.finding("empty_anchors", empty_anchors);

    if empty_anchors > 0 {
        let penalty = (empty_anchors as i32 * 5).min(30);
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("{empty_anchors} link(s) without anchor text"),
            "Give every link descriptive text or an aria-label",
        );
        card.deduct(penalty, rec);
    }

    if unqualified_external > 0 {
        let rec = card
            .recommendation(
                Kind::Suggestion,
                Impact::Low,
                format!("{unqualified_external} external link(s) without rel attributes"),
                "Add rel=\"noopener\" (or nofollow for untrusted targets) to external links",
            )
            .with_example(r#"<a href="https://example.org" rel="noopener">Example</a>"#);
        card.suggest(rec);
    }

    if !links.is_empty() && internal == 0 {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            "No internal links",
            "Link to related pages on the same site",
        );
        card.suggest(rec);
    }

    if generic > 0 {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            format!("{generic} link(s) use generic anchor text"),
            "Replace generic phrases like \"click here\" with descriptive anchor text",
        );
        card.suggest(rec);
    }

    card.finish()
}
