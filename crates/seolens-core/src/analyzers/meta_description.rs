use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, FixKind, Impact, RecommendationType as Kind};

pub const MIN_LENGTH: usize = 120;
pub const MAX_LENGTH: usize = 160;

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::MetaDescription);
    let description = &input.facts.meta_description;

    card.finding("exists", description.exists);
    card.finding("length", description.length);

    if !description.exists || description.text.is_empty() {
        let rec = card
            .recommendation(
                Kind::Critical,
                Impact::High,
                "Missing meta description",
                format!("Add a meta description of {MIN_LENGTH}-{MAX_LENGTH} characters summarizing the page"),
            )
            .with_example(r#"<meta name="description" content="A concise summary of the page.">"#)
            .with_fix(FixKind::MissingMetaDescription);
        card.fail(rec);
        return card.finish();
    }

    if description.length < MIN_LENGTH {
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("Meta description too short ({} characters)", description.length),
            format!("Expand the description to {MIN_LENGTH}-{MAX_LENGTH} characters"),
        );
        card.deduct(30, rec);
    } else if description.length > MAX_LENGTH {
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("Meta description too long ({} characters)", description.length),
            format!("Trim the description to at most {MAX_LENGTH} characters"),
        );
        card.deduct(20, rec);
    }

    let keywords = input.normalized_keywords();
    if !keywords.is_empty() {
        let lower = description.text.to_lowercase();
        if !keywords.iter().any(|k| lower.contains(k.as_str())) {
            let rec = card.recommendation(
                Kind::Suggestion,
                Impact::Low,
                "Meta description does not mention any target keyword",
                format!("Work '{}' naturally into the description", keywords[0]),
            );
            card.deduct(10, rec);
        }
    }

    card.finish()
}
