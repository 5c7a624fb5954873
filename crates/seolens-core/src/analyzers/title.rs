use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, FixKind, Impact, RecommendationType as Kind};

pub const MIN_LENGTH: usize = 30;
pub const MAX_LENGTH: usize = 60;

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::Title);
    let title = &input.facts.title;

    card.finding("exists", title.exists);
    card.finding("length", title.length);

    if !title.exists || title.text.is_empty() {
        let issue = if title.exists {
            "Title tag is empty"
        } else {
            "Missing title tag"
        };
        let rec = card
            .recommendation(
                Kind::Critical,
                Impact::High,
                issue,
                "Add a unique, descriptive <title> of 30-60 characters",
            )
            .with_example("<title>Primary Keyword - Secondary Keyword | Brand</title>")
            .with_fix(FixKind::MissingTitle);
        card.fail(rec);
        return card.finish();
    }

    if title.length < MIN_LENGTH {
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("Title too short ({} characters)", title.length),
            format!("Expand the title to {MIN_LENGTH}-{MAX_LENGTH} characters with relevant keywords"),
        );
        card.deduct(30, rec);
    } else if title.length > MAX_LENGTH {
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("Title too long ({} characters)", title.length),
            format!("Shorten the title to at most {MAX_LENGTH} characters so it is not truncated"),
        );
        card.deduct(20, rec);
    }

    let keywords = input.normalized_keywords();
    if !keywords.is_empty() {
        let lower = title.text.to_lowercase();
        let found: Vec<&String> = keywords.iter().filter(|k| lower.contains(k.as_str())).collect();
        card.finding("keywords_found", found.len());
        if found.is_empty() {
            let rec = card.recommendation(
                Kind::Suggestion,
                Impact::Medium,
                "Title does not contain any target keyword",
                format!("Include '{}' near the start of the title", keywords[0]),
            );
            card.deduct(10, rec);
        }
    }

    card.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::extract_facts;

    fn score(html: &str, keywords: &[String]) -> DimensionResult {
        let facts = extract_facts(html, None);
        analyze(&AnalyzerInput::new(&facts).with_keywords(keywords))
    }

    #[test]
    fn test_missing_title_scores_zero() {
        let result = score("<html><head></head><body></body></html>", &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.recommendations[0].fix, Some(FixKind::MissingTitle));
        assert_eq!(result.recommendations[0].kind, Kind::Critical);
    }

    #[test]
    fn test_blank_title_scores_zero() {
        let result = score("<html><head><title>   </title></head></html>", &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.issues, vec!["Title tag is empty"]);
    }

    #[test]
    fn test_short_title_loses_thirty() {
        let result = score("<html><head><title>Test</title></head></html>", &[]);
        assert_eq!(result.score, 70);
        assert_eq!(result.recommendations[0].fix, None);
    }

    #[test]
    fn test_long_title_loses_twenty() {
        let long = "x".repeat(61);
        let result = score(&format!("<title>{long}</title>"), &[]);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_missing_keyword() {
        let title = "A complete guide to home bread baking";
        let html = format!("<title>{title}</title>");
        assert_eq!(score(&html, &["Bread".to_string()]).score, 100);
        assert_eq!(score(&html, &["sourdough".to_string()]).score, 90);
    }
}
