use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, Impact, RecommendationType as Kind};

pub const MIN_WORDS: usize = 300;
pub const MAX_AVG_SENTENCE_WORDS: f64 = 20.0;
pub const MIN_KEYWORD_DENSITY: f64 = 0.5;
pub const MAX_KEYWORD_DENSITY: f64 = 3.0;

/// Flesch reading ease target for an audience label
pub fn reading_ease_target(audience: Option<&str>) -> f64 {
    match audience.map(|a| a.trim().to_lowercase()).as_deref() {
        Some("technical" | "expert" | "professional") => 30.0,
        Some("children" | "kids") => 80.0,
        _ => 60.0,
    }
}

/// Flesch reading ease; `None` for text without sentences
pub fn flesch_reading_ease(words: usize, sentences: usize, syllables: usize) -> Option<f64> {
    if words == 0 || sentences == 0 {
        return None;
    }
    let words = words as f64;
    Some(206.835 - 1.015 * (words / sentences as f64) - 84.6 * (syllables as f64 / words))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::Content);
    let content = &input.facts.content;

    card.finding("word_count", content.word_count);
    card.finding("sentence_count", content.sentence_count);

    if content.word_count < MIN_WORDS {
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("Thin content ({} words)", content.word_count),
            format!("Expand the page to at least {MIN_WORDS} words of useful text"),
        );
        card.deduct(20, rec);
    }

    if content.sentence_count > 0 {
        let average = content.word_count as f64 / content.sentence_count as f64;
        card.finding("avg_sentence_length", round2(average));
        if average > MAX_AVG_SENTENCE_WORDS {
            let rec = card.recommendation(
                Kind::Warning,
                Impact::Low,
                format!("Sentences are long ({average:.1} words on average)"),
                "Split long sentences; aim for fewer than 20 words each",
            );
            card.deduct(10, rec);
        }
    }

    if let Some(ease) = flesch_reading_ease(
        content.word_count,
        content.sentence_count,
        content.syllable_count,
    ) {
        let target = reading_ease_target(input.audience);
        card.finding("reading_ease", round2(ease));
        if ease < target {
            let rec = card.recommendation(
                Kind::Suggestion,
                Impact::Medium,
                format!("Reading ease {ease:.0} is below the target of {target:.0}"),
                "Prefer shorter words and sentences for this audience",
            );
            card.suggest(rec);
        }
    }

    let keywords = input.normalized_keywords();
    if !keywords.is_empty() && content.word_count > 0 {
        let text = content.text.to_lowercase();
        let mut densities = serde_json::Map::new();
        for keyword in &keywords {
            let occurrences = text.matches(keyword.as_str()).count();
            let keyword_words = keyword.split_whitespace().count().max(1);
            let density =
                (occurrences * keyword_words) as f64 / content.word_count as f64 * 100.0;
            densities.insert(keyword.clone(), round2(density).into());

            if density < MIN_KEYWORD_DENSITY {
                let rec = card.recommendation(
                    Kind::Suggestion,
                    Impact::Low,
                    format!("Keyword '{keyword}' is rare ({density:.2}%)"),
                    "Mention the keyword naturally a few more times",
                );
                card.suggest(rec);
            } else if density > MAX_KEYWORD_DENSITY {
                let rec = card.recommendation(
                    Kind::Warning,
                    Impact::Medium,
                    format!("Keyword '{keyword}' looks stuffed ({density:.2}%)"),
                    "Reduce repetitions to keep density under 3%",
                );
                card.deduct(10, rec);
            }
        }
        card.finding("keyword_density", densities);
    }

    card.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::extract_facts;

    fn analyze_html(html: &str, keywords: &[String], audience: Option<&str>) -> DimensionResult {
        let facts = extract_facts(html, None);
        analyze(
            &AnalyzerInput::new(&facts)
                .with_keywords(keywords)
                .with_audience(audience),
        )
    }

    #[test]
    fn test_thin_content() {
        let result = analyze_html("<p>Too short.</p>", &[], None);
        assert_eq!(result.score, 80);
        assert!(result.issues[0].starts_with("Thin content"));
    }

    #[test]
    fn test_long_sentences_flagged() {
        let sentence = format!("{}.", "word ".repeat(25).trim());
        let body = format!("<p>{}</p>", format!("{sentence} ").repeat(15));
        let result = analyze_html(&body, &[], None);
        // 375 words, 25 per sentence
        assert_eq!(result.score, 90);
    }

    #[test]
    fn test_keyword_stuffing() {
        let body = format!("<p>{}</p>", "Bread is good. ".repeat(100));
        let result = analyze_html(&body, &["bread".to_string()], None);
        assert_eq!(result.score, 90);
        assert!(result.issues.iter().any(|i| i.contains("stuffed")));
    }

    #[test]
    fn test_reading_ease_targets() {
        assert_eq!(reading_ease_target(None), 60.0);
        assert_eq!(reading_ease_target(Some("Technical")), 30.0);
        assert_eq!(reading_ease_target(Some("children")), 80.0);
        assert!(flesch_reading_ease(0, 0, 0).is_none());
        let easy = flesch_reading_ease(10, 2, 10).unwrap_or_default();
        assert!(easy > 90.0);
    }
}
