use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, FixKind, Impact, RecommendationType as Kind};

/// Body word count from which a page is expected to be split by H2 sections
pub const H2_WORD_THRESHOLD: usize = 50;
pub const MAX_H1_LENGTH: usize = 70;

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::Headings);
    let facts = input.facts;

    let distribution: Vec<usize> = (1..=6).map(|level| facts.heading_count(level)).collect();
    card.finding("distribution", distribution.clone());
    card.finding("h1_count", facts.h1_count);
    card.finding("total", facts.total_headings);

    match facts.h1_count {
        0 => {
            let rec = card
                .recommendation(
                    Kind::Critical,
                    Impact::High,
                    "Missing H1 heading",
                    "Add exactly one H1 that states the main topic of the page",
                )
                .with_example("<h1>Main topic of the page</h1>")
                .with_fix(FixKind::MissingH1);
            card.deduct(40, rec);
        }
        1 => {}
        count => {
            let rec = card
                .recommendation(
                    Kind::Warning,
                    Impact::High,
                    format!("Multiple H1 headings ({count})"),
                    "Keep a single H1 and demote the others to H2",
                )
                .with_fix(FixKind::MultipleH1);
            card.deduct(20, rec);
        }
    }

    if facts.heading_count(2) == 0 && facts.content.word_count >= H2_WORD_THRESHOLD {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Medium,
            "No H2 headings structure the content",
            "Break the content into sections introduced by H2 headings",
        );
        card.deduct(15, rec);
    }

    // H4 without H3 and so on; the H1/H2 cases are covered above
    for level in 3..=6u8 {
        let present = distribution[usize::from(level) - 1] > 0;
        let parent_missing = distribution[usize::from(level) - 2] == 0;
        if present && parent_missing {
            let rec = card.recommendation(
                Kind::Warning,
                Impact::Low,
                format!("Heading level skipped: H{level} used without H{}", level - 1),
                "Nest headings sequentially without skipping levels",
            );
            card.flag(rec);
        }
    }

    let empty = facts.all_headings().filter(|(_, text)| text.is_empty()).count();
    if empty > 0 {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            format!("{empty} empty heading(s)"),
            "Give every heading meaningful text or remove it",
        );
        card.suggest(rec);
    }

    let h1_length = facts
        .headings
        .get(&1)
        .and_then(|h| h.first())
        .map(|h1| h1.chars().count())
        .unwrap_or(0);
    if h1_length > MAX_H1_LENGTH {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            format!("H1 is long ({h1_length} characters)"),
            format!("Keep the H1 under {MAX_H1_LENGTH} characters"),
        );
        card.suggest(rec);
    }

    card.finish()
}
