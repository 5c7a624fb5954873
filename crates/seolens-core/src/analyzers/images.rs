use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, FixKind, Impact, RecommendationType as Kind};

pub const MAX_ALT_LENGTH: usize = 125;

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::Images);
    let images = &input.facts.images;

    let missing_alt = images.iter().filter(|img| !img.has_alt).count();
    let not_lazy = images.iter().filter(|img| !img.has_lazy_loading).count();
    let long_alt = images
        .iter()
        .filter_map(|img| img.alt.as_deref())
        .filter(|alt| alt.chars().count() > MAX_ALT_LENGTH)
        .count();

    card.finding("total", images.len());
    card.finding("missing_alt", missing_alt);
    card.finding("without_lazy_loading", not_lazy);

    if missing_alt > 0 {
        let penalty = (missing_alt as i32 * 10).min(50);
        let rec = card
            .recommendation(
                Kind::Warning,
                Impact::High,
                format!("{missing_alt} image(s) missing alt text"),
                "Describe every image with an alt attribute",
            )
            .with_example(r#"<img src="team-photo.jpg" alt="Team photo">"#)
            .with_fix(FixKind::MissingImageAlt);
        card.deduct(penalty, rec);
    }

    if not_lazy > 3 {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            format!("{not_lazy} images load eagerly"),
            "Add loading=\"lazy\" to images below the fold",
        );
        card.suggest(rec);
    }

    if long_alt > 0 {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            format!("{long_alt} alt text(s) longer than {MAX_ALT_LENGTH} characters"),
            "Keep alt text short and descriptive",
        );
        card.suggest(rec);
    }

    card.finish()
}
