use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, Impact, RecommendationType as Kind};
use once_cell::sync::Lazy;
use regex::Regex;

pub const REQUIRED: [&str; 5] = ["og:title", "og:description", "og:type", "og:url", "og:image"];
pub const RECOMMENDED: [&str; 3] = ["og:site_name", "og:locale", "og:image:alt"];
pub const MIN_IMAGE_WIDTH: u32 = 1200;
pub const MIN_IMAGE_HEIGHT: u32 = 630;

pub(crate) static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^\s/]+").expect("invalid absolute url regex"));

pub(crate) static IMAGE_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(jpe?g|png|webp|gif)(?:[?#].*)?$").expect("invalid image format regex")
});

pub(crate) fn parse_dimension(value: Option<&String>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::OpenGraph);
    let tags = &input.facts.og_tags;
    let present = |key: &str| tags.get(key).is_some_and(|v| !v.trim().is_empty());

    card.finding("tag_count", tags.len());

    for key in REQUIRED {
        if present(key) {
            continue;
        }
        let impact = if matches!(key, "og:title" | "og:image") {
            Impact::High
        } else {
            Impact::Medium
        };
        let rec = card
            .recommendation(
                Kind::Warning,
                impact,
                format!("Missing {key}"),
                format!("Add a {key} meta tag for rich social previews"),
            )
            .with_example(format!(r#"<meta property="{key}" content="...">"#));
        card.deduct(20, rec);
    }

    for key in RECOMMENDED {
        if !present(key) {
            let rec = card.recommendation(
                Kind::Suggestion,
                Impact::Low,
                format!("Missing {key}"),
                format!("Consider adding {key}"),
            );
            card.suggest(rec);
        }
    }

    if let Some(image) = tags.get("og:image").map(|i| i.trim()).filter(|i| !i.is_empty()) {
        if !ABSOLUTE_URL.is_match(image) {
            let rec = card.recommendation(
                Kind::Warning,
                Impact::Medium,
                "og:image is not an absolute URL",
                "Use an absolute https:// URL for og:image",
            );
            card.deduct(10, rec);
        }
        if !IMAGE_FORMAT.is_match(image) {
            let rec = card.recommendation(
                Kind::Suggestion,
                Impact::Low,
                "og:image format not recognized",
                "Use a JPEG, PNG, WebP or GIF image",
            );
            card.suggest(rec);
        }
    }

    let width = parse_dimension(tags.get("og:image:width"));
    let height = parse_dimension(tags.get("og:image:height"));
    if width.is_some() || height.is_some() {
        let too_small = width.is_some_and(|w| w < MIN_IMAGE_WIDTH)
            || height.is_some_and(|h| h < MIN_IMAGE_HEIGHT);
        if too_small {
            let rec = card.recommendation(
                Kind::Warning,
                Impact::Medium,
                format!(
                    "og:image is smaller than {MIN_IMAGE_WIDTH}x{MIN_IMAGE_HEIGHT} ({}x{})",
                    width.unwrap_or(0),
                    height.unwrap_or(0)
                ),
                format!("Provide an image of at least {MIN_IMAGE_WIDTH}x{MIN_IMAGE_HEIGHT} pixels"),
            );
            card.deduct(10, rec);
        }
    }

    card.finish()
}
