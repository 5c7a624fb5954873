use super::open_graph::{IMAGE_FORMAT, parse_dimension};
use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, Impact, RecommendationType as Kind};

/// Card types and the fields each one requires (without the `twitter:` prefix)
fn required_fields(card_type: &str) -> Option<&'static [&'static str]> {
    match card_type {
        "summary" => Some(&["title", "description"]),
        "summary_large_image" => Some(&["title", "description", "image"]),
        "app" => Some(&[]),
        "player" => Some(&["title", "player", "player:width", "player:height"]),
        _ => None,
    }
}

fn og_equivalent(field: &str) -> Option<&'static str> {
    match field {
        "title" => Some("og:title"),
        "description" => Some("og:description"),
        "image" => Some("og:image"),
        _ => None,
    }
}

fn minimum_image_size(card_type: &str) -> Option<(u32, u32)> {
    match card_type {
        "summary" => Some((144, 144)),
        "summary_large_image" => Some((300, 157)),
        _ => None,
    }
}

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::TwitterCards);
    let tags = &input.facts.twitter_tags;
    let og = &input.facts.og_tags;
    let present = |key: &str| tags.get(key).is_some_and(|v| !v.trim().is_empty());
    let og_present = |key: &str| og.get(key).is_some_and(|v| !v.trim().is_empty());

    let card_type = match tags.get("twitter:card").map(|c| c.trim().to_lowercase()) {
        Some(card_type) if !card_type.is_empty() => card_type,
        _ => {
            let rec = card
                .recommendation(
                    Kind::Warning,
                    Impact::High,
                    "Missing twitter:card",
                    "Declare a Twitter card type (summary or summary_large_image)",
                )
                .with_example(r#"<meta name="twitter:card" content="summary_large_image">"#);
            card.deduct(20, rec);
            "summary".to_string()
        }
    };
    card.finding("card_type", card_type.as_str());
    card.finding("tag_count", tags.len());

    match required_fields(&card_type) {
        Some(fields) => {
            for field in fields {
                let key = format!("twitter:{field}");
                if present(key.as_str()) {
                    continue;
                }
                match og_equivalent(field).filter(|og_key| og_present(*og_key)) {
                    Some(og_key) => {
                        let rec = card.recommendation(
                            Kind::Suggestion,
                            Impact::Low,
                            format!("Missing {key} (falls back to {og_key})"),
                            format!("Add {key} to control the Twitter preview explicitly"),
                        );
                        card.suggest(rec);
                    }
                    None => {
                        let rec = card.recommendation(
                            Kind::Warning,
                            Impact::Medium,
                            format!("Missing {key}"),
                            format!("Add {key}; it is required for {card_type} cards"),
                        );
                        card.deduct(20, rec);
                    }
                }
            }

            let has_app_id =
                present("twitter:app:id:iphone") || present("twitter:app:id:googleplay");
            if card_type == "app" && !has_app_id {
                let rec = card.recommendation(
                    Kind::Warning,
                    Impact::Medium,
                    "Missing twitter:app:id",
                    "App cards need twitter:app:id:iphone or twitter:app:id:googleplay",
                );
                card.deduct(20, rec);
            }
        }
        None => {
            let rec = card.recommendation(
                Kind::Warning,
                Impact::Medium,
                format!("Unknown twitter:card type '{card_type}'"),
                "Use summary, summary_large_image, app or player",
            );
            card.deduct(20, rec);
        }
    }

    if let Some((min_width, min_height)) = minimum_image_size(&card_type) {
        let width = parse_dimension(tags.get("twitter:image:width"))
            .or_else(|| parse_dimension(og.get("og:image:width")));
        let height = parse_dimension(tags.get("twitter:image:height"))
            .or_else(|| parse_dimension(og.get("og:image:height")));
        let too_small = width.is_some_and(|w| w < min_width) || height.is_some_and(|h| h < min_height);
        if too_small {
            let rec = card.recommendation(
                Kind::Warning,
                Impact::Medium,
                format!("Card image is smaller than {min_width}x{min_height}"),
                format!("Use an image of at least {min_width}x{min_height} pixels for {card_type} cards"),
            );
            card.deduct(10, rec);
        }
    }

    let image = tags
        .get("twitter:image")
        .map(|i| i.trim())
        .filter(|i| !i.is_empty());
    if let Some(image) = image {
        if !IMAGE_FORMAT.is_match(image) {
            let rec = card.recommendation(
                Kind::Suggestion,
                Impact::Low,
                "twitter:image format not recognized",
                "Use a JPEG, PNG, WebP or GIF image",
            );
            card.suggest(rec);
        }
    }

    for key in ["twitter:site", "twitter:creator"] {
        if !present(key) {
            let rec = card.recommendation(
                Kind::Suggestion,
                Impact::Low,
                format!("Missing {key}"),
                format!("Add {key} with the @username to attribute the card"),
            );
            card.suggest(rec);
        }
    }

    card.finish()
}
