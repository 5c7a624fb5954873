use super::{AnalyzerInput, Scorecard};
use crate::types::{Dimension, DimensionResult, FixKind, Impact, RecommendationType as Kind};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Static per-resource size estimates; nothing is downloaded
pub const CSS_SIZE: u64 = 20 * KIB;
pub const JS_SIZE: u64 = 50 * KIB;
pub const IMAGE_SIZE: u64 = 100 * KIB;
pub const FONT_SIZE: u64 = 30 * KIB;

pub const MAX_DEPTH: usize = 32;

/// Good / warning / critical upper bounds
#[derive(Debug, Clone, Copy)]
struct Thresholds {
    good: usize,
    warning: usize,
    critical: usize,
}

const REQUESTS: Thresholds = Thresholds {
    good: 30,
    warning: 50,
    critical: 100,
};

const DOM_ELEMENTS: Thresholds = Thresholds {
    good: 1500,
    warning: 3000,
    critical: 5000,
};

/// Penalty, type and impact for a measured value; `None` inside the good band
fn grade(value: usize, limits: Thresholds) -> Option<(i32, Kind, Impact)> {
    if value < limits.good {
        None
    } else if value < limits.warning {
        Some((10, Kind::Warning, Impact::Medium))
    } else if value < limits.critical {
        Some((20, Kind::Warning, Impact::High))
    } else {
        Some((30, Kind::Critical, Impact::High))
    }
}

pub fn estimated_size(input: &AnalyzerInput<'_>) -> u64 {
    let resources = &input.facts.resources;
    resources.css.len() as u64 * CSS_SIZE
        + resources.js.len() as u64 * JS_SIZE
        + resources.images as u64 * IMAGE_SIZE
        + resources.fonts.len() as u64 * FONT_SIZE
}

pub fn analyze(input: &AnalyzerInput<'_>) -> DimensionResult {
    let mut card = Scorecard::new(Dimension::Performance);
    let facts = input.facts;
    let resources = &facts.resources;

    let requests = resources.total_request_count;
    let elements = facts.dom_stats.total_elements;
    let size = estimated_size(input);

    card.finding("total_requests", requests);
    card.finding("dom_elements", elements);
    card.finding("max_depth", facts.dom_stats.max_depth);
    card.finding("render_blocking", resources.render_blocking);
    card.finding("estimated_size_bytes", size);
    card.finding("text_to_html_ratio", facts.dom_stats.text_to_html_ratio);

    if let Some((penalty, kind, impact)) = grade(requests, REQUESTS) {
        let rec = card.recommendation(
            kind,
            impact,
            format!("Too many HTTP requests ({requests})"),
            "Bundle stylesheets and scripts and drop unused resources",
        );
        card.deduct(penalty, rec);
    }

    if let Some((penalty, kind, impact)) = grade(elements, DOM_ELEMENTS) {
        let rec = card.recommendation(
            kind,
            impact,
            format!("Large DOM ({elements} elements)"),
            "Simplify the markup and paginate or virtualize long lists",
        );
        card.deduct(penalty, rec);
    }

    if resources.render_blocking > 0 {
        let penalty = (resources.render_blocking as i32 * 5).min(30);
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("{} render-blocking resource(s)", resources.render_blocking),
            "Defer non-critical scripts and inline critical CSS",
        );
        card.deduct(penalty, rec);
    }

    let size_penalty = match size {
        s if s < MIB => 0,
        s if s < 2 * MIB => 5,
        s if s < 3 * MIB => 10,
        _ => 15,
    };
    if size_penalty > 0 {
        let rec = card.recommendation(
            Kind::Warning,
            Impact::Medium,
            format!("Estimated page weight is {} KiB", size / KIB),
            "Compress images and trim scripts to reduce page weight",
        );
        card.deduct(size_penalty, rec);
    }

    if facts.dom_stats.max_depth > MAX_DEPTH {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            format!("Deeply nested DOM (depth {})", facts.dom_stats.max_depth),
            "Flatten wrapper elements",
        );
        card.deduct(5, rec);
    }

    technical_meta(input, &mut card);
    card.finish()
}

fn technical_meta(input: &AnalyzerInput<'_>, card: &mut Scorecard) {
    let facts = input.facts;

    if !facts.meta_tags.has_viewport {
        let rec = card
            .recommendation(
                Kind::Critical,
                Impact::High,
                "Missing viewport meta tag",
                "Add a viewport meta tag so the page renders on mobile",
            )
            .with_example(r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#)
            .with_fix(FixKind::MissingViewport);
        card.deduct(10, rec);
    }

    if !facts.meta_tags.has_charset {
        let rec = card
            .recommendation(
                Kind::Warning,
                Impact::High,
                "Missing charset declaration",
                "Declare the document encoding as the first element of <head>",
            )
            .with_example(r#"<meta charset="UTF-8">"#)
            .with_fix(FixKind::MissingCharset);
        card.deduct(10, rec);
    }

    if facts.html_lang.is_none() {
        let rec = card
            .recommendation(
                Kind::Warning,
                Impact::High,
                "Missing lang attribute on <html>",
                "Declare the content language on the html element",
            )
            .with_example(r#"<html lang="en">"#)
            .with_fix(FixKind::MissingLang);
        card.deduct(10, rec);
    }

    if !facts.meta_tags.has_canonical {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Low,
            "Missing canonical link",
            "Add <link rel=\"canonical\"> to consolidate duplicate URLs",
        );
        card.suggest(rec);
    }

    let structured = facts.structured_data.json_ld_count + facts.structured_data.microdata_count;
    if structured == 0 {
        let rec = card.recommendation(
            Kind::Suggestion,
            Impact::Medium,
            "No structured data",
            "Describe the page with schema.org JSON-LD",
        );
        card.suggest(rec);
    }
}
