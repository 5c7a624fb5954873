//! Composite scoring
//!
//! Runs the dimension analyzers in parallel, merges their output in fixed
//! dimension order and folds the per-dimension scores into one weighted
//! overall score.

use crate::analyzers::{self, AnalyzerInput};
use crate::facts::{HtmlFacts, extract_facts};
use crate::types::{
    AnalysisOptions, AnalysisReport, Dimension, DimensionResult, Impact, Recommendation,
    RecommendationType,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

pub const WEIGHT_BASIC: f64 = 0.40;
pub const WEIGHT_OPEN_GRAPH: f64 = 0.20;
pub const WEIGHT_TWITTER: f64 = 0.15;
pub const WEIGHT_PERFORMANCE: f64 = 0.25;

/// How many high-impact items follow the critical ones in priority actions
pub const EXTRA_PRIORITY_ACTIONS: usize = 3;

/// Points the basic score loses when a dimension reports any issue.
/// Links are reported but do not count here.
const BASIC_PENALTIES: [(Dimension, i32); 5] = [
    (Dimension::Title, 15),
    (Dimension::MetaDescription, 15),
    (Dimension::Headings, 15),
    (Dimension::Content, 10),
    (Dimension::Images, 10),
];

/// Nested penalty score over the on-page dimensions
pub fn basic_score(per_dimension: &BTreeMap<Dimension, DimensionResult>) -> u8 {
    let penalty: i32 = BASIC_PENALTIES
        .iter()
        .filter(|(dimension, _)| per_dimension.get(dimension).is_some_and(|r| r.has_issues()))
        .map(|(_, points)| points)
        .sum();
    (100 - penalty).clamp(0, 100) as u8
}

/// Weighted overall score; a missing dimension counts as zero
pub fn composite_score(per_dimension: &BTreeMap<Dimension, DimensionResult>) -> u8 {
    let score_of = |dimension: Dimension| {
        per_dimension
            .get(&dimension)
            .map(|r| f64::from(r.score))
            .unwrap_or(0.0)
    };

    let weighted = WEIGHT_BASIC * f64::from(basic_score(per_dimension))
        + WEIGHT_OPEN_GRAPH * score_of(Dimension::OpenGraph)
        + WEIGHT_TWITTER * score_of(Dimension::TwitterCards)
        + WEIGHT_PERFORMANCE * score_of(Dimension::Performance);

    weighted.round().clamp(0.0, 100.0) as u8
}

/// Stable sort by type rank, then impact rank
pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by_key(Recommendation::priority_key);
}

/// Every critical item, then up to three more high-impact ones
pub fn priority_actions(sorted: &[Recommendation]) -> Vec<String> {
    let critical = sorted
        .iter()
        .filter(|r| r.kind == RecommendationType::Critical);
    let high_impact = sorted
        .iter()
        .filter(|r| r.kind != RecommendationType::Critical && r.impact == Impact::High)
        .take(EXTRA_PRIORITY_ACTIONS);

    critical
        .chain(high_impact)
        .map(|r| r.recommendation.clone())
        .collect()
}

/// Score an already extracted fact snapshot
pub fn analyze_facts(facts: &HtmlFacts, options: &AnalysisOptions) -> AnalysisReport {
    let input = AnalyzerInput::new(facts)
        .with_keywords(&options.keywords)
        .with_audience(options.audience.as_deref());

    let per_dimension: BTreeMap<Dimension, DimensionResult> = Dimension::ALL
        .par_iter()
        .map(|dimension| (*dimension, analyzers::run(*dimension, &input)))
        .collect();

    let issues: Vec<String> = per_dimension
        .values()
        .flat_map(|r| r.issues.iter().cloned())
        .collect();
    let mut recommendations: Vec<Recommendation> = per_dimension
        .values()
        .flat_map(|r| r.recommendations.iter().cloned())
        .collect();
    sort_recommendations(&mut recommendations);

    let report = AnalysisReport {
        overall_score: composite_score(&per_dimension),
        basic_score: basic_score(&per_dimension),
        priority_actions: priority_actions(&recommendations),
        per_dimension,
        issues,
        recommendations,
    };

    debug!(
        overall = report.overall_score,
        basic = report.basic_score,
        issues = report.issues.len(),
        "analysis complete"
    );
    report
}

/// Extract facts from `html` and score them
pub fn analyze(html: &str, options: &AnalysisOptions) -> AnalysisReport {
    let facts = extract_facts(html, options.base_url.as_ref());
    analyze_facts(&facts, options)
}
