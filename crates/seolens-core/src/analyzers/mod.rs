//! Independent SEO dimension analyzers
//!
//! Every analyzer is a pure function of an [`HtmlFacts`] snapshot plus the
//! caller's keywords and audience. Scores start at 100, penalties are
//! subtracted and the result is clamped to `0..=100`.

pub mod content;
pub mod headings;
pub mod images;
pub mod links;
pub mod meta_description;
pub mod open_graph;
pub mod performance;
pub mod title;
pub mod twitter;

use crate::facts::HtmlFacts;
use crate::types::{Dimension, DimensionResult, Impact, Recommendation, RecommendationType};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Everything an analyzer may look at
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerInput<'a> {
    pub facts: &'a HtmlFacts,
    pub keywords: &'a [String],
    pub audience: Option<&'a str>,
}

impl<'a> AnalyzerInput<'a> {
    pub fn new(facts: &'a HtmlFacts) -> Self {
        Self {
            facts,
            keywords: &[],
            audience: None,
        }
    }

    pub fn with_keywords(mut self, keywords: &'a [String]) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_audience(mut self, audience: Option<&'a str>) -> Self {
        self.audience = audience;
        self
    }

    /// Keywords lowercased and trimmed, blanks dropped
    pub(crate) fn normalized_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Run the analyzer for one dimension
pub fn run(dimension: Dimension, input: &AnalyzerInput<'_>) -> DimensionResult {
    match dimension {
        Dimension::Title => title::analyze(input),
        Dimension::MetaDescription => meta_description::analyze(input),
        Dimension::Headings => headings::analyze(input),
        Dimension::Images => images::analyze(input),
        Dimension::Links => links::analyze(input),
        Dimension::Content => content::analyze(input),
        Dimension::OpenGraph => open_graph::analyze(input),
        Dimension::TwitterCards => twitter::analyze(input),
        Dimension::Performance => performance::analyze(input),
    }
}

/// Accumulates penalties and findings for one dimension
pub(crate) struct Scorecard {
    dimension: Dimension,
    score: i32,
    issues: Vec<String>,
    recommendations: Vec<Recommendation>,
    findings: BTreeMap<String, JsonValue>,
}

impl Scorecard {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            score: 100,
            issues: Vec::new(),
            recommendations: Vec::new(),
            findings: BTreeMap::new(),
        }
    }

    /// A recommendation in this dimension's category
    pub fn recommendation(
        &self,
        kind: RecommendationType,
        impact: Impact,
        issue: impl Into<String>,
        text: impl Into<String>,
    ) -> Recommendation {
        Recommendation::new(kind, impact, self.dimension.as_str(), issue, text)
    }

    /// Subtract `points` and record the issue
    pub fn deduct(&mut self, points: i32, recommendation: Recommendation) {
        self.score -= points;
        self.flag(recommendation);
    }

    /// Drop the score to zero and record the issue
    pub fn fail(&mut self, recommendation: Recommendation) {
        self.score = 0;
        self.flag(recommendation);
    }

    /// Record an issue without touching the score
    pub fn flag(&mut self, recommendation: Recommendation) {
        self.issues.push(recommendation.issue.clone());
        self.recommendations.push(recommendation);
    }

    /// Advice only; neither the score nor the issue list changes
    pub fn suggest(&mut self, recommendation: Recommendation) {
        self.recommendations.push(recommendation);
    }

    pub fn finding(&mut self, key: &str, value: impl Into<JsonValue>) {
        self.findings.insert(key.to_string(), value.into());
    }

    pub fn finish(self) -> DimensionResult {
        DimensionResult {
            score: self.score.clamp(0, 100) as u8,
            issues: self.issues,
            recommendations: self.recommendations,
            findings: self.findings,
        }
    }
}
