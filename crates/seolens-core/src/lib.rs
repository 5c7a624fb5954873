//! # seolens-core
//!
//! Core library for scoring and improving the search-engine quality of
//! generated HTML pages.
//!
//! This library provides:
//! - Fact extraction from raw HTML (title, headings, images, links, meta, social tags)
//! - Nine dimension analyzers and a weighted composite score
//! - A deterministic, idempotent auto-fix engine for critical issues
//! - An optimization loop that alternates auto-fixes with an optional AI rewrite
//!
//! ## Features
//!
//! - `default`: analysis, auto-fix and the optimization loop with the AI step disabled
//! - `llm`: OpenAI-compatible chat-completion content improver (reqwest)
//!
//! ## Example
//!
//! ```no_run
//! use seolens_core::{AnalysisOptions, AutoFixEngine, FixRequest, analyze};
//!
//! let html = "<html><head><title>Test</title></head><body><h2>x</h2></body></html>";
//! let report = analyze(html, &AnalysisOptions::default());
//! println!("score: {}", report.overall_score);
//!
//! let engine = AutoFixEngine::default();
//! let fixed = engine.apply(html, &FixRequest::new(&report.recommendations));
//! assert!(fixed.html.contains("<h1>"));
//! ```

pub mod analyzers;
pub mod autofix;
pub mod config;
pub mod dom;
pub mod error;
pub mod facts;
pub mod improver;
pub mod optimizer;
pub mod parser;
pub mod scoring;
pub mod types;
pub mod url_utils;

// Re-export commonly used types
pub use autofix::{AutoFixEngine, FixOutcome, FixRequest};
pub use config::{AutoFixConfig, ImproverConfig, OptimizerConfig, ProviderKind, SeolensConfig};
pub use error::{ConfigError, DomError, ImproverError, OptimizerError, SessionError, SinkError};
pub use facts::{HtmlFacts, extract_facts};
pub use improver::{ContentImprover, DisabledImprover, build_improver};
pub use optimizer::{
    CycleRecord, OptimizationEvent, OptimizationLoop, OptimizationOutcome, OptimizationReport,
    OptimizationRequest, OptimizerStats, ProgressSink, SessionRegistry, SessionStatus, Termination,
};
pub use scoring::{analyze, analyze_facts};
pub use types::{
    AnalysisOptions, AnalysisReport, Breadcrumb, ContentContext, Dimension, DimensionResult,
    FixKind, Impact, Recommendation, RecommendationType, ScoreSummary,
};

#[cfg(feature = "llm")]
pub use improver::ChatCompletionImprover;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_creation() {
        let rec = Recommendation::new(
            RecommendationType::Critical,
            Impact::High,
            "headings",
            "Missing H1 heading",
            "Add exactly one H1",
        )
        .with_fix(FixKind::MissingH1);

        assert_eq!(rec.category, "headings");
        assert!(rec.is_auto_applicable());
        assert_eq!(rec.fix, Some(FixKind::MissingH1));
    }

    #[test]
    fn test_summary_shape() {
        let report = analyze(
            "<html><head><title>Test</title></head><body><h2>x</h2></body></html>",
            &AnalysisOptions::default(),
        );
        let value = serde_json::to_value(report.summary()).unwrap();

        assert!(value["overallScore"].is_u64());
        assert!(value["issues"].is_array());
        assert!(value["priorityActions"].is_array());
        let first = &value["recommendations"][0];
        for key in ["type", "category", "issue", "recommendation", "impact"] {
            assert!(first.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_readme_example() {
        let html = "<html><head><title>Test</title></head><body><h2>x</h2></body></html>";
        let report = analyze(html, &AnalysisOptions::default());
        let fixed = AutoFixEngine::default().apply(html, &FixRequest::new(&report.recommendations));

        assert!(fixed.html.contains("<h1>"));
        assert!(fixed.html.contains("<title>Test</title>"));
    }
}
