//! Common types used across seolens

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use url::Url;

/// Severity class of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    /// Blocks search visibility; eligible for auto-fix
    Critical,

    /// Hurts ranking; auto-fixed only when the impact is high
    Warning,

    /// Nice to have; manual review only
    Suggestion,
}

impl RecommendationType {
    /// Sort rank used when ordering recommendations (lower first)
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Warning => 1,
            Self::Suggestion => 2,
        }
    }
}

/// Expected ranking impact of acting on a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// Machine-readable remedy attached to recommendations the auto-fix engine understands.
///
/// Declaration order is the order fixes are applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    MissingCharset,
    MissingViewport,
    MissingLang,
    MissingTitle,
    MissingMetaDescription,
    MissingH1,
    MultipleH1,
    MissingImageAlt,
}

impl FixKind {
    /// Label recorded in fix reports and cycle history
    pub fn label(self) -> &'static str {
        match self {
            Self::MissingCharset => "added charset meta tag",
            Self::MissingViewport => "added viewport meta tag",
            Self::MissingLang => "added html lang attribute",
            Self::MissingTitle => "added title tag",
            Self::MissingMetaDescription => "added meta description",
            Self::MissingH1 => "added h1 heading",
            Self::MultipleH1 => "demoted extra h1 headings",
            Self::MissingImageAlt => "added image alt text",
        }
    }
}

/// A single actionable finding produced by an analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,

    pub category: String,

    /// What is wrong
    pub issue: String,

    /// What to do about it
    pub recommendation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,

    pub impact: Impact,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixKind>,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationType,
        impact: Impact,
        category: impl Into<String>,
        issue: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            issue: issue.into(),
            recommendation: recommendation.into(),
            example: None,
            impact,
            fix: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_fix(mut self, fix: FixKind) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Critical items and high-impact warnings are applied automatically;
    /// everything else is left for manual review.
    pub fn is_auto_applicable(&self) -> bool {
        match self.kind {
            RecommendationType::Critical => true,
            RecommendationType::Warning => self.impact == Impact::High,
            RecommendationType::Suggestion => false,
        }
    }

    /// Composite sort key: type rank first, then impact rank
    pub fn priority_key(&self) -> (u8, u8) {
        (self.kind.rank(), self.impact.rank())
    }
}

/// The SEO dimensions scored independently by the analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Title,
    MetaDescription,
    Headings,
    Images,
    Links,
    Content,
    OpenGraph,
    TwitterCards,
    Performance,
}

impl Dimension {
    pub const ALL: [Dimension; 9] = [
        Dimension::Title,
        Dimension::MetaDescription,
        Dimension::Headings,
        Dimension::Images,
        Dimension::Links,
        Dimension::Content,
        Dimension::OpenGraph,
        Dimension::TwitterCards,
        Dimension::Performance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::MetaDescription => "meta_description",
            Self::Headings => "headings",
            Self::Images => "images",
            Self::Links => "links",
            Self::Content => "content",
            Self::OpenGraph => "open_graph",
            Self::TwitterCards => "twitter_cards",
            Self::Performance => "performance",
        }
    }
}

/// Output of one dimension analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    /// Always within 0..=100
    pub score: u8,
    pub issues: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// Raw measurements backing the score
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub findings: BTreeMap<String, JsonValue>,
}

impl DimensionResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Aggregate analysis of one HTML document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub overall_score: u8,
    pub basic_score: u8,
    pub per_dimension: BTreeMap<Dimension, DimensionResult>,
    pub issues: Vec<String>,
    /// Sorted by type rank, then impact rank
    pub recommendations: Vec<Recommendation>,
    pub priority_actions: Vec<String>,
}

impl AnalysisReport {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionResult> {
        self.per_dimension.get(&dimension)
    }

    pub fn critical_count(&self) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.kind == RecommendationType::Critical)
            .count()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.critical_count() > 0
    }

    /// The stable public shape handed to report consumers
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            overall_score: self.overall_score,
            issues: self.issues.clone(),
            recommendations: self
                .recommendations
                .iter()
                .map(|r| RecommendationSummary {
                    kind: r.kind,
                    category: r.category.clone(),
                    issue: r.issue.clone(),
                    recommendation: r.recommendation.clone(),
                    impact: r.impact,
                })
                .collect(),
            priority_actions: self.priority_actions.clone(),
        }
    }
}

/// Composite score as seen by downstream API and report consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub overall_score: u8,
    pub issues: Vec<String>,
    pub recommendations: Vec<RecommendationSummary>,
    pub priority_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub category: String,
    pub issue: String,
    pub recommendation: String,
    pub impact: Impact,
}

/// Inputs that tune analysis beyond the HTML itself
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub keywords: Vec<String>,
    pub audience: Option<String>,
    /// Used to tell internal links from external ones
    pub base_url: Option<Url>,
}

impl AnalysisOptions {
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.trim().is_empty())
            .collect();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }
}

/// Caller-supplied page metadata used to fill in missing SEO elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentContext {
    pub title: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub site_name: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl ContentContext {
    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty() && self.breadcrumbs.is_empty()
    }

    /// Non-empty scalar fields keyed by their wire names
    pub fn to_map(&self) -> BTreeMap<&'static str, &str> {
        let fields: [(&'static str, &Option<String>); 11] = [
            ("title", &self.title),
            ("description", &self.description),
            ("excerpt", &self.excerpt),
            ("type", &self.content_type),
            ("author", &self.author),
            ("category", &self.category),
            ("url", &self.url),
            ("image", &self.image),
            ("siteName", &self.site_name),
            ("datePublished", &self.date_published),
            ("dateModified", &self.date_modified),
        ];

        fields
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (key, v))
            })
            .collect()
    }
}

/// A trimmed, non-empty copy of an optional context field
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One breadcrumb trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub position: Option<u32>,
}
