//! Content improvement capability consumed by the optimization loop
//!
//! The loop only sees the [`ContentImprover`] trait. Implementations are
//! picked from [`ImproverConfig`] by [`build_improver`].

#[cfg(feature = "llm")]
mod chat;

#[cfg(feature = "llm")]
pub use chat::ChatCompletionImprover;

use crate::config::{ImproverConfig, ProviderKind};
use crate::error::{ConfigError, ImproverError};
use crate::types::ContentContext;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as FmtWrite;
use std::sync::Arc;

/// Rewrites HTML to address a list of SEO issues
#[async_trait]
pub trait ContentImprover: Send + Sync {
    /// Short name used in logs and events
    fn name(&self) -> &str;

    /// `false` when calling would never produce a candidate
    fn is_enabled(&self) -> bool {
        true
    }

    /// Return a complete candidate document; the caller validates it
    async fn enhance_for_seo(
        &self,
        html: &str,
        issues: &[String],
        context: &ContentContext,
    ) -> Result<String, ImproverError>;
}

/// Improver used when no provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImprover;

#[async_trait]
impl ContentImprover for DisabledImprover {
    fn name(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn enhance_for_seo(
        &self,
        _html: &str,
        _issues: &[String],
        _context: &ContentContext,
    ) -> Result<String, ImproverError> {
        Err(ImproverError::Disabled)
    }
}

/// Select the improver implementation for `config`
pub fn build_improver(config: &ImproverConfig) -> Result<Arc<dyn ContentImprover>, ConfigError> {
    config.validate()?;
    match config.provider {
        ProviderKind::Disabled => Ok(Arc::new(DisabledImprover)),
        #[cfg(feature = "llm")]
        _ => Ok(Arc::new(ChatCompletionImprover::new(config)?)),
        #[cfg(not(feature = "llm"))]
        other => Err(ConfigError::Invalid {
            field: "provider",
            reason: format!("{other:?} requires seolens-core to be built with the `llm` feature"),
        }),
    }
}

pub(crate) const SYSTEM_PROMPT: &str = "You are an SEO specialist. You receive an HTML document \
and a list of SEO issues. Return the complete improved HTML document and nothing else: no \
explanations and no markdown. Preserve the meaning of the content, keep existing structured \
data and scripts, and fix as many of the listed issues as possible.";

/// User message listing the issues and the known page metadata
pub fn build_prompt(html: &str, issues: &[String], context: &ContentContext) -> String {
    let mut prompt = String::from("Fix the following SEO issues:\n");
    for issue in issues {
        let _ = writeln!(prompt, "- {issue}");
    }

    let fields = context.to_map();
    if !fields.is_empty() {
        prompt.push_str("\nPage metadata:\n");
        for (key, value) in fields {
            let _ = writeln!(prompt, "- {key}: {value}");
        }
    }

    prompt.push_str("\nHTML:\n");
    prompt.push_str(html);
    prompt
}

/// Drop a surrounding markdown code fence (```html ... ```), if any
pub fn strip_code_fences(candidate: &str) -> String {
    static FENCED: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?\s*```\s*$")
            .expect("invalid code fence regex")
    });

    match FENCED.captures(candidate) {
        Some(captures) => captures[1].trim().to_string(),
        None => candidate.trim().to_string(),
    }
}
