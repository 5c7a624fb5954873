//! Auto-fix engine
//!
//! Applies the curated set of remedies attached to critical and high-impact
//! recommendations, then an optional enhancement pass driven by the content
//! context. Every fix re-checks the tree before mutating it, so running the
//! engine on its own output changes nothing.

mod enhance;
pub mod structured;

use crate::config::AutoFixConfig;
use crate::dom::{Document, NodeId};
use crate::error::ConfigError;
use crate::types::{ContentContext, FixKind, Recommendation, non_empty};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const MAX_DESCRIPTION_LENGTH: usize = 160;

/// Result of one engine pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixOutcome {
    pub html: String,
    /// Labels of the fixes and enhancements that changed the document
    pub applied: Vec<String>,
    /// Recommendations left for a human
    pub manual_review: Vec<Recommendation>,
    /// The input could not be parsed and was returned unchanged
    pub parse_failed: bool,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Per-call inputs besides the HTML itself
#[derive(Debug, Clone, Copy, Default)]
pub struct FixRequest<'a> {
    pub recommendations: &'a [Recommendation],
    pub context: Option<&'a ContentContext>,
    /// Used only by keyword heading optimization
    pub keywords: &'a [String],
}

impl<'a> FixRequest<'a> {
    pub fn new(recommendations: &'a [Recommendation]) -> Self {
        Self {
            recommendations,
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: Option<&'a ContentContext>) -> Self {
        self.context = context;
        self
    }

    pub fn with_keywords(mut self, keywords: &'a [String]) -> Self {
        self.keywords = keywords;
        self
    }
}

#[derive(Debug, Clone)]
pub struct AutoFixEngine {
    config: AutoFixConfig,
    #[cfg(test)]
    panic_on_apply: bool,
}

impl AutoFixEngine {
    pub fn new(config: AutoFixConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            #[cfg(test)]
            panic_on_apply: false,
        })
    }

    /// Engine whose every pass panics, for exercising the loop's recovery
    #[cfg(test)]
    pub(crate) fn panicking() -> Self {
        Self {
            panic_on_apply: true,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AutoFixConfig {
        &self.config
    }

    /// Apply fixes for `recommendations` to `html`.
    ///
    /// Never fails: unparseable input comes back unchanged with
    /// `parse_failed` set and every recommendation left for manual review.
    pub fn apply(&self, html: &str, request: &FixRequest<'_>) -> FixOutcome {
        #[cfg(test)]
        {
            if self.panic_on_apply {
                panic!("fix pass blew up");
            }
        }

        let mut document = match Document::parse(html) {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "auto-fix skipped: document could not be parsed");
                return FixOutcome {
                    html: html.to_string(),
                    applied: Vec::new(),
                    manual_review: request.recommendations.to_vec(),
                    parse_failed: true,
                };
            }
        };

        let (automatic, manual_review): (Vec<&Recommendation>, Vec<&Recommendation>) = request
            .recommendations
            .iter()
            .partition(|r| r.is_auto_applicable() && r.fix.is_some());
        let kinds: BTreeSet<FixKind> = automatic.iter().filter_map(|r| r.fix).collect();

        let mut applied = Vec::new();
        for kind in kinds {
            if self.apply_fix(&mut document, kind, request.context) {
                debug!(fix = kind.label(), "applied auto-fix");
                applied.push(kind.label().to_string());
            }
        }

        if self.config.enhancements_enabled {
            let enhancements = enhance::run(&mut document, &self.config, request);
            for label in &enhancements {
                debug!(enhancement = %label, "applied enhancement");
            }
            applied.extend(enhancements);
        }

        FixOutcome {
            html: if applied.is_empty() {
                html.to_string()
            } else {
                document.to_html()
            },
            applied,
            manual_review: manual_review.into_iter().cloned().collect(),
            parse_failed: false,
        }
    }

    fn apply_fix(
        &self,
        document: &mut Document,
        kind: FixKind,
        context: Option<&ContentContext>,
    ) -> bool {
        match kind {
            FixKind::MissingCharset => self.fix_charset(document),
            FixKind::MissingViewport => self.fix_viewport(document),
            FixKind::MissingLang => self.fix_lang(document),
            FixKind::MissingTitle => self.fix_title(document, context),
            FixKind::MissingMetaDescription => self.fix_meta_description(document, context),
            FixKind::MissingH1 => self.fix_missing_h1(document, context),
            FixKind::MultipleH1 => fix_multiple_h1(document),
            FixKind::MissingImageAlt => self.fix_image_alt(document),
        }
    }

    fn fix_charset(&self, document: &mut Document) -> bool {
        let Some(head) = document.head() else {
            return false;
        };
        if find_charset_meta(document).is_some() || has_content_type_charset(document) {
            return false;
        }
        let meta = document.create_element("meta", &[("charset", self.config.charset.as_str())]);
        document.prepend_child(head, meta);
        true
    }

    fn fix_viewport(&self, document: &mut Document) -> bool {
        let Some(head) = document.head() else {
            return false;
        };
        if find_named_meta(document, "viewport").is_some() {
            return false;
        }
        let meta = document.create_element(
            "meta",
            &[("name", "viewport"), ("content", self.config.viewport.as_str())],
        );
        match find_charset_meta(document) {
            Some(charset) => document.insert_after(charset, meta),
            None => document.prepend_child(head, meta),
        }
        true
    }

    fn fix_lang(&self, document: &mut Document) -> bool {
        let Some(html) = document.html_element() else {
            return false;
        };
        if document
            .attr(html, "lang")
            .is_some_and(|lang| !lang.trim().is_empty())
        {
            return false;
        }
        document.set_attr(html, "lang", self.config.default_lang.trim());
        true
    }

    fn fix_title(&self, document: &mut Document, context: Option<&ContentContext>) -> bool {
        let Some(head) = document.head() else {
            return false;
        };
        let existing = document
            .children(head)
            .iter()
            .copied()
            .find(|id| document.tag_name(*id) == Some("title"));
        if let Some(title) = existing {
            if !document.text_content(title).trim().is_empty() {
                return false;
            }
        }

        let text = context
            .and_then(|c| non_empty(&c.title))
            .or_else(|| first_heading_text(document, "h1"))
            .unwrap_or_else(|| self.config.fallback_title.clone());

        match existing {
            Some(title) => document.set_text(title, &text),
            None => {
                let title = document.create_element("title", &[]);
                document.set_text(title, &text);
                insert_after_head_prelude(document, head, title);
            }
        }
        true
    }

    fn fix_meta_description(
        &self,
        document: &mut Document,
        context: Option<&ContentContext>,
    ) -> bool {
        let Some(head) = document.head() else {
            return false;
        };
        let existing = find_named_meta(document, "description");
        if let Some(meta) = existing {
            if document
                .attr(meta, "content")
                .is_some_and(|c| !c.trim().is_empty())
            {
                return false;
            }
        }

        let description = context
            .and_then(|c| non_empty(&c.excerpt).or_else(|| non_empty(&c.description)))
            .unwrap_or_else(|| {
                let title = document
                    .first_by_tag("title")
                    .map(|t| document.text_content(t).trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| self.config.fallback_title.clone());
                format!("{title}: an overview of the key information, details and answers on this page.")
            });
        let description = truncate_at_word(&description, MAX_DESCRIPTION_LENGTH);

        match existing {
            Some(meta) => document.set_attr(meta, "content", &description),
            None => {
                let meta = document.create_element(
                    "meta",
                    &[("name", "description"), ("content", description.as_str())],
                );
                let title = document
                    .children(head)
                    .iter()
                    .copied()
                    .find(|id| document.tag_name(*id) == Some("title"));
                match title {
                    Some(title) => document.insert_after(title, meta),
                    None => insert_after_head_prelude(document, head, meta),
                }
            }
        }
        true
    }

    fn fix_missing_h1(&self, document: &mut Document, context: Option<&ContentContext>) -> bool {
        let Some(body) = document.body() else {
            return false;
        };
        if document.first_by_tag("h1").is_some() {
            return false;
        }

        let text = context
            .and_then(|c| non_empty(&c.title))
            .or_else(|| {
                document
                    .first_by_tag("title")
                    .map(|t| document.text_content(t).trim().to_string())
                    .filter(|t| !t.is_empty())
            })
            .unwrap_or_else(|| self.config.fallback_h1.clone());

        let h1 = document.create_element("h1", &[]);
        document.set_text(h1, &text);
        document.prepend_child(body, h1);
        true
    }

    fn fix_image_alt(&self, document: &mut Document) -> bool {
        let mut changed = false;
        for img in document.elements_by_tag("img") {
            if document.has_attr(img, "alt") {
                continue;
            }
            let alt = document
                .attr(img, "src")
                .and_then(alt_from_filename)
                .unwrap_or_else(|| self.config.fallback_image_alt.clone());
            document.set_attr(img, "alt", &alt);
            if !document.has_attr(img, "loading") {
                document.set_attr(img, "loading", "lazy");
            }
            changed = true;
        }
        changed
    }
}

impl Default for AutoFixEngine {
    fn default() -> Self {
        Self {
            config: AutoFixConfig::default(),
            #[cfg(test)]
            panic_on_apply: false,
        }
    }
}

fn fix_multiple_h1(document: &mut Document) -> bool {
    let extra: Vec<NodeId> = document.elements_by_tag("h1").into_iter().skip(1).collect();
    for h1 in &extra {
        document.rename(*h1, "h2");
    }
    !extra.is_empty()
}

/// Alt text derived from an image URL: `/img/my_photo.jpg?v=2` gives `My Photo`
pub fn alt_from_filename(src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    let path = src.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit('/').next().unwrap_or_default();
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };

    let words: Vec<String> = stem
        .split(['_', '-', ' ', '+', '.'])
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Cut `text` to at most `max` characters on a word boundary
fn truncate_at_word(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    for word in text.split_whitespace() {
        let next_len = out.chars().count() + word.chars().count() + usize::from(!out.is_empty());
        if next_len > max {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        text.chars().take(max).collect()
    } else {
        out
    }
}

fn first_heading_text(document: &Document, tag: &str) -> Option<String> {
    document
        .first_by_tag(tag)
        .map(|id| crate::parser::normalize_whitespace(&document.text_content(id)))
        .filter(|t| !t.is_empty())
}

fn find_charset_meta(document: &Document) -> Option<NodeId> {
    document
        .elements_by_tag("meta")
        .into_iter()
        .find(|id| document.has_attr(*id, "charset"))
}

fn has_content_type_charset(document: &Document) -> bool {
    document.elements_by_tag("meta").into_iter().any(|id| {
        document
            .attr(id, "http-equiv")
            .is_some_and(|h| h.eq_ignore_ascii_case("content-type"))
            && document
                .attr(id, "content")
                .is_some_and(|c| c.to_ascii_lowercase().contains("charset"))
    })
}

pub(crate) fn find_named_meta(document: &Document, name: &str) -> Option<NodeId> {
    document.elements_by_tag("meta").into_iter().find(|id| {
        document
            .attr(*id, "name")
            .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
    })
}

/// Insert after the charset/viewport metas at the top of `<head>`
fn insert_after_head_prelude(document: &mut Document, head: NodeId, node: NodeId) {
    let prelude = document
        .children(head)
        .iter()
        .copied()
        .filter(|id| {
            document.tag_name(*id) == Some("meta")
                && (document.has_attr(*id, "charset")
                    || document
                        .attr(*id, "name")
                        .is_some_and(|n| n.eq_ignore_ascii_case("viewport")))
        })
        .last();
    match prelude {
        Some(anchor) => document.insert_after(anchor, node),
        None => document.prepend_child(head, node),
    }
}
