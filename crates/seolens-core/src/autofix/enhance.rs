//! Enhancement pass: structured data, social tags, link hygiene, keyword
//! headings and breadcrumbs. Runs after the critical fixes and is not gated
//! by recommendation severity.

use super::structured::{breadcrumb_schema, page_schema, script_body};
use super::{FixRequest, first_heading_text};
use crate::config::AutoFixConfig;
use crate::dom::{Document, NodeId};
use crate::types::{ContentContext, non_empty};
use crate::url_utils::{LinkTarget, classify_href};
use url::Url;

pub(super) fn run(
    document: &mut Document,
    config: &AutoFixConfig,
    request: &FixRequest<'_>,
) -> Vec<String> {
    let mut applied = Vec::new();
    let context = request.context.filter(|c| !c.is_empty());

    if let Some(context) = context {
        if add_page_json_ld(document, context) {
            applied.push("added JSON-LD structured data".to_string());
        }
        let added = add_open_graph(document, context);
        if added > 0 {
            applied.push(format!("added {added} Open Graph tag(s)"));
        }
    }

    let base = context
        .and_then(|c| non_empty(&c.url))
        .and_then(|u| Url::parse(&u).ok());
    let secured = add_noopener(document, base.as_ref());
    if secured > 0 {
        applied.push(format!("added rel=\"noopener\" to {secured} external link(s)"));
    }

    if config.optimize_heading_keywords {
        let rewritten = prefix_heading_keywords(document, request.keywords);
        if rewritten > 0 {
            applied.push(format!("added keywords to {rewritten} heading(s)"));
        }
    }

    if let Some(context) = context {
        if add_breadcrumbs(document, context) {
            applied.push("added breadcrumb navigation".to_string());
        }
    }

    applied
}

fn json_ld_scripts(document: &Document) -> Vec<NodeId> {
    document
        .elements_by_tag("script")
        .into_iter()
        .filter(|id| {
            document
                .attr(*id, "type")
                .is_some_and(|t| t.to_ascii_lowercase().contains("ld+json"))
        })
        .collect()
}

fn append_json_ld(document: &mut Document, body: &str) -> bool {
    let Some(head) = document.head() else {
        return false;
    };
    let script = document.create_element("script", &[("type", "application/ld+json")]);
    document.set_text(script, body);
    document.append_child(head, script);
    true
}

/// Article/WebPage block, unless the page already carries its own JSON-LD
fn add_page_json_ld(document: &mut Document, context: &ContentContext) -> bool {
    let has_primary = json_ld_scripts(document)
        .into_iter()
        .any(|id| !document.text_content(id).contains("BreadcrumbList"));
    if has_primary {
        return false;
    }

    let title = document
        .first_by_tag("title")
        .map(|t| document.text_content(t).trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| first_heading_text(document, "h1"));
    let schema = page_schema(context, title.as_deref());
    append_json_ld(document, &script_body(&schema))
}

fn open_graph_values(context: &ContentContext) -> Vec<(&'static str, String)> {
    let og_type = match non_empty(&context.content_type).as_deref() {
        Some("Article" | "BlogPosting" | "NewsArticle" | "TechArticle") => "article",
        Some(_) | None if non_empty(&context.date_published).is_some() => "article",
        _ => "website",
    };

    [
        ("og:title", non_empty(&context.title)),
        (
            "og:description",
            non_empty(&context.description).or_else(|| non_empty(&context.excerpt)),
        ),
        ("og:type", Some(og_type.to_string())),
        ("og:url", non_empty(&context.url)),
        ("og:image", non_empty(&context.image)),
        ("og:site_name", non_empty(&context.site_name)),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v)))
    .collect()
}

/// Returns how many tags were added; present tags are never touched
fn add_open_graph(document: &mut Document, context: &ContentContext) -> usize {
    let Some(head) = document.head() else {
        return 0;
    };
    let existing: Vec<String> = document
        .elements_by_tag("meta")
        .into_iter()
        .filter_map(|id| {
            document
                .attr(id, "property")
                .or_else(|| document.attr(id, "name"))
                .map(|p| p.trim().to_ascii_lowercase())
        })
        .collect();

    let mut added = 0;
    for (property, content) in open_graph_values(context) {
        if existing.iter().any(|e| e == property) {
            continue;
        }
        let meta = document.create_element(
            "meta",
            &[("property", property), ("content", content.as_str())],
        );
        document.append_child(head, meta);
        added += 1;
    }
    added
}

fn add_noopener(document: &mut Document, base: Option<&Url>) -> usize {
    let targets: Vec<NodeId> = document
        .elements_by_tag("a")
        .into_iter()
        .filter(|id| !document.has_attr(*id, "rel"))
        .filter(|id| {
            document
                .attr(*id, "href")
                .is_some_and(|href| classify_href(href, base) == LinkTarget::External)
        })
        .collect();
    for link in &targets {
        document.set_attr(*link, "rel", "noopener");
    }
    targets.len()
}

/// Prefix H2-H6 headings that mention no keyword with the keyword at the
/// same position (cycling through the list). Inline markup inside the
/// heading is kept.
fn prefix_heading_keywords(document: &mut Document, keywords: &[String]) -> usize {
    let keywords: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return 0;
    }
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let headings: Vec<NodeId> = document
        .descendants(document.root())
        .into_iter()
        .filter(|id| matches!(document.tag_name(*id), Some("h2" | "h3" | "h4" | "h5" | "h6")))
        .collect();

    let mut rewritten = 0;
    for (index, heading) in headings.into_iter().enumerate() {
        let text = crate::parser::normalize_whitespace(&document.text_content(heading));
        let lower = text.to_lowercase();
        if text.is_empty() || lowered.iter().any(|k| lower.contains(k.as_str())) {
            continue;
        }
        let keyword = capitalize(keywords[index % keywords.len()]);
        let prefix = document.create_text(&format!("{keyword}: "));
        document.prepend_child(heading, prefix);
        rewritten += 1;
    }
    rewritten
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn add_breadcrumbs(document: &mut Document, context: &ContentContext) -> bool {
    if context.breadcrumbs.is_empty() {
        return false;
    }
    let Some(body) = document.body() else {
        return false;
    };
    let exists = document.elements_by_tag("nav").into_iter().any(|id| {
        document
            .attr(id, "aria-label")
            .is_some_and(|l| l.eq_ignore_ascii_case("breadcrumb"))
    });
    if exists {
        return false;
    }

    let nav = document.create_element("nav", &[("aria-label", "breadcrumb")]);
    let list = document.create_element("ol", &[]);
    document.append_child(nav, list);
    for crumb in &context.breadcrumbs {
        let item = document.create_element("li", &[]);
        let link = document.create_element("a", &[("href", crumb.url.as_str())]);
        document.set_text(link, &crumb.name);
        document.append_child(item, link);
        document.append_child(list, item);
    }
    document.prepend_child(body, nav);

    let has_list_ld = json_ld_scripts(document)
        .into_iter()
        .any(|id| document.text_content(id).contains("BreadcrumbList"));
    if !has_list_ld {
        append_json_ld(document, &script_body(&breadcrumb_schema(&context.breadcrumbs)));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autofix::AutoFixEngine;
    use crate::types::Breadcrumb;

    fn context() -> ContentContext {
        ContentContext {
            title: Some("Bread guide".to_string()),
            description: Some("All about bread".to_string()),
            url: Some("https://example.com/bread".to_string()),
            breadcrumbs: vec![
                Breadcrumb {
                    name: "Home".to_string(),
                    url: "/".to_string(),
                    position: None,
                },
                Breadcrumb {
                    name: "Bread".to_string(),
                    url: "/bread".to_string(),
                    position: None,
                },
            ],
            ..Default::default()
        }
    }

    const PAGE: &str = r#"<html lang="en"><head><title>Bread</title></head><body>
        <h1>Bread</h1><h2>Flour types</h2><h2>Bread crust</h2>
        <a href="https://other.org/">Partner</a>
        <a href="https://example.com/about">About</a>
        <a href="https://cdn.org/" rel="nofollow">Cdn</a>
        </body></html>"#;

    fn enhance(html: &str, config: AutoFixConfig, keywords: &[String]) -> String {
        let context = context();
        let engine = AutoFixEngine::new(config).unwrap();
        engine
            .apply(
                html,
                &FixRequest::new(&[])
                    .with_context(Some(&context))
                    .with_keywords(keywords),
            )
            .html
    }

    #[test]
    fn test_structured_data_and_open_graph() {
        let html = enhance(PAGE, AutoFixConfig::default(), &[]);
        assert!(html.contains(r#"<script type="application/ld+json">"#));
        assert!(html.contains(r#""headline": "Bread guide""#));
        assert!(html.contains(r#"<meta property="og:title" content="Bread guide">"#));
        assert!(html.contains(r#"<meta property="og:type" content="website">"#));
        assert!(!html.contains("og:image"));
    }

    #[test]
    fn test_noopener_only_on_external_links_without_rel() {
        let html = enhance(PAGE, AutoFixConfig::default(), &[]);
        assert!(html.contains(r#"<a href="https://other.org/" rel="noopener">"#));
        // same host as the context url
        assert!(html.contains(r#"<a href="https://example.com/about">"#));
        assert!(html.contains(r#"rel="nofollow""#));
    }

    #[test]
    fn test_breadcrumbs() {
        let html = enhance(PAGE, AutoFixConfig::default(), &[]);
        assert!(html.contains(r#"<nav aria-label="breadcrumb"><ol><li><a href="/">Home</a></li>"#));
        assert!(html.contains("BreadcrumbList"));
        assert_eq!(html.matches("application/ld+json").count(), 2);
    }

    #[test]
    fn test_heading_keywords_are_opt_in() {
        let keywords = vec!["sourdough".to_string()];
        let html = enhance(PAGE, AutoFixConfig::default(), &keywords);
        assert!(html.contains("<h2>Flour types</h2>"));

        let config = AutoFixConfig {
            optimize_heading_keywords: true,
            ..Default::default()
        };
        let html = enhance(PAGE, config, &keywords);
        assert!(html.contains("<h2>Sourdough: Flour types</h2>"));
    }

    #[test]
    fn test_heading_keyword_keeps_inline_markup() {
        let config = AutoFixConfig {
            optimize_heading_keywords: true,
            ..Default::default()
        };
        let page = r#"<html><head><title>T</title></head><body><h1>T</h1><h2>About <em>us</em> and <a href="/team">the team</a></h2></body></html>"#;
        let html = enhance(page, config, &["bakery".to_string()]);
        assert!(html.contains(
            r#"<h2>Bakery: About <em>us</em> and <a href="/team">the team</a></h2>"#
        ));
    }

    #[test]
    fn test_enhancements_are_idempotent() {
        let keywords = vec!["bread".to_string(), "flour".to_string()];
        let config = AutoFixConfig {
            optimize_heading_keywords: true,
            ..Default::default()
        };
        let once = enhance(PAGE, config.clone(), &keywords);
        let twice = enhance(&once, config, &keywords);
        assert_eq!(once, twice);
    }
}
