//! HTML fact extraction
//!
//! Turns raw HTML into an immutable [`HtmlFacts`] snapshot that every
//! dimension analyzer reads from. Extraction never fails: anything the parser
//! cannot find is reported as absent or empty.

use crate::parser::{self, element_text, normalize_whitespace};
use crate::url_utils::{LinkTarget, classify_href};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Presence and text of a single-valued element such as `<title>`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextFact {
    pub exists: bool,
    pub text: String,
    /// Length in characters
    pub length: usize,
}

impl TextFact {
    fn from_text(raw: &str) -> Self {
        let text = normalize_whitespace(raw);
        Self {
            exists: true,
            length: text.chars().count(),
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageFact {
    pub src: String,
    pub alt: Option<String>,
    pub has_alt: bool,
    pub has_title: bool,
    pub has_lazy_loading: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFact {
    pub href: String,
    /// Visible text, falling back to aria-label, title and nested image alt
    pub anchor_text: String,
    pub rel: Option<String>,
    pub is_internal: bool,
    pub is_external: bool,
    pub is_anchor: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaTagFacts {
    pub has_viewport: bool,
    pub has_charset: bool,
    pub has_robots: bool,
    pub has_canonical: bool,
    pub og_tag_count: usize,
    pub twitter_tag_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredDataFacts {
    pub json_ld_count: usize,
    pub microdata_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomStats {
    pub total_elements: usize,
    pub max_depth: usize,
    /// Visible text length as a percentage of the HTML length
    pub text_to_html_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceFacts {
    pub css: Vec<String>,
    pub js: Vec<String>,
    pub fonts: Vec<String>,
    pub images: usize,
    pub total_request_count: usize,
    /// Head stylesheets and synchronous head scripts
    pub render_blocking: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentFacts {
    pub text: String,
    pub word_count: usize,
    pub sentence_count: usize,
    pub syllable_count: usize,
}

/// Read-only snapshot of everything the analyzers need from a document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HtmlFacts {
    pub title: TextFact,
    pub meta_description: TextFact,
    /// Heading texts by level (1..=6), in document order
    pub headings: BTreeMap<u8, Vec<String>>,
    pub h1_count: usize,
    pub total_headings: usize,
    pub images: Vec<ImageFact>,
    pub links: Vec<LinkFact>,
    pub meta_tags: MetaTagFacts,
    pub og_tags: BTreeMap<String, String>,
    pub twitter_tags: BTreeMap<String, String>,
    pub html_lang: Option<String>,
    pub structured_data: StructuredDataFacts,
    pub dom_stats: DomStats,
    pub resources: ResourceFacts,
    pub content: ContentFacts,
    pub html_length: usize,
}

impl HtmlFacts {
    pub fn heading_count(&self, level: u8) -> usize {
        self.headings.get(&level).map(Vec::len).unwrap_or(0)
    }

    pub fn all_headings(&self) -> impl Iterator<Item = (u8, &str)> {
        self.headings
            .iter()
            .flat_map(|(level, texts)| texts.iter().map(move |t| (*level, t.as_str())))
    }
}

/// Parse `html` and collect a fresh fact snapshot
pub fn extract_facts(html: &str, base_url: Option<&Url>) -> HtmlFacts {
    let document = Html::parse_document(html);

    let headings = extract_headings(&document);
    let h1_count = headings.get(&1).map(Vec::len).unwrap_or(0);
    let total_headings = headings.values().map(Vec::len).sum();

    let images = extract_images(&document);
    let (meta_tags, og_tags, twitter_tags, meta_description) = extract_meta(&document);
    let resources = extract_resources(&document, images.len());
    let content = extract_content(html);
    let html_length = html.chars().count();

    let dom_stats = DomStats {
        total_elements: select_all(&document, "*").len(),
        max_depth: max_depth(&document),
        text_to_html_ratio: if html_length == 0 {
            0.0
        } else {
            let ratio = content.text.chars().count() as f64 / html_length as f64 * 100.0;
            (ratio * 100.0).round() / 100.0
        },
    };

    HtmlFacts {
        title: extract_title(&document),
        meta_description,
        h1_count,
        total_headings,
        headings,
        links: extract_links(&document, base_url),
        images,
        meta_tags,
        og_tags,
        twitter_tags,
        html_lang: document
            .root_element()
            .value()
            .attr("lang")
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        structured_data: StructuredDataFacts {
            json_ld_count: parser::extract_json_ld_blocks(&document).len(),
            microdata_count: parser::count_elements(&document, "[itemscope]"),
        },
        dom_stats,
        resources,
        content,
        html_length,
    }
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// The document title: the first HTML `<title>`, never an SVG or MathML one
fn extract_title(document: &Html) -> TextFact {
    select_all(document, "head title")
        .into_iter()
        .chain(select_all(document, "title"))
        .find(|el| &*el.value().name.ns == HTML_NAMESPACE)
        .map(|el| TextFact::from_text(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn extract_headings(document: &Html) -> BTreeMap<u8, Vec<String>> {
    (1u8..=6)
        .filter_map(|level| {
            let texts: Vec<String> = select_all(document, &format!("h{level}"))
                .iter()
                .map(element_text)
                .collect();
            (!texts.is_empty()).then_some((level, texts))
        })
        .collect()
}

fn extract_images(document: &Html) -> Vec<ImageFact> {
    select_all(document, "img")
        .into_iter()
        .map(|img| {
            let value = img.value();
            let alt = value.attr("alt").map(str::to_string);
            ImageFact {
                src: value
                    .attr("src")
                    .or_else(|| value.attr("data-src"))
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                has_alt: alt.is_some(),
                alt,
                has_title: value.attr("title").is_some(),
                has_lazy_loading: value
                    .attr("loading")
                    .is_some_and(|l| l.trim().eq_ignore_ascii_case("lazy")),
                width: value.attr("width").and_then(|w| w.trim().parse().ok()),
                height: value.attr("height").and_then(|h| h.trim().parse().ok()),
            }
        })
        .collect()
}

fn extract_links(document: &Html, base_url: Option<&Url>) -> Vec<LinkFact> {
    select_all(document, "a[href]")
        .into_iter()
        .map(|link| {
            let value = link.value();
            let href = value.attr("href").unwrap_or_default().trim().to_string();
            let anchor_text = anchor_text(&link);
            let target = classify_href(&href, base_url);
            LinkFact {
                anchor_text,
                rel: value.attr("rel").map(|r| r.trim().to_ascii_lowercase()),
                is_internal: target == LinkTarget::Internal,
                is_external: target == LinkTarget::External,
                is_anchor: target == LinkTarget::Anchor,
                href,
            }
        })
        .collect()
}

fn anchor_text(link: &ElementRef<'_>) -> String {
    let text = element_text(link);
    if !text.is_empty() {
        return text;
    }
    let value = link.value();
    let labelled = value
        .attr("aria-label")
        .or_else(|| value.attr("title"))
        .map(normalize_whitespace)
        .filter(|t| !t.is_empty());
    if let Some(label) = labelled {
        return label;
    }

    static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("invalid img selector"));
    link.select(&IMG)
        .filter_map(|img| img.value().attr("alt"))
        .map(normalize_whitespace)
        .find(|alt| !alt.is_empty())
        .unwrap_or_default()
}

type MetaExtraction = (
    MetaTagFacts,
    BTreeMap<String, String>,
    BTreeMap<String, String>,
    TextFact,
);

fn extract_meta(document: &Html) -> MetaExtraction {
    let mut facts = MetaTagFacts::default();
    let mut og = BTreeMap::new();
    let mut twitter = BTreeMap::new();
    let mut description = TextFact::default();

    for meta in select_all(document, "meta") {
        let value = meta.value();
        if value.attr("charset").is_some() {
            facts.has_charset = true;
        }
        let http_equiv = value.attr("http-equiv").unwrap_or_default();
        if http_equiv.eq_ignore_ascii_case("content-type")
            && value
                .attr("content")
                .is_some_and(|c| c.to_ascii_lowercase().contains("charset"))
        {
            facts.has_charset = true;
        }

        let key = value
            .attr("property")
            .or_else(|| value.attr("name"))
            .map(|k| k.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let content = value.attr("content").map(str::trim).unwrap_or_default();

        match key.as_str() {
            "viewport" => facts.has_viewport = true,
            "robots" => facts.has_robots = true,
            "description" if !description.exists => description = TextFact::from_text(content),
            k if k.starts_with("og:") => {
                og.entry(key.clone()).or_insert_with(|| content.to_string());
            }
            k if k.starts_with("twitter:") => {
                twitter.entry(key.clone()).or_insert_with(|| content.to_string());
            }
            _ => {}
        }
    }

    facts.og_tag_count = og.len();
    facts.twitter_tag_count = twitter.len();
    facts.has_canonical = select_all(document, "link[rel]")
        .iter()
        .any(|link| rel_contains(link, "canonical"));

    (facts, og, twitter, description)
}

fn rel_contains(element: &ElementRef<'_>, token: &str) -> bool {
    element
        .value()
        .attr("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case(token)))
}

fn is_font_url(href: &str) -> bool {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    [".woff2", ".woff", ".ttf", ".otf", ".eot"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

fn extract_resources(document: &Html, image_count: usize) -> ResourceFacts {
    static FONT_FACE_URL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"(?i)url\(\s*['"]?([^'")]+\.(?:woff2?|ttf|otf|eot)[^'")]*)['"]?\s*\)"#)
            .expect("invalid font url regex")
    });

    let mut resources = ResourceFacts {
        images: image_count,
        ..Default::default()
    };

    for link in select_all(document, "link[href]") {
        let href = link.value().attr("href").unwrap_or_default().trim().to_string();
        let is_font_preload = rel_contains(&link, "preload")
            && link
                .value()
                .attr("as")
                .is_some_and(|a| a.eq_ignore_ascii_case("font"));
        if is_font_preload || is_font_url(&href) {
            resources.fonts.push(href);
        } else if rel_contains(&link, "stylesheet") {
            resources.css.push(href);
        }
    }

    for style in select_all(document, "style") {
        let css = style.text().collect::<String>();
        for capture in FONT_FACE_URL.captures_iter(&css) {
            let url = capture[1].trim().to_string();
            if !resources.fonts.contains(&url) {
                resources.fonts.push(url);
            }
        }
    }

    resources.js = select_all(document, "script[src]")
        .iter()
        .filter_map(|s| s.value().attr("src"))
        .map(|s| s.trim().to_string())
        .collect();

    let blocking_css = select_all(document, "head link[rel]")
        .iter()
        .filter(|link| rel_contains(link, "stylesheet"))
        .filter(|link| {
            link.value().attr("media").is_none_or(|media| {
                let media = media.trim().to_ascii_lowercase();
                media.is_empty() || media == "all" || media == "screen"
            })
        })
        .count();
    let blocking_js = select_all(document, "head script[src]")
        .iter()
        .filter(|script| {
            let value = script.value();
            value.attr("async").is_none()
                && value.attr("defer").is_none()
                && !value
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("module"))
        })
        .count();

    resources.render_blocking = blocking_css + blocking_js;
    resources.total_request_count =
        resources.css.len() + resources.js.len() + resources.images + resources.fonts.len();
    resources
}

fn max_depth(document: &Html) -> usize {
    document
        .root_element()
        .descendants()
        .filter(|node| node.value().is_element())
        .map(|node| {
            node.ancestors()
                .filter(|ancestor| ancestor.value().is_element())
                .count()
                + 1
        })
        .max()
        .unwrap_or(0)
}

fn extract_content(html: &str) -> ContentFacts {
    static SENTENCE_BREAK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[.!?…]+").expect("invalid sentence regex"));

    let text = parser::visible_text(html);
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();

    let sentence_count = if words.is_empty() {
        0
    } else {
        SENTENCE_BREAK
            .split(&text)
            .filter(|s| s.split_whitespace().any(|w| w.chars().any(char::is_alphanumeric)))
            .count()
            .max(1)
    };

    ContentFacts {
        word_count: words.len(),
        sentence_count,
        syllable_count: words.iter().map(|w| count_syllables(w)).sum(),
        text,
    }
}

/// Vowel-group syllable estimate; covers Latin and Cyrillic scripts
pub fn count_syllables(word: &str) -> usize {
    const VOWELS: &str = "aeiouyаеёиоуыэюя";
    let mut count = 0;
    let mut previous_vowel = false;
    for ch in word.chars().flat_map(char::to_lowercase) {
        let vowel = VOWELS.contains(ch);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }
    let lower = word.to_lowercase();
    if count > 1 && lower.ends_with('e') && !lower.ends_with("le") {
        count -= 1;
    }
    count.max(1)
}
