//! JSON-LD blocks injected by the enhancement pass

use crate::types::{Breadcrumb, ContentContext, non_empty};
use serde_json::{Map, Value as JsonValue, json};

/// Article / WebPage description of the page built from the content context.
///
/// `@type` comes from the context `type` and defaults to `Article`;
/// `fallback_name` is used when the context carries no title.
pub fn page_schema(context: &ContentContext, fallback_name: Option<&str>) -> JsonValue {
    let schema_type = non_empty(&context.content_type).unwrap_or_else(|| "Article".to_string());
    let is_web_page = schema_type.ends_with("Page");

    let mut map = Map::new();
    map.insert("@context".to_string(), "https://schema.org".into());
    map.insert("@type".to_string(), schema_type.into());

    let name = non_empty(&context.title).or_else(|| fallback_name.map(str::to_string));
    if let Some(name) = name {
        map.insert(
            if is_web_page { "name" } else { "headline" }.to_string(),
            name.into(),
        );
    }

    let description = non_empty(&context.description).or_else(|| non_empty(&context.excerpt));
    insert_opt(&mut map, "description", description);
    insert_opt(&mut map, "url", non_empty(&context.url));
    insert_opt(&mut map, "image", non_empty(&context.image));
    insert_opt(&mut map, "datePublished", non_empty(&context.date_published));
    insert_opt(&mut map, "dateModified", non_empty(&context.date_modified));
    insert_opt(&mut map, "articleSection", non_empty(&context.category));

    if let Some(author) = non_empty(&context.author) {
        map.insert(
            "author".to_string(),
            json!({"@type": "Person", "name": author}),
        );
    }
    if let Some(site) = non_empty(&context.site_name) {
        map.insert(
            "publisher".to_string(),
            json!({"@type": "Organization", "name": site}),
        );
    }

    JsonValue::Object(map)
}

/// schema.org BreadcrumbList; positions default to the 1-based list order
pub fn breadcrumb_schema(breadcrumbs: &[Breadcrumb]) -> JsonValue {
    let items: Vec<JsonValue> = breadcrumbs
        .iter()
        .enumerate()
        .map(|(index, crumb)| {
            json!({
                "@type": "ListItem",
                "position": crumb.position.unwrap_or(index as u32 + 1),
                "name": crumb.name,
                "item": crumb.url,
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}

/// Serialized JSON safe to embed inside a `<script>` element
pub fn script_body(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .replace("</", "<\\/")
}

fn insert_opt(map: &mut Map<String, JsonValue>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}
