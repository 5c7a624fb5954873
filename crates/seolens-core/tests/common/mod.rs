//! Shared HTML fixtures

#![allow(dead_code)]

/// Short title, no meta description, no H1, no viewport/charset/lang
pub const WEAK_PAGE: &str =
    "<html><head><title>Test</title></head><body><h2>x</h2></body></html>";

const SENTENCE: &str = "Good bread needs time, flour, water and salt.";

fn paragraph(sentences: usize) -> String {
    vec![SENTENCE; sentences].join(" ")
}

/// A page that satisfies every analyzer: 50-char title, 142-char
/// description, one H1, H2 sections, 320 words, alt text, full social tags
pub fn good_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Sourdough Bread at Home: Starter, Flour and Baking</title>
<meta name="description" content="Learn how to bake sourdough bread at home: feed a lively starter, pick the right flour, shape the loaf and bake it with a crisp, golden crust.">
<link rel="canonical" href="https://example.com/sourdough">
<meta property="og:title" content="Sourdough Bread at Home">
<meta property="og:description" content="Starter, flour, shaping and baking in one guide.">
<meta property="og:type" content="article">
<meta property="og:url" content="https://example.com/sourdough">
<meta property="og:image" content="https://example.com/img/loaf.jpg">
<meta property="og:image:alt" content="A fresh sourdough loaf">
<meta property="og:site_name" content="Example Kitchen">
<meta property="og:locale" content="en_US">
<meta name="twitter:card" content="summary_large_image">
<meta name="twitter:title" content="Sourdough Bread at Home">
<meta name="twitter:description" content="Starter, flour, shaping and baking in one guide.">
<meta name="twitter:image" content="https://example.com/img/loaf.jpg">
<meta name="twitter:site" content="@examplekitchen">
<meta name="twitter:creator" content="@baker">
<script type="application/ld+json">{{"@context": "https://schema.org", "@type": "Article", "headline": "Sourdough Bread at Home"}}</script>
</head>
<body>
<h1>Sourdough bread at home</h1>
<h2>The starter</h2>
<p>{first}</p>
<img src="/img/starter.jpg" alt="Bubbly starter in a jar" loading="lazy">
<h2>Baking the loaf</h2>
<p>{second}</p>
<a href="/flour">Choosing flour</a>
</body>
</html>"#,
        first = paragraph(20),
        second = paragraph(20),
    )
}
