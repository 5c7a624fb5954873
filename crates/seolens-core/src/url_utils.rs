use url::Url;

/// Where a link points, relative to the page it sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// Same-page fragment (`#section`)
    Anchor,
    Internal,
    External,
    /// `mailto:`, `tel:`, `javascript:` and other non-navigational schemes
    Other,
}

/// Classify an `href` against an optional page URL.
///
/// Without a base URL every absolute http(s) link counts as external.
pub fn classify_href(href: &str, base: Option<&Url>) -> LinkTarget {
    let href = href.trim();
    if href.starts_with('#') {
        return LinkTarget::Anchor;
    }

    let lower = href.to_ascii_lowercase();
    let absolute = if lower.starts_with("//") {
        Url::parse(&format!("https:{href}")).ok()
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
        Url::parse(href).ok()
    } else {
        None
    };

    match absolute {
        Some(target) => match base {
            Some(base) if same_host(&target, base) => LinkTarget::Internal,
            _ => LinkTarget::External,
        },
        None if has_scheme(&lower) => LinkTarget::Other,
        None => LinkTarget::Internal,
    }
}

fn same_host(a: &Url, b: &Url) -> bool {
    let strip = |host: &str| host.trim_start_matches("www.").to_ascii_lowercase();
    match (a.host_str(), b.host_str()) {
        (Some(x), Some(y)) => strip(x) == strip(y),
        _ => false,
    }
}

fn has_scheme(lower: &str) -> bool {
    match lower.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && !scheme.contains('/')
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
