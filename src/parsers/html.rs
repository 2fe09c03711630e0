use crate::results::{LinkKind, PageLink};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts absolute links from a document, classified against `page_url`.
///
/// Relative hrefs are resolved against the page. Script, mail, phone and
/// fragment-only links are skipped, fragments are stripped, and each URL is
/// reported once in document order.
pub fn extract_links(doc: &Html, page_url: &str) -> Vec<PageLink> {
    let Ok(base) = Url::parse(page_url) else {
        ::log::warn!("Cannot resolve links against invalid URL: {}", page_url);
        return Vec::new();
    };
    let base_host = base.host_str().map(normalize_host);

    let link_selector = Selector::parse("a[href]").unwrap();
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for href in doc
        .select(&link_selector)
        .filter_map(|e| e.value().attr("href"))
    {
        let Some(resolved) = resolve(&base, href) else {
            continue;
        };
        if !seen.insert(resolved.to_string()) {
            continue;
        }

        let kind = match (resolved.host_str().map(normalize_host), &base_host) {
            (Some(host), Some(base_host)) if host == *base_host => LinkKind::Internal,
            _ => LinkKind::External,
        };
        links.push(PageLink {
            href: resolved.to_string(),
            kind,
        });
    }

    ::log::debug!("HTML parser found {} links", links.len());
    if !links.is_empty() {
        ::log::debug!(
            "First few links: {:?}",
            links.iter().take(5).map(|l| &l.href).collect::<Vec<_>>()
        );
    }

    links
}

fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

fn normalize_host(host: &str) -> String {
    host.trim_start_matches("www.").to_ascii_lowercase()
}
