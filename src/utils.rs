use std::time::Duration;
use url::form_urlencoded;

/// Results page URL for `query` on the search engine at `engine`
pub fn search_url(engine: &str, query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://{}/search?q={}", engine.trim_end_matches('/'), encoded)
}

/// Render timeout for a URL: the configured base plus a little for long URLs
pub fn calculate_timeout(base: Duration, url: &str) -> Duration {
    // Longer URLs tend to be deep links into heavier pages
    let additional_ms = (url.len() / 20) as u64 * 100;
    base + Duration::from_millis(additional_ms)
}
