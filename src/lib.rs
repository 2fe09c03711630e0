// Re-export modules
pub mod config;
pub mod distill;
pub mod filter;
pub mod parsers;
pub mod render;
pub mod results;
pub mod search;
pub mod tool;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{DistillationConfig, SearchConfig, ThresholdMode};
pub use render::{RenderError, Renderer, WebDriverRenderer};
pub use results::{LinkKind, PageLink, RenderedPage};
pub use search::SearchOutcome;

use std::path::PathBuf;

/// Search the web for `query` and return readable content of the top results.
///
/// Opens a fresh browser session for this call and closes it before
/// returning. Never fails: problems reaching the search page come back as a
/// diagnostic string.
pub async fn web_search(query: &str, config: &SearchConfig) -> String {
    WebSearch::new(config.clone()).run(query).await
}

/// Builder for web search invocations
pub struct WebSearch {
    config: SearchConfig,
}

impl WebSearch {
    /// Create a new builder from a configuration
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a file
    pub fn from_config_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(SearchConfig::from_file(path)?))
    }

    /// Load configuration from a string
    pub fn from_config_str(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(SearchConfig::from_json(config_str)?))
    }

    /// Set the WebDriver URL
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    /// Replace the WebDriver URLs tried after `webdriver_url` fails
    pub fn with_webdriver_fallbacks(mut self, urls: Vec<String>) -> Self {
        self.config.webdriver_fallbacks = urls;
        self
    }

    /// Set the persistent browser profile directory
    pub fn with_profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.profile_dir = Some(dir.into());
        self
    }

    /// Set the search engine host
    pub fn with_search_engine(mut self, engine: impl Into<String>) -> Self {
        self.config.search_engine = engine.into();
        self
    }

    /// Set the per-render timeout
    pub fn with_fetch_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.fetch_timeout_secs = timeout_seconds;
        self
    }

    /// Apply environment overrides
    pub fn with_env(mut self) -> Self {
        self.config.apply_env();
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run a query and return the structured outcome
    pub async fn outcome(&self, query: &str) -> SearchOutcome {
        match WebDriverRenderer::connect(&self.config).await {
            Ok(session) => search::run_in_session(session, query, &self.config).await,
            Err(e) => {
                ::log::error!("Failed to start rendering session: {}", e);
                SearchOutcome::SearchFailed(e.to_string())
            }
        }
    }

    /// Run a query and return the report string
    pub async fn run(&self, query: &str) -> String {
        self.outcome(query).await.into_report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let search = WebSearch::new(SearchConfig::default())
            .with_webdriver_url("http://localhost:9515")
            .with_profile_dir("/tmp/profile")
            .with_search_engine("search.example")
            .with_fetch_timeout(5);

        let config = search.config();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.profile_dir, Some(PathBuf::from("/tmp/profile")));
        assert_eq!(config.search_engine, "search.example");
        assert_eq!(config.fetch_timeout_secs, 5);
    }

    #[test]
    fn test_builder_from_config_str() {
        let search =
            WebSearch::from_config_str(r#"{"links": {"max_links": 3}, "headless": false}"#).unwrap();
        assert_eq!(search.config().links.max_links, 3);
        assert!(!search.config().headless);

        assert!(WebSearch::from_config_str("not json").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_webdriver_reports_search_failure() {
        // Port 9 (discard) refuses connections; no fallbacks so nothing else is tried
        let search = WebSearch::new(SearchConfig::default())
            .with_webdriver_url("http://127.0.0.1:9")
            .with_webdriver_fallbacks(Vec::new())
            .with_fetch_timeout(5);

        let outcome = search.outcome("what is the capital of France?").await;
        assert!(matches!(outcome, SearchOutcome::SearchFailed(_)));

        let report = web_search("what is the capital of France?", search.config()).await;
        assert!(report.starts_with("Failed to retrieve Google search results: "));
    }
}
