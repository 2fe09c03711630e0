//! Query orchestration: search page, candidate links, distilled report.

use crate::config::SearchConfig;
use crate::distill::distill;
use crate::filter::LinkFilter;
use crate::render::Renderer;
use crate::utils::search_url;
use std::fmt;

/// Prefix of the diagnostic returned when the results page cannot be rendered
pub const SEARCH_FAILED_PREFIX: &str = "Failed to retrieve Google search results";

/// Diagnostic returned when no candidate link survives filtering
pub const NO_CANDIDATES_MESSAGE: &str = "No relevant links found in the search results.";

/// Error text used when a failed render carries no message
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// What a single query invocation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Distilled text of every candidate that yielded some, in candidate order
    Content(Vec<String>),
    /// Candidates were found but none of them yielded text
    NoContent,
    /// The results page offered no usable links
    NoCandidates,
    /// The results page itself could not be rendered
    SearchFailed(String),
}

impl SearchOutcome {
    /// Whether the report reads as a diagnostic rather than page content
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::NoCandidates | Self::SearchFailed(_))
    }

    /// The report string handed back to the caller
    pub fn into_report(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(segments) => {
                for segment in segments {
                    write!(f, "{segment}\n\n")?;
                }
                Ok(())
            }
            Self::NoContent => Ok(()),
            Self::NoCandidates => f.write_str(NO_CANDIDATES_MESSAGE),
            Self::SearchFailed(message) => write!(f, "{SEARCH_FAILED_PREFIX}: {message}"),
        }
    }
}

/// Run one query through `renderer`.
///
/// Candidate links are rendered one after another. A candidate that fails or
/// yields no text is skipped without affecting the others.
pub async fn run<R: Renderer + ?Sized>(
    renderer: &mut R,
    query: &str,
    config: &SearchConfig,
) -> SearchOutcome {
    let url = search_url(&config.search_engine, query);
    ::log::debug!("Searching: {}", url);

    let results_page = renderer.render(&url, &config.distillation).await;
    if !results_page.success || results_page.links.is_none() {
        let message = results_page
            .error_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        ::log::warn!("Search page failed for {:?}: {}", query, message);
        return SearchOutcome::SearchFailed(message);
    }

    let candidates = LinkFilter::new(config.links.clone()).extract(&results_page);
    if candidates.is_empty() {
        ::log::info!("No candidate links for {:?}", query);
        return SearchOutcome::NoCandidates;
    }
    ::log::debug!("Extracted {} candidate links", candidates.len());

    let mut segments = Vec::with_capacity(candidates.len());
    for (index, link) in candidates.iter().enumerate() {
        ::log::info!("Fetching content from: {}", link);
        let page = renderer.render(link, &config.distillation).await;

        match distill(&page) {
            Some(text) => segments.push(text.to_string()),
            None => ::log::warn!(
                "Candidate {} ({}) contributed nothing: {}",
                index + 1,
                link,
                page.error_message.as_deref().unwrap_or("no text after pruning")
            ),
        }
    }

    ::log::info!(
        "Distilled {} of {} candidates for {:?}",
        segments.len(),
        candidates.len(),
        query
    );

    if segments.is_empty() {
        SearchOutcome::NoContent
    } else {
        SearchOutcome::Content(segments)
    }
}

/// Run one query and release the session afterwards, whatever the outcome
pub async fn run_in_session<R: Renderer>(
    mut session: R,
    query: &str,
    config: &SearchConfig,
) -> SearchOutcome {
    let outcome = run(&mut session, query, config).await;
    if let Err(e) = session.close().await {
        ::log::warn!("Failed to close rendering session: {}", e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistillationConfig;
    use crate::render::RenderError;
    use crate::results::{PageLink, RenderedPage};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const SEARCH_URL: &str = "https://www.google.com/search?q=rust+ownership";

    /// Deterministic renderer serving canned pages
    #[derive(Default)]
    struct StubRenderer {
        pages: HashMap<String, RenderedPage>,
        rendered: Arc<Mutex<Vec<String>>>,
        closed: Arc<Mutex<usize>>,
    }

    impl StubRenderer {
        fn with_results(links: &[&str]) -> Self {
            let links = links.iter().map(|l| PageLink::external(*l)).collect();
            Self::default().page(RenderedPage::rendered(SEARCH_URL, links, String::new()))
        }

        fn page(mut self, page: RenderedPage) -> Self {
            self.pages.insert(page.url.clone(), page);
            self
        }

        fn text(self, url: &str, text: &str) -> Self {
            self.page(RenderedPage::rendered(url, Vec::new(), text.to_string()))
        }

        fn fail(self, url: &str, message: &str) -> Self {
            self.page(RenderedPage::failed(url, Some(message.to_string())))
        }
    }

    #[async_trait]
    impl Renderer for StubRenderer {
        async fn render(&mut self, url: &str, _config: &DistillationConfig) -> RenderedPage {
            self.rendered.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| RenderedPage::failed(url, Some("not found".to_string())))
        }

        async fn close(&mut self) -> Result<(), RenderError> {
            *self.closed.lock().unwrap() += 1;
            Ok(())
        }
    }

    async fn report(renderer: &mut StubRenderer) -> String {
        run(renderer, "rust ownership", &SearchConfig::default())
            .await
            .into_report()
    }

    #[tokio::test]
    async fn test_search_failure_embeds_error() {
        let mut renderer = StubRenderer::default().fail(SEARCH_URL, "timeout");
        assert_eq!(
            report(&mut renderer).await,
            "Failed to retrieve Google search results: timeout"
        );
    }

    #[tokio::test]
    async fn test_search_failure_without_message() {
        let mut renderer = StubRenderer::default().page(RenderedPage::failed(SEARCH_URL, None));
        assert_eq!(
            report(&mut renderer).await,
            "Failed to retrieve Google search results: Unknown error"
        );
    }

    #[tokio::test]
    async fn test_success_without_link_data_is_a_search_failure() {
        let mut page = RenderedPage::rendered(SEARCH_URL, Vec::new(), String::new());
        page.links = None;
        let mut renderer = StubRenderer::default().page(page);

        let outcome = run(&mut renderer, "rust ownership", &SearchConfig::default()).await;
        assert_eq!(outcome, SearchOutcome::SearchFailed(UNKNOWN_ERROR.to_string()));
        assert!(outcome.is_diagnostic());
    }

    #[tokio::test]
    async fn test_no_candidates_diagnostic() {
        let mut renderer = StubRenderer::with_results(&[
            "https://www.google.com/preferences",
            "https://www.youtube.com/watch?v=1",
        ]);

        assert_eq!(
            report(&mut renderer).await,
            "No relevant links found in the search results."
        );
        // Only the results page was rendered
        assert_eq!(renderer.rendered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_candidate_is_skipped() {
        let mut renderer =
            StubRenderer::with_results(&["https://a.org", "https://b.org", "https://c.org"])
                .text("https://a.org", "A")
                .fail("https://b.org", "connection reset")
                .text("https://c.org", "C");

        assert_eq!(report(&mut renderer).await, "A\n\nC\n\n");
    }

    #[tokio::test]
    async fn test_empty_distillation_is_skipped() {
        let mut renderer = StubRenderer::with_results(&["https://a.org", "https://b.org"])
            .text("https://a.org", "")
            .text("https://b.org", "B");

        assert_eq!(report(&mut renderer).await, "B\n\n");
    }

    #[tokio::test]
    async fn test_all_candidates_failing_is_distinguishable() {
        let mut renderer = StubRenderer::with_results(&["https://a.org", "https://b.org"])
            .fail("https://a.org", "timeout")
            .text("https://b.org", "   ");

        let outcome = run(&mut renderer, "rust ownership", &SearchConfig::default()).await;
        assert_eq!(outcome, SearchOutcome::NoContent);
        assert!(!outcome.is_diagnostic());
        assert_eq!(outcome.into_report(), "");
    }

    #[tokio::test]
    async fn test_candidates_render_in_order_and_capped() {
        let links = [
            "https://google.com/x",
            "https://example.com/a",
            "https://example.com/a",
            "https://youtube.com/y",
            "https://b.org",
            "https://c.org",
            "https://d.org",
            "https://e.org",
            "https://f.org",
        ];
        let mut renderer = StubRenderer::with_results(&links)
            .text("https://example.com/a", "first")
            .text("https://e.org", "last")
            .text("https://f.org", "never fetched");

        assert_eq!(report(&mut renderer).await, "first\n\nlast\n\n");
        assert_eq!(
            *renderer.rendered.lock().unwrap(),
            vec![
                SEARCH_URL,
                "https://example.com/a",
                "https://b.org",
                "https://c.org",
                "https://d.org",
                "https://e.org",
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let mut renderer = StubRenderer::with_results(&["https://a.org", "https://b.org"])
            .text("https://a.org", "A")
            .text("https://b.org", "B");

        let first = report(&mut renderer).await;
        let second = report(&mut renderer).await;
        assert_eq!(first, second);
        assert_eq!(first, "A\n\nB\n\n");
    }

    #[tokio::test]
    async fn test_session_closed_on_every_path() {
        let failing = StubRenderer::default().fail(SEARCH_URL, "timeout");
        let closed = Arc::clone(&failing.closed);
        let outcome = run_in_session(failing, "rust ownership", &SearchConfig::default()).await;
        assert!(matches!(outcome, SearchOutcome::SearchFailed(_)));
        assert_eq!(*closed.lock().unwrap(), 1);

        let empty = StubRenderer::with_results(&["https://www.google.com/maps"]);
        let closed = Arc::clone(&empty.closed);
        let outcome = run_in_session(empty, "rust ownership", &SearchConfig::default()).await;
        assert_eq!(outcome, SearchOutcome::NoCandidates);
        assert_eq!(*closed.lock().unwrap(), 1);

        let content = StubRenderer::with_results(&["https://a.org"]).text("https://a.org", "A");
        let closed = Arc::clone(&content.closed);
        let outcome = run_in_session(content, "rust ownership", &SearchConfig::default()).await;
        assert_eq!(outcome, SearchOutcome::Content(vec!["A".to_string()]));
        assert_eq!(*closed.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_custom_engine_is_used() {
        let config = SearchConfig {
            search_engine: "search.example".to_string(),
            ..SearchConfig::default()
        };
        let mut renderer = StubRenderer::default();

        let outcome = run(&mut renderer, "rust", &config).await;
        assert_eq!(
            *renderer.rendered.lock().unwrap(),
            vec!["https://search.example/search?q=rust"]
        );
        assert_eq!(outcome, SearchOutcome::SearchFailed("not found".to_string()));
    }
}
