pub mod html;
pub mod prune;


use crate::config::DistillationConfig;
use crate::results::PageLink;
use scraper::Html;

/// Result of parsing a rendered document
pub struct ParseResult {
    /// Pruned, signal-dense text of the page
    pub content: String,
    /// Links found on the page, in document order
    pub links: Vec<PageLink>,
}

impl ParseResult {
    /// Creates a new parse result with the given content and links
    pub fn new(content: String, links: Vec<PageLink>) -> Self {
        Self { content, links }
    }
}

/// Turns page source into links and distilled text
pub struct Parser;

impl Parser {
    /// Parse page source fetched from `url`
    pub fn parse(source: &str, url: &str, config: &DistillationConfig) -> ParseResult {
        let doc = Html::parse_document(source);

        let links = html::extract_links(&doc, url);
        let content = prune::PruningFilter::new(config).fit_markdown(&doc);

        ::log::debug!(
            "Parsed {}: {} links, {} chars of distilled text",
            url,
            links.len(),
            content.len()
        );

        ParseResult::new(content, links)
    }
}
