use crate::results::{LinkKind, RenderedPage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration for selecting candidate links from a results page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Substrings that disqualify a URL wherever they appear in it
    #[serde(default = "default_skip_domains")]
    pub skip_domains: Vec<String>,

    /// Maximum number of candidates kept, in discovery order
    #[serde(default = "default_max_links")]
    pub max_links: usize,
}

fn default_skip_domains() -> Vec<String> {
    ["google", "youtube", "linkedin", "twitter", "facebook"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_max_links() -> usize {
    5
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            skip_domains: default_skip_domains(),
            max_links: default_max_links(),
        }
    }
}

/// Picks the candidate links worth fetching from a search results page
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    config: LinkFilterConfig,
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: LinkFilterConfig) -> Self {
        Self { config }
    }

    /// Extract the ordered, deduplicated, denylist-filtered candidates of a page.
    ///
    /// External links come before internal ones. The first occurrence of a URL
    /// wins. An empty result means the page offered nothing usable.
    pub fn extract(&self, page: &RenderedPage) -> Vec<String> {
        let Some(links) = page.links.as_ref() else {
            return Vec::new();
        };

        let external = links.iter().filter(|l| l.kind == LinkKind::External);
        let internal = links.iter().filter(|l| l.kind == LinkKind::Internal);

        let mut seen = HashSet::new();
        let candidates: Vec<String> = external
            .chain(internal)
            .map(|l| l.href.as_str())
            .filter(|href| !href.is_empty())
            .filter(|href| seen.insert(*href))
            .filter(|href| !self.is_skipped(href))
            .take(self.config.max_links)
            .map(str::to_string)
            .collect();

        ::log::debug!(
            "Selected {} candidate links out of {} on {}",
            candidates.len(),
            links.len(),
            page.url
        );
        candidates
    }

    /// Plain substring match against the whole URL, query string included
    pub fn is_skipped(&self, url: &str) -> bool {
        self.config
            .skip_domains
            .iter()
            .any(|domain| url.contains(domain.as_str()))
    }
}
