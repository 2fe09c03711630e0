use serde::{Deserialize, Serialize};

/// Whether a link stays on the page's own host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Internal,
    External,
}

/// A link discovered on a rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// Absolute URL of the link target
    pub href: String,

    /// Internal or external relative to the page
    pub kind: LinkKind,
}

impl PageLink {
    pub fn internal(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            kind: LinkKind::Internal,
        }
    }

    pub fn external(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            kind: LinkKind::External,
        }
    }
}

/// Outcome of fetching and rendering one URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    /// URL that was requested
    pub url: String,

    /// Whether the fetch and render succeeded
    pub success: bool,

    /// Reason for failure, when the renderer knows one
    pub error_message: Option<String>,

    /// Links found on the page; `None` when the renderer produced no link data
    pub links: Option<Vec<PageLink>>,

    /// Pruned page text
    pub distilled_text: Option<String>,
}

impl RenderedPage {
    /// A successfully rendered page
    pub fn rendered(url: impl Into<String>, links: Vec<PageLink>, distilled_text: String) -> Self {
        Self {
            url: url.into(),
            success: true,
            error_message: None,
            links: Some(links),
            distilled_text: Some(distilled_text),
        }
    }

    /// A page that could not be fetched or rendered
    pub fn failed(url: impl Into<String>, error_message: Option<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            error_message,
            links: None,
            distilled_text: None,
        }
    }
}
