pub mod web;

use crate::config::DistillationConfig;
use crate::results::RenderedPage;
use async_trait::async_trait;
use fantoccini::error::{CmdError, NewSessionError};
use std::time::Duration;
use thiserror::Error;

pub use web::WebDriverRenderer;

/// Failures of the rendering session itself
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not connect to a WebDriver server at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: NewSessionError,
    },

    #[error(transparent)]
    Command(#[from] CmdError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("session is already closed")]
    Closed,
}

/// A browser session that fetches and renders pages.
///
/// One session serves a single invocation: the search page and every
/// candidate link go through it in turn, and it is closed once at the end.
/// Sessions must not be shared between concurrent invocations.
#[async_trait]
pub trait Renderer: Send {
    /// Fetch and render `url`, pruning its text with `config`.
    ///
    /// Failures are reported through `RenderedPage::success`, never as a panic
    /// or an error.
    async fn render(&mut self, url: &str, config: &DistillationConfig) -> RenderedPage;

    /// Release the session
    async fn close(&mut self) -> Result<(), RenderError>;
}
