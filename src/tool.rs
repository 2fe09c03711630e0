//! The `web_search` tool, served over stdio with rmcp.

use crate::config::SearchConfig;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, Meta, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub const TOOL_NAME: &str = "web_search";

const SERVER_NAME: &str = "web-search";

/// Advisory retry budget for callers; nothing here retries
const MAX_RETRIES: u32 = 2;

/// Arguments of the `web_search` tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    /// Free-text search query
    pub query: String,
}

/// Failures of the stdio session itself; tool calls never fail this way
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start tool session: {0}")]
    Initialize(String),

    #[error("tool session ended abnormally: {0}")]
    Session(#[from] tokio::task::JoinError),
}

/// Serves `web_search` to one caller. Each call opens its own browser session.
#[derive(Clone)]
pub struct WebSearchServer {
    tool_router: ToolRouter<Self>,
    config: SearchConfig,
}

#[tool_router]
impl WebSearchServer {
    pub fn new(config: SearchConfig) -> Self {
        let mut tool_router = Self::tool_router();
        if let Some(route) = tool_router.map.get_mut(TOOL_NAME) {
            route.attr.meta = Some(retry_hint());
        }
        Self {
            tool_router,
            config,
        }
    }

    #[tool(
        name = "web_search",
        description = "Web search tool that uses Google to find relevant information on the web. \
            Input is a search query string, and output is the top results from the search.",
        annotations(
            title = "Web Search Tool",
            read_only_hint = true,
            open_world_hint = true
        )
    )]
    async fn web_search(
        &self,
        params: Parameters<WebSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = params.0.query;
        if query.trim().is_empty() {
            return Err(McpError::invalid_params("query must be a non-empty string", None));
        }

        ::log::debug!("web_search call: {}", query);
        let report = crate::web_search(&query, &self.config).await;
        Ok(CallToolResult::success(vec![Content::text(report)]))
    }

    /// Run until the caller closes stdin. Only protocol messages go to stdout.
    pub async fn serve_stdio(self) -> Result<(), ToolError> {
        ::log::info!("Serving {} over stdio", TOOL_NAME);
        let running = self
            .serve(stdio())
            .await
            .map_err(|e| ToolError::Initialize(e.to_string()))?;

        let reason = running.waiting().await?;
        ::log::info!("Tool session closed: {:?}", reason);
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for WebSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Call web_search with a query to get readable text from the top search results."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

/// `_meta` entry telling callers how often a failed call may be retried
fn retry_hint() -> Meta {
    let mut hint = serde_json::Map::new();
    hint.insert(TOOL_NAME.to_string(), json!({ "mcp": { "max_retries": MAX_RETRIES } }));
    Meta(hint)
}
