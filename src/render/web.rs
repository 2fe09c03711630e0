use crate::config::{DistillationConfig, SearchConfig};
use crate::parsers::Parser;
use crate::render::{RenderError, Renderer};
use crate::results::RenderedPage;
use crate::utils::calculate_timeout;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::timeout;

/// Rendering session backed by a WebDriver-controlled browser
pub struct WebDriverRenderer {
    client: Option<Client>,
    fetch_timeout: Duration,
}

impl WebDriverRenderer {
    /// Open a browser session using the WebDriver and profile from `config`
    pub async fn connect(config: &SearchConfig) -> Result<Self, RenderError> {
        let client = connect_to_webdriver(
            &config.webdriver_url,
            &config.webdriver_fallbacks,
            capabilities(config),
        )
        .await?;
        Ok(Self {
            client: Some(client),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        })
    }

    async fn fetch_source(client: &Client, url: &str) -> Result<(String, String), RenderError> {
        client.goto(url).await?;
        let source = client.source().await?;

        // Resolve links against where the browser ended up after redirects
        let final_url = match client.current_url().await {
            Ok(current) => current.to_string(),
            Err(_) => url.to_string(),
        };
        Ok((source, final_url))
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn render(&mut self, url: &str, config: &DistillationConfig) -> RenderedPage {
        let Some(client) = self.client.as_ref() else {
            return RenderedPage::failed(url, Some(RenderError::Closed.to_string()));
        };

        let started = std::time::Instant::now();
        let limit = calculate_timeout(self.fetch_timeout, url);
        ::log::debug!("RENDER: {}", url);

        let fetched = match timeout(limit, Self::fetch_source(client, url)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(limit)),
        };

        match fetched {
            Ok((source, final_url)) => {
                let parsed = Parser::parse(&source, &final_url, config);
                ::log::debug!(
                    "Rendered {} in {:.2} seconds",
                    url,
                    started.elapsed().as_secs_f64()
                );
                RenderedPage::rendered(url, parsed.links, parsed.content)
            }
            Err(e) => {
                let message = describe_render_error(&e, url);
                RenderedPage::failed(url, Some(message))
            }
        }
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        match self.client.take() {
            Some(client) => {
                client.close().await?;
                ::log::debug!("Closed WebDriver session");
                Ok(())
            }
            None => Err(RenderError::Closed),
        }
    }
}

/// Browser capabilities for Chrome and Firefox drivers.
///
/// The browser's own log level is set here so its output never reaches the
/// process streams.
fn capabilities(config: &SearchConfig) -> Map<String, Value> {
    let mut chrome_args = vec![
        format!("--log-level={}", config.browser_log_level),
        "--disable-gpu".to_string(),
        "--no-first-run".to_string(),
    ];
    let mut firefox_args = Vec::new();
    if config.headless {
        chrome_args.push("--headless=new".to_string());
        firefox_args.push("-headless".to_string());
    }
    if let Some(dir) = &config.profile_dir {
        chrome_args.push(format!("--user-data-dir={}", dir.display()));
        firefox_args.push("-profile".to_string());
        firefox_args.push(dir.display().to_string());
    }

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "log": { "level": firefox_log_level(config.browser_log_level) },
        }),
    );
    caps
}

fn firefox_log_level(level: u8) -> &'static str {
    match level {
        0 => "info",
        1 => "warn",
        2 => "error",
        _ => "fatal",
    }
}

/// Connects to the WebDriver instance, trying the usual local ports when the
/// configured one is unreachable
async fn connect_to_webdriver(
    webdriver_url: &str,
    fallback_urls: &[String],
    caps: Map<String, Value>,
) -> Result<Client, RenderError> {
    let first_error = match ClientBuilder::native()
        .capabilities(caps.clone())
        .connect(webdriver_url)
        .await
    {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::warn!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e
        }
    };

    for url in fallback_urls.iter().filter(|url| url.as_str() != webdriver_url) {
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native()
            .capabilities(caps.clone())
            .connect(url)
            .await
        {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(RenderError::Connect {
        url: webdriver_url.to_string(),
        source: first_error,
    })
}

/// Log a render failure and turn it into the page's error message
fn describe_render_error(error: &RenderError, url: &str) -> String {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while rendering {}", url);
    } else {
        ::log::warn!("Failed to render {}: {}", url, error);
    }
    error.to_string()
}
