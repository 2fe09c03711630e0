use crate::filter::LinkFilterConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How the pruning filter turns the relevance threshold into a cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// One global cutoff for every node
    Fixed,
    /// Cutoff recalibrated per node from its tag, text ratio and link ratio
    #[serde(alias = "dynamic")]
    Adaptive,
}

/// Parameters handed to every render call within one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillationConfig {
    /// Relevance threshold on a 0-1 scale; lower retains more content
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,

    /// Fixed or adaptive cutoff
    #[serde(default = "default_threshold_mode")]
    pub threshold_mode: ThresholdMode,

    /// Block nodes with fewer words than this are dropped
    #[serde(default = "default_min_words_per_node")]
    pub min_words_per_node: usize,
}

impl Default for DistillationConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: default_relevance_threshold(),
            threshold_mode: default_threshold_mode(),
            min_words_per_node: default_min_words_per_node(),
        }
    }
}

/// Configuration for a web search invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Host of the search engine whose results page is scraped
    #[serde(default = "default_search_engine")]
    pub search_engine: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// WebDriver URLs tried in order when `webdriver_url` refuses a session
    #[serde(default = "default_webdriver_fallbacks")]
    pub webdriver_fallbacks: Vec<String>,

    /// Persistent browser profile directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<PathBuf>,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Upper bound for a single render, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Browser log level (0 = info .. 3 = fatal)
    #[serde(default = "default_browser_log_level")]
    pub browser_log_level: u8,

    /// Candidate link selection
    #[serde(default)]
    pub links: LinkFilterConfig,

    /// Content pruning
    #[serde(default)]
    pub distillation: DistillationConfig,
}

/// Rejected configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("relevance threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("search engine host must not be empty")]
    EmptySearchEngine,

    #[error("max_links must be at least 1")]
    NoLinksAllowed,
}

impl SearchConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.distillation.relevance_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }
        if self.search_engine.trim().is_empty() {
            return Err(ConfigError::EmptySearchEngine);
        }
        if self.links.max_links == 0 {
            return Err(ConfigError::NoLinksAllowed);
        }
        Ok(())
    }

    /// Override the WebDriver URL and profile directory from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("WEBDRIVER_URL").ok(),
            std::env::var("WEB_SEARCH_PROFILE_DIR").ok(),
        );
    }

    fn apply_overrides(&mut self, webdriver_url: Option<String>, profile_dir: Option<String>) {
        if let Some(url) = webdriver_url.filter(|v| !v.is_empty()) {
            self.webdriver_url = url;
        }
        if let Some(dir) = profile_dir.filter(|v| !v.is_empty()) {
            self.profile_dir = Some(PathBuf::from(dir));
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_engine: default_search_engine(),
            webdriver_url: default_webdriver_url(),
            webdriver_fallbacks: default_webdriver_fallbacks(),
            profile_dir: None,
            headless: default_headless(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            browser_log_level: default_browser_log_level(),
            links: LinkFilterConfig::default(),
            distillation: DistillationConfig::default(),
        }
    }
}

fn default_relevance_threshold() -> f64 {
    0.45
}

fn default_threshold_mode() -> ThresholdMode {
    ThresholdMode::Adaptive
}

fn default_min_words_per_node() -> usize {
    5
}

fn default_search_engine() -> String {
    "www.google.com".to_string()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_webdriver_fallbacks() -> Vec<String> {
    vec![
        "http://localhost:9515".to_string(), // ChromeDriver default
        "http://localhost:4444".to_string(), // GeckoDriver / Selenium default
        "http://127.0.0.1:4444".to_string(),
    ]
}

fn default_headless() -> bool {
    true
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_browser_log_level() -> u8 {
    3
}
