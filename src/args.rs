use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "web-search")]
#[command(about = "Search the web and return readable content for the top results")]
#[command(version)]
pub struct Args {
    /// Query to run once; without it the tool is served over stdio
    pub query: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL (overrides config and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Persistent browser profile directory
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,

    /// Search engine host
    #[arg(long)]
    pub engine: Option<String>,

    /// Per-page render timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
