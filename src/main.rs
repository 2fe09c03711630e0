use clap::Parser;
use web_search::tool::WebSearchServer;
use web_search::{SearchConfig, WebSearch};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout is reserved for results and the tool protocol
    env_logger::init();

    let args = Args::parse();

    let search = match &args.config {
        Some(path) => match WebSearch::from_config_file(path) {
            Ok(search) => search,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => WebSearch::new(SearchConfig::default()),
    };

    let mut search = search.with_env();
    if let Some(url) = args.webdriver_url {
        search = search.with_webdriver_url(url);
    }
    if let Some(dir) = args.profile_dir {
        search = search.with_profile_dir(dir);
    }
    if let Some(engine) = args.engine {
        search = search.with_search_engine(engine);
    }
    if let Some(timeout) = args.timeout {
        search = search.with_fetch_timeout(timeout);
    }

    if let Err(e) = search.config().validate() {
        ::log::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    match args.query {
        Some(query) => {
            let start_time = std::time::Instant::now();
            let report = search.run(&query).await;
            ::log::info!(
                "Search complete in {:.2} seconds",
                start_time.elapsed().as_secs_f64()
            );
            println!("{}", report);
        }
        None => {
            let server = WebSearchServer::new(search.config().clone());
            if let Err(e) = server.serve_stdio().await {
                ::log::error!("Tool server stopped: {}", e);
                std::process::exit(1);
            }
        }
    }
}
