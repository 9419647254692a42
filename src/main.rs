//! tally: a persisted counter service.
//!
//! This is the application entry point. `serve` (the default) initializes
//! tracing, loads configuration, connects the counter store, ensures the
//! counter record exists and only then binds the HTTP listener, so a
//! misconfigured service never serves without persistence. `show` and
//! `increment` drive a running server through the API client.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tally::client::{ApiClient, CounterView};
use tally::config::{AppConfig, LoggingConfig, DEFAULT_LOG_FILTER};
use tally::http::start_server;
use tally::{create_router, store, AppState, CounterService};

/// Default server address for the client commands
const DEFAULT_SERVER_URL: &str = "http://localhost:4000";

/// tally: a persisted counter service
#[derive(Parser, Debug)]
#[command(name = "tally", version, about)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "tally=debug,tower_http=info")
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Load and print the server status and counter
    Show {
        /// Base URL of a running server
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },
    /// Increment the counter on a running server and print the result
    Increment {
        /// Base URL of a running server
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(args.log_level, &config.logging);

    let result = match args.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Show { url } => run_show(&url).await,
        Command::Increment { url } => run_increment(&url).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with priority: CLI > env > default
fn init_tracing(cli_filter: Option<String>, logging: &LoggingConfig) {
    let log_filter = cli_filter
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry = tracing_subscriber::registry().with(EnvFilter::new(&log_filter));

    if logging.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

async fn run_server(mut config: AppConfig) -> Result<(), Box<dyn Error>> {
    config.apply_env()?;
    let store_url = AppConfig::store_url()?;

    tracing::info!(store = %store::redact(&store_url), "Connecting to counter store");
    let store = store::connect(&store_url, &config.store).await?;

    let counter = CounterService::new(store, config.store.timeout_seconds);
    counter.initialize().await?;
    tracing::info!(backend = counter.backend(), "Connected to counter store");

    let app = create_router(AppState::new(counter));
    start_server(app, &config.http).await?;

    Ok(())
}

async fn run_show(url: &str) -> Result<(), Box<dyn Error>> {
    let client = ApiClient::new(url);
    let mut view = CounterView::default();

    view.load(&client).await;
    finish(view)
}

async fn run_increment(url: &str) -> Result<(), Box<dyn Error>> {
    let client = ApiClient::new(url);
    let mut view = CounterView::default();

    view.load(&client).await;
    if view.error.is_none() {
        view.increment(&client).await;
    }
    finish(view)
}

fn finish(view: CounterView) -> Result<(), Box<dyn Error>> {
    print!("{}", view.render());
    match view.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
