use anyhow::{Context, Result};
use clap::Parser;
use mentiontui::app::App;
use mentiontui::config::Config;
use mentiontui::controller::{Controller, ControllerConfig};
use mentiontui::feeds::mentions::MentionsClient;
use mentiontui::terminal::{install_panic_hook, TerminalGuard};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mentiontui")]
#[command(about = "Terminal dashboard for the mention analysis backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: <config dir>/mentiontui/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000/api/v1
    #[arg(long)]
    api_url: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Where to write logs (default: <cache dir>/mentiontui/mentiontui.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("mentiontui").join("mentiontui.log"))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}

/// The terminal belongs to the dashboard, so logs go to a file. Logging is
/// skipped when the file cannot be opened.
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(default_log_path) else {
        return;
    };
    let Ok(file) = open_log_file(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.polling.interval_ms = interval_ms;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone());

    let config = load_config(&cli)?;
    tracing::info!(
        base_url = %config.api.base_url,
        interval_ms = config.polling.interval_ms,
        "starting mentiontui"
    );

    let client = MentionsClient::new(&config.api)?;
    let controller = Controller::new(Arc::new(client), ControllerConfig::from(&config));
    let mut app = App::new(controller);

    install_panic_hook();
    let guard = TerminalGuard::enter(io::stdout())?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = app.run(&mut terminal).await;
    drop(guard);

    if let Err(err) = &result {
        tracing::error!(error = %err, "dashboard exited with an error");
    }
    result
}
