use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use graft::app::App;
use graft::config;
use graft::dispatch::{Dispatcher, Services};
use graft::model::Settings;
use graft::vcs::JjCli;

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "Terminal client for jj repositories", long_about = None)]
struct Cli {
    /// Repository to open (defaults to the current directory)
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Write logs here instead of the default data directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Only refresh on request
    #[arg(long)]
    no_auto_refresh: bool,
}

fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("graft").join("graft.log"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// The terminal belongs to the UI, so logs go to a file or nowhere.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_env("GRAFT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let file = cli
        .log_file
        .clone()
        .or_else(default_log_path)
        .and_then(|path| open_log_file(&path).ok());
    match file {
        Some(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let repo_root = match &cli.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let repo_root = repo_root.canonicalize().unwrap_or(repo_root);
    info!(repo = %repo_root.display(), "starting");

    let mut startup_error = None;
    let settings = config::load(&repo_root).unwrap_or_else(|err| {
        warn!(error = %err, "config could not be loaded; using defaults");
        startup_error = Some(format!("load config: {err:#}"));
        Settings::default()
    });

    let vcs = Arc::new(JjCli::new(settings.jj_bin.clone(), repo_root.clone()));
    let mut services = Services::new(vcs, repo_root.clone(), config::global_config_path());
    if let Err(err) = services.configure(&settings) {
        warn!(error = %err, "remote services unavailable");
        startup_error.get_or_insert_with(|| format!("configure remote services: {err}"));
    }

    let mut app = App::new(
        settings,
        services.capabilities(),
        repo_root.display().to_string(),
        !cli.no_auto_refresh,
    );
    app.model.error = startup_error;

    graft::tui::run(app, Dispatcher::new(services)).await
}
