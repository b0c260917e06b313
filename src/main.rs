use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
};
use taskify::{app::App, ui, Config, FileSlots, Persistence, TaskStore, Theme};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "taskify.log";

#[derive(Parser)]
#[command(name = "taskify")]
#[command(version)]
#[command(about = "Local task list with categories and progress", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/taskify/config.toml)
    #[arg(long, env = "TASKIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding saved tasks and the log file
    #[arg(long, env = "TASKIFY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Starting theme
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    if cli.init_config {
        if config_path.exists() {
            println!("Config already exists: {}", config_path.display());
        } else {
            Config::default().save(&config_path)?;
            println!("Wrote {}", config_path.display());
        }
        return Ok(());
    }

    let mut config = Config::load(&config_path)?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }
    if let Some(theme) = cli.theme {
        config.ui.theme = theme;
    }

    let data_dir = config.data_dir();
    fs::create_dir_all(&data_dir).with_context(|| format!("create {}", data_dir.display()))?;
    init_tracing(&config, &data_dir, cli.verbose)?;
    info!(data_dir = %data_dir.display(), slot = %config.storage.slot, "starting");

    let store = TaskStore::open(Persistence::new(
        FileSlots::new(&data_dir),
        config.storage.slot.clone(),
    ));
    let mut app = App::new(store, config.ui.theme, config.ui.default_category);

    enable_raw_mode()?;
    let result = ui::run_restoring(
        || {
            execute!(io::stdout(), EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(io::stdout()))
        },
        |terminal: &mut Terminal<CrosstermBackend<io::Stdout>>| ui::run_app(terminal, &mut app),
        || {
            let left = execute!(io::stdout(), LeaveAlternateScreen, Show);
            disable_raw_mode().and(left)
        },
    );

    info!(tasks = app.store.tasks().len(), "exiting");
    result.context("terminal event loop failed")
}

/// Logs go to a file in the data dir; the terminal belongs to the UI.
fn init_tracing(config: &Config, data_dir: &std::path::Path, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("taskify=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter))
    };

    let log_path = data_dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}
