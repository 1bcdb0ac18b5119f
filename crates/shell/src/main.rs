//! Oxide Shell - a tabbed browser window around an embedded engine.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use common::DispatchQueue;
use shell::{console, EngineHost, HeadlessBackend, ShellConfig};
use ui::{normalize_url, Dispatch, LoggingHostFocus, UiTask, Window};

/// Oxide Shell - a tabbed browser window
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL new tabs open on
    url: Option<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render pages offscreen
    #[arg(long)]
    offscreen: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Load the config file, if any, and apply command-line overrides.
    fn config(&self) -> Result<ShellConfig> {
        let mut config = match &self.config {
            Some(path) => ShellConfig::load(path)?,
            None => ShellConfig::default(),
        };

        if let Some(url) = &self.url {
            let url = normalize_url(url).ok_or_else(|| anyhow!("start URL is empty"))?;
            config = config.with_start_url(&url);
        }
        if self.offscreen {
            config = config.with_offscreen_rendering(true);
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Oxide Shell v{}", shell::VERSION);
    let config = args.config()?;

    let mut queue = DispatchQueue::<UiTask>::new();

    // The window does not exist until the engine is up
    let backend = HeadlessBackend::new();
    let host = EngineHost::initialize(&config.engine_settings(), &backend, queue.poster().event_sink())?;

    let mut window = Window::new(
        config.window_config(),
        Arc::new(host),
        config.shortcut_router(),
        Box::new(LoggingHostFocus),
    );
    window.open();

    console::spawn_reader(queue.poster())?;
    println!("{}", console::help());

    while let Some(task) = queue.next().await {
        let input = matches!(task, UiTask::Input(_));
        match window.handle(task)? {
            Dispatch::Continue => {
                if input {
                    println!("{}", console::describe(&window));
                }
            }
            Dispatch::Exit if window.is_closed() => break,
            Dispatch::Exit => {
                info!("engine terminated, exiting");
                std::process::exit(0);
            }
        }
        debug!(tabs = window.tabs().count(), "task handled");
    }

    info!("Shell shutdown complete");
    Ok(())
}
