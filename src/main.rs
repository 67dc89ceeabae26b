//! Main entry point for the episode-browser TUI application.

use clap::Parser;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use episode_browser::api::TvMazeClient;
use episode_browser::browser::{Browser, EpisodeRequest, Loaded};
use episode_browser::config::Config;
use episode_browser::tui::{draw, poll_event, Action, App};
use log::{debug, info, warn};
use ratatui::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Command-line arguments for the episode-browser application.
#[derive(Parser, Debug)]
#[command(
    name = "episode-browser",
    version,
    about = "Browse TV shows and their episodes in the terminal",
    long_about = "Pick a show from the TVMaze catalogue, then search and browse its episodes as cards."
)]
struct Args {
    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Write logs to this file (overrides config; defaults to the cache dir)
    #[arg(long)]
    log_file: Option<String>,

    /// Base URL of the TVMaze API (overrides config)
    #[arg(short, long)]
    api_url: Option<String>,

    /// Select this show id as soon as the show list has loaded
    #[arg(short, long)]
    show: Option<u64>,

    /// Initial search term
    #[arg(long)]
    search: Option<String>,

    /// Write a default config file if none exists, print its path and exit
    #[arg(long)]
    init_config: bool,
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn init_logging(level: u8, log_file: Option<&Path>) -> io::Result<()> {
    let log_level = match level {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false);

    // stderr would draw over the TUI
    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    debug!("Log level set to {:?}", log_level);
    Ok(())
}

/// Fetch the show list in the background.
fn spawn_shows_fetch(client: &TvMazeClient, tx: &UnboundedSender<Loaded>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.fetch_shows().await;
        if tx.send(Loaded::Shows(result)).is_err() {
            debug!("UI closed before the show list arrived");
        }
    });
}

/// Fetch one show's episodes in the background, tagged with the request's
/// generation so late responses can be recognised.
fn spawn_episode_fetch(client: &TvMazeClient, tx: &UnboundedSender<Loaded>, request: EpisodeRequest) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.fetch_episodes(request.show_id).await;
        let loaded = Loaded::Episodes {
            generation: request.generation,
            result,
        };
        if tx.send(loaded).is_err() {
            debug!("UI closed before episodes for show {} arrived", request.show_id);
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load config
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::new(), Some(e)),
    };

    let log_file = config.log_path(args.log_file.as_deref());
    init_logging(args.log, log_file.as_deref())?;

    if let Some(e) = config_error {
        warn!("Failed to load config: {}. Using defaults.", e);
    }

    if args.init_config {
        let path = Config::create_default_if_missing()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Merge config with CLI args
    let api_url = args.api_url.clone().unwrap_or_else(|| config.api_url.clone());
    info!("Using API at {}", api_url);

    let client = TvMazeClient::new(&api_url)?;
    let (tx, rx) = mpsc::unbounded_channel();

    let mut app = App::new(Browser::new(&config.placeholder_image), config.colors.clone());
    if let Some(term) = &args.search {
        app.set_search_input(term);
    }

    spawn_shows_fetch(&client, &tx);

    // Initialize terminal
    let mut terminal = init_terminal()?;

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &client, &tx, rx, args.show).await;

    // Restore terminal
    restore_terminal()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &TvMazeClient,
    tx: &UnboundedSender<Loaded>,
    mut rx: UnboundedReceiver<Loaded>,
    mut preselect: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Apply finished fetches
        while let Ok(loaded) = rx.try_recv() {
            let shows_loaded = matches!(loaded, Loaded::Shows(Ok(_)));
            app.apply(loaded);

            if !shows_loaded {
                continue;
            }
            if let Some(request) = preselect.take().and_then(|id| app.preselect_show(id)) {
                spawn_episode_fetch(client, tx, request);
            }
        }

        // Draw UI
        terminal.draw(|f| draw(f, app))?;

        // Poll for events
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(50))? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match app.handle_input(key) {
                Action::Quit => break,
                Action::SelectShow(show_id) => {
                    if let Some(request) = app.select_show(show_id) {
                        spawn_episode_fetch(client, tx, request);
                    }
                }
                Action::None => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
