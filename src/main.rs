mod app;
mod cli;
mod config;
mod event;
mod files;
mod model;
mod remote;
mod ui;

use std::io;
use std::panic;
use std::path::Path;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use app::{Action, App};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        // Subcommand mode writes to stdout, so logging is safe here.
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
        return cli::run(&args).await;
    }
    run_tui().await
}

async fn run_tui() -> Result<()> {
    // Load config
    let config = config::load_config()?;
    let tracker = remote::create_tracker(&config);
    let files_dir = config.files_dir();
    std::fs::create_dir_all(&files_dir)?;

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Registry notifications redraw the UI through the action channel
    let (changes_tx, mut changes_rx) = mpsc::unbounded_channel();
    let registry_tx = action_tx.clone();
    tokio::spawn(async move {
        while changes_rx.recv().await.is_some() {
            if registry_tx.send(Action::RegistryChanged).is_err() {
                break;
            }
        }
    });

    let service = files::service::FileService::new(files_dir.clone(), tracker, changes_tx);
    let mut app = App::new(service);

    // Watch the mirror directory for edits made outside the app
    let mut watcher = files::watcher::MirrorWatcher::start(&files_dir)?;
    let watch_tx = action_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = watcher.recv().await {
            if watch_tx.send(Action::FileChanged(event)).is_err() {
                break;
            }
        }
    });

    // Pause flag hands stdin to $EDITOR while it owns the terminal
    let (pause_tx, pause_rx) = watch::channel(false);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Spawn event reader
    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx, pause_rx).await;
    });

    // Initial scan and remote probe
    app.refresh().await;

    // Main loop
    loop {
        // Render
        terminal.draw(|f| ui::render(f, &app))?;

        // Wait for action
        if let Some(action) = action_rx.recv().await {
            app.update(action).await;
            if let Some(path) = app.take_pending_edit() {
                let _ = pause_tx.send(true);
                let result = edit_in_terminal(&mut terminal, &path);
                let _ = pause_tx.send(false);
                if let Err(e) = result {
                    app.flash(format!("Editor failed: {e}"));
                }
                // The watcher may or may not have seen the write yet.
                // apply_change is idempotent, so absorb it directly.
                app.service.apply_change(&path);
            }
            if app.should_quit {
                break;
            }
        } else {
            break;
        }
    }

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

/// Hand the terminal to $EDITOR for one file, then take it back.
fn edit_in_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    path: &Path,
) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let result = cli::spawn_editor(path);

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    result
}
