//! Terminal UI for super tic-tac-toe.

mod app;
mod input;
mod ui;

use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{GameApi, RestGameApi};
use crate::config::ClientConfig;
use crate::session::{Dispatch, SessionController, SkipReason};
use crate::view::{BoardView, Intent};
use app::{Action, App};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Runs the terminal client against the configured server.
pub async fn run_tui(config: ClientConfig) -> Result<()> {
    // Log to a file so the alternate screen stays clean.
    let log_file = std::fs::File::create(config.log_file())?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized

    info!(server_url = %config.server_url(), "Starting Strictly Ultimate TUI");

    let api = RestGameApi::from_config(&config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_game_loop(&mut terminal, api, &config).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// Draws from a fresh snapshot each pass and forwards key presses.
#[instrument(skip_all)]
async fn run_game_loop(terminal: &mut Term, api: RestGameApi, config: &ClientConfig) -> Result<()> {
    let mut session = SessionController::with_config(api.clone(), config);
    spawn_start(&session);
    let mut app = App::new();

    loop {
        let view = BoardView::render(&session.snapshot());
        app.sync(&view);
        terminal.draw(|f| ui::draw(f, &view, &app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            // Skip key release events (crossterm fires both press and release).
            if key.kind == KeyEventKind::Release {
                continue;
            }
            let Some(command) = input::command_for(key.code) else {
                continue;
            };

            match app.handle(command, &view) {
                Action::Redraw => {}
                Action::Dispatch(intent) => spawn_intent(&session, intent),
                Action::NewGame => {
                    info!("New game requested");
                    close(&session, config.request_timeout()).await;
                    session = SessionController::with_config(api.clone(), config);
                    app.reset();
                    spawn_start(&session);
                }
                Action::Quit => {
                    info!("User quit");
                    close(&session, config.request_timeout()).await;
                    return Ok(());
                }
            }
        }
    }
}

fn spawn_start<A: GameApi + 'static>(session: &SessionController<A>) {
    let session = session.clone();
    tokio::spawn(async move {
        if let Err(e) = session.start().await {
            warn!(error = %e, "Could not start session");
        }
    });
}

fn spawn_intent<A: GameApi + 'static>(session: &SessionController<A>, intent: Intent) {
    let session = session.clone();
    tokio::spawn(async move {
        match session.dispatch(intent).await {
            Ok(Dispatch::Sent) => debug!(%intent, "Intent applied"),
            Ok(Dispatch::Skipped(reason)) => debug!(%intent, %reason, "Intent skipped"),
            Err(e) => warn!(%intent, error = %e, "Intent failed"),
        }
    });
}

/// Waits for any in-flight request, then deletes the game.
async fn close<A: GameApi + 'static>(session: &SessionController<A>, timeout: Duration) {
    match session.close(timeout).await {
        Ok(Dispatch::Sent) => info!("Game closed"),
        Ok(Dispatch::Skipped(SkipReason::Pending)) => {
            warn!(?timeout, "Request still in flight, game left for the server to expire")
        }
        Ok(Dispatch::Skipped(reason)) => debug!(%reason, "Nothing to close"),
        Err(e) => warn!(error = %e, "Failed to delete game"),
    }
}
