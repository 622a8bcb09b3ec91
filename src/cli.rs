use crate::answer::AnswerClient;
use crate::config::{self, Config};
use crate::event::EventReader;
use crate::search::providers::WhoogleProvider;
use crate::search::SearchOrchestrator;
use crate::session::SearchSession;
use crate::tui::App;
use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(80);

/// Load config, set up logging and the terminal, run until the user quits
pub async fn run() -> Result<()> {
    let config = config::load_or_create_config()?;
    let _log_guard = crate::logging::init(&config)?;

    let session = build_session(&config)?;
    let mut app = App::new(session);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "event loop failed");
    }
    result
}

/// Wire provider, orchestrator and answer client from config
pub fn build_session(config: &Config) -> Result<SearchSession> {
    let provider = WhoogleProvider::new(&config.backend)
        .context("Failed to build search client")?;
    let orchestrator = Arc::new(SearchOrchestrator::new(
        Arc::new(provider),
        config.search.context_size,
    ));
    let answer_client = AnswerClient::new(&config.backend)
        .context("Failed to build answer client")?;

    tracing::info!(
        base_url = %config.backend.base_url,
        context_size = config.search.context_size,
        "session ready"
    );

    Ok(SearchSession::new(orchestrator, answer_client))
}

async fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut events = EventReader::new(TICK_RATE);

    loop {
        terminal
            .draw(|frame| app.render(frame))
            .context("Failed to draw frame")?;

        let event = events.next().await?;
        app.handle_event(event)?;
        // Apply any network events right away rather than waiting for a tick.
        app.update();

        if app.should_quit() {
            return Ok(());
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    undo_on_error(enter_screen(io::stdout()), || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = disable_raw_mode();
    })
}

fn enter_screen<W: Write>(mut out: W) -> Result<Terminal<CrosstermBackend<W>>> {
    execute!(out, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(out)).context("Failed to create terminal")
}

/// Run `undo` when `result` is an error, then pass the result through
fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        undo();
    }
    result
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
