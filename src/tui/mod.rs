//! Terminal UI for tic-tac-toe.

mod app;
mod input;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use tictactoe_oracle::{GameConfig, GameController, GameMode};
use tokio::time::Duration;
use tracing::{error, info, instrument};

use app::App;

/// Runs the TUI until the user quits, restoring the terminal afterwards.
pub async fn run(
    config: &GameConfig,
    mode: Option<GameMode>,
    player1: &str,
    player2: &str,
) -> Result<()> {
    let mut app = App::new(GameController::from_config(config));
    if let Some(mode) = mode {
        app.start_game(mode, player1, player2);
    }

    enable_raw_mode()?;
    let mut terminal = restore_on_err(enter_terminal(), || {
        if let Err(err) = disable_raw_mode() {
            error!(error = ?err, "Failed to disable raw mode");
        }
    })?;

    let res = run_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "TUI loop error");
    }
    res
}

/// Switches to the alternate screen and builds the terminal.
fn enter_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    restore_on_err(Terminal::new(backend).map_err(Into::into), || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    })
}

/// Runs `restore` if `res` is an error, then passes `res` through.
fn restore_on_err<T>(res: Result<T>, restore: impl FnOnce()) -> Result<T> {
    if res.is_err() {
        restore();
    }
    res
}

/// Draws, forwards AI replies and keys, until quit.
#[instrument(skip_all)]
async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    info!("Entering UI loop");
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        // Short poll keeps AI replies flowing while waiting for keys.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                // Skip key release events (crossterm fires both press and release).
                if key.kind != KeyEventKind::Release {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit() {
            info!("User quit");
            return Ok(());
        }

        tokio::task::yield_now().await;
    }
}
