use crate::app::{App, AppCommand};
use crate::cli::Cli;
use crate::store::ConfigStore;
use crate::supervisor::Supervisor;
use crate::theme::ThemePalette;
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::time::Duration;
use tracing::info;

const UI_IDLE_SLEEP: Duration = Duration::from_millis(16);

type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run_tui(cli: &Cli) -> Result<()> {
    let store = ConfigStore::new(cli.config_path());
    info!(config = %store.path().display(), "loading config");
    let mut app = App::load(store, Supervisor::new(cli.supervisor_options()));
    let theme = ThemePalette::default();

    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, &mut app, &theme).await;
    // The quit key already stops the stream; this covers a loop that failed.
    app.shutdown().await;
    let restore_result = restore_terminal(&mut terminal);

    run_result?;
    restore_result?;
    Ok(())
}

async fn run_loop(terminal: &mut AppTerminal, app: &mut App, theme: &ThemePalette) -> Result<()> {
    let mut running = true;

    while running {
        app.poll_stream();

        terminal
            .draw(|frame| ui::draw(frame, app, theme))
            .context("failed drawing TUI frame")?;

        while event::poll(Duration::ZERO).context("failed to poll input")? {
            // Resizes are picked up by the next draw.
            match event::read().context("failed reading input")? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if app.handle_key(key).await == AppCommand::Quit {
                        running = false;
                        break;
                    }
                }
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        if running {
            tokio::time::sleep(UI_IDLE_SLEEP).await;
        }
    }

    Ok(())
}

fn init_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("failed entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed creating terminal")
}

fn restore_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("failed disabling raw mode")?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)
        .context("failed leaving alternate screen")?;
    terminal.show_cursor().context("failed showing cursor")?;
    Ok(())
}
