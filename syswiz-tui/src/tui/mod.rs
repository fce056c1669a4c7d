//! Terminal lifecycle and the main event loop.
//!
//! The loop owns the screen: it draws, polls the keyboard with a short
//! timeout, and drains the execution worker's channel without blocking,
//! so output streams in while the interface stays responsive. Exactly
//! one worker can be live at a time; the app refuses a second launch
//! until the terminal result has arrived.

pub mod app;
mod input;
mod ui;

pub use app::App;

use std::io::{self, IsTerminal};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use syswiz_core::exec::{self, ExecEvent};

use app::InputResult;

/// Run the wizard until the operator quits.
pub fn run(app: &mut App) -> anyhow::Result<()> {
    ensure_interactive_terminal()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    // Restore the terminal even if the loop errored.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let mut exec_rx: Option<Receiver<ExecEvent>> = None;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_input(key) {
                    InputResult::Quit => return Ok(()),
                    InputResult::StartExecution(rendered) => {
                        if app.is_running() {
                            continue;
                        }
                        app.begin_run();
                        exec_rx = Some(exec::spawn(rendered, app.elevate));
                    }
                    InputResult::Continue => {}
                }
            }
        }

        // Drain the worker channel without blocking the interface.
        if let Some(ref rx) = exec_rx {
            let mut finished = false;
            while let Ok(event) = rx.try_recv() {
                match event {
                    ExecEvent::Line(line) => app.push_line(line),
                    ExecEvent::Finished(result) => {
                        app.finish_run(result);
                        finished = true;
                    }
                }
            }
            if finished {
                exec_rx = None;
            }
        }
    }
}

fn ensure_interactive_terminal() -> anyhow::Result<()> {
    if io::stdout().is_terminal() {
        return Ok(());
    }

    anyhow::bail!(
        "No TTY detected. syswiz requires an interactive terminal.\n\
         Try running directly in a terminal (not piped or via script)."
    );
}
