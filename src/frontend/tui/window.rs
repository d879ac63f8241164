//! The terminal window a `TerminalView` draws into.
//!
//! Opening a window puts the terminal into raw mode on the alternate screen
//! and sets the OS window title. Closing (explicitly, on drop, or from the
//! panic hook) restores it.

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::sync::Once;

pub const WINDOW_TITLE: &str = "Mobile Robots in Dynamic Graph Simulation";

static PANIC_HOOK: Once = Once::new();

pub struct Window<B: Backend> {
    terminal: Terminal<B>,
    title: String,
    /// Whether this window switched the real terminal into raw mode
    owns_tty: bool,
    closed: bool,
}

impl Window<CrosstermBackend<Stdout>> {
    /// Take over the real terminal
    pub fn open(title: &str) -> Result<Self> {
        install_panic_hook();

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, SetTitle(title))
            .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor()?;

        tracing::info!("Opened terminal window '{}'", title);
        Ok(Self {
            terminal,
            title: title.to_string(),
            owns_tty: true,
            closed: false,
        })
    }
}

impl<B: Backend> Window<B> {
    /// Window over an arbitrary backend; the real terminal is left untouched
    pub fn with_backend(backend: B, title: &str) -> Result<Self> {
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;
        Ok(Self {
            terminal,
            title: title.to_string(),
            owns_tty: false,
            closed: false,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn draw<F: FnOnce(&mut Frame)>(&mut self, render: F) -> Result<()> {
        self.terminal.draw(render).context("Failed to draw frame")?;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.owns_tty {
            restore_terminal()?;
        }
        self.terminal.show_cursor()?;
        tracing::info!("Closed terminal window");
        Ok(())
    }
}

impl<B: Backend> Drop for Window<B> {
    fn drop(&mut self) {
        // Ensure terminal is restored even if close() wasn't called
        let _ = self.close();
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Restore the terminal before the default panic output so it stays readable
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if let Err(e) = restore_terminal() {
                tracing::error!("Unable to restore terminal: {:?}", e);
            }
            default_hook(info);
        }));
    });
}
