#![forbid(unsafe_code)]

pub mod app;
pub mod input;

use std::io;
use std::io::IsTerminal as _;

use crate::error::TaskListError;

pub type Term = ratatui::Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>;

#[must_use]
pub fn is_tty() -> bool {
    io::stdout().is_terminal() && io::stdin().is_terminal()
}

pub fn init_terminal() -> Result<Term, TaskListError> {
    use crossterm::terminal::enable_raw_mode;
    use ratatui::backend::CrosstermBackend;

    enable_raw_mode().map_err(|e| TaskListError::Other(format!("failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)
        .map_err(|e| TaskListError::Other(format!("failed to enter alt screen: {e}")))?;
    ratatui::Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| TaskListError::Other(format!("failed to create terminal: {e}")))
}

pub fn restore_terminal(mut terminal: Term) -> Result<(), TaskListError> {
    use crossterm::terminal::disable_raw_mode;

    disable_raw_mode()
        .map_err(|e| TaskListError::Other(format!("failed to disable raw mode: {e}")))?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )
    .map_err(|e| TaskListError::Other(format!("failed to leave alt screen: {e}")))?;
    terminal
        .show_cursor()
        .map_err(|e| TaskListError::Other(format!("failed to show cursor: {e}")))
}

/// Restores the terminal on every exit path, including panics unwinding through the loop.
pub struct TerminalGuard {
    terminal: Option<Term>,
}

impl TerminalGuard {
    #[must_use]
    pub fn new(terminal: Term) -> Self {
        Self {
            terminal: Some(terminal),
        }
    }

    pub fn terminal(&mut self) -> Result<&mut Term, TaskListError> {
        self.terminal
            .as_mut()
            .ok_or_else(|| TaskListError::Other("terminal unavailable".to_owned()))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Some(terminal) = self.terminal.take() {
            let _ = restore_terminal(terminal);
        }
    }
}
