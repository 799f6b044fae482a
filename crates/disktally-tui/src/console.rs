/// Terminal ownership: setup, teardown, drawing and input.
///
/// The run loop talks to a [`Console`] instead of crossterm directly, so the
/// terminal can be initialised lazily (after a single-line scan) and a
/// scripted console can stand in for it in tests.
use anyhow::{bail, Context as _, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;

pub trait Console {
    /// The full-screen terminal is set up.
    fn is_ready(&self) -> bool;

    /// Set up the full-screen terminal if it isn't already.
    fn ensure_ready(&mut self) -> Result<()>;

    /// Terminal size as (columns, rows).
    fn size(&self) -> io::Result<(u16, u16)>;

    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()>;

    /// Next input event. Non-blocking calls return `Ok(None)` when nothing
    /// is pending.
    fn next_event(&mut self, blocking: bool) -> io::Result<Option<Event>>;

    /// Hand the terminal to a child process.
    fn suspend(&mut self) -> Result<()>;

    /// Take the terminal back after [`suspend`](Self::suspend).
    fn resume(&mut self) -> Result<()>;

    /// Overwrite the single feedback line on stderr.
    fn status_line(&mut self, text: &str) -> io::Result<()>;

    /// End the feedback line so later output starts on a fresh line.
    fn finish_line(&mut self) -> io::Result<()>;

    /// Undo everything [`ensure_ready`](Self::ensure_ready) did.
    fn restore(&mut self) -> Result<()>;
}

/// Where the interface is drawn: standard output, or the controlling
/// terminal when standard output carries export data.
pub enum TtyWriter {
    Stdout(Stdout),
    Tty(File),
}

impl Write for TtyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(s) => s.write(buf),
            Self::Tty(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(s) => s.flush(),
            Self::Tty(f) => f.flush(),
        }
    }
}

pub type Term = Terminal<CrosstermBackend<TtyWriter>>;

/// The real terminal.
pub struct CrosstermConsole {
    terminal: Option<Term>,
    /// A standard stream carries tree data; talk to `/dev/tty` instead.
    use_tty: bool,
}

impl CrosstermConsole {
    pub fn new(use_tty: bool) -> Self {
        Self {
            terminal: None,
            use_tty,
        }
    }

    fn open_writer(&self) -> io::Result<TtyWriter> {
        if self.use_tty {
            Ok(TtyWriter::Tty(OpenOptions::new().write(true).open("/dev/tty")?))
        } else {
            Ok(TtyWriter::Stdout(io::stdout()))
        }
    }
}

impl Console for CrosstermConsole {
    fn is_ready(&self) -> bool {
        self.terminal.is_some()
    }

    fn ensure_ready(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            return Ok(());
        }
        if !self.use_tty && !io::stdin().is_terminal() {
            bail!("Standard input is not a TTY. Did you mean to import a file using '-f -'?");
        }

        let mut writer = self.open_writer().context("Can't open terminal")?;
        enable_raw_mode()?;
        execute!(writer, EnterAlternateScreen, Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(writer))?;
        tracing::info!("Terminal initialised (tty: {})", self.use_tty);
        self.terminal = Some(terminal);
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()> {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.draw(|frame| render(frame))?;
        }
        Ok(())
    }

    fn next_event(&mut self, blocking: bool) -> io::Result<Option<Event>> {
        if blocking {
            return event::read().map(Some);
        }
        if event::poll(Duration::ZERO)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    fn suspend(&mut self) -> Result<()> {
        if let Some(terminal) = self.terminal.as_mut() {
            disable_raw_mode()?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if let Some(terminal) = self.terminal.as_mut() {
            enable_raw_mode()?;
            execute!(terminal.backend_mut(), EnterAlternateScreen, Hide)?;
            terminal.clear()?;
        }
        Ok(())
    }

    fn status_line(&mut self, text: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        write!(err, "\r{text}")?;
        err.flush()
    }

    fn finish_line(&mut self) -> io::Result<()> {
        writeln!(io::stderr())
    }

    fn restore(&mut self) -> Result<()> {
        if let Some(mut terminal) = self.terminal.take() {
            disable_raw_mode()?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
            terminal.show_cursor()?;
            tracing::info!("Terminal restored");
        }
        Ok(())
    }
}

impl Drop for CrosstermConsole {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::warn!("Failed to restore terminal: {e}");
        }
    }
}
