/// Scan engine: live cursor, error slots, and the source drivers that feed
/// entries into a [`Sink`](crate::sink::Sink).
///
/// Drivers are stepped from the run loop. Each [`SourceDriver::step`] does
/// at most [`QUANTUM`] entries of work, so the loop can redraw and poll for
/// the abort key between steps.
pub mod cursor;
pub mod errors;
pub mod import;
pub mod scratch;
pub mod walker;

pub use cursor::ScanCursor;
pub use errors::{ErrorChannel, FatalMessage};
pub use import::ImportDriver;
pub use scratch::{ScratchEntry, ScratchSlot};
pub use walker::FreshScan;

use crate::sink::Sink;
use std::fmt;
use std::path::Path;

/// Entries processed per driver step.
pub const QUANTUM: usize = 64;

/// Result of one driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStep {
    /// More work remains.
    Working,
    /// The source is exhausted, or a fatal error was recorded.
    Finished,
}

/// A producer of tree entries: a filesystem walk or an import replay.
pub trait SourceDriver {
    fn step(&mut self, state: &mut ScanState, sink: &mut dyn Sink) -> SourceStep;
}

/// Everything the progress and error views read while a scan runs.
#[derive(Debug, Default)]
pub struct ScanState {
    pub cursor: ScanCursor,
    pub errors: ErrorChannel,
    /// Entries seen so far, directories included.
    pub items: u64,
    /// Apparent bytes seen so far.
    pub size: u64,
    /// Allocated bytes seen so far.
    pub disk_usage: u64,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the current location as having a non-fatal error.
    ///
    /// Only the presence of `path` matters: `Some(_)` stores the *cursor*,
    /// whatever path was passed, and `None` clears the slot.
    pub fn set_soft_error(&mut self, path: Option<&Path>) {
        match path {
            Some(p) => {
                tracing::warn!("Scan error at {}", p.display());
                self.errors.record_soft(self.cursor.as_bytes());
            }
            None => self.errors.clear_soft(),
        }
    }

    pub fn set_fatal_error(&mut self, message: Option<fmt::Arguments<'_>>) {
        if let Some(args) = message {
            tracing::warn!("Fatal scan error at {}: {args}", self.cursor.to_string_lossy());
        }
        self.errors.set_fatal_error(message);
    }

    pub fn clear_fatal_error(&mut self) {
        self.errors.clear_fatal_error();
    }

    pub fn has_fatal_error(&self) -> bool {
        self.errors.fatal().is_some()
    }

    /// Add an entry to the running totals.
    pub fn record(&mut self, entry: &ScratchEntry) {
        self.items += 1;
        self.size += entry.size;
        self.disk_usage += entry.disk_usage;
    }
}
