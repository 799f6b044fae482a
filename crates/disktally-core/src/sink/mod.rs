/// Destinations for scanned entries.
///
/// A driver reports entries depth-first: `item(entry, true)` opens a
/// directory whose children follow until the matching `leave()`. The first
/// item is the scan root and carries the full root path as its name.
pub mod export;
pub mod memory;

pub use export::{EntryRecord, ExportSink, Record};
pub use memory::MemorySink;

use crate::model::FileTree;
use crate::scan::ScratchEntry;
use std::io;

pub trait Sink {
    /// Link one entry under the current directory; `descend` makes it the
    /// current directory.
    fn item(&mut self, entry: &ScratchEntry, descend: bool) -> io::Result<()>;

    /// Close the current directory.
    fn leave(&mut self) -> io::Result<()>;

    /// Flush everything. The in-memory sink hands back its tree.
    fn finish(&mut self) -> io::Result<Option<FileTree>>;
}
