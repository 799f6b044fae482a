/// Replays an export file through the same cursor and sink as a fresh scan.
use super::scratch::ScratchSlot;
use super::{ScanState, SourceDriver, SourceStep, QUANTUM};
use crate::sink::export::FORMAT_PROGRAM;
use crate::sink::{EntryRecord, Record, Sink};
use std::io::{self, BufRead};

pub struct ImportDriver {
    input: Box<dyn BufRead>,
    line: String,
    line_no: u64,
    /// Directories currently open.
    depth: usize,
    header_seen: bool,
    slot: ScratchSlot,
}

/// Why a replay stopped early. Rendered into the fatal slot.
#[derive(Debug, thiserror::Error)]
enum ImportError {
    #[error("Error reading file: {0}")]
    Read(#[source] io::Error),
    #[error("Error writing to file: {0}")]
    Write(#[source] io::Error),
    #[error("Invalid JSON on line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: serde_json::Error,
    },
    #[error("Line {0}: not a disktally export")]
    NoHeader(u64),
    #[error("Line {0}: unexpected {1} record")]
    Unexpected(u64, &'static str),
    #[error("Unexpected end of file")]
    Truncated,
}

impl ImportDriver {
    pub fn new(input: Box<dyn BufRead>) -> Self {
        Self {
            input,
            line: String::new(),
            line_no: 0,
            depth: 0,
            header_seen: false,
            slot: ScratchSlot::default(),
        }
    }

    fn advance(&mut self, state: &mut ScanState, sink: &mut dyn Sink) -> Result<SourceStep, ImportError> {
        for _ in 0..QUANTUM {
            self.line.clear();
            let read = self.input.read_line(&mut self.line).map_err(ImportError::Read)?;
            if read == 0 {
                return Err(ImportError::Truncated);
            }
            self.line_no += 1;
            if self.line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(&self.line).map_err(|source| ImportError::Parse {
                line: self.line_no,
                source,
            })?;

            match record {
                Record::Header { program, version, .. } => {
                    if self.header_seen || program != FORMAT_PROGRAM {
                        return Err(ImportError::Unexpected(self.line_no, "header"));
                    }
                    tracing::info!("Importing export written by {program} {version}");
                    self.header_seen = true;
                }
                _ if !self.header_seen => return Err(ImportError::NoHeader(self.line_no)),
                Record::Dir(rec) => {
                    if self.depth == 0 {
                        state.cursor.set_root(rec.name_bytes());
                    } else {
                        state.cursor.enter(rec.name_bytes());
                    }
                    self.emit(&rec, true, state, sink)?;
                    self.depth += 1;
                }
                Record::Item(rec) => {
                    if self.depth == 0 {
                        return Err(ImportError::Unexpected(self.line_no, "item"));
                    }
                    state.cursor.enter(rec.name_bytes());
                    self.emit(&rec, false, state, sink)?;
                    state.cursor.leave();
                }
                Record::Leave => {
                    if self.depth == 0 {
                        return Err(ImportError::Unexpected(self.line_no, "leave"));
                    }
                    sink.leave().map_err(ImportError::Write)?;
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Ok(SourceStep::Finished);
                    }
                    state.cursor.leave();
                }
            }
        }
        Ok(SourceStep::Working)
    }

    fn emit(
        &mut self,
        rec: &EntryRecord,
        descend: bool,
        state: &mut ScanState,
        sink: &mut dyn Sink,
    ) -> Result<(), ImportError> {
        let entry = self.slot.acquire(rec.name_bytes());
        entry.kind = rec.kind;
        entry.size = rec.size;
        entry.disk_usage = rec.disk_usage;
        entry.mtime = rec.mtime;
        entry.is_error = rec.error;
        entry.excluded = rec.excluded;
        state.record(entry);
        sink.item(entry, descend).map_err(ImportError::Write)
    }
}

impl SourceDriver for ImportDriver {
    fn step(&mut self, state: &mut ScanState, sink: &mut dyn Sink) -> SourceStep {
        match self.advance(state, sink) {
            Ok(step) => step,
            Err(e) => {
                state.set_fatal_error(Some(format_args!("{e}")));
                SourceStep::Finished
            }
        }
    }
}
