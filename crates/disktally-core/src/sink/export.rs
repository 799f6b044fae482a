/// JSON Lines export: one header record, then `dir` / `item` / `leave`
/// records in depth-first order.
///
/// ```text
/// {"type":"header","program":"disktally","version":"0.1.0","timestamp":1760000000}
/// {"type":"dir","name":"/data","kind":"dir","size":4096,"disk_usage":4096}
/// {"type":"item","name":"a.txt","kind":"file","size":12,"disk_usage":4096,"mtime":1759990000}
/// {"type":"leave"}
/// ```
use super::Sink;
use crate::model::{EntryKind, ExcludeReason, FileTree};
use crate::scan::ScratchEntry;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Program name written into, and required from, the header record.
pub const FORMAT_PROGRAM: &str = "disktally";

/// One line of an export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    Header {
        program: String,
        version: String,
        /// Unix time the export started.
        timestamp: i64,
    },
    /// A directory; its children follow until the matching `Leave`.
    Dir(EntryRecord),
    Item(EntryRecord),
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    /// The name bytes, present only when `name` is a lossy rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<Vec<u8>>,
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub disk_usage: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded: Option<ExcludeReason>,
}

impl EntryRecord {
    pub fn from_entry(entry: &ScratchEntry) -> Self {
        Self {
            name: entry.name_lossy().into_owned(),
            raw_name: std::str::from_utf8(entry.name())
                .is_err()
                .then(|| entry.name().to_vec()),
            kind: entry.kind,
            size: entry.size,
            disk_usage: entry.disk_usage,
            mtime: entry.mtime,
            error: entry.is_error,
            excluded: entry.excluded,
        }
    }

    /// The entry name as it was on disk.
    pub fn name_bytes(&self) -> &[u8] {
        self.raw_name.as_deref().unwrap_or(self.name.as_bytes())
    }
}

/// Streams records to any writer. A write failure is returned to the
/// driver, which turns it into a fatal scan error.
pub struct ExportSink {
    out: Box<dyn Write>,
    records: u64,
}

impl ExportSink {
    /// Wrap `out` and write the header record immediately.
    pub fn new(out: Box<dyn Write>) -> io::Result<Self> {
        let mut sink = Self { out, records: 0 };
        sink.write(&Record::Header {
            program: FORMAT_PROGRAM.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        })?;
        Ok(sink)
    }

    fn write(&mut self, record: &Record) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }
}

impl Sink for ExportSink {
    fn item(&mut self, entry: &ScratchEntry, descend: bool) -> io::Result<()> {
        let rec = EntryRecord::from_entry(entry);
        self.write(&if descend { Record::Dir(rec) } else { Record::Item(rec) })
    }

    fn leave(&mut self) -> io::Result<()> {
        self.write(&Record::Leave)
    }

    fn finish(&mut self) -> io::Result<Option<FileTree>> {
        self.out.flush()?;
        tracing::info!("Export complete: {} records", self.records);
        Ok(None)
    }
}
