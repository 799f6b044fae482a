/// Wires the configured data source to the configured data sink.
///
/// Opening import and export files happens here, after option parsing, so
/// an unreadable `-f` or unwritable `-o` is reported as a usage error
/// before any interface is shown.
use crate::config::{Config, DataSink, DataSource, FileArg};
use crate::error::UsageError;
use crate::scan::walker::WalkOptions;
use crate::scan::{FreshScan, ImportDriver, SourceDriver};
use crate::sink::{ExportSink, MemorySink, Sink};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};

pub struct Pipeline {
    pub source: Box<dyn SourceDriver>,
    pub sink: Box<dyn Sink>,
    /// Whether the sink keeps a tree for browsing.
    pub browsable: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("browsable", &self.browsable)
            .finish_non_exhaustive()
    }
}

/// Open the source and the sink described by `config`.
pub fn open(config: &Config) -> Result<Pipeline, UsageError> {
    let source: Box<dyn SourceDriver> = match &config.source {
        DataSource::Scan(dir) => Box::new(FreshScan::new(dir, WalkOptions::from_config(config))),
        DataSource::Import(FileArg::Stdio) => {
            Box::new(ImportDriver::new(Box::new(io::stdin().lock())))
        }
        DataSource::Import(FileArg::Path(path)) => {
            let file = File::open(path).map_err(|e| UsageError::cant_open(path, e))?;
            tracing::info!("Importing from {}", path.display());
            Box::new(ImportDriver::new(Box::new(BufReader::new(file))))
        }
    };

    let (sink, browsable): (Box<dyn Sink>, bool) = match &config.sink {
        DataSink::Memory => (Box::new(MemorySink::new()), true),
        DataSink::Export(target) => {
            let out: Box<dyn io::Write> = match target {
                FileArg::Stdio => Box::new(BufWriter::new(io::stdout())),
                FileArg::Path(path) => {
                    let file = File::create(path).map_err(|e| UsageError::cant_open(path, e))?;
                    Box::new(BufWriter::new(file))
                }
            };
            let sink = ExportSink::new(out)
                .map_err(|e| UsageError::cant_open(target.display_path(), e))?;
            tracing::info!("Exporting to {}", target.display_path().display());
            (Box::new(sink), false)
        }
    };

    Ok(Pipeline {
        source,
        sink,
        browsable,
    })
}
