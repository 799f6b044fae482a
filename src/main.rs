//! DiskTally: interactive terminal disk usage analyser.
//!
//! Thin binary entry point. All logic lives in the `disktally-core`
//! and `disktally-tui` crates.

use disktally_core::cli::{self, Invocation};
use disktally_core::pipeline;
use disktally_tui::{App, CrosstermConsole};
use std::env;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

/// Environment variable naming the log file. The terminal belongs to the
/// interface, so logs only go to a file.
const LOG_VAR: &str = "DISKTALLY_LOG";

fn init_logging() {
    let Some(path) = env::var_os(LOG_VAR) else {
        return;
    };
    match File::create(&path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => eprintln!(
            "disktally: can't open log file {}: {e}",
            path.to_string_lossy()
        ),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let no_color = env::var_os("NO_COLOR").is_some();
    let config = match cli::parse_args(env::args_os().skip(1), no_color) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            print!("{}", cli::help_text());
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Invocation::Version) => {
            println!("{}", cli::version_text());
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("disktally: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!("DiskTally {} starting", env!("CARGO_PKG_VERSION"));

    let pipeline = match pipeline::open(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("disktally: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let console = CrosstermConsole::new(config.needs_tty());
    let mut app = App::new(console, config, pipeline);
    let outcome = app.run()?;
    drop(app);

    Ok(ExitCode::from(outcome.exit_code as u8))
}
