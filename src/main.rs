mod app;
mod cli;
mod input;
mod selection;
mod store;
mod supervisor;
mod theme;
mod tui;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_path().as_deref());

    tui::run_tui(&cli)
        .await
        .inspect_err(|err| error!(error = %format!("{err:#}"), "quickstream failed"))
}

/// Logs go to a file so they never draw over the alternate screen. Without
/// one they are discarded.
fn init_tracing(log_path: Option<&Path>) {
    let filter = EnvFilter::try_from_env("QUICKSTREAM_LOG")
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let is_json = matches!(
        std::env::var("QUICKSTREAM_LOG_FORMAT").ok().as_deref(),
        Some("json" | "JSON")
    );

    let writer = match log_sink(log_path) {
        LogSink::File(file) => BoxMakeWriter::new(Mutex::new(file)),
        LogSink::Discard(reason) => {
            if let Some(reason) = reason {
                // Printed before the TUI takes over the terminal.
                eprintln!("quickstream: logging disabled: {reason}");
            }
            BoxMakeWriter::new(io::sink)
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);
    if is_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[derive(Debug)]
enum LogSink {
    File(fs::File),
    Discard(Option<String>),
}

fn log_sink(path: Option<&Path>) -> LogSink {
    let Some(path) = path else {
        return LogSink::Discard(None);
    };
    match open_log_file(path) {
        Ok(file) => LogSink::File(file),
        Err(err) => LogSink::Discard(Some(format!("cannot open {}: {err}", path.display()))),
    }
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
