//! Log writer module
//!
//! Picks the output target for the global subscriber: stdout, or a file
//! opened in append mode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Build the writer for the configured target
pub fn make_writer(log_file: Option<&str>) -> io::Result<BoxMakeWriter> {
    match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(io::stdout)),
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
