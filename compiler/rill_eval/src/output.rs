//! Destination for script output.
//!
//! `print`, `cat`, `str`, signature listings and every other builtin that
//! produces text write through an [`OutputHandler`]:
//! - `Stdout`: the process's standard output (default)
//! - `Buffer`: captured text, read back by tests and embedding hosts
//! - `Silent`: discarded
//!
//! Handlers are shared as [`SharedOutput`] so a host can keep a reference
//! and read what a script printed after the run.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::OutputMode;

/// Output sink, dispatched by enum rather than trait object.
#[derive(Debug)]
pub enum OutputHandler {
    Stdout,
    Buffer(Mutex<String>),
    Silent,
}

impl OutputHandler {
    /// Append `text` without adding a newline.
    pub fn write(&self, text: &str) {
        match self {
            Self::Stdout => {
                let mut stdout = std::io::stdout().lock();
                if let Err(err) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
                    tracing::warn!(%err, "failed to write script output");
                }
            }
            Self::Buffer(buffer) => buffer.lock().push_str(text),
            Self::Silent => {}
        }
    }

    /// Append `text` followed by a newline.
    pub fn write_line(&self, text: &str) {
        match self {
            Self::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(text);
                buffer.push('\n');
            }
            _ => {
                self.write(text);
                self.write("\n");
            }
        }
    }

    /// Everything captured so far; empty for handlers that do not capture.
    pub fn captured(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    /// Return and clear the captured text.
    pub fn take(&self) -> String {
        match self {
            Self::Buffer(buffer) => std::mem::take(&mut *buffer.lock()),
            Self::Stdout | Self::Silent => String::new(),
        }
    }
}

/// Output handler shared between an interpreter and its host.
pub type SharedOutput = Arc<OutputHandler>;

pub fn stdout_handler() -> SharedOutput {
    Arc::new(OutputHandler::Stdout)
}

pub fn buffer_handler() -> SharedOutput {
    Arc::new(OutputHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedOutput {
    Arc::new(OutputHandler::Silent)
}

/// Handler for a configured output mode.
pub fn handler_for(mode: OutputMode) -> SharedOutput {
    match mode {
        OutputMode::Stdout => stdout_handler(),
        OutputMode::Buffer => buffer_handler(),
        OutputMode::Silent => silent_handler(),
    }
}

#[cfg(test)]
mod tests;
