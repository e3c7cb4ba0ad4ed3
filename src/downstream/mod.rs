//! Downstream hand-off.
//!
//! Records that pass the dedup gate are handed to a [`Downstream`]
//! consumer once per pass, as one batch. The consumer is external (a text
//! analysis service, a notifier); this module only defines the seam and two
//! stock implementations.
//!
//! # Implementations
//!
//! | Type | Behaviour |
//! |------|-----------|
//! | [`LogDownstream`] | Logs the batch; never fails |
//! | [`CommandDownstream`] | Pipes the batch as a JSON array to a program's stdin |

use crate::{Error, Result};
use serde_json::Value;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{info, instrument};

/// Consumer of newly seen snapshot records.
pub trait Downstream: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Hands `records` over.
    ///
    /// Returning `Ok` confirms delivery of the whole batch; the records are
    /// then never offered again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Downstream`] if the batch was not accepted. The
    /// records stay eligible for the next pass.
    fn deliver(&self, records: &[Value]) -> Result<()>;
}

/// Logs each batch at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDownstream;

impl Downstream for LogDownstream {
    fn name(&self) -> &'static str {
        "log"
    }

    fn deliver(&self, records: &[Value]) -> Result<()> {
        for record in records {
            let title = record.get("title").and_then(Value::as_str).unwrap_or("");
            info!(title, "new record");
        }
        info!(count = records.len(), "handed off new records");
        Ok(())
    }
}

/// Runs a program per batch and writes the batch to its stdin.
///
/// The program's stdout and stderr are inherited. A non-zero exit status
/// counts as a failed hand-off.
#[derive(Debug, Clone)]
pub struct CommandDownstream {
    program: String,
    args: Vec<String>,
}

impl CommandDownstream {
    /// Creates a downstream from an argv vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `argv` is empty.
    pub fn new(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Config("downstream command must not be empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Downstream for CommandDownstream {
    fn name(&self) -> &'static str {
        "command"
    }

    #[instrument(skip(self, records), fields(program = %self.program, count = records.len()))]
    fn deliver(&self, records: &[Value]) -> Result<()> {
        let start = Instant::now();
        let payload = serde_json::to_vec(records)
            .map_err(|e| Error::Downstream(format!("failed to encode batch: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Downstream(format!("failed to start '{}': {e}", self.program)))?;

        // stdin is closed before waiting so the program sees end of input.
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(&payload));

        let status = child
            .wait()
            .map_err(|e| Error::Downstream(format!("failed to wait for '{}': {e}", self.program)))?;
        written.map_err(|e| Error::Downstream(format!("failed to write batch: {e}")))?;
        tracing::debug!(elapsed_ms = start.elapsed().as_millis(), %status, "downstream command finished");

        if status.success() {
            Ok(())
        } else {
            Err(Error::Downstream(format!("'{}' exited with {status}", self.program)))
        }
    }
}

/// Builds the configured downstream: a command when one is given, logging
/// otherwise.
///
/// # Errors
///
/// Returns [`Error::Config`] if `command` is present but empty.
pub fn from_command(command: Option<&[String]>) -> Result<Box<dyn Downstream>> {
    match command {
        Some(argv) => Ok(Box::new(CommandDownstream::new(argv)?)),
        None => Ok(Box::new(LogDownstream)),
    }
}
