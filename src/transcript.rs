//! Record of the commands run in a session and what they printed.
//!
//! Serialized as JSON lines, one object per command, so scripted runs can be
//! post-processed.

use std::io::Write;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::errors::SessionResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// When the command was sent
    pub at: Timestamp,
    pub host: String,
    pub command: String,
    /// Text received up to and including the prompt
    pub output: String,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    host: String,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            entries: Vec::new(),
        }
    }

    /// Append the outcome of one `send_message` call
    ///
    /// Failed commands are recorded with the error text and whatever output
    /// the error carried.
    pub fn record(
        &mut self,
        at: Timestamp,
        command: &str,
        result: &SessionResult<String>,
        elapsed: Duration,
    ) -> &TranscriptEntry {
        let (output, error) = match result {
            Ok(output) => (output.clone(), None),
            Err(e) => (
                e.received()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .unwrap_or_default(),
                Some(e.to_string()),
            ),
        };

        self.entries.push(TranscriptEntry {
            at,
            host: self.host.clone(),
            command: command.to_string(),
            output,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    /// Write every entry as one JSON object per line
    pub fn write_json_lines(&self, mut writer: impl Write) -> std::io::Result<()> {
        for entry in &self.entries {
            serde_json::to_writer(&mut writer, entry)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}
