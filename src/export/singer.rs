//! Newline-delimited JSON message sink
//!
//! Each stream gets one SCHEMA message, then RECORD messages, with a STATE
//! message after every page of records it covers.

use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;

use super::state_file::persist_state;
use crate::error::Result;
use crate::models::{Stream, SyncState};

/// One line of output
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message<'a> {
    Schema {
        stream: &'a str,
        schema: &'a Value,
        key_properties: &'a [&'a str],
    },
    Record {
        stream: &'a str,
        record: &'a Value,
    },
    State {
        value: &'a SyncState,
    },
}

/// Writes messages to `out` and, optionally, mirrors state to a file
pub struct MessageWriter<W: Write> {
    out: W,
    state_path: Option<PathBuf>,
    records_written: u64,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state_path: None,
            records_written: 0,
        }
    }

    /// Also persist every STATE to `path`
    pub fn with_state_file(mut self, path: Option<PathBuf>) -> Self {
        self.state_path = path;
        self
    }

    fn write_message(&mut self, message: &Message<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_schema(&mut self, stream: Stream, schema: &Value) -> Result<()> {
        self.write_message(&Message::Schema {
            stream: stream.name(),
            schema,
            key_properties: stream.key_properties(),
        })
    }

    pub fn write_records(&mut self, stream: Stream, records: &[Value]) -> Result<()> {
        for record in records {
            self.write_message(&Message::Record {
                stream: stream.name(),
                record,
            })?;
        }
        self.records_written += records.len() as u64;
        Ok(())
    }

    /// Emit a bookmark and flush; everything before it is durable once this returns
    pub fn write_state(&mut self, state: &SyncState) -> Result<()> {
        self.write_message(&Message::State { value: state })?;
        self.out.flush()?;
        if let Some(path) = &self.state_path {
            persist_state(path, state)?;
        }
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Parse written output back into JSON lines
#[cfg(test)]
pub(crate) fn parse_lines(bytes: &[u8]) -> Vec<Value> {
    std::str::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
