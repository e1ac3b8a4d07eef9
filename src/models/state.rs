//! Incremental sync bookmarks

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::Stream;
use crate::error::{AppError, Result};
use crate::normalize::parse_timestamp;

/// Watermark floor for streams with no saved bookmark
pub const DEFAULT_START_DATE: &str = "2000-01-01T00:00:00Z";

/// Per-stream watermarks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub leads: String,
    pub activities: String,
}

/// Prior-state file: every key is optional and unknown keys are ignored
#[derive(Debug, Default, Deserialize)]
struct StateFile {
    #[serde(default)]
    leads: Option<String>,
    #[serde(default)]
    activities: Option<String>,
}

impl SyncState {
    /// Fresh state with both watermarks at `floor`
    pub fn starting_at(floor: &str) -> Self {
        Self {
            leads: floor.to_string(),
            activities: floor.to_string(),
        }
    }

    /// Merge a prior-state JSON document over `floor`
    pub fn from_json(content: &str, floor: &str) -> Result<Self> {
        let saved: StateFile = serde_json::from_str(content)?;
        Ok(Self {
            leads: saved.leads.unwrap_or_else(|| floor.to_string()),
            activities: saved.activities.unwrap_or_else(|| floor.to_string()),
        })
    }

    /// Load state from an optional prior-state file
    pub fn load(path: Option<&Path>, floor: &str) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading state from {}", path.display());
                let content = fs::read_to_string(path)?;
                Self::from_json(&content, floor)
            }
            None => Ok(Self::starting_at(floor)),
        }
    }

    pub fn watermark(&self, stream: Stream) -> &str {
        match stream {
            Stream::Leads => &self.leads,
            Stream::Activities => &self.activities,
        }
    }

    fn watermark_mut(&mut self, stream: Stream) -> &mut String {
        match stream {
            Stream::Leads => &mut self.leads,
            Stream::Activities => &mut self.activities,
        }
    }

    /// Move a stream's watermark to `value`. Watermarks never move
    /// backwards; a value earlier than the current one is ignored and
    /// `false` is returned.
    pub fn advance(&mut self, stream: Stream, value: &str) -> Result<bool> {
        let next = parse_timestamp(value)
            .ok_or_else(|| AppError::UnrecognizedDate(value.to_string()))?;

        let current = self.watermark_mut(stream);
        if let Some(current_ts) = parse_timestamp(current) {
            if next < current_ts {
                tracing::warn!(
                    "Ignoring {} bookmark {} - earlier than current {}",
                    stream,
                    value,
                    current
                );
                return Ok(false);
            }
        }

        *current = value.to_string();
        Ok(true)
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::starting_at(DEFAULT_START_DATE)
    }
}
