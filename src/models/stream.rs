//! The two streams this extractor knows about

use serde::{Deserialize, Serialize};
use std::fmt;

/// A record stream exported by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    Leads,
    Activities,
}

impl Stream {
    /// Sync order: leads are fully flushed before activities start
    pub const ALL: [Stream; 2] = [Stream::Leads, Stream::Activities];

    pub fn name(&self) -> &'static str {
        match self {
            Stream::Leads => "leads",
            Stream::Activities => "activities",
        }
    }

    /// Record field the watermark is taken from
    pub fn bookmark_field(&self) -> &'static str {
        match self {
            Stream::Leads => "date_updated",
            Stream::Activities => "date_created",
        }
    }

    pub fn key_properties(&self) -> &'static [&'static str] {
        &["id"]
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
