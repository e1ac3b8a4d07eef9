//! Sync orchestration
//!
//! Streams run strictly in order (leads, then activities). Each page is
//! normalized, resolved, written and bookmarked before the next page is
//! requested, so a failed run resumes after the last completed page.

pub mod contacts;

use serde_json::Value;
use std::fmt;
use std::io::Write;

use crate::api::endpoints::{self, ListParams, PER_PAGE};
use crate::api::{CloseClient, Paginator};
use crate::error::{AppError, Result};
use crate::export::MessageWriter;
use crate::models::{Stream, SyncState};
use crate::normalize::{normalize_activity, normalize_lead};
use crate::schema::Schemas;

pub use contacts::resolve_contacts;

/// Where a stream is in its page cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    NotStarted,
    FetchingPage,
    WritingPage,
    Bookmarking,
    Done,
    Failed,
}

impl fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamPhase::NotStarted => "not started",
            StreamPhase::FetchingPage => "fetching page",
            StreamPhase::WritingPage => "writing page",
            StreamPhase::Bookmarking => "bookmarking",
            StreamPhase::Done => "done",
            StreamPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of one stream's sync
#[derive(Debug, Clone)]
pub struct StreamSummary {
    pub stream: Stream,
    pub phase: StreamPhase,
    pub pages: u64,
    pub records: u64,
}

impl StreamSummary {
    fn new(stream: Stream) -> Self {
        Self {
            stream,
            phase: StreamPhase::NotStarted,
            pages: 0,
            records: 0,
        }
    }

    fn enter(&mut self, phase: StreamPhase) {
        tracing::debug!("{}: {} -> {}", self.stream, self.phase, phase);
        self.phase = phase;
    }
}

/// Normalize a page in place; for leads, also resolve every contact.
/// Nothing from the page is written until this returns Ok.
async fn prepare_page(
    client: &CloseClient,
    stream: Stream,
    schemas: &Schemas,
    records: &mut [Value],
) -> Result<()> {
    match stream {
        Stream::Leads => {
            let schema = schemas.get(Stream::Leads);
            for lead in records.iter_mut() {
                normalize_lead(lead, schema)?;
            }
            for lead in records.iter_mut() {
                resolve_contacts(client, lead).await?;
            }
        }
        Stream::Activities => {
            for activity in records.iter_mut() {
                normalize_activity(activity)?;
            }
        }
    }
    Ok(())
}

/// Bookmark value carried by the last record of a page
fn page_bookmark(stream: Stream, records: &[Value]) -> Result<&str> {
    let field = stream.bookmark_field();
    records
        .last()
        .and_then(|record| record.get(field))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::Sync(format!("last {} record of the page has no {}", stream, field))
        })
}

async fn sync_pages<W: Write>(
    client: &CloseClient,
    stream: Stream,
    schemas: &Schemas,
    state: &mut SyncState,
    writer: &mut MessageWriter<W>,
    summary: &mut StreamSummary,
) -> Result<()> {
    let watermark = state.watermark(stream).to_string();
    tracing::info!("Fetching {} starting at {}", stream, watermark);

    let mut paginator = Paginator::new(
        client,
        stream.name(),
        endpoints::stream_path(stream),
        ListParams::for_stream(stream, &watermark),
    );

    loop {
        summary.enter(StreamPhase::FetchingPage);
        tracing::info!(
            "Fetching {} with offset {} and limit {}",
            stream,
            paginator.skip(),
            PER_PAGE
        );
        tracing::info!("Fetched {} {} in total", summary.records, stream);

        let mut page = match paginator.next_page().await? {
            Some(page) => page,
            None => break,
        };
        prepare_page(client, stream, schemas, &mut page.records).await?;

        summary.enter(StreamPhase::WritingPage);
        writer.write_records(stream, &page.records)?;

        summary.enter(StreamPhase::Bookmarking);
        let bookmark = page_bookmark(stream, &page.records)?;
        state.advance(stream, bookmark)?;
        writer.write_state(state)?;

        summary.pages += 1;
        summary.records += page.len() as u64;
    }

    Ok(())
}

/// Sync one stream from its current watermark to the end
pub async fn sync_stream<W: Write>(
    client: &CloseClient,
    stream: Stream,
    schemas: &Schemas,
    state: &mut SyncState,
    writer: &mut MessageWriter<W>,
) -> Result<StreamSummary> {
    let mut summary = StreamSummary::new(stream);

    match sync_pages(client, stream, schemas, state, writer, &mut summary).await {
        Ok(()) => {
            summary.enter(StreamPhase::Done);
            tracing::info!(
                "Finished {}: {} records over {} pages, bookmark {}",
                stream,
                summary.records,
                summary.pages,
                state.watermark(stream)
            );
            Ok(summary)
        }
        Err(e) => {
            summary.enter(StreamPhase::Failed);
            tracing::error!(
                "{} sync failed after {} pages ({} records): {}",
                stream,
                summary.pages,
                summary.records,
                e
            );
            Err(e)
        }
    }
}

/// Full run: both SCHEMA messages, then leads, then activities, then a
/// closing STATE.
pub async fn run_sync<W: Write>(
    client: &CloseClient,
    schemas: &Schemas,
    state: &mut SyncState,
    writer: &mut MessageWriter<W>,
) -> Result<Vec<StreamSummary>> {
    tracing::info!("Replicating all Close data, with starting state {:?}", state);

    for stream in Stream::ALL {
        writer.write_schema(stream, schemas.get(stream))?;
    }

    let mut summaries = Vec::with_capacity(Stream::ALL.len());
    for stream in Stream::ALL {
        summaries.push(sync_stream(client, stream, schemas, state, writer).await?);
    }

    writer.write_state(state)?;
    Ok(summaries)
}
