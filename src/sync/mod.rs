//! Remote sync.
//!
//! Flattens every sector's records into one table tagged with sector and
//! institution name, then pushes it to each configured `RemoteSink`.
//! Sync only ever reads a `Snapshot`, so a failing sink cannot touch the
//! live session.

pub mod webhook;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::storage::Snapshot;
use crate::types::{DecisionCategory, Sector};

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One flattened record, ready for a spreadsheet-like sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub institution: String,
    pub sector: Sector,
    pub category: DecisionCategory,
    pub label: String,
    pub amount: Decimal,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

/// Flatten all sectors' records, sector order first, insertion order within.
pub fn flatten_records(snapshot: &Snapshot) -> Vec<SheetRow> {
    snapshot
        .sectors
        .iter()
        .flat_map(|(sector, s)| {
            s.records.iter().map(move |r| SheetRow {
                institution: snapshot.institution_name.clone(),
                sector: *sector,
                category: r.category,
                label: r.label.clone(),
                amount: r.amount,
                notes: r.notes.clone(),
                timestamp: r.timestamp,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Destination for flattened rows. Pushes are all-or-nothing per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteSink: Send + Sync {
    async fn push_rows(&self, institution: &str, rows: &[SheetRow]) -> Result<()>;

    /// Sink name for logging and reports.
    fn name(&self) -> String;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkResult {
    pub sink: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub rows: usize,
    pub results: Vec<SinkResult>,
}

impl SyncReport {
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|r| r.ok)
    }
}

/// Pushes a snapshot's rows to every sink concurrently.
pub struct SyncDispatcher {
    sinks: Vec<Box<dyn RemoteSink>>,
}

impl SyncDispatcher {
    pub fn new(sinks: Vec<Box<dyn RemoteSink>>) -> Self {
        Self { sinks }
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub async fn sync(&self, snapshot: &Snapshot) -> SyncReport {
        let rows = flatten_records(snapshot);
        let institution = snapshot.institution_name.as_str();

        let pushes = self.sinks.iter().map(|sink| {
            let rows = &rows;
            async move {
                let name = sink.name();
                match sink.push_rows(institution, rows).await {
                    Ok(()) => SinkResult { sink: name, ok: true, error: None },
                    Err(e) => {
                        warn!(sink = %name, error = %e, "Remote sync failed");
                        SinkResult { sink: name, ok: false, error: Some(format!("{e:#}")) }
                    }
                }
            }
        });
        let results = join_all(pushes).await;

        info!(
            institution,
            rows = rows.len(),
            sinks = results.len(),
            failed = results.iter().filter(|r| !r.ok).count(),
            "Remote sync complete"
        );

        SyncReport { rows: rows.len(), results }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
