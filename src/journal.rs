//! Daily JSONL log of recommendation and seller-lookup outcomes.

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use common::RecommendError;
use recommendation_engine::Recommendation;
use seller_resolver::{LookupSource, SellerLookup};

/// One journal record. Serialized with an `event` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    RecommendOk {
        request_id: String,
        reference: String,
        origin: &'static str,
        primary_failure: Option<&'static str>,
        category: String,
        alternatives: usize,
        elapsed_ms: u64,
    },
    RecommendFailed {
        reference: String,
        code: &'static str,
        primary: Option<&'static str>,
        secondary: Option<&'static str>,
    },
    SellerLookup {
        product: String,
        brand: String,
        current_platform: String,
        source: LookupSource,
        total_found: usize,
    },
}

impl JournalEvent {
    pub fn recommend_ok(rec: &Recommendation) -> Self {
        Self::RecommendOk {
            request_id: rec.request_id.to_string(),
            reference: rec.result.reference.canonical_url.clone(),
            origin: rec.origin.as_str(),
            primary_failure: rec.primary_failure.as_ref().map(|e| e.code()),
            category: rec.result.category.clone(),
            alternatives: rec.result.alternatives.len(),
            elapsed_ms: rec.elapsed.as_millis() as u64,
        }
    }

    pub fn recommend_failed(reference: &str, err: &RecommendError) -> Self {
        let (primary, secondary) = match err {
            RecommendError::Exhausted { primary, secondary } => {
                (Some(primary.code()), Some(secondary.code()))
            }
            RecommendError::Cancelled => (None, None),
        };
        Self::RecommendFailed {
            reference: reference.to_string(),
            code: err.code(),
            primary,
            secondary,
        }
    }

    pub fn seller_lookup(
        product: &str,
        brand: &str,
        current_platform: &str,
        lookup: &SellerLookup,
    ) -> Self {
        Self::SellerLookup {
            product: product.to_string(),
            brand: brand.to_string(),
            current_platform: current_platform.to_string(),
            source: lookup.source,
            total_found: lookup.total_found,
        }
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a JournalEvent,
}

/// `$EVENTS_DIR/alt-finder` when set, else `events/alt-finder` under the
/// working directory.
pub fn resolve_events_dir(events_dir: Option<String>) -> PathBuf {
    let base = events_dir
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("events"));
    base.join("alt-finder")
}

/// Append-only event log, one file per UTC day. Each record opens the
/// day's file, so a long shell session rolls over at midnight.
pub struct EventJournal {
    dir: PathBuf,
}

impl EventJournal {
    pub fn open(dir: PathBuf) -> std::io::Result<Self> {
        create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("events-{}.jsonl", day.format("%Y-%m-%d")))
    }

    pub fn current_file(&self) -> PathBuf {
        self.path_for(Utc::now().date_naive())
    }

    fn append(&self, event: &JournalEvent) -> std::io::Result<()> {
        let now = Utc::now();
        let entry = Entry {
            ts: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };
        let line = serde_json::to_string(&entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(now.date_naive()))?;
        writeln!(file, "{line}")
    }

    /// Failures are logged and swallowed; the journal never fails a request.
    pub fn record(&self, event: &JournalEvent) {
        if let Err(e) = self.append(event) {
            tracing::warn!("journal write failed: {}", e);
        }
    }
}
