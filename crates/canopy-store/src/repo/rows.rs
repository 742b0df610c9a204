//! Row decoding for the pages, versions and slot_policies tables

#![allow(clippy::result_large_err)]

use canopy_core::digest::content_digest;
use canopy_core::model::{SlotPolicy, Version, VersionStatus, WidgetRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use std::collections::BTreeMap;

use crate::errors::{corrupt_row, digest_mismatch, from_serde_json, Result};

/// Columns selected for every version query, in `VersionRow` order
pub(crate) const VERSION_COLUMNS: &str = "id, page_id, sequence, status, created_at, \
     published_at, description, restored_from, slots_json, content_digest";

/// Timestamps are stored as RFC 3339 text with full precision
pub(crate) fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_time(table: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt_row(table, format!("bad timestamp {raw:?}: {e}")))
}

/// A versions row before JSON and status decoding
pub(crate) struct VersionRow {
    id: String,
    page_id: String,
    sequence: i64,
    status: String,
    created_at: String,
    published_at: Option<String>,
    description: Option<String>,
    restored_from: Option<String>,
    slots_json: String,
    content_digest: String,
}

impl VersionRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            page_id: row.get(1)?,
            sequence: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
            published_at: row.get(5)?,
            description: row.get(6)?,
            restored_from: row.get(7)?,
            slots_json: row.get(8)?,
            content_digest: row.get(9)?,
        })
    }

    /// Decode into a `Version`, verifying the stored content digest
    pub(crate) fn into_version(self) -> Result<Version> {
        let status = VersionStatus::parse(&self.status)
            .ok_or_else(|| corrupt_row("versions", format!("unknown status {:?}", self.status)))?;
        let sequence = u64::try_from(self.sequence)
            .map_err(|_| corrupt_row("versions", format!("negative sequence {}", self.sequence)))?;
        let slots: BTreeMap<String, Vec<WidgetRecord>> =
            serde_json::from_str(&self.slots_json).map_err(from_serde_json)?;

        let computed = content_digest(&slots);
        if computed != self.content_digest {
            return Err(digest_mismatch(&self.id, &self.content_digest, &computed));
        }

        Ok(Version {
            created_at: decode_time("versions", &self.created_at)?,
            published_at: self
                .published_at
                .as_deref()
                .map(|raw| decode_time("versions", raw))
                .transpose()?,
            id: self.id,
            page_id: self.page_id,
            sequence,
            status,
            description: self.description,
            restored_from: self.restored_from,
            slots,
        })
    }
}

pub(crate) fn slot_policy_from_row(row: &Row<'_>) -> rusqlite::Result<SlotPolicy> {
    let max_widgets: Option<i64> = row.get(2)?;
    Ok(SlotPolicy {
        allows_inheritance: row.get(0)?,
        allow_merge: row.get(1)?,
        max_widgets: max_widgets.and_then(|m| usize::try_from(m).ok()),
    })
}
