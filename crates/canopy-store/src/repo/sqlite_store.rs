//! SQLite-backed store
//!
//! One connection behind a mutex serves every trait. Writes that must be
//! atomic (a publishing `put_version`, the `promote` swap) run inside an
//! immediate transaction so a second connection to the same file waits on
//! the write lock instead of interleaving.

#![allow(clippy::result_large_err)]

use canopy_core::digest::content_digest;
use canopy_core::errors::{CanopyError, ExError, ExErrorKind, ExResult};
use canopy_core::model::{
    Page, PublishOutcome, SlotPolicy, Version, VersionContent, VersionStatus,
};
use canopy_core::ports::{PageHierarchy, SlotPolicyRegistry, VersionStore};
use canopy_core::traversal::{collect_ancestor_chain, ParentLink};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use super::rows::{decode_time, encode_time, slot_policy_from_row, VersionRow, VERSION_COLUMNS};
use crate::db;
use crate::errors::{from_rusqlite, from_serde_json, Result};
use crate::migrations::apply_migrations;

/// SQLite store for pages, versions and slot policies
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self::from_connection(conn))
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            CanopyError::LockPoisoned {
                message: "sqlite connection".to_string(),
            }
            .into()
        })
    }

    /// Add a page to the tree
    ///
    /// # Errors
    /// * `InvalidInput` - Page id is empty
    /// * `AlreadyExists` - Page id is taken
    /// * `NotFound` - Parent page doesn't exist
    pub fn create_page(&self, page: Page) -> Result<Page> {
        if page.id.trim().is_empty() {
            return Err(CanopyError::EmptyPageId.into());
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        if page_exists(&tx, &page.id)? {
            return Err(CanopyError::PageAlreadyExists {
                page_id: page.id.clone(),
            }
            .into());
        }
        if let Some(parent_id) = &page.parent_id {
            if !page_exists(&tx, parent_id)? {
                return Err(CanopyError::ParentNotFound {
                    page_id: parent_id.clone(),
                }
                .into());
            }
        }

        tx.execute(
            "INSERT INTO pages (id, title, parent_id, layout_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                page.id,
                page.title,
                page.parent_id,
                page.layout_id,
                encode_time(page.created_at),
            ],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        Ok(Page {
            children: Vec::new(),
            ..page
        })
    }

    /// All pages in creation order
    pub fn list_pages(&self) -> Result<Vec<Page>> {
        let conn = self.lock()?;
        let ids: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT id FROM pages ORDER BY rowid")
                .map_err(from_rusqlite)?;
            let rows = stmt
                .query_map([], |row| row.get(0))
                .map_err(from_rusqlite)?;
            rows.collect::<std::result::Result<_, _>>()
                .map_err(from_rusqlite)?
        };
        ids.iter()
            .map(|id| -> Result<Page> {
                load_page(&conn, id)?.ok_or_else(|| {
                    CanopyError::PageNotFound {
                        page_id: id.clone(),
                    }
                    .into()
                })
            })
            .collect()
    }

    /// Register (or replace) the policy for a layout's slot
    ///
    /// # Errors
    /// * `InvalidInput` - Slot name is empty
    pub fn set_slot_policy(&self, layout_id: &str, slot_name: &str, policy: SlotPolicy) -> Result<()> {
        if slot_name.trim().is_empty() {
            return Err(CanopyError::EmptySlotName.into());
        }
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO slot_policies (layout_id, slot_name, allows_inheritance, allow_merge, max_widgets)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(layout_id, slot_name) DO UPDATE SET
                allows_inheritance = excluded.allows_inheritance,
                allow_merge = excluded.allow_merge,
                max_widgets = excluded.max_widgets",
            params![
                layout_id,
                slot_name,
                policy.allows_inheritance,
                policy.allow_merge,
                policy.max_widgets.map(|m| m as i64),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }
}

fn page_exists(conn: &Connection, page_id: &str) -> Result<bool> {
    conn.query_row("SELECT 1 FROM pages WHERE id = ?1", [page_id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(from_rusqlite)
}

fn load_page(conn: &Connection, page_id: &str) -> Result<Option<Page>> {
    let row = conn
        .query_row(
            "SELECT id, title, parent_id, layout_id, created_at FROM pages WHERE id = ?1",
            [page_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()
        .map_err(from_rusqlite)?;
    let Some((id, title, parent_id, layout_id, created_at)) = row else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare("SELECT id FROM pages WHERE parent_id = ?1 ORDER BY rowid")
        .map_err(from_rusqlite)?;
    let children = stmt
        .query_map([page_id], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;

    Ok(Some(Page {
        id,
        title,
        parent_id,
        children,
        layout_id,
        created_at: decode_time("pages", &created_at)?,
    }))
}

fn parent_link(conn: &Connection, page_id: &str) -> Result<ParentLink> {
    let parent: Option<Option<String>> = conn
        .query_row("SELECT parent_id FROM pages WHERE id = ?1", [page_id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(from_rusqlite)?;
    Ok(match parent {
        None => ParentLink::Missing,
        Some(None) => ParentLink::Root,
        Some(Some(parent_id)) => ParentLink::Parent(parent_id),
    })
}

fn query_versions(conn: &Connection, where_clause: &str, arg: &str) -> Result<Vec<Version>> {
    let sql = format!("SELECT {VERSION_COLUMNS} FROM versions WHERE {where_clause}");
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([arg], VersionRow::from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    rows.into_iter().map(VersionRow::into_version).collect()
}

fn load_version(conn: &Connection, version_id: &str) -> Result<Option<Version>> {
    Ok(query_versions(conn, "id = ?1", version_id)?.into_iter().next())
}

fn current_version(conn: &Connection, page_id: &str) -> Result<Option<Version>> {
    let mut published = query_versions(
        conn,
        "page_id = ?1 AND status = 'published' ORDER BY sequence",
        page_id,
    )?;
    match published.len() {
        0 | 1 => Ok(published.pop()),
        count => Err(CanopyError::MultipleCurrentVersions {
            page_id: page_id.to_string(),
            count,
            version_ids: published.into_iter().map(|v| v.id).collect(),
        }
        .into()),
    }
}

/// Archive the page's current version inside a write transaction
fn demote_current(tx: &Transaction<'_>, page_id: &str) -> Result<Option<Version>> {
    let Some(mut current) = current_version(tx, page_id)? else {
        return Ok(None);
    };
    tx.execute(
        "UPDATE versions SET status = 'archived' WHERE id = ?1",
        [&current.id],
    )
    .map_err(from_rusqlite)?;
    current.status = VersionStatus::Archived;
    Ok(Some(current))
}

fn not_found(version_id: &str) -> ExError {
    CanopyError::VersionNotFound {
        version_id: version_id.to_string(),
    }
    .into()
}

impl PageHierarchy for SqliteStore {
    fn get_page(&self, page_id: &str) -> ExResult<Page> {
        let conn = self.lock()?;
        load_page(&conn, page_id)?.ok_or_else(|| {
            CanopyError::PageNotFound {
                page_id: page_id.to_string(),
            }
            .into()
        })
    }

    fn get_parent(&self, page_id: &str) -> ExResult<Option<String>> {
        let conn = self.lock()?;
        match parent_link(&conn, page_id)? {
            ParentLink::Missing => Err(CanopyError::PageNotFound {
                page_id: page_id.to_string(),
            }
            .into()),
            ParentLink::Root => Ok(None),
            ParentLink::Parent(parent_id) => Ok(Some(parent_id)),
        }
    }

    fn get_ancestor_chain(&self, page_id: &str) -> ExResult<Vec<String>> {
        let conn = self.lock()?;
        collect_ancestor_chain(page_id, |id| parent_link(&conn, id))
    }
}

impl VersionStore for SqliteStore {
    fn get_published_version(&self, page_id: &str) -> ExResult<Option<Version>> {
        let conn = self.lock()?;
        current_version(&conn, page_id)
    }

    fn get_latest_draft(&self, page_id: &str) -> ExResult<Option<Version>> {
        let conn = self.lock()?;
        Ok(query_versions(
            &conn,
            "page_id = ?1 AND status = 'draft' ORDER BY sequence DESC LIMIT 1",
            page_id,
        )?
        .into_iter()
        .next())
    }

    fn get_version(&self, version_id: &str) -> ExResult<Version> {
        let conn = self.lock()?;
        load_version(&conn, version_id)?.ok_or_else(|| not_found(version_id))
    }

    fn list_versions(&self, page_id: &str) -> ExResult<Vec<Version>> {
        let conn = self.lock()?;
        query_versions(&conn, "page_id = ?1 ORDER BY sequence", page_id)
    }

    fn put_version(
        &self,
        page_id: &str,
        content: VersionContent,
        status: VersionStatus,
        restored_from: Option<&str>,
    ) -> ExResult<Version> {
        if status == VersionStatus::Archived {
            return Err(CanopyError::InvalidInitialStatus {
                page_id: page_id.to_string(),
                status,
            }
            .into());
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        if !page_exists(&tx, page_id)? {
            return Err(CanopyError::PageNotFound {
                page_id: page_id.to_string(),
            }
            .into());
        }

        let last_sequence: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(sequence), 0) FROM versions WHERE page_id = ?1",
                [page_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;

        if status == VersionStatus::Published {
            demote_current(&tx, page_id)?;
        }

        let now = Utc::now();
        let version = Version {
            id: Uuid::now_v7().to_string(),
            page_id: page_id.to_string(),
            sequence: u64::try_from(last_sequence + 1).map_err(|_| {
                ExError::new(ExErrorKind::InconsistentState)
                    .with_page_id(page_id)
                    .with_message(format!("negative sequence {last_sequence}"))
            })?,
            status,
            created_at: now,
            published_at: (status == VersionStatus::Published).then_some(now),
            description: content.description,
            restored_from: restored_from.map(str::to_string),
            slots: content.slots,
        };

        let slots_json = serde_json::to_string(&version.slots).map_err(from_serde_json)?;
        tx.execute(
            &format!(
                "INSERT INTO versions ({VERSION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                version.id,
                version.page_id,
                last_sequence + 1,
                version.status.as_str(),
                encode_time(version.created_at),
                version.published_at.map(encode_time),
                version.description,
                version.restored_from,
                slots_json,
                content_digest(&version.slots),
            ],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        Ok(version)
    }

    fn promote(&self, version_id: &str, at: DateTime<Utc>) -> ExResult<PublishOutcome> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        let mut target = load_version(&tx, version_id)?.ok_or_else(|| not_found(version_id))?;
        if !target.status.can_publish() {
            return Err(CanopyError::InvalidTransition {
                version_id: version_id.to_string(),
                status: target.status,
                action: "publish".to_string(),
            }
            .into());
        }

        // Archive first: the partial unique index rejects two published rows
        let archived = demote_current(&tx, &target.page_id)?;

        tx.execute(
            "UPDATE versions SET status = 'published', published_at = ?1 WHERE id = ?2",
            params![encode_time(at), version_id],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        target.status = VersionStatus::Published;
        target.published_at = Some(at);
        Ok(PublishOutcome {
            published: target,
            archived,
        })
    }
}

impl SlotPolicyRegistry for SqliteStore {
    fn get_slot_policy(&self, layout_id: &str, slot_name: &str) -> ExResult<Option<SlotPolicy>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT allows_inheritance, allow_merge, max_widgets
             FROM slot_policies WHERE layout_id = ?1 AND slot_name = ?2",
            [layout_id, slot_name],
            slot_policy_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }
}
