//! Version service: append-only diagram snapshots.
//!
//! DESIGN
//! ======
//! Each update-save writes one row holding the saved `canvas_data` and
//! `svg_data`, keyed by a millisecond timestamp that is unique per diagram.
//! Rows are never pruned; they disappear only when the diagram is deleted.

#[cfg(test)]
#[path = "version_test.rs"]
mod version_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const VERSION_COLUMNS: &str =
    "id, diagram_id, version_ts, canvas_data, svg_data, (EXTRACT(EPOCH FROM created_at) * 1000)::BIGINT";

type VersionTuple = (Uuid, Uuid, i64, Option<serde_json::Value>, Option<String>, i64);

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("version {version_ts} not found for diagram {diagram_id}")]
    NotFound { diagram_id: Uuid, version_ts: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRow {
    pub id: Uuid,
    pub diagram_id: Uuid,
    pub version_ts: i64,
    pub canvas_data: Option<serde_json::Value>,
    pub svg_data: Option<String>,
    pub created_at: i64,
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Timestamp for a new version: the wall clock, bumped past the latest
/// existing version so timestamps stay strictly increasing per diagram.
fn next_version_ts(now: i64, latest: Option<i64>) -> i64 {
    match latest {
        Some(latest) if latest >= now => latest + 1,
        _ => now,
    }
}

fn row_from_tuple((id, diagram_id, version_ts, canvas_data, svg_data, created_at): VersionTuple) -> VersionRow {
    VersionRow { id, diagram_id, version_ts, canvas_data, svg_data, created_at }
}

/// Append a snapshot for `diagram_id`.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn record_version(
    pool: &PgPool,
    diagram_id: Uuid,
    canvas_data: Option<serde_json::Value>,
    svg_data: Option<String>,
) -> Result<VersionRow, VersionError> {
    let latest: Option<i64> = sqlx::query_scalar("SELECT MAX(version_ts) FROM diagram_versions WHERE diagram_id = $1")
        .bind(diagram_id)
        .fetch_one(pool)
        .await?;
    let version_ts = next_version_ts(now_ms(), latest);

    let sql = format!(
        "INSERT INTO diagram_versions (id, diagram_id, version_ts, canvas_data, svg_data) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {VERSION_COLUMNS}"
    );
    let row = sqlx::query_as::<_, VersionTuple>(&sql)
        .bind(Uuid::new_v4())
        .bind(diagram_id)
        .bind(version_ts)
        .bind(canvas_data)
        .bind(svg_data)
        .fetch_one(pool)
        .await?;

    debug!(%diagram_id, version_ts, "diagram version recorded");
    Ok(row_from_tuple(row))
}

/// All versions of a diagram, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_versions(pool: &PgPool, diagram_id: Uuid) -> Result<Vec<VersionRow>, VersionError> {
    let sql = format!("SELECT {VERSION_COLUMNS} FROM diagram_versions WHERE diagram_id = $1 ORDER BY version_ts DESC");
    let rows = sqlx::query_as::<_, VersionTuple>(&sql)
        .bind(diagram_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// One version by its timestamp.
///
/// # Errors
///
/// Returns [`VersionError::NotFound`] if the diagram has no such version.
pub async fn get_version(pool: &PgPool, diagram_id: Uuid, version_ts: i64) -> Result<VersionRow, VersionError> {
    let sql = format!("SELECT {VERSION_COLUMNS} FROM diagram_versions WHERE diagram_id = $1 AND version_ts = $2");
    let row = sqlx::query_as::<_, VersionTuple>(&sql)
        .bind(diagram_id)
        .bind(version_ts)
        .fetch_optional(pool)
        .await?
        .ok_or(VersionError::NotFound { diagram_id, version_ts })?;
    Ok(row_from_tuple(row))
}
