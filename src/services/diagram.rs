//! Diagram service: CRUD over the persisted diagram record.
//!
//! DESIGN
//! ======
//! A diagram row stores the authoritative `canvas_data` blob alongside a
//! derived `svg_data` display cache. Whenever a create or update carries
//! canvas data without SVG, or an update resizes a diagram that has canvas
//! data, the SVG is regenerated with the canvas crate's exporter at the
//! record's width/height, so readers never need the editor.
//!
//! Every successful update appends a snapshot to `diagram_versions`. A
//! restore writes the snapshot's content back as-is, absent fields included.
//!
//! ERROR HANDLING
//! ==============
//! Validation runs before any query, so malformed input never reaches the
//! database. A failed version insert after a successful update is logged
//! and swallowed: the update itself has already committed.

#[cfg(test)]
#[path = "diagram_test.rs"]
mod diagram_test;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;
use sqlx::QueryBuilder;
use tracing::{info, warn};
use uuid::Uuid;

use canvas::doc::CanvasData;

use crate::services::version::{self, VersionError};
use crate::state::DiagramDefaults;

const DEFAULT_DIAGRAM_TYPE: &str = "general";

/// Columns selected for every diagram read, in [`DiagramTuple`] order.
const DIAGRAM_COLUMNS: &str = "id, title, subject_id, diagram_type, tags, storage_mode, canvas_data, svg_data, \
     png_url, width, height, \
     (EXTRACT(EPOCH FROM created_at) * 1000)::BIGINT, \
     (EXTRACT(EPOCH FROM updated_at) * 1000)::BIGINT";

type DiagramTuple = (
    Uuid,
    String,
    Option<Uuid>,
    String,
    Vec<String>,
    String,
    Option<serde_json::Value>,
    Option<String>,
    Option<String>,
    i32,
    i32,
    i64,
    i64,
);

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("diagram not found: {0}")]
    NotFound(Uuid),
    #[error("version {version_ts} not found for diagram {diagram_id}")]
    VersionNotFound { diagram_id: Uuid, version_ts: i64 },
    #[error("invalid diagram: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// How the diagram's primary content is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Editable canvas elements; SVG is derived.
    #[default]
    Canvas,
    /// Uploaded SVG markup.
    Svg,
    /// Externally hosted raster image.
    Png,
}

impl StorageMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "canvas" => Some(Self::Canvas),
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// The mutable columns of a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramFields {
    pub title: String,
    pub subject_id: Option<Uuid>,
    pub diagram_type: String,
    pub tags: Vec<String>,
    pub storage_mode: StorageMode,
    pub canvas_data: Option<serde_json::Value>,
    pub svg_data: Option<String>,
    pub png_url: Option<String>,
    pub width: i32,
    pub height: i32,
}

/// A stored diagram. Timestamps are Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramRow {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: DiagramFields,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDiagram {
    pub title: String,
    pub subject_id: Option<Uuid>,
    pub diagram_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub storage_mode: StorageMode,
    pub canvas_data: Option<serde_json::Value>,
    pub svg_data: Option<String>,
    pub png_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Update request body. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagramPatch {
    pub title: Option<String>,
    pub subject_id: Option<Uuid>,
    pub diagram_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub storage_mode: Option<StorageMode>,
    pub canvas_data: Option<serde_json::Value>,
    pub svg_data: Option<String>,
    pub png_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// List filters. All present filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagramFilter {
    pub subject_id: Option<Uuid>,
    pub diagram_type: Option<String>,
    pub tag: Option<String>,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim, lowercase and deduplicate tags, dropping empties. First occurrence wins.
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn parse_canvas(canvas_data: &serde_json::Value) -> Result<CanvasData, DiagramError> {
    CanvasData::from_value(canvas_data.clone()).map_err(|e| DiagramError::Invalid(format!("canvas_data: {e}")))
}

fn normalize_title(title: &str) -> Result<String, DiagramError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DiagramError::Invalid("title must not be empty".to_owned()));
    }
    Ok(title.to_owned())
}

fn normalize_diagram_type(diagram_type: Option<&str>) -> String {
    match diagram_type.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_owned(),
        _ => DEFAULT_DIAGRAM_TYPE.to_owned(),
    }
}

fn check_dimension(name: &str, value: i32) -> Result<i32, DiagramError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(DiagramError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

impl DiagramFields {
    /// Validate a create request and fill defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Invalid`] on a blank title, non-positive size,
    /// unparsable canvas data, or content missing for the storage mode.
    pub fn from_new(new: NewDiagram, defaults: DiagramDefaults) -> Result<Self, DiagramError> {
        let canvas_data = match (new.canvas_data, new.storage_mode) {
            (Some(data), _) => Some(data),
            (None, StorageMode::Canvas) => Some(serde_json::json!({ "elements": [] })),
            (None, _) => None,
        };
        let fields = Self {
            title: normalize_title(&new.title)?,
            subject_id: new.subject_id,
            diagram_type: normalize_diagram_type(new.diagram_type.as_deref()),
            tags: normalize_tags(&new.tags),
            storage_mode: new.storage_mode,
            canvas_data,
            svg_data: new.svg_data,
            png_url: new.png_url,
            width: check_dimension("width", new.width.unwrap_or(defaults.width))?,
            height: check_dimension("height", new.height.unwrap_or(defaults.height))?,
        };
        let derive = fields.svg_data.is_none();
        fields.finish(derive)
    }

    /// Merge an update into the stored fields.
    ///
    /// # Errors
    ///
    /// Same validation as [`DiagramFields::from_new`].
    pub fn patched(&self, patch: DiagramPatch) -> Result<Self, DiagramError> {
        let mut next = self.clone();
        let canvas_changed = patch.canvas_data.is_some();
        let svg_supplied = patch.svg_data.is_some();

        if let Some(title) = patch.title {
            next.title = normalize_title(&title)?;
        }
        if let Some(subject_id) = patch.subject_id {
            next.subject_id = Some(subject_id);
        }
        if let Some(diagram_type) = patch.diagram_type {
            next.diagram_type = normalize_diagram_type(Some(&diagram_type));
        }
        if let Some(tags) = patch.tags {
            next.tags = normalize_tags(&tags);
        }
        if let Some(mode) = patch.storage_mode {
            next.storage_mode = mode;
        }
        if patch.canvas_data.is_some() {
            next.canvas_data = patch.canvas_data;
        }
        if patch.svg_data.is_some() {
            next.svg_data = patch.svg_data;
        }
        if patch.png_url.is_some() {
            next.png_url = patch.png_url;
        }
        if let Some(width) = patch.width {
            next.width = check_dimension("width", width)?;
        }
        if let Some(height) = patch.height {
            next.height = check_dimension("height", height)?;
        }

        let resized = next.width != self.width || next.height != self.height;
        next.finish((canvas_changed || resized) && !svg_supplied)
    }

    /// Replace the content with a stored snapshot. Absent snapshot fields are
    /// cleared, not kept; SVG is derived only when the snapshot has none.
    ///
    /// # Errors
    ///
    /// Same validation as [`DiagramFields::from_new`].
    pub fn restored(
        &self,
        canvas_data: Option<serde_json::Value>,
        svg_data: Option<String>,
    ) -> Result<Self, DiagramError> {
        let derive = svg_data.is_none();
        let next = Self { canvas_data, svg_data, ..self.clone() };
        next.finish(derive)
    }

    /// Check canvas data and storage-mode content, deriving SVG when asked.
    fn finish(mut self, derive_svg_from_canvas: bool) -> Result<Self, DiagramError> {
        if let Some(canvas_data) = &self.canvas_data {
            let data = parse_canvas(canvas_data)?;
            if derive_svg_from_canvas {
                self.svg_data = Some(canvas::svg::to_svg(&data, f64::from(self.width), f64::from(self.height)));
            }
        }

        let missing = match self.storage_mode {
            StorageMode::Canvas if self.canvas_data.is_none() => Some("canvas storage requires canvas_data"),
            StorageMode::Svg if self.svg_data.is_none() => Some("svg storage requires svg_data or canvas_data"),
            StorageMode::Png if self.png_url.is_none() => Some("png storage requires png_url"),
            _ => None,
        };
        match missing {
            Some(reason) => Err(DiagramError::Invalid(reason.to_owned())),
            None => Ok(self),
        }
    }
}

fn row_from_tuple(row: DiagramTuple) -> DiagramRow {
    let (
        id,
        title,
        subject_id,
        diagram_type,
        tags,
        storage_mode,
        canvas_data,
        svg_data,
        png_url,
        width,
        height,
        created_at,
        updated_at,
    ) = row;
    DiagramRow {
        id,
        fields: DiagramFields {
            title,
            subject_id,
            diagram_type,
            tags,
            // Guarded by the table's CHECK constraint.
            storage_mode: StorageMode::parse(&storage_mode).unwrap_or_default(),
            canvas_data,
            svg_data,
            png_url,
            width,
            height,
        },
        created_at,
        updated_at,
    }
}

fn bind_fields<'q>(
    query: QueryAs<'q, Postgres, DiagramTuple, PgArguments>,
    fields: &DiagramFields,
) -> QueryAs<'q, Postgres, DiagramTuple, PgArguments> {
    query
        .bind(fields.title.clone())
        .bind(fields.subject_id)
        .bind(fields.diagram_type.clone())
        .bind(fields.tags.clone())
        .bind(fields.storage_mode.as_str())
        .bind(fields.canvas_data.clone())
        .bind(fields.svg_data.clone())
        .bind(fields.png_url.clone())
        .bind(fields.width)
        .bind(fields.height)
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a diagram.
///
/// # Errors
///
/// Returns [`DiagramError::Invalid`] for bad input, or a database error.
pub async fn create_diagram(
    pool: &PgPool,
    new: NewDiagram,
    defaults: DiagramDefaults,
) -> Result<DiagramRow, DiagramError> {
    let fields = DiagramFields::from_new(new, defaults)?;
    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO diagrams \
         (id, title, subject_id, diagram_type, tags, storage_mode, canvas_data, svg_data, png_url, width, height) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {DIAGRAM_COLUMNS}"
    );
    let row = bind_fields(sqlx::query_as::<_, DiagramTuple>(&sql).bind(id), &fields)
        .fetch_one(pool)
        .await?;

    info!(%id, title = %fields.title, mode = fields.storage_mode.as_str(), "diagram created");
    Ok(row_from_tuple(row))
}

/// List diagrams matching `filter`, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_diagrams(pool: &PgPool, filter: &DiagramFilter) -> Result<Vec<DiagramRow>, DiagramError> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {DIAGRAM_COLUMNS} FROM diagrams WHERE TRUE"));
    if let Some(subject_id) = filter.subject_id {
        builder.push(" AND subject_id = ").push_bind(subject_id);
    }
    if let Some(diagram_type) = filter.diagram_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        builder.push(" AND diagram_type = ").push_bind(diagram_type.to_owned());
    }
    if let Some(tag) = filter.tag.as_ref().and_then(|t| normalize_tags(std::slice::from_ref(t)).pop()) {
        builder.push(" AND ").push_bind(tag).push(" = ANY(tags)");
    }
    builder.push(" ORDER BY created_at DESC, id");

    let rows = builder.build_query_as::<DiagramTuple>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// Fetch one diagram.
///
/// # Errors
///
/// Returns [`DiagramError::NotFound`] if no row has this id.
pub async fn get_diagram(pool: &PgPool, id: Uuid) -> Result<DiagramRow, DiagramError> {
    let sql = format!("SELECT {DIAGRAM_COLUMNS} FROM diagrams WHERE id = $1");
    let row = sqlx::query_as::<_, DiagramTuple>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DiagramError::NotFound(id))?;
    Ok(row_from_tuple(row))
}

/// Apply `patch`, then append a version snapshot of the saved content.
///
/// No optimistic concurrency: the last writer wins.
///
/// # Errors
///
/// Returns [`DiagramError::NotFound`], [`DiagramError::Invalid`], or a
/// database error. Version snapshot failures are not reported.
pub async fn update_diagram(pool: &PgPool, id: Uuid, patch: DiagramPatch) -> Result<DiagramRow, DiagramError> {
    let current = get_diagram(pool, id).await?;
    let fields = current.fields.patched(patch)?;
    save_fields(pool, id, &fields).await
}

/// Write validated fields over a diagram and append a version.
async fn save_fields(pool: &PgPool, id: Uuid, fields: &DiagramFields) -> Result<DiagramRow, DiagramError> {
    let sql = format!(
        "UPDATE diagrams SET title = $2, subject_id = $3, diagram_type = $4, tags = $5, storage_mode = $6, \
         canvas_data = $7, svg_data = $8, png_url = $9, width = $10, height = $11, updated_at = now() \
         WHERE id = $1 \
         RETURNING {DIAGRAM_COLUMNS}"
    );
    let row = bind_fields(sqlx::query_as::<_, DiagramTuple>(&sql).bind(id), fields)
        .fetch_optional(pool)
        .await?
        .ok_or(DiagramError::NotFound(id))?;
    let row = row_from_tuple(row);
    info!(%id, "diagram saved");

    if let Err(e) =
        version::record_version(pool, id, row.fields.canvas_data.clone(), row.fields.svg_data.clone()).await
    {
        warn!(%id, error = %e, "version snapshot failed; update kept");
    }

    Ok(row)
}

/// Delete a diagram and, by cascade, its versions.
///
/// # Errors
///
/// Returns [`DiagramError::NotFound`] if no row has this id.
pub async fn delete_diagram(pool: &PgPool, id: Uuid) -> Result<(), DiagramError> {
    let result = sqlx::query("DELETE FROM diagrams WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DiagramError::NotFound(id));
    }
    info!(%id, "diagram deleted");
    Ok(())
}

/// Copy a stored version's content back onto the diagram.
///
/// The restore is itself an update, so it appends a new version.
///
/// # Errors
///
/// Returns [`DiagramError::VersionNotFound`] if the version does not exist,
/// [`DiagramError::Invalid`] if the snapshot no longer fits the storage mode,
/// or a database error.
pub async fn restore_version(pool: &PgPool, id: Uuid, version_ts: i64) -> Result<DiagramRow, DiagramError> {
    let snapshot = version::get_version(pool, id, version_ts).await.map_err(|e| match e {
        VersionError::NotFound { .. } => DiagramError::VersionNotFound { diagram_id: id, version_ts },
        VersionError::Database(e) => DiagramError::Database(e),
    })?;

    info!(%id, version_ts, "restoring diagram version");
    let current = get_diagram(pool, id).await?;
    let fields = current.fields.restored(snapshot.canvas_data, snapshot.svg_data)?;
    save_fields(pool, id, &fields).await
}
