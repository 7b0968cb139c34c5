//! Diagram and version routes.

#[cfg(test)]
#[path = "diagrams_test.rs"]
mod diagrams_test;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use uuid::Uuid;

use crate::services::diagram::{self, DiagramError, DiagramFilter, DiagramPatch, DiagramRow, NewDiagram};
use crate::services::version::{self, VersionError, VersionRow};
use crate::state::AppState;

pub(crate) fn diagram_error_to_status(err: DiagramError) -> StatusCode {
    match err {
        DiagramError::NotFound(_) | DiagramError::VersionNotFound { .. } => StatusCode::NOT_FOUND,
        DiagramError::Invalid(reason) => {
            tracing::debug!(%reason, "rejected diagram payload");
            StatusCode::BAD_REQUEST
        }
        DiagramError::Database(e) => {
            tracing::error!(error = %e, "diagram query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn version_error_to_status(err: VersionError) -> StatusCode {
    match err {
        VersionError::NotFound { .. } => StatusCode::NOT_FOUND,
        VersionError::Database(e) => {
            tracing::error!(error = %e, "version query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /api/diagrams`: list diagrams, newest first.
pub async fn list_diagrams(
    State(state): State<AppState>,
    Query(filter): Query<DiagramFilter>,
) -> Result<Json<Vec<DiagramRow>>, StatusCode> {
    let rows = diagram::list_diagrams(&state.pool, &filter)
        .await
        .map_err(diagram_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/diagrams`: create a diagram.
pub async fn create_diagram(
    State(state): State<AppState>,
    Json(body): Json<NewDiagram>,
) -> Result<(StatusCode, Json<DiagramRow>), StatusCode> {
    let row = diagram::create_diagram(&state.pool, body, state.defaults)
        .await
        .map_err(diagram_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/diagrams/{id}`: fetch one diagram.
pub async fn get_diagram(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagramRow>, StatusCode> {
    let row = diagram::get_diagram(&state.pool, id)
        .await
        .map_err(diagram_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/diagrams/{id}`: update a diagram and record a version.
pub async fn update_diagram(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<DiagramPatch>,
) -> Result<Json<DiagramRow>, StatusCode> {
    let row = diagram::update_diagram(&state.pool, id, body)
        .await
        .map_err(diagram_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/diagrams/{id}`: delete a diagram and its versions.
pub async fn delete_diagram(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, StatusCode> {
    diagram::delete_diagram(&state.pool, id)
        .await
        .map_err(diagram_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/diagrams/{id}/svg`: the cached SVG as an image.
pub async fn get_diagram_svg(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, StatusCode> {
    let row = diagram::get_diagram(&state.pool, id)
        .await
        .map_err(diagram_error_to_status)?;
    let svg = row.fields.svg_data.ok_or(StatusCode::NOT_FOUND)?;
    Ok((
        [
            (CONTENT_TYPE, "image/svg+xml; charset=utf-8"),
            (CONTENT_DISPOSITION, &format!("inline; filename=\"diagram-{id}.svg\"")),
        ],
        svg,
    )
        .into_response())
}

/// `GET /api/diagrams/{id}/versions`: version history, newest first.
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VersionRow>>, StatusCode> {
    diagram::get_diagram(&state.pool, id)
        .await
        .map_err(diagram_error_to_status)?;
    let rows = version::list_versions(&state.pool, id)
        .await
        .map_err(version_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/diagrams/{id}/versions/{ts}`: one stored version.
pub async fn get_version(
    State(state): State<AppState>,
    Path((id, version_ts)): Path<(Uuid, i64)>,
) -> Result<Json<VersionRow>, StatusCode> {
    let row = version::get_version(&state.pool, id, version_ts)
        .await
        .map_err(version_error_to_status)?;
    Ok(Json(row))
}

/// `POST /api/diagrams/{id}/versions/{ts}/restore`: copy a version back onto the diagram.
pub async fn restore_version(
    State(state): State<AppState>,
    Path((id, version_ts)): Path<(Uuid, i64)>,
) -> Result<Json<DiagramRow>, StatusCode> {
    let row = diagram::restore_version(&state.pool, id, version_ts)
        .await
        .map_err(diagram_error_to_status)?;
    Ok(Json(row))
}
