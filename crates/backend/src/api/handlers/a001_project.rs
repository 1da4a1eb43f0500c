use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a001_project;
use crate::shared::data::db::get_connection;

/// GET /api/project
pub async fn list_all(
) -> Result<Json<Vec<contracts::domain::a001_project::Project>>, axum::http::StatusCode> {
    match a001_project::service::list_all(get_connection()).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/project/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a001_project::Project>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a001_project::service::get_by_id(get_connection(), uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/project
pub async fn upsert(
    Json(dto): Json<contracts::domain::a001_project::ProjectDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let project = dto.into_aggregate();
    match a001_project::service::upsert(get_connection(), &project).await {
        Ok((id, _is_new)) => Ok(Json(json!({"id": id.to_string()}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
