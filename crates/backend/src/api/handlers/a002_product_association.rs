use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a002_product_association;
use crate::shared::data::db::get_connection;

/// GET /api/association/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a002_product_association::ProductAssociation>, axum::http::StatusCode>
{
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a002_product_association::service::get_by_id(get_connection(), uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/association/by-project/:id
pub async fn list_by_project(
    Path(id): Path<String>,
) -> Result<
    Json<Vec<contracts::domain::a002_product_association::ProductAssociation>>,
    axum::http::StatusCode,
> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a002_product_association::service::list_by_project(get_connection(), uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/association
pub async fn upsert(
    Json(dto): Json<contracts::domain::a002_product_association::ProductAssociationDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let association = dto.into_aggregate();
    match a002_product_association::service::upsert(get_connection(), &association).await {
        Ok((id, _is_new)) => Ok(Json(json!({"id": id.to_string()}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
