use axum::{extract::Path, Json};
use contracts::domain::a003_projection::{
    CreateProjectionRequest, Projection, ProjectionId, UpdateProjectionRequest,
};
use uuid::Uuid;

use crate::api::{error_response, ApiError};
use crate::domain::a003_projection::{error::ProjectionError, service};
use crate::shared::data::db::get_connection;
use crate::shared::product_client::get_product_client;

fn parse_projection_id(id: &str) -> Result<ProjectionId, ApiError> {
    Uuid::parse_str(id)
        .map(ProjectionId::new)
        .map_err(|_| error_response(ProjectionError::validation("id", "invalid UUID")))
}

fn parse_uuid(id: &str, field: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id)
        .map_err(|_| error_response(ProjectionError::validation(field, "invalid UUID")))
}

/// POST /api/projection
pub async fn create(
    Json(req): Json<CreateProjectionRequest>,
) -> Result<Json<Projection>, ApiError> {
    service::create(get_connection(), get_product_client(), req)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /api/projection/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Projection>, ApiError> {
    let id = parse_projection_id(&id)?;
    service::get(get_connection(), id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// PUT /api/projection/:id
pub async fn update(
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectionRequest>,
) -> Result<Json<Projection>, ApiError> {
    let id = parse_projection_id(&id)?;
    service::update(get_connection(), id, req)
        .await
        .map(Json)
        .map_err(error_response)
}

/// DELETE /api/projection/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), ApiError> {
    let id = parse_projection_id(&id)?;
    service::remove(get_connection(), id)
        .await
        .map_err(error_response)
}

/// GET /api/projection/by-association/:id
pub async fn list_by_association(
    Path(id): Path<String>,
) -> Result<Json<Vec<Projection>>, ApiError> {
    let association_ref = parse_uuid(&id, "association_ref")?;
    service::list_by_association(get_connection(), association_ref)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /api/projection/by-project/:id
pub async fn list_by_project(Path(id): Path<String>) -> Result<Json<Vec<Projection>>, ApiError> {
    let project_ref = parse_uuid(&id, "project_ref")?;
    service::list_by_project(get_connection(), project_ref)
        .await
        .map(Json)
        .map_err(error_response)
}
