use axum::{extract::Path, Json};
use contracts::domain::a003_projection::{ProjectionId, WeeklyPeriod};
use uuid::Uuid;

use crate::api::{error_response, ApiError};
use crate::domain::a003_projection::{error::ProjectionError, service};
use crate::shared::data::db::get_connection;

/// GET /api/projection/:id/weeks
///
/// 404 для несуществующей проекции вместо пустого списка.
pub async fn list_for_projection(
    Path(id): Path<String>,
) -> Result<Json<Vec<WeeklyPeriod>>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map(ProjectionId::new)
        .map_err(|_| error_response(ProjectionError::validation("id", "invalid UUID")))?;

    let projection = service::get(get_connection(), id)
        .await
        .map_err(error_response)?;
    Ok(Json(projection.periods))
}
