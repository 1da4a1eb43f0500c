use crate::enums::{ProjectionStatus, ProjectionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Запрос на создание проекции
///
/// Обязательны только связка, тип, статус и скорость. Этажность, дата
/// старта, количество и единица измерения обычно разрешаются из профилей
/// проекта/связки/продукта, но могут быть заданы явно.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectionRequest {
    pub association_ref: Uuid,
    pub projection_type: ProjectionType,
    pub status: ProjectionStatus,

    /// Этажей в неделю, может быть дробной (например 1.5)
    pub velocity: f64,

    pub floors: Option<i32>,
    pub basements: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub total_quantity: Option<f64>,
    pub unit: Option<String>,
}

/// Частичное обновление проекции
///
/// Поле учитывается только если оно задано. `force_recalculate` заставляет
/// полностью перегенерировать график независимо от набора изменений.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectionRequest {
    pub status: Option<ProjectionStatus>,
    pub projection_type: Option<ProjectionType>,
    pub velocity: Option<f64>,
    pub floors: Option<i32>,
    pub basements: Option<i32>,
    pub total_quantity: Option<f64>,
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub force_recalculate: bool,
}

impl UpdateProjectionRequest {
    /// Запрос без единого заданного поля
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.projection_type.is_none()
            && self.velocity.is_none()
            && self.floors.is_none()
            && self.basements.is_none()
            && self.total_quantity.is_none()
            && self.start_date.is_none()
    }
}
