use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use crate::enums::{ProjectionStatus, ProjectionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для проекции поставок
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectionId(pub Uuid);

impl ProjectionId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ProjectionId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProjectionId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Недельный период проекции
///
/// Одна датированная порция графика. Период живёт только внутри своей
/// проекции: создаётся вместе с ней и целиком пересоздаётся при
/// структурном изменении.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPeriod {
    /// Автоинкрементный ключ строки
    pub id: i64,

    /// Номер недели по ISO 8601
    pub week_number: u32,

    /// Дата начала недели, всегда понедельник
    pub date: NaiveDate,

    /// Количество материала на неделю
    pub quantity: f64,

    /// Единица измерения (копия из проекции на момент генерации)
    pub unit: String,
}

/// Проекция поставок (агрегат a003)
///
/// Недельный график поставки материала для одной связки проект-продукт.
/// На связку допускается не более одной REAL и одной PROSPECT проекции.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub id: ProjectionId,

    /// Связка проект-продукт (a002_product_association)
    pub association_ref: Uuid,

    /// Логическая ссылка на продукт (копия из связки)
    pub product_ref: Uuid,

    pub projection_type: ProjectionType,
    pub status: ProjectionStatus,

    /// Дата старта строительства
    pub start_date: NaiveDate,

    /// Дата последнего сгенерированного периода
    /// (равна start_date, если периодов нет)
    pub end_date: NaiveDate,

    /// Количество этажей
    pub floors: i32,

    /// Количество подвальных уровней
    pub basements: i32,

    /// Скорость строительства: этажей в неделю, может быть дробной
    pub velocity: f64,

    /// Общее количество материала
    pub total_quantity: f64,

    /// Количество на неделю: total / ((floors+basements) / velocity),
    /// округлено до 2 знаков
    pub per_week_quantity: f64,

    /// Единица измерения материала
    pub unit: String,

    /// Периоды графика, отсортированы по дате по возрастанию
    pub periods: Vec<WeeklyPeriod>,

    pub metadata: EntityMetadata,
}

impl AggregateRoot for Projection {
    type Id = ProjectionId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "projection"
    }
}
