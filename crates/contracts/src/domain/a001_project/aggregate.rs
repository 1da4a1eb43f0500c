use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для строительного проекта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ProjectId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProjectId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Строительный проект (агрегат a001)
///
/// Хранятся только поля, которые читает планировщик проекций:
/// этажность и предварительная дата старта строительства.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    /// Название проекта
    pub name: String,

    /// Количество этажей (может быть неизвестно на ранней стадии)
    pub floors: Option<i32>,

    /// Количество подвальных уровней
    pub basements: Option<i32>,

    /// Предварительная дата начала строительства
    pub tentative_start: Option<NaiveDate>,

    pub metadata: EntityMetadata,
}

impl Project {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id: ProjectId::new(id),
            name,
            floors: None,
            basements: None,
            tentative_start: None,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Название проекта не может быть пустым".into());
        }
        if matches!(self.floors, Some(f) if f < 0) {
            return Err("Количество этажей не может быть отрицательным".into());
        }
        if matches!(self.basements, Some(b) if b < 0) {
            return Err("Количество подвалов не может быть отрицательным".into());
        }
        Ok(())
    }
}

/// DTO для создания/обновления проекта через API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDto {
    pub id: Option<Uuid>,
    pub name: String,
    pub floors: Option<i32>,
    pub basements: Option<i32>,
    pub tentative_start: Option<NaiveDate>,
}

impl ProjectDto {
    pub fn into_aggregate(self) -> Project {
        let mut project = Project::new(self.id.unwrap_or_else(Uuid::new_v4), self.name);
        project.floors = self.floors;
        project.basements = self.basements;
        project.tentative_start = self.tentative_start;
        project
    }
}

impl AggregateRoot for Project {
    type Id = ProjectId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "project"
    }
}
