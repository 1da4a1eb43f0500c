use chrono::{NaiveDate, Utc};
use contracts::domain::a001_project::{Project, ProjectId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub floors: Option<i32>,
    pub basements: Option<i32>,
    pub tentative_start: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Project {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Project {
            id: ProjectId::new(uuid),
            name: m.name,
            floors: m.floors,
            basements: m.basements,
            tentative_start: m.tentative_start.and_then(|s| s.parse::<NaiveDate>().ok()),
            metadata,
        }
    }
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Project>, DbErr> {
    let model = Entity::find_by_id(id.to_string()).one(conn).await?;
    Ok(model.map(|m| m.into()))
}

/// Upsert записи проекта по ID
pub async fn upsert<C: ConnectionTrait>(conn: &C, project: &Project) -> Result<bool, DbErr> {
    let id_str = project.id.as_string();
    let tentative_start = project.tentative_start.map(|d| d.to_string());

    let existing = Entity::find_by_id(&id_str).one(conn).await?;

    if existing.is_some() {
        let active_model = ActiveModel {
            id: Set(id_str),
            name: Set(project.name.clone()),
            floors: Set(project.floors),
            basements: Set(project.basements),
            tentative_start: Set(tentative_start),
            updated_at: Set(Some(Utc::now())),
            version: Set(project.metadata.version + 1),
            created_at: sea_orm::ActiveValue::NotSet,
        };
        Entity::update(active_model).exec(conn).await?;
        Ok(false)
    } else {
        let active_model = ActiveModel {
            id: Set(id_str),
            name: Set(project.name.clone()),
            floors: Set(project.floors),
            basements: Set(project.basements),
            tentative_start: Set(tentative_start),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            version: Set(1),
        };
        Entity::insert(active_model).exec(conn).await?;
        Ok(true)
    }
}

pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Project>, DbErr> {
    let models = Entity::find().all(conn).await?;
    Ok(models.into_iter().map(|m| m.into()).collect())
}
