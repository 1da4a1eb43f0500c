use chrono::Utc;
use contracts::domain::a002_product_association::{AssociationId, ProductAssociation};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_product_association")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub project_ref: String,
    pub product_ref: String,
    pub quantity: f64,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ProductAssociation {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        ProductAssociation {
            id: AssociationId::new(uuid),
            project_ref: Uuid::parse_str(&m.project_ref).unwrap_or_default(),
            product_ref: Uuid::parse_str(&m.product_ref).unwrap_or_default(),
            quantity: m.quantity,
            is_active: m.is_active,
            metadata,
        }
    }
}

pub async fn get_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<ProductAssociation>, DbErr> {
    let model = Entity::find_by_id(id.to_string()).one(conn).await?;
    Ok(model.map(|m| m.into()))
}

/// Upsert связки проект-продукт по ID
pub async fn upsert<C: ConnectionTrait>(
    conn: &C,
    association: &ProductAssociation,
) -> Result<bool, DbErr> {
    let id_str = association.id.as_string();

    let existing = Entity::find_by_id(&id_str).one(conn).await?;

    if existing.is_some() {
        let active_model = ActiveModel {
            id: Set(id_str),
            project_ref: Set(association.project_ref.to_string()),
            product_ref: Set(association.product_ref.to_string()),
            quantity: Set(association.quantity),
            is_active: Set(association.is_active),
            updated_at: Set(Some(Utc::now())),
            version: Set(association.metadata.version + 1),
            created_at: sea_orm::ActiveValue::NotSet,
        };
        Entity::update(active_model).exec(conn).await?;
        Ok(false)
    } else {
        let active_model = ActiveModel {
            id: Set(id_str),
            project_ref: Set(association.project_ref.to_string()),
            product_ref: Set(association.product_ref.to_string()),
            quantity: Set(association.quantity),
            is_active: Set(association.is_active),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            version: Set(1),
        };
        Entity::insert(active_model).exec(conn).await?;
        Ok(true)
    }
}

/// Все связки одного проекта
pub async fn list_by_project<C: ConnectionTrait>(
    conn: &C,
    project_ref: Uuid,
) -> Result<Vec<ProductAssociation>, DbErr> {
    let models = Entity::find()
        .filter(Column::ProjectRef.eq(project_ref.to_string()))
        .all(conn)
        .await?;
    Ok(models.into_iter().map(|m| m.into()).collect())
}
