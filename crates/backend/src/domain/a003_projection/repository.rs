use chrono::{NaiveDate, Utc};
use contracts::domain::a003_projection::{Projection, ProjectionId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::{ProjectionStatus, ProjectionType};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Строка проекции (a003_projection)
///
/// Даты хранятся как TEXT в формате YYYY-MM-DD, тип и статус — кодами.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_projection")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub association_ref: String,
    pub product_ref: String,
    pub projection_type: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub floors: i32,
    pub basements: i32,
    pub velocity: f64,
    pub total_quantity: f64,
    pub per_week_quantity: f64,
    pub unit: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_date(field: &str, s: &str) -> Result<NaiveDate, DbErr> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbErr::Custom(format!("bad {} `{}`: {}", field, s, e)))
}

fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbErr> {
    Uuid::parse_str(s).map_err(|e| DbErr::Custom(format!("bad {} `{}`: {}", field, s, e)))
}

// Повреждённая строка всплывает как DbErr, а не маскируется
// значением по умолчанию
impl TryFrom<Model> for Projection {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, DbErr> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };

        Ok(Projection {
            id: ProjectionId::new(parse_uuid("projection id", &m.id)?),
            association_ref: parse_uuid("association_ref", &m.association_ref)?,
            product_ref: parse_uuid("product_ref", &m.product_ref)?,
            projection_type: ProjectionType::from_code(&m.projection_type).ok_or_else(|| {
                DbErr::Custom(format!("bad projection_type `{}`", m.projection_type))
            })?,
            status: ProjectionStatus::from_code(&m.status)
                .ok_or_else(|| DbErr::Custom(format!("bad status `{}`", m.status)))?,
            start_date: parse_date("start_date", &m.start_date)?,
            end_date: parse_date("end_date", &m.end_date)?,
            floors: m.floors,
            basements: m.basements,
            velocity: m.velocity,
            total_quantity: m.total_quantity,
            per_week_quantity: m.per_week_quantity,
            unit: m.unit,
            // Периоды подтягиваются отдельным запросом (a004)
            periods: Vec::new(),
            metadata,
        })
    }
}

fn to_active_model(projection: &Projection, is_new: bool) -> ActiveModel {
    ActiveModel {
        id: Set(projection.id.as_string()),
        association_ref: Set(projection.association_ref.to_string()),
        product_ref: Set(projection.product_ref.to_string()),
        projection_type: Set(projection.projection_type.code().to_string()),
        status: Set(projection.status.code().to_string()),
        start_date: Set(projection.start_date.format("%Y-%m-%d").to_string()),
        end_date: Set(projection.end_date.format("%Y-%m-%d").to_string()),
        floors: Set(projection.floors),
        basements: Set(projection.basements),
        velocity: Set(projection.velocity),
        total_quantity: Set(projection.total_quantity),
        per_week_quantity: Set(projection.per_week_quantity),
        unit: Set(projection.unit.clone()),
        created_at: if is_new {
            Set(Some(Utc::now()))
        } else {
            sea_orm::ActiveValue::NotSet
        },
        updated_at: Set(Some(Utc::now())),
        version: Set(if is_new {
            1
        } else {
            projection.metadata.version + 1
        }),
    }
}

/// Вставить новую проекцию
///
/// Нарушение индекса ux_a003_association_type всплывает как DbErr,
/// вызывающий переводит его в конфликт.
pub async fn insert<C: ConnectionTrait>(conn: &C, projection: &Projection) -> Result<(), DbErr> {
    Entity::insert(to_active_model(projection, true))
        .exec(conn)
        .await?;
    Ok(())
}

/// Перезаписать все поля существующей проекции, версия +1
pub async fn update_row<C: ConnectionTrait>(
    conn: &C,
    projection: &Projection,
) -> Result<(), DbErr> {
    Entity::update(to_active_model(projection, false))
        .exec(conn)
        .await?;
    Ok(())
}

/// Обновить только end_date после генерации периодов
pub async fn update_end_date<C: ConnectionTrait>(
    conn: &C,
    id: ProjectionId,
    end_date: NaiveDate,
) -> Result<(), DbErr> {
    let update = ActiveModel {
        id: Set(id.as_string()),
        end_date: Set(end_date.format("%Y-%m-%d").to_string()),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    Entity::update(update).exec(conn).await?;
    Ok(())
}

/// Удалить строку проекции; возвращает число удалённых строк
pub async fn delete_row<C: ConnectionTrait>(conn: &C, id: ProjectionId) -> Result<u64, DbErr> {
    let result = Entity::delete_by_id(id.as_string()).exec(conn).await?;
    Ok(result.rows_affected)
}

pub async fn get_by_id<C: ConnectionTrait>(
    conn: &C,
    id: ProjectionId,
) -> Result<Option<Projection>, DbErr> {
    let model = Entity::find_by_id(id.as_string()).one(conn).await?;
    model.map(Projection::try_from).transpose()
}

/// Проекция заданного типа для связки (их не может быть больше одной)
pub async fn find_by_association_and_type<C: ConnectionTrait>(
    conn: &C,
    association_ref: Uuid,
    projection_type: ProjectionType,
) -> Result<Option<Projection>, DbErr> {
    let model = Entity::find()
        .filter(Column::AssociationRef.eq(association_ref.to_string()))
        .filter(Column::ProjectionType.eq(projection_type.code()))
        .one(conn)
        .await?;
    model.map(Projection::try_from).transpose()
}

/// Все проекции одной связки
pub async fn list_by_association<C: ConnectionTrait>(
    conn: &C,
    association_ref: Uuid,
) -> Result<Vec<Projection>, DbErr> {
    let models = Entity::find()
        .filter(Column::AssociationRef.eq(association_ref.to_string()))
        .all(conn)
        .await?;
    models.into_iter().map(Projection::try_from).collect()
}

/// Проекции для набора связок (выборка по проекту)
pub async fn list_by_association_refs<C: ConnectionTrait>(
    conn: &C,
    association_refs: &[Uuid],
) -> Result<Vec<Projection>, DbErr> {
    if association_refs.is_empty() {
        return Ok(Vec::new());
    }
    let refs: Vec<String> = association_refs.iter().map(|r| r.to_string()).collect();
    let models = Entity::find()
        .filter(Column::AssociationRef.is_in(refs))
        .all(conn)
        .await?;
    models.into_iter().map(Projection::try_from).collect()
}
