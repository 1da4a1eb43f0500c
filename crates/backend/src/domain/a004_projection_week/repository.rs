use chrono::NaiveDate;
use contracts::domain::a003_projection::{ProjectionId, WeeklyPeriod};
use contracts::domain::common::AggregateId;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::shared::dates::{add_days, iso_week_number};

/// Строка недельного периода (a004_projection_week)
///
/// Периоды не являются самостоятельным агрегатом: они принадлежат проекции
/// и управляются только через её жизненный цикл.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_projection_week")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub projection_ref: String,
    pub week_number: i32,
    pub date: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_period_date(s: &str) -> Result<NaiveDate, DbErr> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbErr::Custom(format!("bad period date `{}`: {}", s, e)))
}

// Повреждённая строка периода всплывает как DbErr
impl TryFrom<Model> for WeeklyPeriod {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, DbErr> {
        Ok(WeeklyPeriod {
            id: m.id,
            week_number: m.week_number.max(0) as u32,
            date: parse_period_date(&m.date)?,
            quantity: m.quantity,
            unit: m.unit,
        })
    }
}

/// Вставить свежесгенерированные периоды проекции
///
/// `insert_many` в sea-orm падает на пустом списке, поэтому пустой график
/// (вырожденная проекция без уровней) обходится без запроса.
pub async fn insert_for_projection<C: ConnectionTrait>(
    conn: &C,
    projection_id: ProjectionId,
    periods: &[WeeklyPeriod],
) -> Result<(), DbErr> {
    if periods.is_empty() {
        return Ok(());
    }

    let rows = periods.iter().map(|p| ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        projection_ref: Set(projection_id.as_string()),
        week_number: Set(p.week_number as i32),
        date: Set(p.date.format("%Y-%m-%d").to_string()),
        quantity: Set(p.quantity),
        unit: Set(p.unit.clone()),
    });

    Entity::insert_many(rows).exec(conn).await?;
    Ok(())
}

/// Удалить все периоды проекции; возвращает число удалённых строк
pub async fn delete_by_projection<C: ConnectionTrait>(
    conn: &C,
    projection_id: ProjectionId,
) -> Result<u64, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::ProjectionRef.eq(projection_id.as_string()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Периоды проекции по возрастанию даты
pub async fn find_by_projection<C: ConnectionTrait>(
    conn: &C,
    projection_id: ProjectionId,
) -> Result<Vec<WeeklyPeriod>, DbErr> {
    let models = Entity::find()
        .filter(Column::ProjectionRef.eq(projection_id.as_string()))
        .order_by_asc(Column::Date)
        .all(conn)
        .await?;
    models.into_iter().map(WeeklyPeriod::try_from).collect()
}

/// Сдвинуть даты всех периодов проекции на `offset_days`
///
/// Количества и единицы не трогаются; номер недели пересчитывается
/// по ISO 8601 от новой даты. Возвращает периоды после сдвига.
pub async fn shift_dates<C: ConnectionTrait>(
    conn: &C,
    projection_id: ProjectionId,
    offset_days: i64,
) -> Result<Vec<WeeklyPeriod>, DbErr> {
    let models = Entity::find()
        .filter(Column::ProjectionRef.eq(projection_id.as_string()))
        .order_by_asc(Column::Date)
        .all(conn)
        .await?;

    let mut shifted = Vec::with_capacity(models.len());
    for model in models {
        let old_date = parse_period_date(&model.date)?;
        let new_date = add_days(old_date, offset_days);
        let new_week = iso_week_number(new_date);

        let update = ActiveModel {
            id: Set(model.id),
            date: Set(new_date.format("%Y-%m-%d").to_string()),
            week_number: Set(new_week as i32),
            ..Default::default()
        };
        Entity::update(update).exec(conn).await?;

        shifted.push(WeeklyPeriod {
            id: model.id,
            week_number: new_week,
            date: new_date,
            quantity: model.quantity,
            unit: model.unit,
        });
    }

    Ok(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{Database, DatabaseBackend, Statement};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_corrupt_period_date_surfaces_as_error() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        crate::shared::data::db::create_schema(&db).await.unwrap();

        let projection_id = ProjectionId::new(Uuid::new_v4());
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!(
                "INSERT INTO a004_projection_week (projection_ref, week_number, date, \
                 quantity, unit) VALUES ('{}', 2, '06.01.2025', 150.0, 'UND')",
                projection_id.as_string()
            ),
        ))
        .await
        .unwrap();

        let err = find_by_projection(&db, projection_id).await.unwrap_err();
        assert!(err.to_string().contains("period date"), "{}", err);
    }
}
