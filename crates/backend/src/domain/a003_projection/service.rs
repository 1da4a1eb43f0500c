use contracts::domain::a003_projection::{
    CreateProjectionRequest, Projection, ProjectionId, UpdateProjectionRequest, WeeklyPeriod,
};
use contracts::domain::common::EntityMetadata;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use super::classifier::{self, ChangeTier};
use super::error::{is_unique_violation, ProjectionError};
use super::repository;
use super::schedule::{self, WeeklySchedule};
use crate::domain::{a001_project, a002_product_association, a004_projection_week};
use crate::shared::dates::{iso_week_number, next_monday};
use crate::shared::product_client::UnitProvider;

type Result<T> = std::result::Result<T, ProjectionError>;

/// Создать проекцию для связки проект-продукт
///
/// Все входы разрешаются и проверяются до открытия транзакции: недостающие
/// этажность/дату/количество добираем из профилей проекта и связки, единицу
/// измерения — из каталога продуктов. Запись строки, генерация периодов и
/// фиксация end_date происходят в одной транзакции.
pub async fn create(
    db: &DatabaseConnection,
    units: &dyn UnitProvider,
    req: CreateProjectionRequest,
) -> Result<Projection> {
    if req.velocity <= 0.0 {
        return Err(ProjectionError::validation(
            "velocity",
            "must be greater than zero",
        ));
    }

    let association = a002_product_association::repository::get_by_id(db, req.association_ref)
        .await?
        .ok_or_else(|| ProjectionError::not_found("association", req.association_ref))?;

    // Ранний отказ для честного клиента; гонку create/create окончательно
    // закрывает уникальный индекс при вставке
    if repository::find_by_association_and_type(db, req.association_ref, req.projection_type)
        .await?
        .is_some()
    {
        return Err(ProjectionError::Conflict {
            association_ref: req.association_ref,
            projection_type: req.projection_type,
        });
    }

    let project = a001_project::repository::get_by_id(db, association.project_ref)
        .await?
        .ok_or_else(|| ProjectionError::not_found("project", association.project_ref))?;

    let floors = req.floors.or(project.floors).ok_or_else(|| {
        ProjectionError::validation("floors", "not provided and missing from project profile")
    })?;
    let basements = req.basements.or(project.basements).unwrap_or(0);
    let start_date = req.start_date.or(project.tentative_start).ok_or_else(|| {
        ProjectionError::validation(
            "start_date",
            "not provided and project has no tentative start",
        )
    })?;
    let total_quantity = req.total_quantity.unwrap_or(association.quantity);

    if floors < 0 {
        return Err(ProjectionError::validation("floors", "must not be negative"));
    }
    if basements < 0 {
        return Err(ProjectionError::validation(
            "basements",
            "must not be negative",
        ));
    }
    if total_quantity < 0.0 {
        return Err(ProjectionError::validation(
            "total_quantity",
            "must not be negative",
        ));
    }

    let unit = match req.unit {
        Some(unit) => unit,
        None => units
            .unit_of_measure(association.product_ref)
            .await
            .map_err(|e| ProjectionError::Dependency {
                service: "product_service",
                message: e.to_string(),
            })?,
    };

    let plan = schedule::compute(floors, basements, req.velocity, total_quantity, start_date);
    let end_date = plan.end_date(start_date);

    let projection = Projection {
        id: ProjectionId::new(Uuid::new_v4()),
        association_ref: req.association_ref,
        product_ref: association.product_ref,
        projection_type: req.projection_type,
        status: req.status,
        start_date,
        // Заглушка до генерации периодов; финальное значение ставится
        // внутри транзакции
        end_date: start_date,
        floors,
        basements,
        velocity: req.velocity,
        total_quantity,
        per_week_quantity: plan.per_week_quantity,
        unit: unit.clone(),
        periods: Vec::new(),
        metadata: EntityMetadata::new(),
    };

    let periods = build_periods(&plan, &unit);

    let txn = db.begin().await?;
    if let Err(err) = repository::insert(&txn, &projection).await {
        return Err(if is_unique_violation(&err) {
            ProjectionError::Conflict {
                association_ref: req.association_ref,
                projection_type: req.projection_type,
            }
        } else {
            err.into()
        });
    }
    a004_projection_week::repository::insert_for_projection(&txn, projection.id, &periods).await?;
    repository::update_end_date(&txn, projection.id, end_date).await?;
    txn.commit().await?;

    info!(
        "Projection {} created: {} weeks of {} {}",
        projection.id.value(),
        plan.week_count,
        plan.per_week_quantity,
        unit
    );

    get(db, projection.id).await
}

/// Обновить проекцию
///
/// Запрос классифицируется по ярусам: метки применяются как есть, смена даты
/// старта сдвигает периоды без пересчёта количеств, изменение расчётных
/// входов сносит график и строит его заново. Любой ярус выполняется в одной
/// транзакции.
pub async fn update(
    db: &DatabaseConnection,
    id: ProjectionId,
    req: UpdateProjectionRequest,
) -> Result<Projection> {
    if let Some(velocity) = req.velocity {
        if velocity <= 0.0 {
            return Err(ProjectionError::validation(
                "velocity",
                "must be greater than zero",
            ));
        }
    }
    if req.floors.is_some_and(|v| v < 0) {
        return Err(ProjectionError::validation("floors", "must not be negative"));
    }
    if req.basements.is_some_and(|v| v < 0) {
        return Err(ProjectionError::validation(
            "basements",
            "must not be negative",
        ));
    }
    if req.total_quantity.is_some_and(|v| v < 0.0) {
        return Err(ProjectionError::validation(
            "total_quantity",
            "must not be negative",
        ));
    }

    let current = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ProjectionError::not_found("projection", id.value()))?;

    // Пустой запрос без принудительного пересчёта — no-op, запись не трогаем
    if req.is_empty() && !req.force_recalculate {
        return get(db, id).await;
    }

    let tier = classifier::classify(&current, &req);
    info!("Projection {} update classified as {:?}", id.value(), tier);

    let mut next = current.clone();
    if let Some(status) = req.status {
        next.status = status;
    }
    if let Some(projection_type) = req.projection_type {
        next.projection_type = projection_type;
    }

    let txn = db.begin().await?;
    match tier {
        ChangeTier::Harmless => {
            if let Err(err) = repository::update_row(&txn, &next).await {
                return Err(map_type_conflict(err, &next));
            }
        }
        ChangeTier::Shift => {
            let new_start = req.start_date.unwrap_or(current.start_date);
            let offset = (next_monday(new_start) - next_monday(current.start_date)).num_days();

            let shifted =
                a004_projection_week::repository::shift_dates(&txn, id, offset).await?;
            next.start_date = new_start;
            next.end_date = shifted.last().map(|p| p.date).unwrap_or(new_start);
            if let Err(err) = repository::update_row(&txn, &next).await {
                return Err(map_type_conflict(err, &next));
            }
        }
        ChangeTier::Structural => {
            next.velocity = req.velocity.unwrap_or(current.velocity);
            next.floors = req.floors.unwrap_or(current.floors);
            next.basements = req.basements.unwrap_or(current.basements);
            next.total_quantity = req.total_quantity.unwrap_or(current.total_quantity);
            next.start_date = req.start_date.unwrap_or(current.start_date);

            let plan = schedule::compute(
                next.floors,
                next.basements,
                next.velocity,
                next.total_quantity,
                next.start_date,
            );
            next.per_week_quantity = plan.per_week_quantity;
            next.end_date = plan.end_date(next.start_date);

            let periods = build_periods(&plan, &next.unit);
            a004_projection_week::repository::delete_by_projection(&txn, id).await?;
            a004_projection_week::repository::insert_for_projection(&txn, id, &periods).await?;
            if let Err(err) = repository::update_row(&txn, &next).await {
                return Err(map_type_conflict(err, &next));
            }
        }
    }
    txn.commit().await?;

    get(db, id).await
}

/// Удалить проекцию вместе с её периодами
pub async fn remove(db: &DatabaseConnection, id: ProjectionId) -> Result<()> {
    let txn = db.begin().await?;
    a004_projection_week::repository::delete_by_projection(&txn, id).await?;
    let deleted = repository::delete_row(&txn, id).await?;
    if deleted == 0 {
        // txn откатится при drop
        return Err(ProjectionError::not_found("projection", id.value()));
    }
    txn.commit().await?;

    info!("Projection {} removed", id.value());
    Ok(())
}

/// Проекция с периодами (по возрастанию даты)
pub async fn get(db: &DatabaseConnection, id: ProjectionId) -> Result<Projection> {
    let mut projection = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ProjectionError::not_found("projection", id.value()))?;
    projection.periods = a004_projection_week::repository::find_by_projection(db, id).await?;
    Ok(projection)
}

/// Все проекции связки, с периодами
pub async fn list_by_association(
    db: &DatabaseConnection,
    association_ref: Uuid,
) -> Result<Vec<Projection>> {
    let mut projections = repository::list_by_association(db, association_ref).await?;
    for projection in &mut projections {
        projection.periods =
            a004_projection_week::repository::find_by_projection(db, projection.id).await?;
    }
    Ok(projections)
}

/// Все проекции проекта (через его связки), с периодами
pub async fn list_by_project(
    db: &DatabaseConnection,
    project_ref: Uuid,
) -> Result<Vec<Projection>> {
    let associations =
        a002_product_association::repository::list_by_project(db, project_ref).await?;
    let refs: Vec<Uuid> = associations.iter().map(|a| a.id.value()).collect();

    let mut projections = repository::list_by_association_refs(db, &refs).await?;
    for projection in &mut projections {
        projection.periods =
            a004_projection_week::repository::find_by_projection(db, projection.id).await?;
    }
    Ok(projections)
}

fn build_periods(plan: &WeeklySchedule, unit: &str) -> Vec<WeeklyPeriod> {
    plan.week_starts
        .iter()
        .map(|&date| WeeklyPeriod {
            id: 0,
            week_number: iso_week_number(date),
            date,
            quantity: plan.per_week_quantity,
            unit: unit.to_string(),
        })
        .collect()
}

/// Смена типа проекции может упереться в уже существующую проекцию
/// другого типа на той же связке
fn map_type_conflict(err: sea_orm::DbErr, next: &Projection) -> ProjectionError {
    if is_unique_violation(&err) {
        ProjectionError::Conflict {
            association_ref: next.association_ref,
            projection_type: next.projection_type,
        }
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use contracts::domain::a001_project::{Project, ProjectId};
    use contracts::domain::a002_product_association::{AssociationId, ProductAssociation};
    use contracts::enums::{ProjectionStatus, ProjectionType};
    use sea_orm::Database;

    struct FixedUnit(&'static str);

    #[async_trait]
    impl UnitProvider for FixedUnit {
        async fn unit_of_measure(&self, _product_ref: Uuid) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl UnitProvider for BrokenCatalog {
        async fn unit_of_measure(&self, _product_ref: Uuid) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    async fn test_db() -> DatabaseConnection {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        crate::shared::data::db::create_schema(&conn).await.unwrap();
        conn
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Проект 10 этажей + 2 подвала, старт в четверг 2025-01-02,
    /// связка на 1200 единиц материала
    async fn seed(db: &DatabaseConnection) -> ProductAssociation {
        let project = Project {
            id: ProjectId::new(Uuid::new_v4()),
            name: "Torre Central".to_string(),
            floors: Some(10),
            basements: Some(2),
            tentative_start: Some(d(2025, 1, 2)),
            metadata: EntityMetadata::new(),
        };
        a001_project::repository::upsert(db, &project).await.unwrap();

        let association = ProductAssociation {
            id: AssociationId::new(Uuid::new_v4()),
            project_ref: project.id.value(),
            product_ref: Uuid::new_v4(),
            quantity: 1200.0,
            is_active: true,
            metadata: EntityMetadata::new(),
        };
        a002_product_association::repository::upsert(db, &association)
            .await
            .unwrap();
        association
    }

    fn create_request(association: &ProductAssociation) -> CreateProjectionRequest {
        CreateProjectionRequest {
            association_ref: association.id.value(),
            projection_type: ProjectionType::Real,
            status: ProjectionStatus::Pending,
            velocity: 1.5,
            floors: None,
            basements: None,
            start_date: None,
            total_quantity: None,
            unit: None,
        }
    }

    #[tokio::test]
    async fn test_create_builds_expected_schedule() {
        let db = test_db().await;
        let association = seed(&db).await;

        let projection = create(&db, &FixedUnit("M3"), create_request(&association))
            .await
            .unwrap();

        assert_eq!(projection.floors, 10);
        assert_eq!(projection.basements, 2);
        assert_eq!(projection.per_week_quantity, 150.0);
        assert_eq!(projection.unit, "M3");
        assert_eq!(projection.start_date, d(2025, 1, 2));
        assert_eq!(projection.end_date, d(2025, 2, 24));

        assert_eq!(projection.periods.len(), 8);
        assert_eq!(projection.periods[0].date, d(2025, 1, 6));
        assert_eq!(projection.periods[0].week_number, 2);
        assert_eq!(projection.periods[7].date, d(2025, 2, 24));
        for period in &projection.periods {
            assert_eq!(period.quantity, 150.0);
            assert_eq!(period.unit, "M3");
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_type_but_allows_other() {
        let db = test_db().await;
        let association = seed(&db).await;

        create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();

        let err = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectionError::Conflict { .. }));

        // Второй тип для той же связки допустим
        let mut prospect = create_request(&association);
        prospect.projection_type = ProjectionType::Prospect;
        create(&db, &FixedUnit("UND"), prospect).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_rejects_nonpositive_velocity() {
        let db = test_db().await;
        let association = seed(&db).await;

        for velocity in [0.0, -1.5] {
            let mut req = create_request(&association);
            req.velocity = velocity;
            let err = create(&db, &FixedUnit("UND"), req).await.unwrap_err();
            assert!(matches!(
                err,
                ProjectionError::Validation {
                    field: "velocity",
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_create_requires_floors_from_somewhere() {
        let db = test_db().await;

        let project = Project {
            id: ProjectId::new(Uuid::new_v4()),
            name: "Sin perfil".to_string(),
            floors: None,
            basements: None,
            tentative_start: None,
            metadata: EntityMetadata::new(),
        };
        a001_project::repository::upsert(&db, &project).await.unwrap();
        let association = ProductAssociation {
            id: AssociationId::new(Uuid::new_v4()),
            project_ref: project.id.value(),
            product_ref: Uuid::new_v4(),
            quantity: 500.0,
            is_active: true,
            metadata: EntityMetadata::new(),
        };
        a002_product_association::repository::upsert(&db, &association)
            .await
            .unwrap();

        let err = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::Validation { field: "floors", .. }
        ));
    }

    #[tokio::test]
    async fn test_create_unknown_association_is_not_found() {
        let db = test_db().await;
        seed(&db).await;

        let req = CreateProjectionRequest {
            association_ref: Uuid::new_v4(),
            projection_type: ProjectionType::Real,
            status: ProjectionStatus::Pending,
            velocity: 1.0,
            floors: None,
            basements: None,
            start_date: None,
            total_quantity: None,
            unit: None,
        };
        let err = create(&db, &FixedUnit("UND"), req).await.unwrap_err();
        assert!(matches!(err, ProjectionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_broken_catalog_is_dependency_error() {
        let db = test_db().await;
        let association = seed(&db).await;

        let err = create(&db, &BrokenCatalog, create_request(&association))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectionError::Dependency { .. }));
        assert!(err.is_retryable());

        // Явно заданная единица не требует каталога
        let mut req = create_request(&association);
        req.unit = Some("KG".to_string());
        let projection = create(&db, &BrokenCatalog, req).await.unwrap();
        assert_eq!(projection.unit, "KG");
    }

    #[tokio::test]
    async fn test_create_degenerate_structure_yields_empty_schedule() {
        let db = test_db().await;
        let association = seed(&db).await;

        let mut req = create_request(&association);
        req.floors = Some(0);
        req.basements = Some(0);
        let projection = create(&db, &FixedUnit("UND"), req).await.unwrap();

        assert!(projection.periods.is_empty());
        assert_eq!(projection.per_week_quantity, 0.0);
        assert_eq!(projection.end_date, projection.start_date);
    }

    #[tokio::test]
    async fn test_status_change_preserves_schedule() {
        let db = test_db().await;
        let association = seed(&db).await;
        let created = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();
        let period_ids: Vec<i64> = created.periods.iter().map(|p| p.id).collect();

        let updated = update(
            &db,
            created.id,
            UpdateProjectionRequest {
                status: Some(ProjectionStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.status, ProjectionStatus::InProgress);
        assert_eq!(updated.per_week_quantity, 150.0);
        // Строки периодов не пересоздавались
        let ids_after: Vec<i64> = updated.periods.iter().map(|p| p.id).collect();
        assert_eq!(ids_after, period_ids);
    }

    #[tokio::test]
    async fn test_velocity_change_regenerates_schedule() {
        let db = test_db().await;
        let association = seed(&db).await;
        let created = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();

        let updated = update(
            &db,
            created.id,
            UpdateProjectionRequest {
                velocity: Some(2.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.velocity, 2.0);
        assert_eq!(updated.per_week_quantity, 200.0);
        assert_eq!(updated.periods.len(), 6);
        assert_eq!(updated.periods[0].date, d(2025, 1, 6));
        assert_eq!(updated.end_date, d(2025, 2, 10));

        // В хранилище не осталось строк старого графика
        let stored = a004_projection_week::repository::find_by_projection(&db, created.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 6);
        for period in stored {
            assert_eq!(period.quantity, 200.0);
        }
    }

    #[tokio::test]
    async fn test_start_date_change_shifts_without_recalculation() {
        let db = test_db().await;
        let association = seed(&db).await;
        let created = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();
        let period_ids: Vec<i64> = created.periods.iter().map(|p| p.id).collect();

        // Четверг 2025-01-09: понедельники сдвигаются ровно на неделю
        let updated = update(
            &db,
            created.id,
            UpdateProjectionRequest {
                start_date: Some(d(2025, 1, 9)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.start_date, d(2025, 1, 9));
        assert_eq!(updated.periods.len(), 8);
        assert_eq!(updated.periods[0].date, d(2025, 1, 13));
        assert_eq!(updated.periods[0].week_number, 3);
        assert_eq!(updated.end_date, d(2025, 3, 3));
        // Количества и сами строки сохранены
        assert_eq!(updated.per_week_quantity, 150.0);
        let ids_after: Vec<i64> = updated.periods.iter().map(|p| p.id).collect();
        assert_eq!(ids_after, period_ids);
    }

    #[tokio::test]
    async fn test_force_recalculate_rebuilds_identical_inputs() {
        let db = test_db().await;
        let association = seed(&db).await;
        let created = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();
        let old_ids: Vec<i64> = created.periods.iter().map(|p| p.id).collect();

        let updated = update(
            &db,
            created.id,
            UpdateProjectionRequest {
                force_recalculate: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.periods.len(), 8);
        assert_eq!(updated.per_week_quantity, 150.0);
        let new_ids: Vec<i64> = updated.periods.iter().map(|p| p.id).collect();
        assert_ne!(new_ids, old_ids);
    }

    #[tokio::test]
    async fn test_empty_update_is_a_noop() {
        let db = test_db().await;
        let association = seed(&db).await;
        let created = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();
        let period_ids: Vec<i64> = created.periods.iter().map(|p| p.id).collect();

        let updated = update(&db, created.id, UpdateProjectionRequest::default())
            .await
            .unwrap();

        // Запись не перезаписывалась: версия и строки периодов те же
        assert_eq!(updated.metadata.version, created.metadata.version);
        let ids_after: Vec<i64> = updated.periods.iter().map(|p| p.id).collect();
        assert_eq!(ids_after, period_ids);
    }

    #[tokio::test]
    async fn test_update_missing_projection_is_not_found() {
        let db = test_db().await;
        seed(&db).await;

        let err = update(
            &db,
            ProjectionId::new(Uuid::new_v4()),
            UpdateProjectionRequest::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProjectionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_deletes_projection_and_periods() {
        let db = test_db().await;
        let association = seed(&db).await;
        let created = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();

        remove(&db, created.id).await.unwrap();

        let err = get(&db, created.id).await.unwrap_err();
        assert!(matches!(err, ProjectionError::NotFound { .. }));
        let leftovers = a004_projection_week::repository::find_by_projection(&db, created.id)
            .await
            .unwrap();
        assert!(leftovers.is_empty());

        let err = remove(&db, created.id).await.unwrap_err();
        assert!(matches!(err, ProjectionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_by_project_walks_associations() {
        let db = test_db().await;
        let association = seed(&db).await;
        let created = create(&db, &FixedUnit("UND"), create_request(&association))
            .await
            .unwrap();

        let by_association = list_by_association(&db, association.id.value())
            .await
            .unwrap();
        assert_eq!(by_association.len(), 1);
        assert_eq!(by_association[0].periods.len(), 8);

        let by_project = list_by_project(&db, association.project_ref).await.unwrap();
        assert_eq!(by_project.len(), 1);
        assert_eq!(by_project[0].id, created.id);

        let empty = list_by_project(&db, Uuid::new_v4()).await.unwrap();
        assert!(empty.is_empty());
    }
}
