use contracts::domain::a003_projection::{Projection, UpdateProjectionRequest};

/// Ярус изменения: определяет, какую работу нужно выполнить при обновлении
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTier {
    /// Затронуты только метки (статус, тип) — график не трогается
    Harmless,
    /// Изменилась только дата старта — недели сдвигаются без пересчёта количеств
    Shift,
    /// Изменились расчётные входы — график сносится и строится заново
    Structural,
}

/// Классификация запроса на обновление относительно текущего состояния
///
/// Поле считается изменённым, только если оно задано в запросе И отличается
/// от хранимого значения: повтор того же значения — не изменение.
/// `force_recalculate` безусловно поднимает ярус до Structural.
pub fn classify(current: &Projection, req: &UpdateProjectionRequest) -> ChangeTier {
    if req.force_recalculate {
        return ChangeTier::Structural;
    }

    let velocity_changed = req.velocity.is_some_and(|v| v != current.velocity);
    let floors_changed = req.floors.is_some_and(|v| v != current.floors);
    let basements_changed = req.basements.is_some_and(|v| v != current.basements);
    let total_changed = req
        .total_quantity
        .is_some_and(|v| v != current.total_quantity);

    if velocity_changed || floors_changed || basements_changed || total_changed {
        return ChangeTier::Structural;
    }

    if req.start_date.is_some_and(|d| d != current.start_date) {
        return ChangeTier::Shift;
    }

    ChangeTier::Harmless
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a003_projection::ProjectionId;
    use contracts::domain::common::EntityMetadata;
    use contracts::enums::{ProjectionStatus, ProjectionType};
    use uuid::Uuid;

    fn sample() -> Projection {
        Projection {
            id: ProjectionId::new(Uuid::new_v4()),
            association_ref: Uuid::new_v4(),
            product_ref: Uuid::new_v4(),
            projection_type: ProjectionType::Real,
            status: ProjectionStatus::Pending,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 24).unwrap(),
            floors: 10,
            basements: 2,
            velocity: 1.5,
            total_quantity: 1200.0,
            per_week_quantity: 150.0,
            unit: "UND".to_string(),
            periods: Vec::new(),
            metadata: EntityMetadata::new(),
        }
    }

    fn empty_request() -> UpdateProjectionRequest {
        UpdateProjectionRequest::default()
    }

    #[test]
    fn test_empty_request_is_harmless() {
        assert_eq!(classify(&sample(), &empty_request()), ChangeTier::Harmless);
    }

    #[test]
    fn test_status_and_type_are_harmless() {
        let req = UpdateProjectionRequest {
            status: Some(ProjectionStatus::InProgress),
            projection_type: Some(ProjectionType::Prospect),
            ..empty_request()
        };
        assert_eq!(classify(&sample(), &req), ChangeTier::Harmless);
    }

    #[test]
    fn test_same_values_do_not_count_as_changes() {
        let current = sample();
        let req = UpdateProjectionRequest {
            velocity: Some(1.5),
            floors: Some(10),
            basements: Some(2),
            total_quantity: Some(1200.0),
            start_date: Some(current.start_date),
            ..empty_request()
        };
        assert_eq!(classify(&current, &req), ChangeTier::Harmless);
    }

    #[test]
    fn test_start_date_only_is_shift() {
        let req = UpdateProjectionRequest {
            start_date: Some(NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()),
            ..empty_request()
        };
        assert_eq!(classify(&sample(), &req), ChangeTier::Shift);
    }

    #[test]
    fn test_calculation_inputs_are_structural() {
        for req in [
            UpdateProjectionRequest {
                velocity: Some(2.0),
                ..empty_request()
            },
            UpdateProjectionRequest {
                floors: Some(12),
                ..empty_request()
            },
            UpdateProjectionRequest {
                basements: Some(0),
                ..empty_request()
            },
            UpdateProjectionRequest {
                total_quantity: Some(900.0),
                ..empty_request()
            },
        ] {
            assert_eq!(classify(&sample(), &req), ChangeTier::Structural);
        }
    }

    #[test]
    fn test_structural_wins_over_shift() {
        let req = UpdateProjectionRequest {
            velocity: Some(2.0),
            start_date: Some(NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()),
            status: Some(ProjectionStatus::InProgress),
            ..empty_request()
        };
        assert_eq!(classify(&sample(), &req), ChangeTier::Structural);
    }

    #[test]
    fn test_force_recalculate_is_always_structural() {
        let req = UpdateProjectionRequest {
            force_recalculate: true,
            ..empty_request()
        };
        assert_eq!(classify(&sample(), &req), ChangeTier::Structural);
    }
}
