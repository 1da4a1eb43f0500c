use serde::{Deserialize, Serialize};

/// Статус переговоров по проекции
///
/// Информационное поле: смена статуса никогда не меняет форму графика.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionStatus {
    /// Переговоры идут
    Pending,
    /// Поставки выполняются
    InProgress,
    /// Сделка закрыта без поставок
    Closed,
    /// Поставки завершены
    Finished,
}

impl ProjectionStatus {
    /// Код для хранения и обмена
    pub fn code(&self) -> &'static str {
        match self {
            ProjectionStatus::Pending => "PENDING",
            ProjectionStatus::InProgress => "IN_PROGRESS",
            ProjectionStatus::Closed => "CLOSED",
            ProjectionStatus::Finished => "FINISHED",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(ProjectionStatus::Pending),
            "IN_PROGRESS" => Some(ProjectionStatus::InProgress),
            "CLOSED" => Some(ProjectionStatus::Closed),
            "FINISHED" => Some(ProjectionStatus::Finished),
            _ => None,
        }
    }

    pub fn all() -> Vec<ProjectionStatus> {
        vec![
            ProjectionStatus::Pending,
            ProjectionStatus::InProgress,
            ProjectionStatus::Closed,
            ProjectionStatus::Finished,
        ]
    }
}

impl std::fmt::Display for ProjectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for s in ProjectionStatus::all() {
            assert_eq!(ProjectionStatus::from_code(s.code()), Some(s));
        }
        assert_eq!(ProjectionStatus::from_code("UNKNOWN"), None);
    }
}
