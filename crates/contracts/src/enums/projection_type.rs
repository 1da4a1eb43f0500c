use serde::{Deserialize, Serialize};

/// Тип проекции: подтверждённый график поставок или предварительный
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionType {
    /// Подтверждённый график
    Real,
    /// Спекулятивный (проспект)
    Prospect,
}

impl ProjectionType {
    /// Код для хранения и обмена
    pub fn code(&self) -> &'static str {
        match self {
            ProjectionType::Real => "REAL",
            ProjectionType::Prospect => "PROSPECT",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "REAL" => Some(ProjectionType::Real),
            "PROSPECT" => Some(ProjectionType::Prospect),
            _ => None,
        }
    }

    pub fn all() -> Vec<ProjectionType> {
        vec![ProjectionType::Real, ProjectionType::Prospect]
    }
}

impl std::fmt::Display for ProjectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
