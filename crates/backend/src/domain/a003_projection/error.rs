use contracts::enums::ProjectionType;
use thiserror::Error;
use uuid::Uuid;

/// Типизированные ошибки движка проекций
///
/// Каждый вариант несёт достаточно контекста (поле, id), чтобы вызывающий
/// мог показать точное сообщение или принять решение о повторе.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Некорректный вход; отклоняется до любой записи в хранилище
    #[error("validation failed for `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Для связки уже существует проекция этого типа
    #[error("a {projection_type} projection already exists for association {association_ref}")]
    Conflict {
        association_ref: Uuid,
        projection_type: ProjectionType,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Внешний сервис недоступен или вернул мусор; повтор допустим
    #[error("dependency `{service}` failed: {message}")]
    Dependency {
        service: &'static str,
        message: String,
    },

    /// Сбой хранилища; транзакция откачена целиком
    #[error("storage failure: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl ProjectionError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Повтор имеет смысл только для отказов внешних зависимостей
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dependency { .. })
    }
}

/// Нарушение уникального индекса sqlite
///
/// Ловит гонку create/create на (association_ref, projection_type):
/// проверка чтением могла пройти у обоих, но вставит только один.
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}
