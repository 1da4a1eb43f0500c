use super::repository;
use anyhow::Result;
use contracts::domain::a001_project::Project;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Сохранить или обновить проект
/// Возвращает (id, is_new)
pub async fn upsert(db: &DatabaseConnection, project: &Project) -> Result<(Uuid, bool)> {
    project
        .validate()
        .map_err(|message| anyhow::anyhow!(message))?;
    let is_new = repository::upsert(db, project).await?;
    Ok((project.id.value(), is_new))
}

pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Project>> {
    Ok(repository::get_by_id(db, id).await?)
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Project>> {
    Ok(repository::list_all(db).await?)
}
