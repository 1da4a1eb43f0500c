use super::repository;
use anyhow::Result;
use contracts::domain::a002_product_association::ProductAssociation;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Сохранить или обновить связку проект-продукт
/// Возвращает (id, is_new)
pub async fn upsert(
    db: &DatabaseConnection,
    association: &ProductAssociation,
) -> Result<(Uuid, bool)> {
    association
        .validate()
        .map_err(|message| anyhow::anyhow!(message))?;
    let is_new = repository::upsert(db, association).await?;
    Ok((association.id.value(), is_new))
}

pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<ProductAssociation>> {
    Ok(repository::get_by_id(db, id).await?)
}

pub async fn list_by_project(
    db: &DatabaseConnection,
    project_ref: Uuid,
) -> Result<Vec<ProductAssociation>> {
    Ok(repository::list_by_project(db, project_ref).await?)
}
