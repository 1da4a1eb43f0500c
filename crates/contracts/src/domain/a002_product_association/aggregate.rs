use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для связки проект-продукт
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationId(pub Uuid);

impl AssociationId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for AssociationId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(AssociationId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Связка проект-продукт (агрегат a002)
///
/// Несёт общее количество материала к поставке. Продукт — логическая
/// ссылка на внешний каталог, проект — локальный агрегат a001.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAssociation {
    pub id: AssociationId,

    /// Ссылка на проект (a001_project)
    pub project_ref: Uuid,

    /// Логическая ссылка на продукт во внешнем каталоге
    pub product_ref: Uuid,

    /// Общее количество материала к распределению
    pub quantity: f64,

    /// Активна ли связка
    pub is_active: bool,

    pub metadata: EntityMetadata,
}

impl ProductAssociation {
    pub fn new(id: Uuid, project_ref: Uuid, product_ref: Uuid, quantity: f64) -> Self {
        Self {
            id: AssociationId::new(id),
            project_ref,
            product_ref,
            quantity,
            is_active: true,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.quantity < 0.0 {
            return Err("Количество не может быть отрицательным".into());
        }
        Ok(())
    }
}

/// DTO для создания/обновления связки через API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAssociationDto {
    pub id: Option<Uuid>,
    pub project_ref: Uuid,
    pub product_ref: Uuid,
    pub quantity: f64,
    pub is_active: Option<bool>,
}

impl ProductAssociationDto {
    pub fn into_aggregate(self) -> ProductAssociation {
        let mut association = ProductAssociation::new(
            self.id.unwrap_or_else(Uuid::new_v4),
            self.project_ref,
            self.product_ref,
            self.quantity,
        );
        if let Some(is_active) = self.is_active {
            association.is_active = is_active;
        }
        association
    }
}

impl AggregateRoot for ProductAssociation {
    type Id = AssociationId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "product_association"
    }
}
