pub mod aggregate;

pub use aggregate::{AssociationId, ProductAssociation, ProductAssociationDto};
