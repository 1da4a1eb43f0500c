pub mod a001_project;
pub mod a002_product_association;
pub mod a003_projection;
pub mod common;
