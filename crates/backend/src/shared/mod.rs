pub mod config;
pub mod data;
pub mod dates;
pub mod product_client;
