pub mod classifier;
pub mod error;
pub mod repository;
pub mod schedule;
pub mod service;
