pub mod aggregate;
pub mod dto;

pub use aggregate::{Projection, ProjectionId, WeeklyPeriod};
pub use dto::{CreateProjectionRequest, UpdateProjectionRequest};
