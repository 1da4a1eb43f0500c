pub mod projection_status;
pub mod projection_type;

pub use projection_status::ProjectionStatus;
pub use projection_type::ProjectionType;
