pub mod error;
pub mod requests;
pub mod responses;

pub use error::{ApiError, NAME_REQUIRED};
pub use requests::{ListQuery, ResolveRequest};
pub use responses::{ErrorResponse, HealthResponse};
