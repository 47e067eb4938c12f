pub mod auto_auth_session;
pub mod dto;
pub mod error;
pub mod pilot_session;
pub mod urls;

pub use auto_auth_session::AutoAuthSession;
pub use error::ApiError;
pub use pilot_session::{CourseApi, PilotSession};
pub use urls::*;
