pub mod service;
pub mod workspace;

pub use service::SyncService;
pub use workspace::Workspace;
