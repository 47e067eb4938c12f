pub mod board;

pub use board::{apply_suggested_grades, ReviewBoard, ReviewError, StatusSummary};
