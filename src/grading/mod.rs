pub mod band;
pub mod ledger;
pub mod rollup;

pub use band::{Band, GradeScale};
pub use ledger::GradeLedger;
pub use rollup::{AverageReport, MemberSprint, Rollup};
