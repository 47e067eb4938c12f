pub mod assignment;
pub mod grade;
pub mod review;
pub mod roster;

pub use assignment::{Assignment, UnknownAssignment};
pub use grade::{clamp_score, Grade, GradeKey, Sprint};
pub use review::{PeerReview, ReportLinkUpdate, ReviewId, ReviewStatus, SuggestedGrades};
pub use roster::{
    slugify, CurrentUser, Project, ProjectId, Role, Roster, Student, StudentId, Team, TeamId,
};
