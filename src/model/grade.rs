use super::assignment::Assignment;
use super::roster::StudentId;
use serde::{Deserialize, Serialize};

pub type Sprint = u32;

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(alias = "student_id")]
    pub student_id: StudentId,
    pub sprint: Sprint,
    pub assignment: Assignment,
    pub score: u32,
}

impl Grade {
    pub fn key(&self) -> GradeKey {
        GradeKey {
            student_id: self.student_id,
            sprint: self.sprint,
            assignment: self.assignment,
        }
    }
}

/// Uniqueness key of a grade row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GradeKey {
    pub student_id: StudentId,
    pub sprint: Sprint,
    pub assignment: Assignment,
}

impl GradeKey {
    pub fn new(student_id: StudentId, sprint: Sprint, assignment: Assignment) -> Self {
        Self {
            student_id,
            sprint,
            assignment,
        }
    }
}

/// Scores outside 0..=100 are pulled to the nearest bound.
pub fn clamp_score(raw: i64) -> u32 {
    raw.clamp(0, MAX_SCORE as i64) as u32
}
