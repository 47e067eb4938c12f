use crate::model::{Assignment, Grade};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unsaved grade edit, one row per (student, sprint, assignment).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grade_drafts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    pub student_id: i64,
    pub sprint: i32,
    pub assignment: String,
    pub score: i32,
    /// Server id when the edit targets an existing grade.
    pub grade_id: Option<i64>,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_grade(&self) -> Option<Grade> {
        let assignment: Assignment = self.assignment.parse().ok()?;
        Some(Grade {
            id: self.grade_id,
            student_id: self.student_id,
            sprint: u32::try_from(self.sprint).ok()?,
            assignment,
            score: u32::try_from(self.score).ok()?,
        })
    }
}
