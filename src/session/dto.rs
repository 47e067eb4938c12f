use crate::model::{Grade, PeerReview, ReviewStatus, Sprint, Student, StudentId, Team, TeamId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Partial team update; absent fields are left untouched.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_link: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct GradeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint: Option<Sprint>,
}

#[derive(Debug, Default, Serialize)]
pub struct ReviewQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint: Option<Sprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewing_team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_team_id: Option<TeamId>,
}

#[derive(Debug, Serialize)]
pub struct JoinQuery {
    pub team_id: TeamId,
    pub as_rep: bool,
}

/// Everything a student's dashboard needs in one response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub student: Student,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub grades: Vec<Grade>,
    #[serde(default, alias = "review_assignments")]
    pub review_assignments: Vec<PeerReview>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patches_skip_absent_fields() {
        let p = TeamPatch {
            is_locked: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&p).unwrap(), json!({"isLocked": true}));
        let r = ReviewPatch {
            status: Some(ReviewStatus::Graded),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"status": "graded"}));
    }

    #[test]
    fn dashboard_accepts_snake_case_reviews() {
        let body = json!({
            "student": {"id": 1, "name": "Ann", "email": "a@uni.edu", "team_id": 3, "is_rep": true},
            "teams": [],
            "students": [],
            "grades": [{"id": 5, "studentId": 1, "sprint": 1, "assignment": "TE", "score": 4}],
            "review_assignments": [
                {"id": 9, "sprint": 1, "reviewing_team_id": 3, "reviewed_team_id": 4, "status": "submitted"}
            ]
        });
        let d: StudentDashboard = serde_json::from_value(body).unwrap();
        assert_eq!(d.student.team_id, Some(3));
        assert_eq!(d.grades[0].assignment, crate::model::Assignment::ET);
        assert_eq!(d.review_assignments[0].status, ReviewStatus::Submitted);
    }
}
