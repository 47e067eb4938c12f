use crate::model::{ProjectId, ReviewId, StudentId, TeamId};

/// Default backend address.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Endpoint builder rooted at the configured backend URL.
#[derive(Debug, Clone)]
pub struct ApiUrls {
    base: String,
}

impl ApiUrls {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn login(&self) -> String {
        format!("{}/auth/login", self.base)
    }
    pub fn me(&self) -> String {
        format!("{}/auth/me", self.base)
    }

    pub fn teams(&self) -> String {
        format!("{}/teams", self.base)
    }
    pub fn team(&self, id: TeamId) -> String {
        format!("{}/teams/{}", self.base, id)
    }

    pub fn students(&self) -> String {
        format!("{}/students", self.base)
    }
    pub fn student(&self, id: StudentId) -> String {
        format!("{}/students/{}", self.base, id)
    }

    pub fn projects(&self) -> String {
        format!("{}/projects", self.base)
    }
    pub fn join_team(&self, project_id: ProjectId) -> String {
        format!("{}/projects/{}/join-team", self.base, project_id)
    }

    pub fn grades(&self) -> String {
        format!("{}/grades", self.base)
    }
    pub fn grade(&self, id: i64) -> String {
        format!("{}/grades/{}", self.base, id)
    }

    pub fn peer_reviews(&self) -> String {
        format!("{}/peer-reviews", self.base)
    }
    pub fn peer_review(&self, id: ReviewId) -> String {
        format!("{}/peer-reviews/{}", self.base, id)
    }
    pub fn report_link(&self) -> String {
        format!("{}/peer-reviews/report-link", self.base)
    }

    pub fn student_dashboard(&self, id: StudentId) -> String {
        format!("{}/dashboard/students/{}", self.base, id)
    }
}
