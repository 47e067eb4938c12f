use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub type StudentId = i64;
pub type TeamId = i64;
pub type ProjectId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    #[serde(default, alias = "team_id")]
    pub team_id: Option<TeamId>,
    #[serde(default, alias = "is_rep")]
    pub is_rep: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "is_locked")]
    pub is_locked: bool,
    #[serde(default, alias = "project_id")]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl Team {
    pub fn has_rep(&self) -> bool {
        self.students.iter().any(|s| s.is_rep)
    }

    pub fn has_member(&self, student_id: StudentId) -> bool {
        self.students.iter().any(|s| s.id == student_id)
    }

    pub fn rep(&self) -> Option<&Student> {
        self.students.iter().find(|s| s.is_rep)
    }

    /// URL-style name used for lookups: `Team Alpha` -> `team-alpha`.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(alias = "max_teams")]
    pub max_teams: u32,
    #[serde(alias = "max_students_per_team")]
    pub max_students_per_team: u32,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Project {
    pub fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn team_mut(&mut self, team_id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == team_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Instructor,
    Student,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, alias = "student_id")]
    pub student_id: Option<StudentId>,
    #[serde(default, alias = "team_id")]
    pub team_id: Option<TeamId>,
}

impl CurrentUser {
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }
}

pub fn slugify(name: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let re = WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re.replace_all(name.trim(), "-").to_lowercase()
}

/// Teams and students as last fetched, plus projects for formation.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub teams: Vec<Team>,
    pub students: Vec<Student>,
    pub projects: Vec<Project>,
}

impl Roster {
    pub fn members(&self, team_id: TeamId) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.team_id == Some(team_id))
            .collect()
    }

    pub fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn student(&self, student_id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    /// Resolves a team by id, exact name or slug, ignoring case.
    pub fn find_team(&self, query: &str) -> Option<&Team> {
        let q = query.trim();
        if let Ok(id) = q.parse::<TeamId>() {
            if let Some(t) = self.team(id) {
                return Some(t);
            }
        }
        let slug = slugify(q);
        self.teams
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(q) || t.slug() == slug)
    }

    /// Resolves a student by id, email or name, ignoring case.
    pub fn find_student(&self, query: &str) -> Option<&Student> {
        let q = query.trim();
        if let Ok(id) = q.parse::<StudentId>() {
            if let Some(s) = self.student(id) {
                return Some(s);
            }
        }
        let slug = slugify(q);
        self.students.iter().find(|s| {
            s.email.eq_ignore_ascii_case(q)
                || s.name.eq_ignore_ascii_case(q)
                || slugify(&s.name) == slug
        })
    }

    pub fn project_of(&self, team_id: TeamId) -> Option<&Project> {
        self.projects.iter().find(|p| p.team(team_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster {
            teams: vec![
                Team {
                    id: 1,
                    name: "Team Alpha".into(),
                    color: None,
                    is_locked: false,
                    project_id: None,
                    students: vec![],
                },
                Team {
                    id: 2,
                    name: "Team Beta".into(),
                    color: None,
                    is_locked: true,
                    project_id: None,
                    students: vec![],
                },
            ],
            students: vec![
                Student {
                    id: 10,
                    name: "Alice Johnson".into(),
                    email: "alice@example.com".into(),
                    team_id: Some(1),
                    is_rep: false,
                },
                Student {
                    id: 11,
                    name: "Bob Smith".into(),
                    email: "bob@example.com".into(),
                    team_id: None,
                    is_rep: false,
                },
            ],
            projects: vec![],
        }
    }

    #[test]
    fn finds_team_by_id_name_or_slug() {
        let r = roster();
        assert_eq!(r.find_team("2").map(|t| t.id), Some(2));
        assert_eq!(r.find_team("team alpha").map(|t| t.id), Some(1));
        assert_eq!(r.find_team("team-beta").map(|t| t.id), Some(2));
        assert!(r.find_team("gamma").is_none());
    }

    #[test]
    fn finds_student_by_email_and_slug() {
        let r = roster();
        assert_eq!(r.find_student("BOB@example.com").map(|s| s.id), Some(11));
        assert_eq!(r.find_student("alice-johnson").map(|s| s.id), Some(10));
    }

    #[test]
    fn members_follow_team_id() {
        let r = roster();
        let ids: Vec<_> = r.members(1).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10]);
        assert!(r.members(2).is_empty());
    }

    #[test]
    fn project_accepts_snake_case_payload() {
        let raw = r#"{
            "id": 3, "name": "CMS", "max_teams": 2, "max_students_per_team": 4,
            "teams": [{"id": 7, "name": "CMS - Team 1", "is_locked": true,
                       "students": [{"id": 1, "name": "A", "email": "a@x", "team_id": 7, "is_rep": true}]}]
        }"#;
        let p: Project = serde_json::from_str(raw).unwrap();
        assert_eq!(p.max_students_per_team, 4);
        assert!(p.teams[0].is_locked);
        assert!(p.teams[0].has_rep());
        assert_eq!(p.teams[0].students[0].team_id, Some(7));
    }
}
