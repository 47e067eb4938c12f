//! Team formation rules.
//!
//! Every join, rename and lock goes through these checks before the request
//! is sent, so the user gets a precise reason instead of a bare HTTP 400.

use crate::model::{Project, ProjectId, Roster, Student, StudentId, Team, TeamId};
use serde::Serialize;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormationError {
    #[error("project {0} not found")]
    UnknownProject(ProjectId),
    #[error("team not found: {0}")]
    UnknownTeam(String),
    #[error("student {0} not found")]
    UnknownStudent(StudentId),
    #[error("team {team} is not part of project {project}")]
    TeamNotInProject { team: TeamId, project: ProjectId },
    #[error("Team is full")]
    TeamFull,
    #[error("Team is locked")]
    TeamLocked,
    #[error("Representative already exists for this team")]
    RepresentativeExists,
    #[error("You are already in a locked team in this project")]
    AlreadyInLockedTeam,
    #[error("only the team representative can rename the team")]
    NotRepresentative,
    #[error("team name cannot be empty")]
    EmptyName,
    #[error("project name cannot be empty")]
    EmptyProjectName,
    #[error("a project needs at least one team and one seat per team")]
    InvalidCapacity,
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub max_teams: u32,
    pub max_students_per_team: u32,
}

pub fn validate_project(
    name: &str,
    max_teams: u32,
    max_students_per_team: u32,
) -> Result<NewProject, FormationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FormationError::EmptyProjectName);
    }
    if max_teams < 1 || max_students_per_team < 1 {
        return Err(FormationError::InvalidCapacity);
    }
    Ok(NewProject {
        name: name.to_string(),
        max_teams,
        max_students_per_team,
    })
}

/// Checks whether `student_id` may take a seat in `team_id`.
pub fn check_join(
    project: &Project,
    team_id: TeamId,
    student_id: StudentId,
    as_rep: bool,
) -> Result<(), FormationError> {
    let team = project
        .team(team_id)
        .ok_or(FormationError::TeamNotInProject {
            team: team_id,
            project: project.id,
        })?;

    if project
        .teams
        .iter()
        .any(|t| t.is_locked && t.has_member(student_id))
    {
        return Err(FormationError::AlreadyInLockedTeam);
    }

    let others: Vec<&Student> = team.students.iter().filter(|s| s.id != student_id).collect();
    if others.len() >= project.max_students_per_team as usize {
        return Err(FormationError::TeamFull);
    }
    if team.is_locked {
        return Err(FormationError::TeamLocked);
    }
    if as_rep && others.iter().any(|s| s.is_rep) {
        return Err(FormationError::RepresentativeExists);
    }
    Ok(())
}

/// Moves the student into `team_id`, dropping any other seat in the project.
pub fn apply_join(project: &mut Project, team_id: TeamId, student: &Student, as_rep: bool) {
    for team in project.teams.iter_mut() {
        team.students.retain(|s| s.id != student.id);
    }
    if let Some(team) = project.team_mut(team_id) {
        team.students.push(Student {
            team_id: Some(team_id),
            is_rep: as_rep,
            ..student.clone()
        });
    }
}

/// Applies a join to every copy of the roster so views update before the
/// next fetch.
pub fn mirror_join(
    roster: &mut Roster,
    project_id: ProjectId,
    team_id: TeamId,
    student_id: StudentId,
    as_rep: bool,
) -> Result<(), FormationError> {
    let student = roster
        .student(student_id)
        .cloned()
        .ok_or(FormationError::UnknownStudent(student_id))?;
    let project = roster
        .projects
        .iter_mut()
        .find(|p| p.id == project_id)
        .ok_or(FormationError::UnknownProject(project_id))?;
    let project_teams: Vec<TeamId> = project.teams.iter().map(|t| t.id).collect();
    apply_join(project, team_id, &student, as_rep);

    for team in roster
        .teams
        .iter_mut()
        .filter(|t| project_teams.contains(&t.id))
    {
        team.students.retain(|s| s.id != student_id);
        if team.id == team_id {
            team.students.push(Student {
                team_id: Some(team_id),
                is_rep: as_rep,
                ..student.clone()
            });
        }
    }
    if let Some(s) = roster.students.iter_mut().find(|s| s.id == student_id) {
        s.team_id = Some(team_id);
        s.is_rep = as_rep;
    }
    Ok(())
}

/// Validates a rename and returns the trimmed name.
pub fn check_rename(team: &Team, actor: StudentId, name: &str) -> Result<String, FormationError> {
    if team.rep().map(|s| s.id) != Some(actor) {
        return Err(FormationError::NotRepresentative);
    }
    if team.is_locked {
        return Err(FormationError::TeamLocked);
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(FormationError::EmptyName);
    }
    Ok(name.to_string())
}
