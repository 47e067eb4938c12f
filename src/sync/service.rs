use super::workspace::Workspace;
use crate::formation::{self, FormationError};
use crate::model::{
    Assignment, GradeKey, ReviewId, ReviewStatus, Sprint, Student, StudentId, Team,
};
use crate::review::apply_suggested_grades;
use crate::session::dto::{GradeQuery, ReviewPatch, ReviewQuery, TeamPatch};
use crate::session::CourseApi;
use crate::storage::repository::DraftRepository;
use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use log::{info, warn};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Owns the workspace and keeps it in step with the backend and the local
/// draft store.
pub struct SyncService {
    api: Arc<dyn CourseApi>,
    db: Option<Arc<DatabaseConnection>>,
    ws: Workspace,
}

impl SyncService {
    pub fn new(api: Arc<dyn CourseApi>, db: Option<Arc<DatabaseConnection>>, sprints: u32) -> Self {
        Self {
            api,
            db,
            ws: Workspace::new(sprints),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.ws
    }

    /// Loads the signed-in user, fetches everything and replays drafts left
    /// by a previous run.
    pub async fn bootstrap(&mut self) -> Result<String> {
        let user = self.api.me().await.context("loading current user")?;
        info!("Signed in as {} ({:?})", user.email, user.role);
        self.ws.user = Some(user);
        self.refresh().await?;
        let restored = self.restore_drafts().await?;

        let who = self.ws.user.as_ref().map(|u| u.name.clone()).unwrap_or_default();
        Ok(if restored > 0 {
            format!("Signed in as {}, restored {} unsaved change(s)", who, restored)
        } else {
            format!("Signed in as {}", who)
        })
    }

    async fn restore_drafts(&mut self) -> Result<usize> {
        let Some(db) = self.db.clone() else {
            return Ok(0);
        };
        let grades = DraftRepository::load_grades(&db)
            .await
            .context("reading grade drafts")?;
        let links = DraftRepository::load_report_links(&db)
            .await
            .context("reading report link drafts")?;
        for g in &grades {
            self.ws.ledger.set(g.key(), g.score as i64);
        }
        for l in &links {
            self.ws
                .reviews
                .set_report_link(l.reviewed_team_id, l.sprint, &l.link);
        }
        Ok(grades.len() + links.len())
    }

    /// Re-fetches all course data in parallel. Unsaved edits are replayed on
    /// top of the fresh rows.
    pub async fn refresh(&mut self) -> Result<()> {
        let user = self
            .ws
            .user
            .clone()
            .ok_or_else(|| anyhow!("not signed in"))?;
        let api = self.api.as_ref();

        if user.is_instructor() {
            let (teams, students, grades, projects, reviews) = tokio::try_join!(
                api.teams(),
                api.students(),
                api.grades(GradeQuery::default()),
                api.projects(),
                api.peer_reviews(ReviewQuery::default()),
            )
            .context("refreshing course data")?;
            self.ws.roster.teams = teams;
            self.ws.roster.students = students;
            self.ws.roster.projects = projects;
            self.ws.ledger.rebase(grades);
            self.ws.reviews.rebase(reviews);
        } else {
            let student_id = user
                .student_id
                .ok_or_else(|| anyhow!("account {} is not linked to a student", user.email))?;
            let (dashboard, projects) =
                tokio::try_join!(api.student_dashboard(student_id), api.projects())
                    .context("refreshing student dashboard")?;
            self.ws.roster.teams = dashboard.teams;
            self.ws.roster.students = dashboard.students;
            if self.ws.roster.student(student_id).is_none() {
                self.ws.roster.students.push(dashboard.student);
            }
            self.ws.roster.projects = projects;
            self.ws.ledger.rebase(dashboard.grades);
            self.ws.reviews.rebase(dashboard.review_assignments);
        }

        info!(
            "Refreshed: {} teams, {} students, {} grades, {} reviews",
            self.ws.roster.teams.len(),
            self.ws.roster.students.len(),
            self.ws.ledger.len(),
            self.ws.reviews.all().len()
        );
        Ok(())
    }

    /// Flushes the pending buffer. Every accepted row leaves the buffer as
    /// soon as its answer is in, so retrying a half-failed save only resends
    /// what the server has not stored yet.
    pub async fn save(&mut self) -> Result<String> {
        let grades = self.ws.ledger.pending();
        let links = self.ws.reviews.pending_links();
        if grades.is_empty() && links.is_empty() {
            self.refresh().await?;
            return Ok("Nothing to save, reloaded".to_string());
        }

        let api = self.api.as_ref();
        let grade_results = join_all(grades.iter().map(|g| async move {
            match g.id {
                Some(id) => api.update_grade(id, g).await,
                None => api.create_grade(g).await,
            }
        }))
        .await;
        let link_results = join_all(links.iter().map(|l| api.update_report_link(l))).await;

        let mut failure: Option<anyhow::Error> = None;
        for (g, res) in grades.iter().zip(grade_results) {
            match res {
                Ok(saved) => self.ws.ledger.adopt(g.key(), saved.id.or(g.id)),
                Err(e) => {
                    warn!("Grade {:?} not saved: {}", g.key(), e);
                    failure.get_or_insert(anyhow::Error::new(e).context("saving grades"));
                }
            }
        }
        for (l, res) in links.iter().zip(link_results) {
            match res {
                Ok(()) => self.ws.reviews.settle_link(l),
                Err(e) => {
                    warn!(
                        "Report link for team {} sprint {} not saved: {}",
                        l.reviewed_team_id, l.sprint, e
                    );
                    failure.get_or_insert(anyhow::Error::new(e).context("saving report links"));
                }
            }
        }

        if let Some(e) = failure {
            self.persist_drafts().await;
            return Err(e);
        }

        if let Some(db) = &self.db {
            DraftRepository::clear(db)
                .await
                .context("clearing drafts")?;
        }
        info!("Saved {} grades and {} report links", grades.len(), links.len());

        self.refresh().await?;
        Ok(format!(
            "Saved {} grade(s) and {} report link(s)",
            grades.len(),
            links.len()
        ))
    }

    /// Mirrors the whole pending buffer into the draft store. Failures are
    /// logged only; the in-memory buffer stays authoritative.
    async fn persist_drafts(&self) {
        let Some(db) = &self.db else {
            return;
        };
        let grades = self.ws.ledger.pending();
        let links = self.ws.reviews.pending_links();
        let mut res = DraftRepository::clear(db).await.map(|_| ());
        if res.is_ok() {
            res = DraftRepository::save_grades(db, &grades).await;
        }
        if res.is_ok() {
            res = DraftRepository::save_report_links(db, &links).await;
        }
        if let Err(e) = res {
            warn!("Could not write drafts: {}", e);
        }
    }

    fn require_instructor(&self) -> Result<()> {
        if !self.ws.is_instructor() {
            bail!("only instructors can do that");
        }
        Ok(())
    }

    fn require_student(&self) -> Result<StudentId> {
        self.ws
            .student_id()
            .ok_or_else(|| anyhow!("only students can do that"))
    }

    fn check_sprint(&self, sprint: Sprint) -> Result<()> {
        if sprint < 1 || sprint > self.ws.sprints {
            bail!("sprint must be between 1 and {}", self.ws.sprints);
        }
        Ok(())
    }

    fn find_team(&self, query: &str) -> Result<Team> {
        self.ws
            .roster
            .find_team(query)
            .cloned()
            .ok_or_else(|| FormationError::UnknownTeam(query.to_string()).into())
    }

    fn find_student(&self, query: &str) -> Result<Student> {
        self.ws
            .roster
            .find_student(query)
            .cloned()
            .ok_or_else(|| anyhow!("student not found: {}", query))
    }

    pub async fn set_grade(
        &mut self,
        student: &str,
        sprint: Sprint,
        assignment: Assignment,
        score: i64,
    ) -> Result<String> {
        self.require_instructor()?;
        self.check_sprint(sprint)?;
        let student = self.find_student(student)?;
        let stored = self
            .ws
            .ledger
            .set(GradeKey::new(student.id, sprint, assignment), score);
        self.persist_drafts().await;
        Ok(format!(
            "{} sprint {} {} = {}",
            student.name, sprint, assignment, stored
        ))
    }

    /// Writes the same score for every member of the team.
    pub async fn set_team_grade(
        &mut self,
        team: &str,
        sprint: Sprint,
        assignment: Assignment,
        score: i64,
    ) -> Result<String> {
        self.require_instructor()?;
        self.check_sprint(sprint)?;
        let team = self.find_team(team)?;
        let members: Vec<StudentId> = self
            .ws
            .roster
            .members(team.id)
            .iter()
            .map(|s| s.id)
            .collect();
        if members.is_empty() {
            bail!("{} has no members", team.name);
        }
        let stored = self
            .ws
            .ledger
            .set_team(&members, sprint, assignment, score);
        self.persist_drafts().await;
        Ok(format!(
            "{} sprint {} {} = {} for {} member(s)",
            team.name,
            sprint,
            assignment,
            stored,
            members.len()
        ))
    }

    /// Deletes a grade on the server right away and forgets it locally.
    pub async fn delete_grade(
        &mut self,
        student: &str,
        sprint: Sprint,
        assignment: Assignment,
    ) -> Result<String> {
        self.require_instructor()?;
        let student = self.find_student(student)?;
        let key = GradeKey::new(student.id, sprint, assignment);
        let Some(existing) = self.ws.ledger.get(&key).cloned() else {
            bail!("{} has no {} grade in sprint {}", student.name, assignment, sprint);
        };
        if let Some(id) = existing.id {
            self.api
                .delete_grade(id)
                .await
                .with_context(|| format!("deleting grade {}", id))?;
        }
        self.ws.ledger.remove(&key);
        self.persist_drafts().await;
        Ok(format!(
            "Removed {} sprint {} {}",
            student.name, sprint, assignment
        ))
    }

    /// Buffers the reviewed team's report link for the review's sprint. An
    /// empty link clears it.
    pub async fn set_report_link(&mut self, review: ReviewId, link: &str) -> Result<String> {
        self.require_instructor()?;
        let r = self
            .ws
            .reviews
            .get(review)
            .ok_or_else(|| anyhow!("peer review {} not found", review))?;
        let (team, sprint) = (r.reviewed_team_id, r.sprint);
        self.ws.reviews.set_report_link(team, sprint, link);
        self.persist_drafts().await;
        Ok(if link.trim().is_empty() {
            format!("Report link cleared for review {}", review)
        } else {
            format!("Report link set for review {}", review)
        })
    }

    /// Sends a status change immediately.
    pub async fn set_review_status(&mut self, review: ReviewId, status: ReviewStatus) -> Result<String> {
        if self.ws.reviews.get(review).is_none() {
            bail!("peer review {} not found", review);
        }
        self.api
            .update_review(
                review,
                &ReviewPatch {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("updating review {}", review))?;
        self.ws.reviews.set_status(review, status)?;
        Ok(format!("Review {} is now {}", review, status))
    }

    /// Copies a review's suggested grades onto the reviewed team and marks
    /// the review graded. The grades are worked out on a copy and only kept
    /// once the server has taken the status change.
    pub async fn apply_suggested(&mut self, review: ReviewId) -> Result<String> {
        self.require_instructor()?;
        let mut reviews = self.ws.reviews.clone();
        let mut ledger = self.ws.ledger.clone();
        let graded = apply_suggested_grades(&mut reviews, review, &self.ws.roster, &mut ledger)?;
        self.api
            .update_review(
                review,
                &ReviewPatch {
                    status: Some(ReviewStatus::Graded),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("marking review {} graded", review))?;
        self.ws.reviews = reviews;
        self.ws.ledger = ledger;
        self.persist_drafts().await;
        Ok(format!(
            "Applied suggested grades of review {} to {} member(s)",
            review,
            graded.len()
        ))
    }

    pub async fn create_project(
        &mut self,
        name: &str,
        max_teams: u32,
        max_students_per_team: u32,
    ) -> Result<String> {
        self.require_instructor()?;
        let new = formation::validate_project(name, max_teams, max_students_per_team)?;
        let project = self
            .api
            .create_project(&new)
            .await
            .context("creating project")?;
        self.refresh().await?;
        Ok(format!(
            "Created project {} with {} team(s)",
            project.name,
            project.teams.len()
        ))
    }

    /// Joins a team of the project that owns it, as member or representative.
    pub async fn join(&mut self, team: &str, as_rep: bool) -> Result<String> {
        let student_id = self.require_student()?;
        let team = self.find_team(team)?;
        let project = self
            .ws
            .roster
            .project_of(team.id)
            .cloned()
            .ok_or_else(|| anyhow!("{} does not belong to a project", team.name))?;
        formation::check_join(&project, team.id, student_id, as_rep)?;

        self.api
            .join_team(project.id, team.id, as_rep)
            .await
            .with_context(|| format!("joining {}", team.name))?;
        formation::mirror_join(&mut self.ws.roster, project.id, team.id, student_id, as_rep)?;
        self.refresh().await?;
        Ok(format!(
            "Joined {}{}",
            team.name,
            if as_rep { " as representative" } else { "" }
        ))
    }

    /// Renames the signed-in student's team; representatives only.
    pub async fn rename(&mut self, team: &str, name: &str) -> Result<String> {
        let student_id = self.require_student()?;
        let mut team = self.find_team(team)?;
        if team.students.is_empty() {
            team.students = self
                .ws
                .roster
                .members(team.id)
                .into_iter()
                .cloned()
                .collect();
        }
        let name = formation::check_rename(&team, student_id, name)?;
        self.api
            .update_team(
                team.id,
                &TeamPatch {
                    name: Some(name.clone()),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("renaming {}", team.name))?;
        self.refresh().await?;
        Ok(format!("Renamed {} to {}", team.name, name))
    }

    pub async fn toggle_lock(&mut self, team: &str) -> Result<String> {
        self.require_instructor()?;
        let team = self.find_team(team)?;
        let locked = !team.is_locked;
        self.api
            .update_team(
                team.id,
                &TeamPatch {
                    is_locked: Some(locked),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("updating {}", team.name))?;
        self.refresh().await?;
        Ok(format!(
            "{} {}",
            team.name,
            if locked { "locked" } else { "unlocked" }
        ))
    }
}
