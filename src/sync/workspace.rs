use crate::grading::{GradeLedger, Rollup};
use crate::model::{CurrentUser, Roster, Student, StudentId, Team, TeamId};
use crate::review::ReviewBoard;

/// Everything the dashboard renders: the signed-in user, the roster, the
/// grade ledger and the review board.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub user: Option<CurrentUser>,
    pub roster: Roster,
    pub ledger: GradeLedger,
    pub reviews: ReviewBoard,
    pub sprints: u32,
}

impl Workspace {
    pub fn new(sprints: u32) -> Self {
        Self {
            user: None,
            roster: Roster::default(),
            ledger: GradeLedger::new(),
            reviews: ReviewBoard::default(),
            sprints: sprints.max(1),
        }
    }

    pub fn rollup(&self) -> Rollup<'_> {
        Rollup::new(&self.roster, &self.ledger, self.sprints)
    }

    pub fn is_instructor(&self) -> bool {
        self.user.as_ref().map(|u| u.is_instructor()).unwrap_or(false)
    }

    pub fn student_id(&self) -> Option<StudentId> {
        self.user.as_ref().and_then(|u| u.student_id)
    }

    /// The signed-in student's row, if any.
    pub fn me(&self) -> Option<&Student> {
        self.student_id().and_then(|id| self.roster.student(id))
    }

    /// The signed-in student's team, preferring the roster over the login
    /// payload since joins update the roster first.
    pub fn my_team_id(&self) -> Option<TeamId> {
        self.me()
            .and_then(|s| s.team_id)
            .or_else(|| self.user.as_ref().and_then(|u| u.team_id))
    }

    pub fn my_team(&self) -> Option<&Team> {
        self.my_team_id().and_then(|id| self.roster.team(id))
    }

    pub fn unsaved_count(&self) -> usize {
        self.ledger.pending_len() + self.reviews.pending_len()
    }

    pub fn has_unsaved(&self) -> bool {
        self.unsaved_count() > 0
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SPRINTS)
    }
}
