use crate::grading::GradeLedger;
use crate::model::{
    Assignment, PeerReview, ReportLinkUpdate, ReviewId, ReviewStatus, Roster, Sprint, StudentId,
    TeamId,
};
use std::collections::BTreeMap;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("peer review {0} not found")]
    UnknownReview(ReviewId),
    #[error("peer review {0} has no suggested grades")]
    NoSuggestedGrades(ReviewId),
    #[error("reviewed team {0} has no members")]
    EmptyTeam(TeamId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub pending: usize,
    pub submitted: usize,
    pub graded: usize,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.pending + self.submitted + self.graded
    }
}

/// Peer reviews as last fetched plus unsaved report-link edits.
#[derive(Debug, Clone, Default)]
pub struct ReviewBoard {
    reviews: Vec<PeerReview>,
    /// (reviewed team, sprint) -> link; an empty string clears the link.
    link_edits: BTreeMap<(TeamId, Sprint), String>,
}

impl ReviewBoard {
    pub fn new(reviews: Vec<PeerReview>) -> Self {
        Self {
            reviews,
            link_edits: BTreeMap::new(),
        }
    }

    pub fn all(&self) -> &[PeerReview] {
        &self.reviews
    }

    pub fn get(&self, id: ReviewId) -> Option<&PeerReview> {
        self.reviews.iter().find(|r| r.id == id)
    }

    /// Reviews of one sprint whose reviewing or reviewed team name contains
    /// `search`, ignoring case.
    pub fn for_sprint<'a>(
        &'a self,
        sprint: Sprint,
        search: &str,
        roster: &Roster,
    ) -> Vec<&'a PeerReview> {
        let needle = search.trim().to_lowercase();
        let name_matches = |team_id: TeamId| {
            roster
                .team(team_id)
                .map(|t| t.name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };
        self.reviews
            .iter()
            .filter(|r| r.sprint == sprint)
            .filter(|r| {
                needle.is_empty()
                    || name_matches(r.reviewing_team_id)
                    || name_matches(r.reviewed_team_id)
            })
            .collect()
    }

    /// Reviews a student's team gives or receives.
    pub fn visible_to(&self, team_id: TeamId) -> Vec<&PeerReview> {
        self.reviews.iter().filter(|r| r.involves(team_id)).collect()
    }

    pub fn summary(&self, sprint: Sprint) -> StatusSummary {
        self.reviews
            .iter()
            .filter(|r| r.sprint == sprint)
            .fold(StatusSummary::default(), |mut acc, r| {
                match r.status {
                    ReviewStatus::Pending => acc.pending += 1,
                    ReviewStatus::Submitted => acc.submitted += 1,
                    ReviewStatus::Graded => acc.graded += 1,
                }
                acc
            })
    }

    /// Records a report link edit and shows it on every matching review.
    pub fn set_report_link(&mut self, reviewed_team_id: TeamId, sprint: Sprint, link: &str) {
        let link = link.trim().to_string();
        self.show_link(reviewed_team_id, sprint, &link);
        self.link_edits.insert((reviewed_team_id, sprint), link);
    }

    fn show_link(&mut self, reviewed_team_id: TeamId, sprint: Sprint, link: &str) {
        for r in self
            .reviews
            .iter_mut()
            .filter(|r| r.reviewed_team_id == reviewed_team_id && r.sprint == sprint)
        {
            r.reviewed_team_report_link = (!link.is_empty()).then(|| link.to_string());
        }
    }

    pub fn set_status(&mut self, id: ReviewId, status: ReviewStatus) -> Result<(), ReviewError> {
        let review = self
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ReviewError::UnknownReview(id))?;
        review.status = status;
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.link_edits.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.link_edits.len()
    }

    pub fn pending_links(&self) -> Vec<ReportLinkUpdate> {
        self.link_edits
            .iter()
            .map(|(&(reviewed_team_id, sprint), link)| ReportLinkUpdate {
                reviewed_team_id,
                sprint,
                link: link.clone(),
            })
            .collect()
    }

    /// Drops a link edit the server accepted, unless it was edited again
    /// since.
    pub fn settle_link(&mut self, saved: &ReportLinkUpdate) {
        let key = (saved.reviewed_team_id, saved.sprint);
        if self.link_edits.get(&key) == Some(&saved.link) {
            self.link_edits.remove(&key);
        }
    }

    /// Swaps in freshly fetched reviews and replays unsaved link edits.
    pub fn rebase(&mut self, reviews: Vec<PeerReview>) {
        self.reviews = reviews;
        let edits: Vec<((TeamId, Sprint), String)> = self
            .link_edits
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        for ((team, sprint), link) in edits {
            self.show_link(team, sprint, &link);
        }
    }
}

/// Writes a review's suggested grades as team grades of the reviewed team
/// and marks the review graded. Returns the members that were graded.
pub fn apply_suggested_grades(
    board: &mut ReviewBoard,
    id: ReviewId,
    roster: &Roster,
    ledger: &mut GradeLedger,
) -> Result<Vec<StudentId>, ReviewError> {
    let review = board.get(id).ok_or(ReviewError::UnknownReview(id))?;
    let suggested = review
        .suggested_grades
        .ok_or(ReviewError::NoSuggestedGrades(id))?;
    let (team_id, sprint) = (review.reviewed_team_id, review.sprint);

    let members: Vec<StudentId> = roster.members(team_id).iter().map(|s| s.id).collect();
    if members.is_empty() {
        return Err(ReviewError::EmptyTeam(team_id));
    }
    ledger.set_team(&members, sprint, Assignment::A, suggested.assignment as i64);
    if let Some(iteration) = suggested.iteration {
        ledger.set_team(&members, sprint, Assignment::I, iteration as i64);
    }
    board.set_status(id, ReviewStatus::Graded)?;
    Ok(members)
}
