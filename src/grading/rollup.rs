//! Sprint and overall rollups derived from the ledger.
//!
//! Every view in the dashboard goes through these functions; nothing caches a
//! rollup, so a grade edit shows up on the next frame.

use super::ledger::GradeLedger;
use crate::model::{Assignment, Roster, Sprint, StudentId, TeamId};

/// Rollup of one student for one sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberSprint {
    pub team_total: u32,
    pub extra: u32,
    pub sum: u32,
}

/// Student-facing averages "out of 100" over the core components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AverageReport {
    /// `(sprint, average)` for every sprint, in order.
    pub per_sprint: Vec<(Sprint, u32)>,
    /// Average of the sprints that have a positive average.
    pub overall: u32,
}

pub struct Rollup<'a> {
    roster: &'a Roster,
    ledger: &'a GradeLedger,
    sprints: u32,
}

impl<'a> Rollup<'a> {
    pub fn new(roster: &'a Roster, ledger: &'a GradeLedger, sprints: u32) -> Self {
        Self {
            roster,
            ledger,
            sprints,
        }
    }

    pub fn sprints(&self) -> impl Iterator<Item = Sprint> {
        1..=self.sprints
    }

    pub fn score(&self, student_id: StudentId, sprint: Sprint, assignment: Assignment) -> u32 {
        self.ledger.score(student_id, sprint, assignment)
    }

    fn team_mean(&self, team_id: TeamId, sprint: Sprint, assignment: Assignment) -> f64 {
        if assignment.is_individual() {
            return 0.0;
        }
        let members = self.roster.members(team_id);
        if members.is_empty() {
            return 0.0;
        }
        let sum: u32 = members
            .iter()
            .map(|s| self.score(s.id, sprint, assignment))
            .sum();
        sum as f64 / members.len() as f64
    }

    pub fn team_assignment_average(
        &self,
        team_id: TeamId,
        sprint: Sprint,
        assignment: Assignment,
    ) -> u32 {
        self.team_mean(team_id, sprint, assignment).round() as u32
    }

    /// Sum of the unrounded member means of the team components, rounded once.
    pub fn team_total(&self, team_id: TeamId, sprint: Sprint) -> u32 {
        Assignment::TEAM
            .iter()
            .map(|&a| self.team_mean(team_id, sprint, a))
            .sum::<f64>()
            .round() as u32
    }

    pub fn team_sprint_sum(&self, team_id: TeamId, sprint: Sprint) -> u32 {
        self.team_total(team_id, sprint)
    }

    pub fn team_overall(&self, team_id: TeamId) -> u32 {
        self.sprints()
            .map(|s| self.team_sprint_sum(team_id, s))
            .sum()
    }

    pub fn member_sprint(&self, student_id: StudentId, sprint: Sprint) -> MemberSprint {
        let team_total = self
            .roster
            .student(student_id)
            .and_then(|s| s.team_id)
            .map(|t| self.team_total(t, sprint))
            .unwrap_or(0);
        let extra = self.score(student_id, sprint, Assignment::E);
        MemberSprint {
            team_total,
            extra,
            sum: team_total + extra,
        }
    }

    pub fn student_overall(&self, student_id: StudentId) -> u32 {
        self.sprints()
            .map(|s| self.member_sprint(student_id, s).sum)
            .sum()
    }

    pub fn student_average_report(&self, student_id: StudentId) -> AverageReport {
        let per_sprint: Vec<(Sprint, u32)> = self
            .sprints()
            .map(|sprint| {
                let total: u32 = Assignment::CORE
                    .iter()
                    .map(|&a| self.score(student_id, sprint, a))
                    .sum();
                let avg = (total as f64 / Assignment::CORE.len() as f64).round() as u32;
                (sprint, avg)
            })
            .collect();
        let graded: Vec<u32> = per_sprint
            .iter()
            .map(|&(_, avg)| avg)
            .filter(|&avg| avg > 0)
            .collect();
        let overall = if graded.is_empty() {
            0
        } else {
            (graded.iter().sum::<u32>() as f64 / graded.len() as f64).round() as u32
        };
        AverageReport {
            per_sprint,
            overall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GradeKey, Student, Team};

    fn student(id: i64, team: Option<i64>) -> Student {
        Student {
            id,
            name: format!("Student {id}"),
            email: format!("s{id}@uni.edu"),
            team_id: team,
            is_rep: false,
        }
    }

    fn team(id: i64) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            color: None,
            is_locked: false,
            project_id: None,
            students: vec![],
        }
    }

    fn roster() -> Roster {
        Roster {
            teams: vec![team(1), team(2)],
            students: vec![student(1, Some(1)), student(2, Some(1)), student(3, None)],
            projects: vec![],
        }
    }

    fn put(ledger: &mut GradeLedger, s: i64, sprint: u32, a: Assignment, score: i64) {
        ledger.set(GradeKey::new(s, sprint, a), score);
    }

    #[test]
    fn average_rounds_member_mean() {
        let roster = roster();
        let mut ledger = GradeLedger::new();
        put(&mut ledger, 1, 1, Assignment::A, 80);
        put(&mut ledger, 2, 1, Assignment::A, 85);
        let r = Rollup::new(&roster, &ledger, 4);
        assert_eq!(r.team_assignment_average(1, 1, Assignment::A), 83);
        assert_eq!(r.team_assignment_average(1, 1, Assignment::E), 0);
        assert_eq!(r.team_assignment_average(2, 1, Assignment::A), 0);
    }

    #[test]
    fn team_total_rounds_once_at_the_end() {
        let roster = roster();
        let mut ledger = GradeLedger::new();
        // means: A 82.5, R 82.5 -> rounded separately would be 166
        put(&mut ledger, 1, 1, Assignment::A, 80);
        put(&mut ledger, 2, 1, Assignment::A, 85);
        put(&mut ledger, 1, 1, Assignment::R, 80);
        put(&mut ledger, 2, 1, Assignment::R, 85);
        put(&mut ledger, 1, 1, Assignment::E, 10);
        let r = Rollup::new(&roster, &ledger, 4);
        assert_eq!(r.team_total(1, 1), 165);
        assert_eq!(r.team_sprint_sum(1, 1), 165);
    }

    #[test]
    fn member_sprint_adds_individual_extra() {
        let roster = roster();
        let mut ledger = GradeLedger::new();
        ledger.set_team(&[1, 2], 1, Assignment::A, 90);
        ledger.set_team(&[1, 2], 1, Assignment::ET, 5);
        put(&mut ledger, 2, 1, Assignment::E, 7);
        let r = Rollup::new(&roster, &ledger, 4);

        assert_eq!(
            r.member_sprint(2, 1),
            MemberSprint {
                team_total: 95,
                extra: 7,
                sum: 102
            }
        );
        assert_eq!(r.member_sprint(1, 1).sum, 95);
    }

    #[test]
    fn unassigned_student_only_counts_extra() {
        let roster = roster();
        let mut ledger = GradeLedger::new();
        put(&mut ledger, 3, 2, Assignment::A, 100);
        put(&mut ledger, 3, 2, Assignment::E, 4);
        let r = Rollup::new(&roster, &ledger, 4);
        assert_eq!(r.member_sprint(3, 2).team_total, 0);
        assert_eq!(r.student_overall(3), 4);
    }

    #[test]
    fn overall_sums_every_sprint() {
        let roster = roster();
        let mut ledger = GradeLedger::new();
        for sprint in 1..=4 {
            ledger.set_team(&[1, 2], sprint, Assignment::I, 100);
        }
        put(&mut ledger, 1, 3, Assignment::E, 10);
        let r = Rollup::new(&roster, &ledger, 4);
        assert_eq!(r.team_overall(1), 400);
        assert_eq!(r.student_overall(1), 410);
        assert_eq!(r.student_overall(2), 400);
    }

    #[test]
    fn sprints_beyond_the_configured_count_are_ignored() {
        let roster = roster();
        let mut ledger = GradeLedger::new();
        ledger.set_team(&[1, 2], 5, Assignment::A, 100);
        let r = Rollup::new(&roster, &ledger, 4);
        assert_eq!(r.team_overall(1), 0);
    }

    #[test]
    fn average_report_skips_empty_sprints() {
        let roster = roster();
        let mut ledger = GradeLedger::new();
        for a in Assignment::CORE {
            put(&mut ledger, 1, 1, a, 90);
            put(&mut ledger, 1, 2, a, 75);
        }
        put(&mut ledger, 1, 2, Assignment::E, 100);
        let report = Rollup::new(&roster, &ledger, 4).student_average_report(1);
        assert_eq!(report.per_sprint, vec![(1, 90), (2, 75), (3, 0), (4, 0)]);
        assert_eq!(report.overall, 83);
    }
}
