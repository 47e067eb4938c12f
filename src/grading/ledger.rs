use crate::model::{clamp_score, Assignment, Grade, GradeKey, Sprint, StudentId};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory grade table with a pending-changes buffer.
///
/// Every edit lands in the table immediately and its key is remembered until
/// the next successful save. Rows are unique per [`GradeKey`]; a second write
/// to the same key replaces the first.
#[derive(Debug, Clone, Default)]
pub struct GradeLedger {
    rows: BTreeMap<GradeKey, Grade>,
    pending: BTreeSet<GradeKey>,
}

impl GradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_grades(grades: impl IntoIterator<Item = Grade>) -> Self {
        let mut ledger = Self::new();
        for g in grades {
            ledger.rows.insert(g.key(), g);
        }
        ledger
    }

    pub fn get(&self, key: &GradeKey) -> Option<&Grade> {
        self.rows.get(key)
    }

    /// Stored score, or 0 when nothing was entered yet.
    pub fn score(&self, student_id: StudentId, sprint: Sprint, assignment: Assignment) -> u32 {
        self.rows
            .get(&GradeKey::new(student_id, sprint, assignment))
            .map(|g| g.score)
            .unwrap_or(0)
    }

    /// Writes one clamped score and marks it pending. Returns the stored value.
    pub fn set(&mut self, key: GradeKey, raw: i64) -> u32 {
        let score = clamp_score(raw);
        self.rows
            .entry(key)
            .and_modify(|g| g.score = score)
            .or_insert(Grade {
                id: None,
                student_id: key.student_id,
                sprint: key.sprint,
                assignment: key.assignment,
                score,
            });
        self.pending.insert(key);
        score
    }

    /// Writes the same score for every listed member.
    pub fn set_team(
        &mut self,
        members: &[StudentId],
        sprint: Sprint,
        assignment: Assignment,
        raw: i64,
    ) -> u32 {
        let score = clamp_score(raw);
        for &student_id in members {
            self.set(GradeKey::new(student_id, sprint, assignment), score as i64);
        }
        score
    }

    /// Drops a row and any pending edit of it. Returns the removed row.
    pub fn remove(&mut self, key: &GradeKey) -> Option<Grade> {
        self.pending.remove(key);
        self.rows.remove(key)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pending rows in key order, carrying the server id when one is known.
    pub fn pending(&self) -> Vec<Grade> {
        self.pending
            .iter()
            .filter_map(|k| self.rows.get(k).cloned())
            .collect()
    }

    /// Records a row the server accepted: keeps its id and drops the key
    /// from the pending buffer.
    pub fn adopt(&mut self, key: GradeKey, id: Option<i64>) {
        if let (Some(row), Some(id)) = (self.rows.get_mut(&key), id) {
            row.id = Some(id);
        }
        self.pending.remove(&key);
    }

    /// Replaces the table with fresh server rows, then replays pending edits
    /// on top so unsaved work is not lost by a refresh.
    pub fn rebase(&mut self, server: impl IntoIterator<Item = Grade>) {
        let edits: Vec<(GradeKey, u32)> = self
            .pending
            .iter()
            .filter_map(|k| self.rows.get(k).map(|g| (*k, g.score)))
            .collect();
        self.rows = server.into_iter().map(|g| (g.key(), g)).collect();
        for (key, score) in edits {
            self.set(key, score as i64);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grade> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
