use crate::model::{Grade, ReportLinkUpdate};
use crate::storage::entity::grade_draft::{
    ActiveModel as GradeDraftActiveModel, Column as GradeDraftColumn,
};
use crate::storage::entity::report_link_draft::{
    ActiveModel as ReportLinkDraftActiveModel, Column as ReportLinkDraftColumn,
};
use crate::storage::entity::{GradeDraft, ReportLinkDraft};
use chrono::Utc;
use log::warn;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};

/// Local mirror of the pending-changes buffer.
pub struct DraftRepository;

impl DraftRepository {
    /// Upserts grade edits; a later edit of the same key replaces the earlier.
    pub async fn save_grades(db: &DatabaseConnection, grades: &[Grade]) -> Result<(), sea_orm::DbErr> {
        if grades.is_empty() {
            return Ok(());
        }
        let now = Utc::now().timestamp();
        let models: Vec<GradeDraftActiveModel> = grades
            .iter()
            .map(|g| GradeDraftActiveModel {
                student_id: Set(g.student_id),
                sprint: Set(g.sprint as i32),
                assignment: Set(g.assignment.code().to_string()),
                score: Set(g.score as i32),
                grade_id: Set(g.id),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        GradeDraft::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    GradeDraftColumn::StudentId,
                    GradeDraftColumn::Sprint,
                    GradeDraftColumn::Assignment,
                ])
                .update_columns([
                    GradeDraftColumn::Score,
                    GradeDraftColumn::GradeId,
                    GradeDraftColumn::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn save_report_links(
        db: &DatabaseConnection,
        links: &[ReportLinkUpdate],
    ) -> Result<(), sea_orm::DbErr> {
        if links.is_empty() {
            return Ok(());
        }
        let now = Utc::now().timestamp();
        let models: Vec<ReportLinkDraftActiveModel> = links
            .iter()
            .map(|l| ReportLinkDraftActiveModel {
                reviewed_team_id: Set(l.reviewed_team_id),
                sprint: Set(l.sprint as i32),
                link: Set(l.link.clone()),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        ReportLinkDraft::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    ReportLinkDraftColumn::ReviewedTeamId,
                    ReportLinkDraftColumn::Sprint,
                ])
                .update_columns([ReportLinkDraftColumn::Link, ReportLinkDraftColumn::UpdatedAt])
                .to_owned(),
            )
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn load_grades(db: &DatabaseConnection) -> Result<Vec<Grade>, sea_orm::DbErr> {
        let rows = GradeDraft::find()
            .order_by_asc(GradeDraftColumn::UpdatedAt)
            .all(db)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let grade = row.to_grade();
                if grade.is_none() {
                    warn!("Skipping unreadable grade draft {:?}", row);
                }
                grade
            })
            .collect())
    }

    pub async fn load_report_links(
        db: &DatabaseConnection,
    ) -> Result<Vec<ReportLinkUpdate>, sea_orm::DbErr> {
        let rows = ReportLinkDraft::find()
            .order_by_asc(ReportLinkDraftColumn::UpdatedAt)
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(ReportLinkUpdate {
                    reviewed_team_id: row.reviewed_team_id,
                    sprint: u32::try_from(row.sprint).ok()?,
                    link: row.link,
                })
            })
            .collect())
    }

    /// `(grade drafts, report link drafts)`
    pub async fn count(db: &DatabaseConnection) -> Result<(u64, u64), sea_orm::DbErr> {
        let grades = GradeDraft::find().count(db).await?;
        let links = ReportLinkDraft::find().count(db).await?;
        Ok((grades, links))
    }

    pub async fn clear(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        let grades = GradeDraft::delete_many().exec(db).await?;
        let links = ReportLinkDraft::delete_many().exec(db).await?;
        Ok(grades.rows_affected + links.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Assignment;
    use crate::storage::establish_connection;
    use tempfile::TempDir;

    async fn open() -> (TempDir, DatabaseConnection) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("drafts.db").display()
        );
        let db = establish_connection(&url).await.unwrap();
        (dir, db)
    }

    fn grade(id: Option<i64>, student: i64, a: Assignment, score: u32) -> Grade {
        Grade {
            id,
            student_id: student,
            sprint: 1,
            assignment: a,
            score,
        }
    }

    #[tokio::test]
    async fn grade_drafts_upsert_by_key() {
        let (_dir, db) = open().await;
        DraftRepository::save_grades(
            &db,
            &[grade(None, 1, Assignment::A, 70), grade(Some(3), 2, Assignment::ET, 5)],
        )
        .await
        .unwrap();
        DraftRepository::save_grades(&db, &[grade(None, 1, Assignment::A, 95)])
            .await
            .unwrap();

        let mut loaded = DraftRepository::load_grades(&db).await.unwrap();
        loaded.sort_by_key(|g| g.key());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].score, 95);
        assert_eq!(loaded[1].assignment, Assignment::ET);
        assert_eq!(loaded[1].id, Some(3));
    }

    #[tokio::test]
    async fn report_links_upsert_and_clear() {
        let (_dir, db) = open().await;
        let link = |l: &str| ReportLinkUpdate {
            reviewed_team_id: 4,
            sprint: 2,
            link: l.to_string(),
        };
        DraftRepository::save_report_links(&db, &[link("https://a")])
            .await
            .unwrap();
        DraftRepository::save_report_links(&db, &[link("https://b")])
            .await
            .unwrap();
        DraftRepository::save_grades(&db, &[grade(None, 1, Assignment::E, 3)])
            .await
            .unwrap();

        assert_eq!(
            DraftRepository::load_report_links(&db).await.unwrap(),
            vec![link("https://b")]
        );
        assert_eq!(DraftRepository::count(&db).await.unwrap(), (1, 1));

        assert_eq!(DraftRepository::clear(&db).await.unwrap(), 2);
        assert_eq!(DraftRepository::count(&db).await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn empty_batches_are_noops() {
        let (_dir, db) = open().await;
        DraftRepository::save_grades(&db, &[]).await.unwrap();
        DraftRepository::save_report_links(&db, &[]).await.unwrap();
        assert_eq!(DraftRepository::count(&db).await.unwrap(), (0, 0));
    }
}
