use super::grade::Sprint;
use super::roster::TeamId;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ReviewId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Submitted,
    Graded,
}

impl ReviewStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Submitted => "Submitted",
            ReviewStatus::Graded => "Graded",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "submitted" => Ok(ReviewStatus::Submitted),
            "graded" => Ok(ReviewStatus::Graded),
            other => Err(format!("unknown review status: {other}")),
        }
    }
}

/// Grades the reviewing team proposes for the reviewed team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedGrades {
    pub assignment: u32,
    #[serde(default)]
    pub iteration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerReview {
    pub id: ReviewId,
    pub sprint: Sprint,
    #[serde(alias = "reviewing_team_id")]
    pub reviewing_team_id: TeamId,
    #[serde(alias = "reviewed_team_id")]
    pub reviewed_team_id: TeamId,
    #[serde(default, alias = "review_link", alias = "summaryPDFLink")]
    pub review_link: Option<String>,
    #[serde(default, alias = "commentsPDFLink")]
    pub comments_link: Option<String>,
    #[serde(default, alias = "reviewed_team_report_link")]
    pub reviewed_team_report_link: Option<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default, alias = "suggested_grades")]
    pub suggested_grades: Option<SuggestedGrades>,
    #[serde(
        default,
        alias = "submitted_at",
        deserialize_with = "de_timestamp"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "due_date", deserialize_with = "de_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
}

impl PeerReview {
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.reviewing_team_id == team_id || self.reviewed_team_id == team_id
    }
}

/// Assignment report link of the reviewed team for one sprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLinkUpdate {
    pub reviewed_team_id: TeamId,
    pub sprint: Sprint,
    pub link: String,
}

/// Accepts RFC 3339 timestamps and the offset-less form the backend emits.
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::from_str(&raw)
        .map(|n| Some(n.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_review_with_naive_timestamps() {
        let raw = r#"{
            "id": 5, "sprint": 2, "reviewingTeamId": 1, "reviewedTeamId": 3,
            "reviewLink": null, "status": "submitted",
            "submittedAt": "2025-03-01T10:30:00", "dueDate": null
        }"#;
        let r: PeerReview = serde_json::from_str(raw).unwrap();
        assert_eq!(r.status, ReviewStatus::Submitted);
        assert_eq!(
            r.submitted_at.map(|d| d.to_rfc3339()),
            Some("2025-03-01T10:30:00+00:00".to_string())
        );
        assert!(r.due_date.is_none());
        assert!(r.involves(3));
        assert!(!r.involves(2));
    }

    #[test]
    fn decodes_suggested_grades_and_rfc3339() {
        let raw = r#"{
            "id": 9, "sprint": 1, "reviewing_team_id": 2, "reviewed_team_id": 1,
            "suggestedGrades": {"assignment": 88},
            "submittedAt": "2025-03-01T10:30:00Z"
        }"#;
        let r: PeerReview = serde_json::from_str(raw).unwrap();
        assert_eq!(r.status, ReviewStatus::Pending);
        assert_eq!(
            r.suggested_grades,
            Some(SuggestedGrades {
                assignment: 88,
                iteration: None
            })
        );
        assert!(r.submitted_at.is_some());
    }

    #[test]
    fn parses_status_words() {
        assert_eq!("Graded".parse::<ReviewStatus>(), Ok(ReviewStatus::Graded));
        assert!("done".parse::<ReviewStatus>().is_err());
    }
}
