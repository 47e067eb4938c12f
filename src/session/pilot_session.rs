use super::auto_auth_session::AutoAuthSession;
use super::dto::{
    GradeQuery, JoinQuery, ReviewPatch, ReviewQuery, StudentDashboard, TeamPatch,
};
use super::error::ApiError;
use super::urls::ApiUrls;
use crate::formation::NewProject;
use crate::model::{
    CurrentUser, Grade, PeerReview, Project, ProjectId, ReportLinkUpdate, ReviewId, Student,
    StudentId, Team, TeamId,
};
use async_trait::async_trait;
use log::info;
use reqwest::Response;
use serde::de::DeserializeOwned;

/// Course backend operations the dashboard depends on.
#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn me(&self) -> Result<CurrentUser, ApiError>;
    async fn teams(&self) -> Result<Vec<Team>, ApiError>;
    async fn students(&self) -> Result<Vec<Student>, ApiError>;
    async fn projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn grades(&self, query: GradeQuery) -> Result<Vec<Grade>, ApiError>;
    async fn peer_reviews(&self, query: ReviewQuery) -> Result<Vec<PeerReview>, ApiError>;
    async fn student_dashboard(&self, id: StudentId) -> Result<StudentDashboard, ApiError>;

    async fn create_grade(&self, grade: &Grade) -> Result<Grade, ApiError>;
    async fn update_grade(&self, id: i64, grade: &Grade) -> Result<Grade, ApiError>;
    async fn delete_grade(&self, id: i64) -> Result<(), ApiError>;

    async fn update_team(&self, id: TeamId, patch: &TeamPatch) -> Result<Team, ApiError>;
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;
    async fn join_team(
        &self,
        project_id: ProjectId,
        team_id: TeamId,
        as_rep: bool,
    ) -> Result<(), ApiError>;

    async fn update_review(&self, id: ReviewId, patch: &ReviewPatch)
        -> Result<PeerReview, ApiError>;
    async fn update_report_link(&self, update: &ReportLinkUpdate) -> Result<(), ApiError>;
}

/// Peer Pilot backend session.
pub struct PilotSession {
    session: AutoAuthSession,
    urls: ApiUrls,
}

impl PilotSession {
    pub fn new(
        base_url: &str,
        email: String,
        password: String,
        max_tries: usize,
        delay_unexpected: f64,
    ) -> Result<Self, ApiError> {
        let urls = ApiUrls::new(base_url);
        let session =
            AutoAuthSession::new(urls.login(), email, password, max_tries, delay_unexpected)?;
        Ok(Self { session, urls })
    }

    pub fn email(&self) -> &str {
        self.session.email()
    }

    /// Logs in eagerly so bad credentials surface at startup.
    pub async fn login(&self) -> Result<(), ApiError> {
        self.session.auth_request().await.map(|_| ())
    }
}

async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::from_body(status.as_u16(), &body))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let body = ensure_success(resp).await?.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl CourseApi for PilotSession {
    async fn me(&self) -> Result<CurrentUser, ApiError> {
        let url = self.urls.me();
        let resp = self.session.request(|client| client.get(&url)).await?;
        decode(resp).await
    }

    async fn teams(&self) -> Result<Vec<Team>, ApiError> {
        let url = self.urls.teams();
        let resp = self.session.request(|client| client.get(&url)).await?;
        decode(resp).await
    }

    async fn students(&self) -> Result<Vec<Student>, ApiError> {
        let url = self.urls.students();
        let resp = self.session.request(|client| client.get(&url)).await?;
        decode(resp).await
    }

    async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        let url = self.urls.projects();
        let resp = self.session.request(|client| client.get(&url)).await?;
        decode(resp).await
    }

    async fn grades(&self, query: GradeQuery) -> Result<Vec<Grade>, ApiError> {
        let url = self.urls.grades();
        let resp = self
            .session
            .request(|client| client.get(&url).query(&query))
            .await?;
        decode(resp).await
    }

    async fn peer_reviews(&self, query: ReviewQuery) -> Result<Vec<PeerReview>, ApiError> {
        let url = self.urls.peer_reviews();
        let resp = self
            .session
            .request(|client| client.get(&url).query(&query))
            .await?;
        decode(resp).await
    }

    async fn student_dashboard(&self, id: StudentId) -> Result<StudentDashboard, ApiError> {
        let url = self.urls.student_dashboard(id);
        let resp = self.session.request(|client| client.get(&url)).await?;
        decode(resp).await
    }

    async fn create_grade(&self, grade: &Grade) -> Result<Grade, ApiError> {
        let url = self.urls.grades();
        let resp = self
            .session
            .request(|client| client.post(&url).json(grade))
            .await?;
        info!(
            "{} create_grade(student={}, sprint={}, {})",
            self, grade.student_id, grade.sprint, grade.assignment
        );
        decode(resp).await
    }

    async fn update_grade(&self, id: i64, grade: &Grade) -> Result<Grade, ApiError> {
        let url = self.urls.grade(id);
        let resp = self
            .session
            .request(|client| client.put(&url).json(grade))
            .await?;
        info!("{} update_grade({})", self, id);
        decode(resp).await
    }

    async fn delete_grade(&self, id: i64) -> Result<(), ApiError> {
        let url = self.urls.grade(id);
        let resp = self.session.request(|client| client.delete(&url)).await?;
        info!("{} delete_grade({})", self, id);
        ensure_success(resp).await.map(|_| ())
    }

    async fn update_team(&self, id: TeamId, patch: &TeamPatch) -> Result<Team, ApiError> {
        let url = self.urls.team(id);
        let resp = self
            .session
            .request(|client| client.patch(&url).json(patch))
            .await?;
        info!("{} update_team({}, {:?})", self, id, patch);
        decode(resp).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        let url = self.urls.projects();
        let resp = self
            .session
            .request(|client| client.post(&url).json(project))
            .await?;
        info!("{} create_project({})", self, project.name);
        decode(resp).await
    }

    async fn join_team(
        &self,
        project_id: ProjectId,
        team_id: TeamId,
        as_rep: bool,
    ) -> Result<(), ApiError> {
        let url = self.urls.join_team(project_id);
        let query = JoinQuery { team_id, as_rep };
        let resp = self
            .session
            .request(|client| client.post(&url).query(&query))
            .await?;
        info!("{} join_team({}, team={}, rep={})", self, project_id, team_id, as_rep);
        ensure_success(resp).await.map(|_| ())
    }

    async fn update_review(
        &self,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> Result<PeerReview, ApiError> {
        let url = self.urls.peer_review(id);
        let resp = self
            .session
            .request(|client| client.put(&url).json(patch))
            .await?;
        info!("{} update_review({}, {:?})", self, id, patch);
        decode(resp).await
    }

    async fn update_report_link(&self, update: &ReportLinkUpdate) -> Result<(), ApiError> {
        let url = self.urls.report_link();
        let resp = self
            .session
            .request(|client| client.put(&url).json(update))
            .await?;
        info!(
            "{} update_report_link(team={}, sprint={})",
            self, update.reviewed_team_id, update.sprint
        );
        ensure_success(resp).await.map(|_| ())
    }
}

impl std::fmt::Display for PilotSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<PilotSession [{}]>", self.session.email())
    }
}

impl std::fmt::Debug for PilotSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<PilotSession [{}]>", self.session.email())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, ReviewStatus};
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Backend {
        logins: AtomicUsize,
        /// Number of upcoming protected requests to reject with 401.
        reject_next: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    type Shared = Arc<Backend>;

    fn authorized(backend: &Backend, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
        let unauthorized = || {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Could not validate credentials"})),
            )
        };
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unauthorized)?;
        if token != "Bearer tok-1" && token != "Bearer tok-2" {
            return Err(unauthorized());
        }
        if backend
            .reject_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(unauthorized());
        }
        Ok(())
    }

    async fn login(State(b): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body["password"] != "secret" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Incorrect email or password"})),
            );
        }
        let n = b.logins.fetch_add(1, Ordering::SeqCst) + 1;
        (
            StatusCode::OK,
            Json(json!({"access_token": format!("tok-{n}"), "token_type": "bearer"})),
        )
    }

    async fn teams(
        State(b): State<Shared>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        authorized(&b, &headers)?;
        Ok(Json(json!([
            {"id": 1, "name": "Team Alpha", "isLocked": false, "projectId": 1,
             "students": [{"id": 10, "name": "Ann", "email": "ann@uni.edu", "team_id": 1, "is_rep": true}]}
        ])))
    }

    async fn grades(
        State(b): State<Shared>,
        headers: HeaderMap,
        Query(q): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        authorized(&b, &headers)?;
        b.seen
            .lock()
            .unwrap()
            .push(format!("grades?{}", q.get("student_id").cloned().unwrap_or_default()));
        Ok(Json(json!([
            {"id": 3, "studentId": 10, "sprint": 1, "assignment": "A", "score": 88}
        ])))
    }

    async fn create_grade(
        State(b): State<Shared>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        authorized(&b, &headers)?;
        let mut created = body.clone();
        created["id"] = json!(42);
        Ok(Json(created))
    }

    async fn update_review(
        State(b): State<Shared>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        authorized(&b, &headers)?;
        Ok(Json(json!({
            "id": id, "sprint": 2, "reviewingTeamId": 1, "reviewedTeamId": 2,
            "reviewLink": null, "status": body["status"],
            "submittedAt": null, "dueDate": "2025-03-01T12:00:00"
        })))
    }

    async fn join_team(
        State(b): State<Shared>,
        headers: HeaderMap,
        Path(project_id): Path<i64>,
        Query(q): Query<HashMap<String, String>>,
    ) -> Result<StatusCode, (StatusCode, Json<Value>)> {
        authorized(&b, &headers)?;
        b.seen.lock().unwrap().push(format!(
            "join {project_id} team={} rep={}",
            q.get("team_id").cloned().unwrap_or_default(),
            q.get("as_rep").cloned().unwrap_or_default()
        ));
        if q.get("team_id").map(String::as_str) == Some("9") {
            return Err((StatusCode::BAD_REQUEST, Json(json!({"detail": "Team is full"}))));
        }
        Ok(StatusCode::OK)
    }

    async fn report_link(
        State(b): State<Shared>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Result<StatusCode, (StatusCode, Json<Value>)> {
        authorized(&b, &headers)?;
        b.seen.lock().unwrap().push(format!(
            "link {} {} {}",
            body["reviewedTeamId"], body["sprint"], body["link"]
        ));
        Ok(StatusCode::OK)
    }

    async fn spawn(backend: Shared) -> String {
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/teams", get(teams))
            .route("/grades", get(grades).post(create_grade))
            .route("/peer-reviews/report-link", put(report_link))
            .route("/peer-reviews/{id}", put(update_review))
            .route("/projects/{id}/join-team", post(join_team))
            .with_state(backend);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn session(base: &str, password: &str) -> PilotSession {
        PilotSession::new(base, "ann@uni.edu".into(), password.into(), 3, 0.0).unwrap()
    }

    #[tokio::test]
    async fn logs_in_lazily_and_decodes_teams() {
        let backend = Shared::default();
        let base = spawn(backend.clone()).await;
        let api = session(&base, "secret");

        let teams = api.teams().await.unwrap();
        assert_eq!(teams[0].name, "Team Alpha");
        assert!(teams[0].students[0].is_rep);
        api.teams().await.unwrap();
        assert_eq!(backend.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reauthenticates_after_401() {
        let backend = Shared::default();
        let base = spawn(backend.clone()).await;
        let api = session(&base, "secret");
        api.login().await.unwrap();

        backend.reject_next.store(1, Ordering::SeqCst);
        let grades = api
            .grades(GradeQuery {
                student_id: Some(10),
                sprint: None,
            })
            .await
            .unwrap();

        assert_eq!(grades[0].score, 88);
        assert_eq!(backend.logins.load(Ordering::SeqCst), 2);
        assert_eq!(backend.seen.lock().unwrap().as_slice(), ["grades?10"]);
    }

    #[tokio::test]
    async fn unauthorized_after_all_tries_is_an_error() {
        let backend = Shared::default();
        let base = spawn(backend.clone()).await;
        let api = session(&base, "secret");

        backend.reject_next.store(10, Ordering::SeqCst);
        let err = api.teams().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)), "{err}");
    }

    #[tokio::test]
    async fn bad_password_is_not_retried() {
        let backend = Shared::default();
        let base = spawn(backend.clone()).await;
        let api = session(&base, "wrong");

        let err = api.login().await.unwrap_err();
        assert_eq!(err.to_string(), "not authorized: Incorrect email or password");
    }

    #[tokio::test]
    async fn create_grade_returns_server_id() {
        let base = spawn(Shared::default()).await;
        let api = session(&base, "secret");
        let grade = Grade {
            id: None,
            student_id: 10,
            sprint: 2,
            assignment: Assignment::ET,
            score: 5,
        };
        let created = api.create_grade(&grade).await.unwrap();
        assert_eq!(created.id, Some(42));
        assert_eq!(created.assignment, Assignment::ET);
    }

    #[tokio::test]
    async fn join_sends_query_and_surfaces_detail() {
        let backend = Shared::default();
        let base = spawn(backend.clone()).await;
        let api = session(&base, "secret");

        api.join_team(1, 2, true).await.unwrap();
        let err = api.join_team(1, 9, false).await.unwrap_err();

        assert_eq!(err.to_string(), "server returned 400: Team is full");
        assert_eq!(
            backend.seen.lock().unwrap()[0],
            "join 1 team=2 rep=true"
        );
    }

    #[tokio::test]
    async fn review_status_and_report_link() {
        let backend = Shared::default();
        let base = spawn(backend.clone()).await;
        let api = session(&base, "secret");

        let review = api
            .update_review(
                7,
                &ReviewPatch {
                    status: Some(ReviewStatus::Submitted),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(review.status, ReviewStatus::Submitted);
        assert!(review.due_date.is_some());

        api.update_report_link(&ReportLinkUpdate {
            reviewed_team_id: 2,
            sprint: 2,
            link: "https://drive/r".into(),
        })
        .await
        .unwrap();
        assert_eq!(
            backend.seen.lock().unwrap().last().unwrap(),
            "link 2 2 \"https://drive/r\""
        );
    }
}
