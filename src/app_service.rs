use crate::app_state::AppEvent;
use crate::commands::{AppCommand, USAGE};
use crate::sync::SyncService;
use anyhow::Result;
use tokio::sync::mpsc;

/// Pushes a fresh workspace snapshot to the UI.
pub fn refresh_ui(svc: &SyncService, tx: &mpsc::UnboundedSender<AppEvent>) {
    let _ = tx.send(AppEvent::Workspace(Box::new(svc.workspace().clone())));
}

/// Runs one worker command against the service and returns the status line.
///
/// Refresh doubles as sign-in when no user is loaded yet, so retrying a failed
/// startup goes through the same path.
pub async fn execute(svc: &mut SyncService, cmd: AppCommand) -> Result<String> {
    match cmd {
        AppCommand::Grade {
            student,
            sprint,
            assignment,
            score,
        } => svc.set_grade(&student, sprint, assignment, score).await,
        AppCommand::TeamGrade {
            team,
            sprint,
            assignment,
            score,
        } => svc.set_team_grade(&team, sprint, assignment, score).await,
        AppCommand::Ungrade {
            student,
            sprint,
            assignment,
        } => svc.delete_grade(&student, sprint, assignment).await,
        AppCommand::Save => svc.save().await,
        AppCommand::Refresh => {
            if svc.workspace().user.is_none() {
                svc.bootstrap().await
            } else {
                svc.refresh().await?;
                Ok("Reloaded".to_string())
            }
        }
        AppCommand::Link { review, link } => svc.set_report_link(review, &link).await,
        AppCommand::Status { review, status } => svc.set_review_status(review, status).await,
        AppCommand::Apply { review } => svc.apply_suggested(review).await,
        AppCommand::ProjectAdd {
            name,
            max_teams,
            max_students_per_team,
        } => {
            svc.create_project(&name, max_teams, max_students_per_team)
                .await
        }
        AppCommand::Join { team, as_rep } => svc.join(&team, as_rep).await,
        AppCommand::Rename { team, name } => svc.rename(&team, &name).await,
        AppCommand::Lock { team } => svc.toggle_lock(&team).await,
        AppCommand::Help => Ok(format!("Commands: {}", USAGE)),
        AppCommand::Team { .. }
        | AppCommand::Sprint(_)
        | AppCommand::Search(_)
        | AppCommand::Retry
        | AppCommand::Quit => Ok(String::new()),
    }
}

/// Whether a failure of this command deserves the blocking Try Again banner.
/// Fetches and saves do; a rejected edit is only logged.
pub fn is_retryable(cmd: &AppCommand) -> bool {
    matches!(cmd, AppCommand::Save | AppCommand::Refresh)
}
