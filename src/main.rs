mod app_service;
mod app_state;
mod commands;
mod config;
mod formation;
mod grading;
mod model;
mod review;
mod session;
mod storage;
mod sync;
mod ui;

use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_service::{execute, is_retryable, refresh_ui};
use crate::app_state::{App, AppEvent};
use crate::commands::AppCommand;
use crate::config::Settings;
use crate::session::{CourseApi, PilotSession};
use crate::sync::{SyncService, Workspace};
use crate::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> io::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join(format!("app-{}.log", ts)))?;
    // the terminal belongs to the TUI, so logs go to a file
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Warn)
        .filter_module("peer_pilot", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    let (settings, mut notes) = Settings::from_env();
    info!("Backend {}, {} sprints", settings.api_url, settings.sprints);

    let db = match storage::establish_connection(&settings.database_url).await {
        Ok(connection) => {
            notes.push(format!("Draft store: {}", settings.database_url));
            Some(Arc::new(connection))
        }
        Err(e) => {
            error!("Draft store unavailable: {}", e);
            notes.push(format!("⚠ Draft store unavailable, edits live in memory only: {}", e));
            None
        }
    };

    let service = match create_service(&settings, db) {
        Ok(svc) => Some(svc),
        Err(msg) => {
            notes.push(format!("✗ {}", msg));
            None
        }
    };

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    // single worker task owns the session, the draft store and the workspace
    let evt_tx_bg = evt_tx.clone();
    let sprints = settings.sprints;
    tokio::spawn(async move {
        let Some((session, mut svc)) = service else {
            let _ = evt_tx_bg.send(AppEvent::Workspace(Box::new(Workspace::new(sprints))));
            while cmd_rx.recv().await.is_some() {
                let _ = evt_tx_bg.send(AppEvent::Error(
                    "not signed in: set PEER_PILOT_EMAIL and PEER_PILOT_PASSWORD".to_string(),
                ));
            }
            return;
        };

        let _ = evt_tx_bg.send(AppEvent::Log("Signing in...".to_string()));
        match session.login().await {
            Ok(()) => info!("Authenticated as {}", session.email()),
            Err(e) => error!("Login failed: {}", e),
        }
        run_command(&mut svc, AppCommand::Refresh, &evt_tx_bg).await;

        while let Some(cmd) = cmd_rx.recv().await {
            run_command(&mut svc, cmd, &evt_tx_bg).await;
        }
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(notes, settings.sprints, cmd_tx, evt_rx);
    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn create_service(
    settings: &Settings,
    db: Option<Arc<sea_orm::DatabaseConnection>>,
) -> Result<(Arc<PilotSession>, SyncService), String> {
    if !settings.has_credentials() {
        return Err(
            "No account configured: set PEER_PILOT_EMAIL and PEER_PILOT_PASSWORD in .env"
                .to_string(),
        );
    }
    let session = PilotSession::new(
        &settings.api_url,
        settings.email.clone().unwrap_or_default(),
        settings.password.clone().unwrap_or_default(),
        settings.max_tries,
        settings.retry_delay,
    )
    .map_err(|e| format!("Could not create session: {}", e))?;
    let session = Arc::new(session);
    let api: Arc<dyn CourseApi> = session.clone();
    Ok((session, SyncService::new(api, db, settings.sprints)))
}

async fn run_command(
    svc: &mut SyncService,
    cmd: AppCommand,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let retryable = is_retryable(&cmd);
    let replay = cmd.clone();
    match execute(svc, cmd).await {
        Ok(msg) if msg.is_empty() => {}
        Ok(msg) => {
            let _ = tx.send(AppEvent::Message(msg));
        }
        Err(e) => {
            error!("{:?} failed: {:#}", replay, e);
            let message = format!("{:#}", e);
            let _ = if retryable {
                tx.send(AppEvent::Failed {
                    command: replay,
                    message,
                })
            } else {
                tx.send(AppEvent::Error(message))
            };
        }
    }
    refresh_ui(svc, tx);
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
