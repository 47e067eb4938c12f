use crate::commands::{AppCommand, COMMAND_NAMES};
use crate::model::{PeerReview, Sprint, Student, Team, TeamId};
use crate::sync::Workspace;
use crossterm::event::KeyCode;
use ratatui::widgets::TableState;
use tokio::sync::mpsc;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ViewMode {
    Grading,
    AllStudents,
    PeerReviews,
    Teams,
    MyGrades,
    MyTeam,
    ReviewAssignments,
}

impl ViewMode {
    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Grading => "Grading",
            ViewMode::AllStudents => "All Students",
            ViewMode::PeerReviews => "Peer Reviews",
            ViewMode::Teams => "Teams",
            ViewMode::MyGrades => "My Grades",
            ViewMode::MyTeam => "My Team",
            ViewMode::ReviewAssignments => "Review Assignments",
        }
    }
}

const INSTRUCTOR_MENU: [ViewMode; 4] = [
    ViewMode::Grading,
    ViewMode::AllStudents,
    ViewMode::PeerReviews,
    ViewMode::Teams,
];
const STUDENT_MENU: [ViewMode; 4] = [
    ViewMode::MyGrades,
    ViewMode::MyTeam,
    ViewMode::ReviewAssignments,
    ViewMode::Teams,
];

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,
    MainView,
}

/// A worker command that failed, kept so it can be sent again.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub command: AppCommand,
    pub message: String,
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    Workspace(Box<Workspace>),
    Failed { command: AppCommand, message: String },
}

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub workspace: Workspace,
    pub loaded: bool,
    pub sprint: Sprint,
    pub search: String,
    /// Team shown in the member grading view; also filters All Students.
    pub team_filter: Option<TeamId>,
    pub failure: Option<Failure>,
    pub selected_index: usize,
    pub table_state: TableState,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        startup_notes: Vec<String>,
        sprints: u32,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["Peer Pilot started".to_string()];
        log_messages.extend(startup_notes);

        App {
            view_mode: ViewMode::Teams,
            input_mode: InputMode::Normal,
            focus_area: FocusArea::Menu,
            menu_selected_index: 0,
            workspace: Workspace::new(sprints),
            loaded: false,
            sprint: 1,
            search: String::new(),
            team_filter: None,
            failure: None,
            selected_index: 0,
            table_state: TableState::default().with_selected(Some(0)),
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    fn add_error(&mut self, msg: impl std::fmt::Display) {
        self.log_messages.push(format!("✗ {}", msg));
    }

    /// Views offered for the signed-in role; only Teams before sign-in.
    pub fn menu(&self) -> &'static [ViewMode] {
        match &self.workspace.user {
            Some(u) if u.is_instructor() => &INSTRUCTOR_MENU,
            Some(_) => &STUDENT_MENU,
            None => &INSTRUCTOR_MENU[3..],
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) => self.add_log(msg),
            AppEvent::Message(msg) => self.add_log(format!("✓ {}", msg)),
            AppEvent::Error(msg) => self.add_error(msg),
            AppEvent::Failed { command, message } => {
                self.add_error(&message);
                self.failure = Some(Failure { command, message });
            }
            AppEvent::Workspace(ws) => {
                let first = !self.loaded;
                self.workspace = *ws;
                self.loaded = true;
                self.sprint = self.sprint.clamp(1, self.workspace.sprints);
                if self
                    .team_filter
                    .is_some_and(|t| self.workspace.roster.team(t).is_none())
                {
                    self.team_filter = None;
                }
                if first || !self.menu().contains(&self.view_mode) {
                    self.view_mode = self.menu()[0];
                    self.menu_selected_index = 0;
                }
                self.clamp_selection();
            }
        }
    }

    /// Teams of the grading view, narrowed by the search text.
    pub fn visible_teams(&self) -> Vec<&Team> {
        let needle = self.search.to_lowercase();
        self.workspace
            .roster
            .teams
            .iter()
            .filter(|t| needle.is_empty() || t.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Students of the selected team, or everyone matching the search.
    pub fn visible_students(&self) -> Vec<&Student> {
        let needle = self.search.to_lowercase();
        self.workspace
            .roster
            .students
            .iter()
            .filter(|s| self.team_filter.map_or(true, |t| s.team_id == Some(t)))
            .filter(|s| {
                needle.is_empty()
                    || s.name.to_lowercase().contains(&needle)
                    || s.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn visible_reviews(&self) -> Vec<&PeerReview> {
        match self.view_mode {
            ViewMode::ReviewAssignments => self
                .workspace
                .my_team_id()
                .map(|t| self.workspace.reviews.visible_to(t))
                .unwrap_or_default(),
            _ => self
                .workspace
                .reviews
                .for_sprint(self.sprint, &self.search, &self.workspace.roster),
        }
    }

    fn row_count(&self) -> usize {
        match self.view_mode {
            ViewMode::Grading if self.team_filter.is_some() => self.visible_students().len(),
            ViewMode::Grading | ViewMode::Teams => self.visible_teams().len(),
            ViewMode::AllStudents => self.visible_students().len(),
            ViewMode::PeerReviews | ViewMode::ReviewAssignments => self.visible_reviews().len(),
            ViewMode::MyGrades => self.workspace.sprints as usize,
            ViewMode::MyTeam => self
                .workspace
                .my_team_id()
                .map(|t| self.workspace.roster.members(t).len())
                .unwrap_or(0),
        }
    }

    pub fn clamp_selection(&mut self) {
        let len = self.row_count();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        self.table_state.select(Some(self.selected_index));
    }

    /// Ghost text for Tab: command names, plus `add` after `project`.
    pub fn get_completion_hint(&self) -> Option<String> {
        let input = self.command_input.trim_start();
        let open_word = !input.ends_with(' ');
        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.as_slice() {
            ["project"] if !open_word => Some("add".to_string()),
            ["project", sub] if open_word => "add"
                .strip_prefix(sub)
                .filter(|rest| !rest.is_empty())
                .map(str::to_string),
            [word] if open_word => COMMAND_NAMES
                .iter()
                .find(|c| c.starts_with(*word) && **c != *word)
                .map(|c| c[word.len()..].to_string()),
            _ => None,
        }
    }

    /// Sends the failed command again and drops the banner.
    pub fn retry(&mut self) {
        match self.failure.take() {
            Some(f) => {
                self.add_log(format!("Retrying: {}", f.message));
                let _ = self.cmd_tx.send(f.command);
            }
            None => self.add_log("Nothing to retry".to_string()),
        }
    }

    fn run_local(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::Team { team: None } => {
                self.team_filter = None;
                self.add_log("Showing all teams".to_string());
            }
            AppCommand::Team { team: Some(q) } => match self
                .workspace
                .roster
                .find_team(&q)
                .map(|t| (t.id, t.name.clone()))
            {
                Some((id, name)) => {
                    self.team_filter = Some(id);
                    self.add_log(format!("Showing {}", name));
                    if self.view_mode != ViewMode::AllStudents {
                        self.view_mode = ViewMode::Grading;
                    }
                }
                None => self.add_error(format!("team not found: {}", q)),
            },
            AppCommand::Sprint(n) => {
                if n < 1 || n > self.workspace.sprints {
                    self.add_error(format!(
                        "sprint must be between 1 and {}",
                        self.workspace.sprints
                    ));
                } else {
                    self.sprint = n;
                }
            }
            AppCommand::Search(text) => self.search = text,
            AppCommand::Retry => self.retry(),
            AppCommand::Quit => return true,
            other => {
                let _ = self.cmd_tx.send(other);
            }
        }
        self.selected_index = 0;
        self.clamp_selection();
        false
    }

    /// Parses and runs one command line. Returns true when the app should quit.
    pub fn submit_command(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        self.command_history.push(line.to_string());
        self.command_history_index = None;
        match line.parse::<AppCommand>() {
            Ok(cmd) => self.run_local(cmd),
            Err(e) => {
                self.add_error(e);
                false
            }
        }
    }

    fn close_command(&mut self) {
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    fn switch_view(&mut self, view: ViewMode) {
        self.view_mode = view;
        self.selected_index = 0;
        self.clamp_selection();
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Command {
            match key {
                KeyCode::Enter => {
                    let line = self.command_input.clone();
                    self.close_command();
                    return self.submit_command(&line);
                }
                KeyCode::Esc => self.close_command(),
                KeyCode::Tab => {
                    if let Some(hint) = self.get_completion_hint() {
                        let insert = format!("{} ", hint);
                        self.command_input.push_str(&insert);
                        self.command_cursor = self.command_input.len();
                    }
                }
                KeyCode::Up => {
                    if self.command_history.is_empty() {
                        return false;
                    }
                    let next = match self.command_history_index {
                        None => self.command_history.len() - 1,
                        Some(i) => i.saturating_sub(1),
                    };
                    self.command_history_index = Some(next);
                    self.command_input = self.command_history[next].clone();
                    self.command_cursor = self.command_input.len();
                }
                KeyCode::Down => {
                    let Some(i) = self.command_history_index else {
                        return false;
                    };
                    if i + 1 >= self.command_history.len() {
                        self.command_history_index = None;
                        self.command_input.clear();
                        self.command_cursor = 0;
                    } else {
                        self.command_history_index = Some(i + 1);
                        self.command_input = self.command_history[i + 1].clone();
                        self.command_cursor = self.command_input.len();
                    }
                }
                KeyCode::Backspace => {
                    if self.command_cursor > 0 {
                        self.command_cursor -= 1;
                        self.command_input.remove(self.command_cursor);
                    }
                }
                KeyCode::Delete => {
                    if self.command_cursor < self.command_input.len() {
                        self.command_input.remove(self.command_cursor);
                    }
                }
                KeyCode::Left => self.command_cursor = self.command_cursor.saturating_sub(1),
                KeyCode::Right => {
                    if self.command_cursor < self.command_input.len() {
                        self.command_cursor += 1;
                    }
                }
                KeyCode::Home => self.command_cursor = 0,
                KeyCode::End => self.command_cursor = self.command_input.len(),
                KeyCode::Char(c) if c.is_ascii() => {
                    self.command_input.insert(self.command_cursor, c);
                    self.command_cursor += 1;
                }
                _ => {}
            }
            return false;
        }

        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') if self.failure.is_some() => self.retry(),
            KeyCode::Esc if self.failure.is_some() => self.failure = None,
            KeyCode::Char('s') => {
                let _ = self.cmd_tx.send(AppCommand::Save);
            }
            KeyCode::Char('R') => {
                let _ = self.cmd_tx.send(AppCommand::Refresh);
            }
            KeyCode::Char('[') => {
                if self.sprint > 1 {
                    self.sprint -= 1;
                }
            }
            KeyCode::Char(']') => {
                if self.sprint < self.workspace.sprints {
                    self.sprint += 1;
                }
            }
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            KeyCode::Right => self.focus_area = FocusArea::MainView,
            KeyCode::Up => {
                if self.focus_area == FocusArea::Menu {
                    self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                } else if self.selected_index > 0 {
                    self.selected_index -= 1;
                    self.table_state.select(Some(self.selected_index));
                }
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Menu {
                    if self.menu_selected_index + 1 < self.menu().len() {
                        self.menu_selected_index += 1;
                    }
                } else if self.selected_index + 1 < self.row_count() {
                    self.selected_index += 1;
                    self.table_state.select(Some(self.selected_index));
                }
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                if self.focus_area == FocusArea::Menu {
                    if let Some(&view) = self.menu().get(self.menu_selected_index) {
                        self.switch_view(view);
                    }
                    self.focus_area = FocusArea::MainView;
                } else if self.view_mode == ViewMode::Grading && self.team_filter.is_none() {
                    let picked = self.visible_teams().get(self.selected_index).map(|t| t.id);
                    if let Some(id) = picked {
                        self.team_filter = Some(id);
                        self.selected_index = 0;
                        self.clamp_selection();
                    }
                }
            }
            KeyCode::Char('x') | KeyCode::Esc => {
                if self.team_filter.is_some() {
                    self.team_filter = None;
                    self.clamp_selection();
                }
            }
            _ => {}
        }
        false
    }
}
