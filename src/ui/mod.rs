use crate::app_state::{App, FocusArea, InputMode, ViewMode};
use crate::grading::{Band, GradeScale, Rollup};
use crate::model::{Assignment, PeerReview, ReviewStatus, TeamId};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let banner = if app.failure.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner),
            Constraint::Min(0),
            Constraint::Length(10),
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);
    if app.failure.is_some() {
        render_failure(f, chunks[1], app);
    }

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)])
        .split(chunks[2]);
    render_left_menu(f, middle[0], app);
    render_main_view(f, middle[1], app);

    render_bottom_bar(f, chunks[3], app);
}

pub fn band_style(band: Band) -> Style {
    let color = match band {
        Band::Excellent => Color::Green,
        Band::Good => Color::LightGreen,
        Band::Fair => Color::Yellow,
        Band::Weak => Color::LightRed,
        Band::Failing => Color::Red,
        Band::Empty => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn scored(value: u32, scale: GradeScale) -> Cell<'static> {
    Cell::from(Span::styled(value.to_string(), band_style(scale.band(value))))
}

fn status_style(status: ReviewStatus) -> Style {
    match status {
        ReviewStatus::Pending => Style::default().fg(Color::Yellow),
        ReviewStatus::Submitted => Style::default().fg(Color::Cyan),
        ReviewStatus::Graded => Style::default().fg(Color::Green),
    }
}

fn focus_style(app: &App, area: FocusArea) -> Style {
    if app.focus_area == area {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn header(labels: Vec<String>) -> Row<'static> {
    Row::new(labels).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let who = match &app.workspace.user {
        Some(u) => format!("{} ({})", u.name, if u.is_instructor() { "instructor" } else { "student" }),
        None if app.loaded => "not signed in".to_string(),
        None => "loading...".to_string(),
    };
    let mut spans = vec![
        Span::styled(
            " Peer Pilot ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}  Sprint {}/{}", who, app.sprint, app.workspace.sprints)),
    ];
    if app.workspace.has_unsaved() {
        spans.push(Span::styled(
            format!("  ● Unsaved changes ({}), s to save", app.workspace.unsaved_count()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_failure(f: &mut Frame, area: Rect, app: &App) {
    let message = app
        .failure
        .as_ref()
        .map(|fl| fl.message.as_str())
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled(
            format!("✗ {}  ", message),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            "[r] Try Again",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  [Esc] dismiss"),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error")
        .style(Style::default().fg(Color::Red));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .menu()
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = *view == app.view_mode;
            let style = if is_selected && app.focus_area == FocusArea::Menu {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, view.title())).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "Views (Enter)"
    } else {
        "Views (←)"
    };
    let menu = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app, FocusArea::Menu)),
    );
    f.render_widget(menu, area);
}

fn render_table(
    f: &mut Frame,
    area: Rect,
    app: &mut App,
    title: String,
    head: Vec<String>,
    rows: Vec<Row<'static>>,
    widths: Vec<Constraint>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(focus_style(app, FocusArea::MainView));
    let table = Table::new(rows, widths)
        .header(header(head))
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    app.table_state.select(Some(app.selected_index));
    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &mut App) {
    if !app.loaded {
        let p = Paragraph::new("Loading course data...").block(
            Block::default()
                .borders(Borders::ALL)
                .style(focus_style(app, FocusArea::MainView)),
        );
        f.render_widget(p, area);
        return;
    }
    match app.view_mode {
        ViewMode::Grading => match app.team_filter {
            Some(team) => render_team_members(f, area, app, team),
            None => render_team_grades(f, area, app),
        },
        ViewMode::AllStudents => render_all_students(f, area, app),
        ViewMode::PeerReviews => render_peer_reviews(f, area, app),
        ViewMode::Teams => render_teams(f, area, app),
        ViewMode::MyGrades => render_my_grades(f, area, app),
        ViewMode::MyTeam => render_my_team(f, area, app),
        ViewMode::ReviewAssignments => render_review_assignments(f, area, app),
    }
}

fn sprint_sum_labels(rollup: &Rollup) -> Vec<String> {
    rollup.sprints().map(|s| format!("S{}", s)).collect()
}

fn render_team_grades(f: &mut Frame, area: Rect, app: &mut App) {
    let sprint = app.sprint;
    let (rows, head, widths) = {
        let rollup = app.workspace.rollup();
        let rows: Vec<Row> = app
            .visible_teams()
            .iter()
            .map(|t| {
                let mut cells = vec![Cell::from(t.name.clone())];
                for a in Assignment::TEAM {
                    cells.push(scored(
                        rollup.team_assignment_average(t.id, sprint, a),
                        GradeScale::Assignment,
                    ));
                }
                cells.push(scored(
                    rollup.team_sprint_sum(t.id, sprint),
                    GradeScale::TeamSprint,
                ));
                for s in rollup.sprints() {
                    cells.push(scored(rollup.team_sprint_sum(t.id, s), GradeScale::TeamSprint));
                }
                cells.push(scored(rollup.team_overall(t.id), GradeScale::TeamOverall));
                Row::new(cells)
            })
            .collect();

        let mut head = vec!["Team".to_string()];
        head.extend(Assignment::TEAM.iter().map(|a| a.code().to_string()));
        head.push("Sum".to_string());
        head.extend(sprint_sum_labels(&rollup));
        head.push("Overall".to_string());

        let mut widths = vec![Constraint::Min(18)];
        widths.extend(std::iter::repeat(Constraint::Length(5)).take(head.len() - 2));
        widths.push(Constraint::Length(8));
        (rows, head, widths)
    };
    let title = format!(
        "Grading: team averages, sprint {} (Enter members, teamgrade to edit)",
        sprint
    );
    render_table(f, area, app, title, head, rows, widths);
}

fn render_team_members(f: &mut Frame, area: Rect, app: &mut App, team: TeamId) {
    let sprint = app.sprint;
    let team_name = app
        .workspace
        .roster
        .team(team)
        .map(|t| t.name.clone())
        .unwrap_or_default();
    let (rows, head, widths) = {
        let rollup = app.workspace.rollup();
        let rows: Vec<Row> = app
            .visible_students()
            .iter()
            .map(|s| {
                let m = rollup.member_sprint(s.id, sprint);
                let mut cells = vec![
                    Cell::from(s.name.clone()),
                    Cell::from(if s.is_rep { "rep" } else { "" }),
                    scored(m.team_total, GradeScale::TeamSprint),
                    scored(m.extra, GradeScale::Assignment),
                    scored(m.sum, GradeScale::MemberSprint),
                ];
                for s2 in rollup.sprints() {
                    cells.push(scored(rollup.member_sprint(s.id, s2).sum, GradeScale::MemberSprint));
                }
                cells.push(scored(rollup.student_overall(s.id), GradeScale::StudentOverall));
                Row::new(cells)
            })
            .collect();

        let mut head: Vec<String> = ["Student", "", "Total", "Extra", "Sum"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        head.extend(sprint_sum_labels(&rollup));
        head.push("Overall".to_string());

        let mut widths = vec![Constraint::Min(18), Constraint::Length(4)];
        widths.extend(std::iter::repeat(Constraint::Length(6)).take(head.len() - 3));
        widths.push(Constraint::Length(8));
        (rows, head, widths)
    };
    let title = format!(
        "{}: members, sprint {} (x back, extra to edit)",
        team_name, sprint
    );
    render_table(f, area, app, title, head, rows, widths);
}

fn render_all_students(f: &mut Frame, area: Rect, app: &mut App) {
    let sprint = app.sprint;
    let (rows, head) = {
        let rollup = app.workspace.rollup();
        let roster = &app.workspace.roster;
        let rows: Vec<Row> = app
            .visible_students()
            .iter()
            .map(|s| {
                let m = rollup.member_sprint(s.id, sprint);
                let team = s
                    .team_id
                    .and_then(|t| roster.team(t))
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    Cell::from(s.name.clone()),
                    Cell::from(s.email.clone()),
                    Cell::from(team),
                    scored(m.team_total, GradeScale::TeamSprint),
                    scored(m.extra, GradeScale::Assignment),
                    scored(m.sum, GradeScale::MemberSprint),
                    scored(rollup.student_overall(s.id), GradeScale::StudentOverall),
                ])
            })
            .collect();
        let head = ["Student", "Email", "Team", "Total", "Extra", "Sum", "Overall"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        (rows, head)
    };
    let filter = app
        .team_filter
        .and_then(|t| app.workspace.roster.team(t))
        .map(|t| format!(" [{}]", t.name))
        .unwrap_or_default();
    let title = format!("All Students{}, sprint {}", filter, sprint);
    let widths = vec![
        Constraint::Min(16),
        Constraint::Min(20),
        Constraint::Min(14),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(8),
    ];
    render_table(f, area, app, title, head, rows, widths);
}

fn link_cell(link: &Option<String>) -> Cell<'static> {
    match link.as_deref() {
        Some(l) if !l.is_empty() => Cell::from(l.to_string()),
        _ => Cell::from(Span::styled("-", Style::default().fg(Color::DarkGray))),
    }
}

fn review_rows(app: &App, reviews: &[&PeerReview]) -> Vec<Row<'static>> {
    let name = |id: TeamId| {
        app.workspace
            .roster
            .team(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    };
    reviews
        .iter()
        .map(|r| {
            let suggested = r
                .suggested_grades
                .as_ref()
                .map(|g| match g.iteration {
                    Some(i) => format!("A {} / I {}", g.assignment, i),
                    None => format!("A {}", g.assignment),
                })
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(r.id.to_string()),
                Cell::from(r.sprint.to_string()),
                Cell::from(name(r.reviewing_team_id)),
                Cell::from(name(r.reviewed_team_id)),
                Cell::from(Span::styled(r.status.label(), status_style(r.status))),
                Cell::from(suggested),
                link_cell(&r.reviewed_team_report_link),
                link_cell(&r.review_link),
            ])
        })
        .collect()
}

const REVIEW_HEAD: [&str; 8] = [
    "ID", "Sprint", "Reviewer", "Reviewed", "Status", "Suggested", "Report", "Review",
];

fn review_widths() -> Vec<Constraint> {
    vec![
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Min(14),
        Constraint::Min(14),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Min(12),
        Constraint::Min(12),
    ]
}

fn render_peer_reviews(f: &mut Frame, area: Rect, app: &mut App) {
    let summary = app.workspace.reviews.summary(app.sprint);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let counts = Line::from(vec![
        Span::raw(format!("Sprint {}: ", app.sprint)),
        Span::styled(
            format!("{} pending", summary.pending),
            status_style(ReviewStatus::Pending),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} submitted", summary.submitted),
            status_style(ReviewStatus::Submitted),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} graded", summary.graded),
            status_style(ReviewStatus::Graded),
        ),
        Span::raw(format!("  of {}", summary.total())),
    ]);
    f.render_widget(
        Paragraph::new(counts).block(Block::default().borders(Borders::ALL).title("Status")),
        chunks[0],
    );

    let rows = review_rows(app, &app.visible_reviews());
    let search = if app.search.is_empty() {
        String::new()
    } else {
        format!(" search \"{}\"", app.search)
    };
    let title = format!("Peer Reviews{} (link, status, apply)", search);
    let head = REVIEW_HEAD.iter().map(|s| s.to_string()).collect();
    render_table(f, chunks[1], app, title, head, rows, review_widths());
}

fn render_review_assignments(f: &mut Frame, area: Rect, app: &mut App) {
    if app.workspace.my_team_id().is_none() {
        let p = Paragraph::new("Join a team to see its review assignments.")
            .block(Block::default().borders(Borders::ALL).title("Review Assignments"));
        f.render_widget(p, area);
        return;
    }
    let rows = review_rows(app, &app.visible_reviews());
    let head = REVIEW_HEAD.iter().map(|s| s.to_string()).collect();
    render_table(
        f,
        area,
        app,
        "Review Assignments".to_string(),
        head,
        rows,
        review_widths(),
    );
}

fn render_teams(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .visible_teams()
        .iter()
        .map(|t| {
            let roster = &app.workspace.roster;
            let project = roster.project_of(t.id);
            let members = roster.members(t.id);
            let seats = match project {
                Some(p) => format!("{}/{}", members.len(), p.max_students_per_team),
                None => members.len().to_string(),
            };
            let rep = members
                .iter()
                .find(|s| s.is_rep)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "-".to_string());
            let lock = if t.is_locked {
                Span::styled("locked", Style::default().fg(Color::Red))
            } else {
                Span::styled("open", Style::default().fg(Color::Green))
            };
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.name.clone()),
                Cell::from(project.map(|p| p.name.clone()).unwrap_or_else(|| "-".to_string())),
                Cell::from(seats),
                Cell::from(rep),
                Cell::from(lock),
            ])
        })
        .collect();
    let head = ["ID", "Team", "Project", "Seats", "Representative", "State"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let hint = if app.workspace.is_instructor() {
        "project add, lock"
    } else {
        "join, rename"
    };
    let widths = vec![
        Constraint::Length(5),
        Constraint::Min(18),
        Constraint::Min(14),
        Constraint::Length(6),
        Constraint::Min(16),
        Constraint::Length(7),
    ];
    render_table(f, area, app, format!("Teams ({})", hint), head, rows, widths);
}

fn render_my_grades(f: &mut Frame, area: Rect, app: &mut App) {
    let Some(me) = app.workspace.student_id() else {
        let p = Paragraph::new("This account is not linked to a student.")
            .block(Block::default().borders(Borders::ALL).title("My Grades"));
        f.render_widget(p, area);
        return;
    };
    let (rows, overall) = {
        let rollup = app.workspace.rollup();
        let report = rollup.student_average_report(me);
        let rows: Vec<Row> = report
            .per_sprint
            .iter()
            .map(|&(sprint, avg)| {
                let mut cells = vec![Cell::from(format!("Sprint {}", sprint))];
                for a in Assignment::CORE {
                    cells.push(scored(rollup.score(me, sprint, a), GradeScale::Assignment));
                }
                cells.push(scored(avg, GradeScale::Assignment));
                Row::new(cells)
            })
            .collect();
        (rows, report.overall)
    };
    let mut head = vec!["Sprint".to_string()];
    head.extend(Assignment::CORE.iter().map(|a| a.name().to_string()));
    head.push("Average".to_string());
    let mut widths = vec![Constraint::Length(10)];
    widths.extend(std::iter::repeat(Constraint::Min(10)).take(Assignment::CORE.len() + 1));
    let title = format!("My Grades: overall average {} out of 100", overall);
    render_table(f, area, app, title, head, rows, widths);
}

fn render_my_team(f: &mut Frame, area: Rect, app: &mut App) {
    let Some(team) = app.workspace.my_team().cloned() else {
        let p = Paragraph::new("You are not in a team yet. Use: join <team> [rep]")
            .block(Block::default().borders(Borders::ALL).title("My Team"));
        f.render_widget(p, area);
        return;
    };
    let me = app.workspace.student_id();
    let rows: Vec<Row> = app
        .workspace
        .roster
        .members(team.id)
        .iter()
        .map(|s| {
            let mut role = if s.is_rep { "representative" } else { "member" }.to_string();
            if Some(s.id) == me {
                role.push_str(" (you)");
            }
            Row::new(vec![
                Cell::from(s.name.clone()),
                Cell::from(s.email.clone()),
                Cell::from(role),
            ])
        })
        .collect();
    let state = if team.is_locked { "locked" } else { "open" };
    let title = format!("My Team: {} ({})", team.name, state);
    let head = ["Name", "Email", "Role"].iter().map(|s| s.to_string()).collect();
    let widths = vec![Constraint::Min(18), Constraint::Min(22), Constraint::Min(18)];
    render_table(f, area, app, title, head, rows, widths);
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "Command: ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app.command_cursor.min(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(right));
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }
        vec![
            Line::from(spans),
            Line::from("Enter run  Esc cancel  Tab complete  ↑↓ history"),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled("Command: ", Style::default().fg(Color::Yellow)),
                Span::raw("(press / to type a command, help lists them)"),
            ]),
            Line::from("←→ focus  ↑↓ move  Enter open  x back  [ ] sprint  s save  R reload  q quit"),
        ]
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Command")
        .style(if app.input_mode == InputMode::Command {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::White)
        });
    f.render_widget(Paragraph::new(prompt).block(block), chunks[0]);

    let items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();
    let log = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Log ({})", app.log_messages.len())),
    );
    f.render_widget(log, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppEvent;
    use crate::commands::AppCommand;
    use crate::model::{CurrentUser, GradeKey, Role, Roster, Student, Team};
    use crate::sync::Workspace;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn workspace() -> Workspace {
        let mut ws = Workspace::new(2);
        ws.user = Some(CurrentUser {
            id: 1,
            name: "Prof Oak".into(),
            email: "oak@uni.edu".into(),
            role: Role::Instructor,
            student_id: None,
            team_id: None,
        });
        ws.roster = Roster {
            teams: vec![Team {
                id: 10,
                name: "Team Alpha".into(),
                color: None,
                is_locked: false,
                project_id: None,
                students: vec![],
            }],
            students: vec![Student {
                id: 1,
                name: "Ada".into(),
                email: "ada@uni.edu".into(),
                team_id: Some(10),
                is_rep: true,
            }],
            projects: vec![],
        };
        ws
    }

    fn app() -> App {
        let (cmd_tx, _cmd_rx) = mpsc::unbounded_channel();
        let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
        let mut app = App::new(vec![], 2, cmd_tx, evt_rx);
        app.apply_event(AppEvent::Workspace(Box::new(workspace())));
        app
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn member_view_has_extra_column() {
        let mut app = app();
        let team_view = screen(&mut app);
        assert!(team_view.contains("Team Alpha"));
        assert!(team_view.contains("Overall"));
        assert!(!team_view.contains("Extra"));

        app.team_filter = Some(10);
        let members = screen(&mut app);
        assert!(members.contains("Extra"));
        assert!(members.contains("Ada"));
    }

    #[test]
    fn unsaved_marker_follows_pending_buffer() {
        let mut app = app();
        assert!(!screen(&mut app).contains("Unsaved changes"));

        let mut ws = workspace();
        ws.ledger.set(GradeKey::new(1, 1, Assignment::A), 88);
        app.apply_event(AppEvent::Workspace(Box::new(ws)));
        assert!(screen(&mut app).contains("Unsaved changes (1)"));
    }

    #[test]
    fn failed_fetch_offers_try_again() {
        let mut app = app();
        app.apply_event(AppEvent::Failed {
            command: AppCommand::Refresh,
            message: "refreshing course data: connection refused".into(),
        });
        let text = screen(&mut app);
        assert!(text.contains("Try Again"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn bands_map_to_colors() {
        assert_eq!(band_style(Band::Excellent).fg, Some(Color::Green));
        assert_eq!(band_style(Band::Failing).fg, Some(Color::Red));
        assert_eq!(band_style(Band::Empty).fg, Some(Color::DarkGray));
    }
}
