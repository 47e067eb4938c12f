use crate::model::{Assignment, ReviewId, ReviewStatus, Sprint, UnknownAssignment};
use std::str::FromStr;

pub const USAGE: &str = "team <name|all> | grade <student> <sprint> <letter> <score> | \
teamgrade <team> <sprint> <letter> <score> | extra <student> <sprint> <score> | \
ungrade <student> <sprint> <letter> | save | refresh | retry | sprint <n> | search <text> | \
link <review> <url|-> | status <review> <pending|submitted|graded> | apply <review> | \
project add <name> <teams> <max> | join <team> [rep] | rename <team> <new name> | lock <team> | \
help | quit";

/// First words completed by Tab in the command box.
pub const COMMAND_NAMES: [&str; 20] = [
    "team", "teamgrade", "grade", "extra", "ungrade", "save", "refresh", "retry", "sprint",
    "search", "link", "status", "apply", "project", "join", "rename", "lock", "help", "quit",
    "exit",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0} (type help)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error(transparent)]
    Assignment(#[from] UnknownAssignment),
    #[error("{0}")]
    Status(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Show one team's members in the grading view; `None` shows all teams.
    Team { team: Option<String> },
    Grade {
        student: String,
        sprint: Sprint,
        assignment: Assignment,
        score: i64,
    },
    TeamGrade {
        team: String,
        sprint: Sprint,
        assignment: Assignment,
        score: i64,
    },
    Ungrade {
        student: String,
        sprint: Sprint,
        assignment: Assignment,
    },
    Save,
    Refresh,
    Retry,
    Sprint(Sprint),
    Search(String),
    /// Empty link clears.
    Link { review: ReviewId, link: String },
    Status { review: ReviewId, status: ReviewStatus },
    Apply { review: ReviewId },
    ProjectAdd {
        name: String,
        max_teams: u32,
        max_students_per_team: u32,
    },
    Join { team: String, as_rep: bool },
    Rename { team: String, name: String },
    Lock { team: String },
    Help,
    Quit,
}

fn number<T: FromStr>(raw: Option<&&str>, usage: &'static str) -> Result<T, CommandError> {
    let raw = raw.ok_or(CommandError::Usage(usage))?;
    raw.parse().map_err(|_| CommandError::NotANumber(raw.to_string()))
}

fn word(raw: Option<&&str>, usage: &'static str) -> Result<String, CommandError> {
    raw.map(|s| s.to_string()).ok_or(CommandError::Usage(usage))
}

fn letter(raw: Option<&&str>, usage: &'static str) -> Result<Assignment, CommandError> {
    Ok(raw.ok_or(CommandError::Usage(usage))?.parse()?)
}

fn rest(parts: &[&str], from: usize) -> String {
    parts.get(from..).map(|p| p.join(" ")).unwrap_or_default()
}

impl FromStr for AppCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let Some(head) = parts.first() else {
            return Err(CommandError::Usage(USAGE));
        };

        match head.to_ascii_lowercase().as_str() {
            "team" | "teams" => {
                let team = rest(&parts, 1);
                if team.is_empty() {
                    return Err(CommandError::Usage("team <name|all>"));
                }
                Ok(AppCommand::Team {
                    team: (!team.eq_ignore_ascii_case("all")).then_some(team),
                })
            }
            "grade" => {
                const U: &str = "grade <student> <sprint> <letter> <score>";
                Ok(AppCommand::Grade {
                    student: word(parts.get(1), U)?,
                    sprint: number(parts.get(2), U)?,
                    assignment: letter(parts.get(3), U)?,
                    score: number(parts.get(4), U)?,
                })
            }
            "teamgrade" => {
                const U: &str = "teamgrade <team> <sprint> <letter> <score>";
                Ok(AppCommand::TeamGrade {
                    team: word(parts.get(1), U)?,
                    sprint: number(parts.get(2), U)?,
                    assignment: letter(parts.get(3), U)?,
                    score: number(parts.get(4), U)?,
                })
            }
            "extra" => {
                const U: &str = "extra <student> <sprint> <score>";
                Ok(AppCommand::Grade {
                    student: word(parts.get(1), U)?,
                    sprint: number(parts.get(2), U)?,
                    assignment: Assignment::E,
                    score: number(parts.get(3), U)?,
                })
            }
            "ungrade" => {
                const U: &str = "ungrade <student> <sprint> <letter>";
                Ok(AppCommand::Ungrade {
                    student: word(parts.get(1), U)?,
                    sprint: number(parts.get(2), U)?,
                    assignment: letter(parts.get(3), U)?,
                })
            }
            "save" => Ok(AppCommand::Save),
            "refresh" | "reload" => Ok(AppCommand::Refresh),
            "retry" => Ok(AppCommand::Retry),
            "sprint" => Ok(AppCommand::Sprint(number(parts.get(1), "sprint <n>")?)),
            "search" => Ok(AppCommand::Search(rest(&parts, 1))),
            "link" => {
                const U: &str = "link <review> <url|->";
                let link = word(parts.get(2), U)?;
                Ok(AppCommand::Link {
                    review: number(parts.get(1), U)?,
                    link: if link == "-" { String::new() } else { link },
                })
            }
            "status" => {
                const U: &str = "status <review> <pending|submitted|graded>";
                let status = word(parts.get(2), U)?;
                Ok(AppCommand::Status {
                    review: number(parts.get(1), U)?,
                    status: status.parse().map_err(CommandError::Status)?,
                })
            }
            "apply" => Ok(AppCommand::Apply {
                review: number(parts.get(1), "apply <review>")?,
            }),
            "project" => {
                const U: &str = "project add <name> <teams> <max>";
                if !parts.get(1).is_some_and(|s| s.eq_ignore_ascii_case("add")) || parts.len() < 5
                {
                    return Err(CommandError::Usage(U));
                }
                let n = parts.len();
                Ok(AppCommand::ProjectAdd {
                    name: parts[2..n - 2].join(" "),
                    max_teams: number(parts.get(n - 2), U)?,
                    max_students_per_team: number(parts.get(n - 1), U)?,
                })
            }
            "join" => {
                let as_rep = parts.len() > 2
                    && parts
                        .last()
                        .is_some_and(|s| s.eq_ignore_ascii_case("rep"));
                let end = if as_rep { parts.len() - 1 } else { parts.len() };
                let team = parts[1..end].join(" ");
                if team.is_empty() {
                    return Err(CommandError::Usage("join <team> [rep]"));
                }
                Ok(AppCommand::Join { team, as_rep })
            }
            "rename" => {
                const U: &str = "rename <team> <new name>";
                let name = rest(&parts, 2);
                if name.is_empty() {
                    return Err(CommandError::Usage(U));
                }
                Ok(AppCommand::Rename {
                    team: word(parts.get(1), U)?,
                    name,
                })
            }
            "lock" | "unlock" => {
                let team = rest(&parts, 1);
                if team.is_empty() {
                    return Err(CommandError::Usage("lock <team>"));
                }
                Ok(AppCommand::Lock { team })
            }
            "help" | "h" | "?" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<AppCommand, CommandError> {
        s.parse()
    }

    #[test]
    fn grade_commands() {
        assert_eq!(
            parse("grade ann@uni.edu 2 et 95"),
            Ok(AppCommand::Grade {
                student: "ann@uni.edu".into(),
                sprint: 2,
                assignment: Assignment::ET,
                score: 95
            })
        );
        assert_eq!(
            parse("teamgrade team-alpha 1 TE 4"),
            Ok(AppCommand::TeamGrade {
                team: "team-alpha".into(),
                sprint: 1,
                assignment: Assignment::ET,
                score: 4
            })
        );
        assert_eq!(
            parse("extra 12 3 -5"),
            Ok(AppCommand::Grade {
                student: "12".into(),
                sprint: 3,
                assignment: Assignment::E,
                score: -5
            })
        );
    }

    #[test]
    fn grade_errors_are_specific() {
        assert_eq!(
            parse("grade ann 2 A"),
            Err(CommandError::Usage("grade <student> <sprint> <letter> <score>"))
        );
        assert_eq!(
            parse("grade ann two A 5"),
            Err(CommandError::NotANumber("two".into()))
        );
        assert_eq!(
            parse("grade ann 2 Z 5").unwrap_err().to_string(),
            "unknown assignment letter: Z (expected A, R, I, C, ET or E)"
        );
    }

    #[test]
    fn team_filter_and_all() {
        assert_eq!(parse("team all"), Ok(AppCommand::Team { team: None }));
        assert_eq!(
            parse("team Team Alpha"),
            Ok(AppCommand::Team {
                team: Some("Team Alpha".into())
            })
        );
    }

    #[test]
    fn review_commands() {
        assert_eq!(
            parse("link 4 -"),
            Ok(AppCommand::Link {
                review: 4,
                link: String::new()
            })
        );
        assert_eq!(
            parse("status 4 Graded"),
            Ok(AppCommand::Status {
                review: 4,
                status: ReviewStatus::Graded
            })
        );
        assert_eq!(
            parse("status 4 done"),
            Err(CommandError::Status("unknown review status: done".into()))
        );
        assert_eq!(parse("apply 9"), Ok(AppCommand::Apply { review: 9 }));
    }

    #[test]
    fn formation_commands_accept_spaces() {
        assert_eq!(
            parse("project add Web Apps 5 4"),
            Ok(AppCommand::ProjectAdd {
                name: "Web Apps".into(),
                max_teams: 5,
                max_students_per_team: 4
            })
        );
        assert_eq!(
            parse("project add 5 4"),
            Err(CommandError::Usage("project add <name> <teams> <max>"))
        );
        assert_eq!(
            parse("join Team Beta rep"),
            Ok(AppCommand::Join {
                team: "Team Beta".into(),
                as_rep: true
            })
        );
        assert_eq!(
            parse("join rep"),
            Ok(AppCommand::Join {
                team: "rep".into(),
                as_rep: false
            })
        );
        assert_eq!(
            parse("rename team-beta Night Owls"),
            Ok(AppCommand::Rename {
                team: "team-beta".into(),
                name: "Night Owls".into()
            })
        );
    }

    #[test]
    fn simple_and_unknown() {
        assert_eq!(parse("SAVE"), Ok(AppCommand::Save));
        assert_eq!(parse("q"), Ok(AppCommand::Quit));
        assert_eq!(parse("reload"), Ok(AppCommand::Refresh));
        assert_eq!(
            parse("frobnicate x"),
            Err(CommandError::Unknown("frobnicate".into()))
        );
        assert!(parse("   ").is_err());
    }
}
