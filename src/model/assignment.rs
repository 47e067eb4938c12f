use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Graded component of a sprint.
///
/// `E` is the only individual component; every other letter is graded per
/// team and copied to each member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Assignment {
    A,
    R,
    I,
    C,
    #[serde(rename = "ET", alias = "TE")]
    ET,
    E,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown assignment letter: {0} (expected A, R, I, C, ET or E)")]
pub struct UnknownAssignment(pub String);

impl Assignment {
    /// Column order used by every grading table.
    pub const ALL: [Assignment; 6] = [
        Assignment::A,
        Assignment::R,
        Assignment::I,
        Assignment::C,
        Assignment::ET,
        Assignment::E,
    ];

    /// Components that make up the team total.
    pub const TEAM: [Assignment; 5] = [
        Assignment::A,
        Assignment::R,
        Assignment::I,
        Assignment::C,
        Assignment::ET,
    ];

    /// Components shown on the student "My Grades" card.
    pub const CORE: [Assignment; 4] = [Assignment::A, Assignment::R, Assignment::I, Assignment::C];

    pub fn code(self) -> &'static str {
        match self {
            Assignment::A => "A",
            Assignment::R => "R",
            Assignment::I => "I",
            Assignment::C => "C",
            Assignment::ET => "ET",
            Assignment::E => "E",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Assignment::A => "Assignment",
            Assignment::R => "Peer review",
            Assignment::I => "Implementation",
            Assignment::C => "Communication",
            Assignment::ET => "Team extra",
            Assignment::E => "Extra",
        }
    }

    pub fn is_individual(self) -> bool {
        self == Assignment::E
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Assignment {
    type Err = UnknownAssignment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Assignment::A),
            "R" => Ok(Assignment::R),
            "I" => Ok(Assignment::I),
            "C" => Ok(Assignment::C),
            "ET" | "TE" => Ok(Assignment::ET),
            "E" => Ok(Assignment::E),
            _ => Err(UnknownAssignment(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_case_insensitively() {
        assert_eq!("a".parse::<Assignment>(), Ok(Assignment::A));
        assert_eq!(" et ".parse::<Assignment>(), Ok(Assignment::ET));
        assert_eq!("E".parse::<Assignment>(), Ok(Assignment::E));
        assert!("X".parse::<Assignment>().is_err());
    }

    #[test]
    fn legacy_te_code_maps_to_team_extra() {
        assert_eq!("TE".parse::<Assignment>(), Ok(Assignment::ET));
        let parsed: Assignment = serde_json::from_str("\"TE\"").unwrap();
        assert_eq!(parsed, Assignment::ET);
        assert_eq!(serde_json::to_string(&Assignment::ET).unwrap(), "\"ET\"");
    }

    #[test]
    fn only_extra_is_individual() {
        let individual: Vec<_> = Assignment::ALL
            .iter()
            .filter(|a| a.is_individual())
            .collect();
        assert_eq!(individual, vec![&Assignment::E]);
        assert!(!Assignment::TEAM.contains(&Assignment::E));
    }
}
