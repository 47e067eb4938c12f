use log::warn;
use std::str::FromStr;

use crate::session::DEFAULT_API_URL;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://peer_pilot.db?mode=rwc";
pub const DEFAULT_SPRINTS: u32 = 4;
pub const DEFAULT_MAX_TRIES: usize = 3;
pub const DEFAULT_RETRY_DELAY: f64 = 2.0;

/// Runtime settings read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub database_url: String,
    pub sprints: u32,
    pub max_tries: usize,
    pub retry_delay: f64,
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    /// Returns the settings plus startup notes for the log panel.
    pub fn from_env() -> (Self, Vec<String>) {
        let mut notes = Vec::new();
        match dotenv::dotenv() {
            Ok(path) => notes.push(format!("Loaded {}", path.display())),
            Err(_) => notes.push("No .env file found, using process environment".to_string()),
        }
        let settings = Self::from_lookup(|key| std::env::var(key).ok(), &mut notes);
        (settings, notes)
    }

    pub fn from_lookup<F>(lookup: F, notes: &mut Vec<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let email = non_empty("PEER_PILOT_EMAIL");
        let password = non_empty("PEER_PILOT_PASSWORD");
        match (&email, &password) {
            (Some(e), Some(_)) => notes.push(format!("Account: {}", e)),
            (None, _) => notes.push("PEER_PILOT_EMAIL is not set".to_string()),
            (Some(_), None) => notes.push("PEER_PILOT_PASSWORD is not set".to_string()),
        }

        Self {
            api_url: non_empty("PEER_PILOT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            email,
            password,
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            sprints: parse_or(&non_empty, "PEER_PILOT_SPRINTS", DEFAULT_SPRINTS, notes).max(1),
            max_tries: parse_or(&non_empty, "PEER_PILOT_MAX_TRIES", DEFAULT_MAX_TRIES, notes).max(1),
            retry_delay: parse_or(&non_empty, "PEER_PILOT_RETRY_DELAY", DEFAULT_RETRY_DELAY, notes)
                .max(0.0),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            email: None,
            password: None,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            sprints: DEFAULT_SPRINTS,
            max_tries: DEFAULT_MAX_TRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T, notes: &mut Vec<String>) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}={:?}, using {}", key, raw, default);
            notes.push(format!("Invalid {}, using {}", key, default));
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> (Settings, Vec<String>) {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut notes = Vec::new();
        let s = Settings::from_lookup(|k| env.get(k).cloned(), &mut notes);
        (s, notes)
    }

    #[test]
    fn defaults_when_unset() {
        let (s, notes) = load(&[]);
        assert_eq!(
            s,
            Settings::default()
        );
        assert!(!s.has_credentials());
        assert!(notes.iter().any(|n| n.contains("PEER_PILOT_EMAIL")));
    }

    #[test]
    fn reads_every_variable() {
        let (s, _) = load(&[
            ("PEER_PILOT_API_URL", "http://api.test"),
            ("PEER_PILOT_EMAIL", "prof@uni.edu"),
            ("PEER_PILOT_PASSWORD", "pw"),
            ("DATABASE_URL", "sqlite://x.db"),
            ("PEER_PILOT_SPRINTS", "6"),
            ("PEER_PILOT_MAX_TRIES", "5"),
            ("PEER_PILOT_RETRY_DELAY", "0.5"),
        ]);
        assert_eq!(s.api_url, "http://api.test");
        assert!(s.has_credentials());
        assert_eq!(s.database_url, "sqlite://x.db");
        assert_eq!((s.sprints, s.max_tries, s.retry_delay), (6, 5, 0.5));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let (s, notes) = load(&[("PEER_PILOT_SPRINTS", "four"), ("PEER_PILOT_MAX_TRIES", "0")]);
        assert_eq!(s.sprints, DEFAULT_SPRINTS);
        assert_eq!(s.max_tries, 1);
        assert!(notes.iter().any(|n| n == "Invalid PEER_PILOT_SPRINTS, using 4"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let (s, _) = load(&[("PEER_PILOT_EMAIL", "  "), ("PEER_PILOT_API_URL", "")]);
        assert_eq!(s.email, None);
        assert_eq!(s.api_url, DEFAULT_API_URL);
    }
}
