use std::env;
use std::fs;

use colored::Colorize;

const HOSTNAME_FILE: &str = "/etc/hostname";
const FALLBACK_USER: &str = "user";
const FALLBACK_HOST: &str = "localhost";

/// `user@host:cwd$ ` prompt shown before every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    user: String,
    host: String,
}

impl Prompt {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }

    /// Best effort; unknown values fall back to fixed placeholders.
    pub fn from_env() -> Self {
        let user = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| FALLBACK_USER.to_string());
        let host = env::var("HOSTNAME")
            .ok()
            .or_else(|| fs::read_to_string(HOSTNAME_FILE).ok())
            .map(|host| host.trim().trim_end_matches(".local").to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| FALLBACK_HOST.to_string());
        Self::new(user, host)
    }

    /// Renders the prompt for `cwd`, or `~` when no filesystem is loaded.
    pub fn render(&self, cwd: Option<&str>) -> String {
        format!(
            "{}:{}$ ",
            format!("{}@{}", self.user, self.host).green().bold(),
            cwd.unwrap_or("~").blue().bold()
        )
    }
}
