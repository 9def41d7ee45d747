/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! INI-style settings reader.
//!
//! Two section kinds are recognized, both case-insensitive: one optional
//! `[DEFAULT]` and any number of `[SESSION]` sections. Keys are
//! case-insensitive; `#` starts a comment line. Default keys are merged
//! under each session's own keys.

use chrono::{Datelike, Timelike, Utc};
use ironouch_core::error::SettingsError;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// One merged session section with case-insensitive key lookup.
#[derive(Debug, Clone, Default)]
pub struct Section {
    entries: HashMap<String, String>,
}

impl Section {
    /// Returns the value for a key, if present and non-empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Returns the value for a key parsed as an integer, or the default
    /// when the key is absent or unparsable.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Inserts a key/value pair (key stored lowercase).
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.to_lowercase(), value.trim().to_string());
    }
}

/// Reads settings from any buffered reader and returns one merged
/// [`Section`] per `[SESSION]`.
///
/// # Errors
/// Returns `SettingsError::Io` when the reader fails.
pub fn read_settings<R: BufRead>(reader: R) -> Result<Vec<Section>, SettingsError> {
    let mut defaults = Section::default();
    let mut sessions: Vec<Section> = Vec::new();
    enum Current {
        Nothing,
        Default,
        Session,
    }
    let mut current = Current::Nothing;

    for line in reader.lines() {
        let line = line.map_err(|e| SettingsError::Io(e.to_string()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_lowercase();
            current = match name.as_str() {
                "default" => Current::Default,
                "session" => {
                    sessions.push(Section::default());
                    Current::Session
                }
                _ => Current::Nothing,
            };
            continue;
        }
        if let Some(equals) = line.find('=') {
            let key = line[..equals].trim();
            let value = line[equals + 1..].trim();
            match current {
                Current::Default => defaults.insert(key, value),
                Current::Session => {
                    if let Some(section) = sessions.last_mut() {
                        section.insert(key, value);
                    }
                }
                Current::Nothing => {}
            }
        }
    }

    // session keys override the defaults
    for section in &mut sessions {
        for (key, value) in &defaults.entries {
            section
                .entries
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
    Ok(sessions)
}

/// Reads settings from a file.
///
/// # Errors
/// Returns `SettingsError::Io` when the file cannot be opened or read.
pub fn read_settings_file(path: impl AsRef<Path>) -> Result<Vec<Section>, SettingsError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|_| SettingsError::Io(format!("File '{}' not found", path.display())))?;
    read_settings(std::io::BufReader::new(file))
}

/// Expands the strftime-style date tokens `%Y`, `%m`, `%d`, `%H`, `%M`,
/// `%S` in a path pattern, once, against the current UTC time. When the
/// pattern contains no token, a `/%Y%m%d` date sub-directory is appended
/// so log and store files land under a dated directory.
#[must_use]
pub fn expand_path(pattern: &str) -> String {
    let expanded = expand_tokens(pattern);
    if expanded == pattern {
        expand_tokens(&format!("{pattern}/%Y%m%d"))
    } else {
        expanded
    }
}

fn expand_tokens(pattern: &str) -> String {
    let now = Utc::now();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&format!("{:04}", now.year())),
            Some('m') => out.push_str(&format!("{:02}", now.month())),
            Some('d') => out.push_str(&format!("{:02}", now.day())),
            Some('H') => out.push_str(&format!("{:02}", now.hour())),
            Some('M') => out.push_str(&format!("{:02}", now.minute())),
            Some('S') => out.push_str(&format!("{:02}", now.second())),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
[DEFAULT]
SocketConnectHost=localhost
SocketConnectPort=9123
SocketAcceptPort=9123
FileStorePath=out/test_store
FileLogPath=out/test_log
[SESSION]
Username=zhb
Password=xxx
ConnectionType=acceptor
[SESSION]
Username=zhb2
Password=xxx
ConnectionType=initiator
SocketConnectPort=9999
";

    #[test]
    fn test_sections_and_default_merge() {
        let sections = read_settings(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].get("username"), Some("zhb"));
        assert_eq!(sections[0].get("SocketConnectHost"), Some("localhost"));
        assert_eq!(sections[0].get_int("SocketConnectPort", 0), 9123);
        // session value overrides the default
        assert_eq!(sections[1].get_int("SocketConnectPort", 0), 9999);
    }

    #[test]
    fn test_case_insensitive_keys_and_sections() {
        let text = "[session]\nUSERNAME = abc\n";
        let sections = read_settings(Cursor::new(text)).unwrap();
        assert_eq!(sections[0].get("Username"), Some("abc"));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "# comment\n\n[SESSION]\n# another\nUsername=u\n";
        let sections = read_settings(Cursor::new(text)).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].get("Username"), Some("u"));
    }

    #[test]
    fn test_keys_before_any_section_ignored() {
        let text = "Username=orphan\n[SESSION]\nUsername=u\n";
        let sections = read_settings(Cursor::new(text)).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].get("Username"), Some("u"));
    }

    #[test]
    fn test_empty_value_reads_as_absent() {
        let text = "[SESSION]\nUsername=\n";
        let sections = read_settings(Cursor::new(text)).unwrap();
        assert_eq!(sections[0].get("Username"), None);
    }

    #[test]
    fn test_expand_path_with_tokens() {
        let expanded = expand_path("logs/%Y%m%d");
        assert!(expanded.starts_with("logs/2"));
        assert_eq!(expanded.len(), "logs/".len() + 8);
        assert!(!expanded.contains('%'));
    }

    #[test]
    fn test_expand_path_without_tokens_appends_date() {
        let expanded = expand_path("out/test_store");
        assert!(expanded.starts_with("out/test_store/"));
        assert_eq!(expanded.len(), "out/test_store/".len() + 8);
    }

    #[test]
    fn test_unknown_token_kept_verbatim() {
        let expanded = expand_tokens("a%Qb");
        assert_eq!(expanded, "a%Qb");
    }
}
