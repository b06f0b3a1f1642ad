//! Notes workspace settings
//!
//!     A small persistent key/value store kept in a plain text file, one `key = value` pair per
//!     line. Blank lines and lines starting with `#` are ignored. Keys may contain spaces and
//!     non-ASCII text; a value may contain `=` (only the first one separates key and value).
//!
//!     The store is an ordinary object: open it once and pass it to whoever needs it. Every
//!     mutation is written back to disk before it returns, and a missing file is created from
//!     [DEFAULT_SETTINGS].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key holding the notes working directory
pub const WORKING_DIRECTORY: &str = "工作目录";

/// Keys every settings file ends up with, in file order.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("GPT Proxy", ""),
    ("ChatGPT Key", ""),
    ("JUMP URL", ""),
    (WORKING_DIRECTORY, ""),
    ("SD URL", "http://localhost:8082"),
    ("VITS URL", "http://localhost:8083"),
    ("QianFan API Key", ""),
    ("QianFan Secret Key", ""),
];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: expected `key = value`, found {content:?}")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("no setting named {0:?}")]
    UnknownKey(String),
}

/// Settings backed by a `key = value` file.
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl Settings {
    /// Load the settings file, creating it with the defaults if it does not exist.
    ///
    /// Default keys missing from an existing file are filled in (in memory only, until the
    /// next write).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "creating settings file with defaults");
                let settings = Self::with_defaults(path);
                settings.save()?;
                return Ok(settings);
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        let mut entries = parse_entries(&path, &content)?;
        for (key, value) in DEFAULT_SETTINGS {
            if !entries.iter().any(|(existing, _)| existing == key) {
                entries.push((key.to_string(), value.to_string()));
            }
        }
        Ok(Self { path, entries })
    }

    fn with_defaults(path: PathBuf) -> Self {
        let entries = DEFAULT_SETTINGS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// All settings in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The notes working directory, when one is configured.
    pub fn working_directory(&self) -> Option<&str> {
        self.get(WORKING_DIRECTORY).filter(|dir| !dir.is_empty())
    }

    /// Set a value and persist the file.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let key = key.trim();
        let value = value.trim();
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
        self.save()
    }

    /// Remove a key and persist the file. Returns the removed value.
    pub fn remove(&mut self, key: &str) -> Result<String, SettingsError> {
        let index = self
            .entries
            .iter()
            .position(|(existing, _)| existing == key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        let (_, value) = self.entries.remove(index);
        self.save()?;
        Ok(value)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let out: String = self
            .entries
            .iter()
            .map(|(key, value)| format!("{} = {}\n", key, value))
            .collect();
        fs::write(&self.path, out).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "settings saved");
        Ok(())
    }
}

fn parse_entries(path: &Path, content: &str) -> Result<Vec<(String, String)>, SettingsError> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| SettingsError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
            content: line.to_string(),
        })?;
        let (key, value) = (key.trim().to_string(), value.trim().to_string());
        // Later lines win, keeping the first position
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = value,
            None => entries.push((key, value)),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_path(dir: &TempDir) -> PathBuf {
        dir.path().join("config.cfg")
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);
        let settings = Settings::open(&path).unwrap();

        assert_eq!(settings.get("SD URL"), Some("http://localhost:8082"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("GPT Proxy = \n"));
        assert!(written.contains("VITS URL = http://localhost:8083\n"));
    }

    #[test]
    fn test_existing_file_gets_missing_defaults() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);
        fs::write(&path, "# comment\n\nSD URL = http://gpu:7860\nCustom = yes\n").unwrap();

        let settings = Settings::open(&path).unwrap();
        assert_eq!(settings.get("SD URL"), Some("http://gpu:7860"));
        assert_eq!(settings.get("Custom"), Some("yes"));
        assert_eq!(settings.get("VITS URL"), Some("http://localhost:8083"));
        let keys: Vec<&str> = settings.entries().map(|(key, _)| key).collect();
        assert_eq!(&keys[..2], &["SD URL", "Custom"]);
    }

    #[test]
    fn test_values_may_contain_equals() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);
        fs::write(&path, "JUMP URL = http://x/?a=b\n").unwrap();
        let settings = Settings::open(&path).unwrap();
        assert_eq!(settings.get("JUMP URL"), Some("http://x/?a=b"));
    }

    #[test]
    fn test_malformed_line() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);
        fs::write(&path, "GPT Proxy = \nnot a pair\n").unwrap();
        let err = Settings::open(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_set_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);
        let mut settings = Settings::open(&path).unwrap();
        settings.set(WORKING_DIRECTORY, "/home/me/notes").unwrap();

        let reopened = Settings::open(&path).unwrap();
        assert_eq!(reopened.working_directory(), Some("/home/me/notes"));
    }

    #[test]
    fn test_remove_persists_and_reports_unknown() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);
        let mut settings = Settings::open(&path).unwrap();
        settings.set("Extra", "1").unwrap();

        assert_eq!(settings.remove("Extra").unwrap(), "1");
        assert!(!fs::read_to_string(&path).unwrap().contains("Extra"));
        assert!(matches!(
            settings.remove("Extra"),
            Err(SettingsError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_save_writes_one_line_per_entry() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);
        fs::write(&path, "JUMP URL = http://x/?a=b\n").unwrap();
        let mut settings = Settings::open(&path).unwrap();
        settings.set("工作目录", "/笔记").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), DEFAULT_SETTINGS.len());
        assert_eq!(lines[0], "JUMP URL = http://x/?a=b");
        assert!(lines.contains(&"工作目录 = /笔记"));
        assert!(written.ends_with('\n'));
    }

    #[test]
    fn test_empty_working_directory_is_none() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::open(settings_path(&dir)).unwrap();
        assert_eq!(settings.working_directory(), None);
    }
}
