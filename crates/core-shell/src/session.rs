//! Per-session state: current directory, variables, language mode.
//!
//! The session directory is the shell's own notion of "here"; the host
//! process working directory is never touched, so nested tools and the
//! parent process keep their own view. Variables are case-insensitive by
//! folded key; the original spelling is kept for listings.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::ShellError;

/// Diagnostic and help language for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    English,
    #[default]
    Arabic,
}

#[derive(Debug)]
pub struct SessionState {
    current_dir: PathBuf,
    vars: HashMap<String, (String, String)>,
    pub language: Language,
}

impl SessionState {
    /// New session rooted at the process working directory (the last time
    /// the shell consults it).
    pub fn new() -> std::io::Result<Self> {
        Ok(SessionState::rooted_at(std::env::current_dir()?))
    }

    pub fn rooted_at(dir: PathBuf) -> Self {
        SessionState {
            current_dir: dir,
            vars: HashMap::new(),
            language: Language::default(),
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Resolve `target` against the session directory and make it current.
    /// Fails when the result is not an existing directory. The process
    /// working directory is left alone.
    pub fn set_current_dir(&mut self, target: &str) -> Result<&Path, ShellError> {
        let resolved = normalize_path(&self.current_dir, Path::new(target));
        let metadata = std::fs::metadata(&resolved).map_err(|source| ShellError::Handler {
            command: "انتقل".into(),
            message: format!("{}: {source}", resolved.display()),
        })?;
        if !metadata.is_dir() {
            return Err(ShellError::handler(
                "انتقل",
                format!("{}: ليس مجلدا (not a directory)", resolved.display()),
            ));
        }
        self.current_dir = resolved;
        Ok(&self.current_dir)
    }

    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(&fold_key(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_var(&mut self, name: &str, value: impl Into<String>) {
        self.vars
            .insert(fold_key(name), (name.to_string(), value.into()));
    }

    /// Variables as `(original name, value)`, sorted by name for stable
    /// listings.
    pub fn vars(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .vars
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

fn fold_key(name: &str) -> String {
    name.to_lowercase()
}

/// Lexically resolve `target` against `base`: `.` drops, `..` pops, no
/// filesystem access and no symlink resolution, so `/tmp` stays `/tmp`.
pub fn normalize_path(base: &Path, target: &Path) -> PathBuf {
    let mut result = if target.is_absolute() {
        PathBuf::new()
    } else {
        base.to_path_buf()
    };
    for component in target.components() {
        match component {
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::RootDir => result.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_case_insensitive() {
        let mut session = SessionState::rooted_at(PathBuf::from("/"));
        session.set_var("Name", "value");
        assert_eq!(session.get_var("name"), Some("value"));
        assert_eq!(session.get_var("NAME"), Some("value"));
        assert_eq!(session.get_var("other"), None);
        session.set_var("name", "updated");
        assert_eq!(session.get_var("Name"), Some("updated"));
        assert_eq!(session.vars().len(), 1);
    }

    #[test]
    fn arabic_variable_names_round_trip() {
        let mut session = SessionState::rooted_at(PathBuf::from("/"));
        session.set_var("اسم", "سمير");
        assert_eq!(session.get_var("اسم"), Some("سمير"));
    }

    #[test]
    fn normalize_handles_relative_segments() {
        let base = Path::new("/home/user");
        assert_eq!(normalize_path(base, Path::new("sub")), PathBuf::from("/home/user/sub"));
        assert_eq!(normalize_path(base, Path::new("../other")), PathBuf::from("/home/other"));
        assert_eq!(normalize_path(base, Path::new("./x/../y")), PathBuf::from("/home/user/y"));
        assert_eq!(normalize_path(base, Path::new("/tmp")), PathBuf::from("/tmp"));
    }

    #[test]
    fn set_current_dir_requires_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = SessionState::rooted_at(tmp.path().to_path_buf());
        assert!(session.set_current_dir("missing-subdir").is_err());

        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        session.set_current_dir("sub").unwrap();
        assert_eq!(session.current_dir(), tmp.path().join("sub"));
    }

    #[test]
    fn set_current_dir_never_touches_process_cwd() {
        let before = std::env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let mut session = SessionState::rooted_at(before.clone());
        session
            .set_current_dir(tmp.path().to_str().unwrap())
            .unwrap();
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
