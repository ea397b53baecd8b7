//! Configuration for a journal root directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Configuration for one journal.
///
/// Passed explicitly into [`Database::open`](crate::Database::open); nothing in
/// the library reads the process environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Root directory holding `worklogs/` and `quick/`.
    pub root: PathBuf,

    /// Name of the directory (under `root`) holding entry files.
    pub worklog_dir: String,

    /// Name of the directory (under `root`) holding the derived link tree.
    pub quick_dir: String,

    /// Extension of entry files, without the leading dot.
    pub extension: String,

    /// Command prefix used to open an entry; the file path is appended.
    pub editor: Vec<String>,

    /// Whether scans write the "Open With" attribute for `@ft` entries.
    pub set_open_with: bool,
}

impl JournalConfig {
    /// Create a config rooted at `root` with default values.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worklog_dir: "worklogs".to_string(),
            quick_dir: "quick".to_string(),
            extension: "txt".to_string(),
            editor: default_editor(),
            set_open_with: true,
        }
    }

    /// Read a TOML config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Location of the per-user config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jnl").join("config.toml"))
    }

    /// Set the root directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the entry file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the editor command.
    pub fn with_editor<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.editor = command.into_iter().map(Into::into).collect();
        self
    }

    /// Disable writing the "Open With" attribute during scans.
    pub fn without_open_with(mut self) -> Self {
        self.set_open_with = false;
        self
    }

    /// Directory layout derived from this config.
    pub fn layout(&self) -> Layout {
        Layout {
            root: self.root.clone(),
            worklog_dir: self.worklog_dir.clone(),
            quick_dir: self.quick_dir.clone(),
            extension: self.extension.clone(),
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self::new(dirs::home_dir().unwrap_or_default().join("jnl"))
    }
}

fn default_editor() -> Vec<String> {
    if cfg!(target_os = "macos") {
        return vec!["open".to_string(), "-a".to_string(), "FoldingText".to_string()];
    }
    vec![std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string())]
}

/// Paths inside a journal root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    worklog_dir: String,
    quick_dir: String,
    extension: String,
}

impl Layout {
    /// The journal root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding entry files (not created).
    pub fn worklogs(&self) -> PathBuf {
        self.root.join(&self.worklog_dir)
    }

    /// Directory holding the derived link tree (not created).
    pub fn quick(&self) -> PathBuf {
        self.root.join(&self.quick_dir)
    }

    /// Entry file extension, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directory of entry files, created on first access.
    pub fn ensure_worklogs(&self) -> Result<PathBuf> {
        self.ensure_dir(&[self.worklog_dir.as_str()])
    }

    /// `quick/<segments...>`, created on first access.
    pub fn ensure_quick(&self, segments: &[&str]) -> Result<PathBuf> {
        let mut all = Vec::with_capacity(segments.len() + 1);
        all.push(self.quick_dir.as_str());
        all.extend_from_slice(segments);
        self.ensure_dir(&all)
    }

    /// `root/<segments...>`, creating any missing directories.
    pub fn ensure_dir(&self, segments: &[&str]) -> Result<PathBuf> {
        let path = segments
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment));
        if !path.is_dir() {
            fs::create_dir_all(&path)?;
            debug!("Created directory {}", path.display());
        }
        Ok(path)
    }
}
