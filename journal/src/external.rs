//! External processes the journal hands work to: the editor and git.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::JournalConfig;
use crate::entry::Entry;
use crate::error::{JournalError, Result};

/// File in a working directory naming its default project.
pub const PROJECT_FILE: &str = ".project";

/// Opens entry files with the configured command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    command: Vec<String>,
}

impl Editor {
    /// An editor running `command` with the file path appended.
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn from_config(config: &JournalConfig) -> Self {
        Self::new(config.editor.clone())
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Run the editor on `path` and wait for it to exit.
    pub fn open(&self, path: &Path) -> Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(JournalError::Config("editor command is empty".to_string()));
        };
        let mut command = Command::new(program);
        command.args(args).arg(path);
        info!("Opening {}", path.display());
        run(command)
    }

    pub fn open_entry(&self, entry: &Entry) -> Result<()> {
        self.open(&entry.file_path())
    }
}

/// `git` subcommands run in the journal root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pull(&self) -> Result<()> {
        self.run("pull")
    }

    pub fn status(&self) -> Result<()> {
        self.run("status")
    }

    /// `git autopush`, a user-defined alias that commits and pushes.
    pub fn autopush(&self) -> Result<()> {
        self.run("autopush")
    }

    fn run(&self, subcommand: &str) -> Result<()> {
        let mut command = Command::new("git");
        command.arg(subcommand).current_dir(&self.root);
        info!("git {subcommand} in {}", self.root.display());
        run(command)
    }
}

/// Trimmed content of the `.project` file in `dir`.
pub fn project_name(dir: &Path) -> Result<String> {
    let path = dir.join(PROJECT_FILE);
    let name = fs::read_to_string(&path)?.trim().to_string();
    debug!("Project {name} from {}", path.display());
    Ok(name)
}

/// Run `command` to completion; a non-zero exit is an error.
fn run(mut command: Command) -> Result<()> {
    let status = command.status()?;
    if status.success() {
        return Ok(());
    }
    Err(JournalError::ExternalCommand {
        command: describe(&command),
        status,
    })
}

fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
