//! # Journal
//!
//! This crate manages a directory of plain-text worklog entries annotated
//! with inline `@tags`, and keeps a derived tree of symbolic links in sync
//! with those tags.
//!
//! ## Features
//!
//! - **Tags**: `@name` and `@name(value)` annotations anywhere in a line
//! - **Entries**: one file per record, identified by a 20-character guid
//! - **Daily Entries**: get-or-create the entry for a calendar date
//! - **Quick Links**: `@quick(a/b)` becomes `quick/a/b.txt` pointing at the entry
//! - **Search**: ranked pattern search for interactive selection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Journal                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  JournalConfig ──► Database ──► Entry ──► Tag                   │
//! │                       │                                         │
//! │                       ▼                                         │
//! │                  ScanPipeline                                   │
//! │       ┌───────────────┼───────────────┐                         │
//! │       ▼               ▼               ▼                         │
//! │  StaleLink       Symlink          OpenWith                      │
//! │  Cleaner         Reconciler       Setter                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jnl_journal::{Database, JournalConfig};
//!
//! // Rooted at `<home>/jnl`; use `JournalConfig::new` for another directory.
//! let mut db = Database::open(JournalConfig::default())?;
//! let today = db.daily_entry(None)?.guid().clone();
//! let report = db.scan()?;
//! ```

pub mod config;
pub mod database;
pub mod entry;
pub mod error;
pub mod external;
pub mod guid;
pub mod open_with;
pub mod quick_cleaner;
pub mod scan;
pub mod search;
pub mod symlinker;
pub mod tag;

pub use config::{JournalConfig, Layout};
pub use database::{Database, today};
pub use entry::{Entry, EntryLine, EntryMatch, Lines};
pub use error::{JournalError, Result};
pub use external::{Editor, Git, PROJECT_FILE, project_name};
pub use guid::Guid;
pub use open_with::{OPEN_WITH_ATTR, OPEN_WITH_ATTR_NAME, OpenWithSetter};
pub use quick_cleaner::StaleLinkCleaner;
pub use scan::{ScanContext, ScanListener, ScanPhase, ScanPipeline, ScanReport};
pub use search::{SearchHit, SearchOptions, SearchResults, compile_pattern, search};
pub use symlinker::SymlinkReconciler;
pub use tag::Tag;
