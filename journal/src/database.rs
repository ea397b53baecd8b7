//! The journal database: every entry under one root directory.

use std::io;
use std::path::{self, Path};

use chrono::Local;
use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{JournalConfig, Layout};
use crate::entry::{Entry, EntryMatch};
use crate::error::{JournalError, Result};
use crate::guid::Guid;
use crate::scan::{ScanPipeline, ScanReport};
use crate::tag::{FT, PROJECT, QUICK, Tag};

/// Entries loaded from one journal root.
///
/// The entry list is read once by [`Database::open`] and then only changes
/// through [`Database::create_entry`] (which appends in place) or an
/// explicit [`Database::reload`]. Files added to the worklog directory by
/// other processes are not picked up in between.
#[derive(Debug)]
pub struct Database {
    config: JournalConfig,
    layout: Layout,
    entries: Vec<Entry>,
}

impl Database {
    /// Load every entry under `config.root`.
    ///
    /// The root is made absolute so that quick links point at absolute
    /// entry paths. The worklog directory is created if missing.
    pub fn open(config: JournalConfig) -> Result<Self> {
        let root = path::absolute(&config.root)?;
        let config = config.with_root(root);
        let layout = config.layout();
        let entries = load_entries(&layout)?;
        info!("Loaded {} entries from {}", entries.len(), layout.worklogs().display());
        Ok(Self {
            config,
            layout,
            entries,
        })
    }

    /// Re-read the worklog directory, dropping cached tags.
    pub fn reload(&mut self) -> Result<()> {
        self.entries = load_entries(&self.layout)?;
        debug!("Reloaded {} entries", self.entries.len());
        Ok(())
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Entries in filesystem enumeration order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Write a new entry seeded with `tags` and append it to the entry list.
    pub fn create_entry(&mut self, tags: &[Tag]) -> Result<&Entry> {
        let dir = self.layout.ensure_worklogs()?;
        let entry = Entry::create(dir, self.layout.extension(), tags)?;
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Entries with a tag named `name` and, when given, exactly `value`.
    pub fn entries_with_tag(&self, name: &str, value: Option<&str>) -> Result<Vec<&Entry>> {
        self.filter(|entry| entry.has_tag(name, value))
    }

    /// Entries whose `@project(...)` value starts with `prefix`.
    pub fn entries_with_project(&self, prefix: &str) -> Result<Vec<&Entry>> {
        self.filter(|entry| entry.tag_starts_with(PROJECT, prefix))
    }

    /// The first entry with this guid.
    pub fn entry_with_guid(&self, guid: &str) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.guid() == guid)
            .ok_or_else(|| JournalError::NotFound(format!("no entry with guid {guid}")))
    }

    /// Matches of `pattern` keyed by guid. Entries without a match are left
    /// out; the rest keep database order.
    pub fn entries_matching(&self, pattern: &Regex) -> Result<IndexMap<Guid, Vec<EntryMatch<'_>>>> {
        let mut out = IndexMap::new();
        for entry in &self.entries {
            let matches = entry.matches(pattern)?;
            if !matches.is_empty() {
                out.insert(entry.guid().clone(), matches);
            }
        }
        debug!("Pattern {} matched {} entries", pattern.as_str(), out.len());
        Ok(out)
    }

    /// The entry tagged `@quick(daily/<date>)`, created with that tag and
    /// `@ft` when none exists. `date` defaults to today (`YYYY-MM-DD`).
    pub fn daily_entry(&mut self, date: Option<&str>) -> Result<&Entry> {
        let date = date.map_or_else(today, str::to_string);
        let value = format!("daily/{date}");

        let mut existing = None;
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.has_tag(QUICK, Some(&value))? {
                existing = Some(index);
                break;
            }
        }
        if let Some(index) = existing {
            debug!("Reusing daily entry for {date}");
            return Ok(&self.entries[index]);
        }

        info!("Creating daily entry for {date}");
        self.create_entry(&[Tag::with_value(QUICK, value), Tag::new(FT)])
    }

    /// The second most recent daily entry.
    ///
    /// Daily entries are ordered by their date string, and the last one is
    /// assumed to be today's. Dates that don't sort lexicographically (not
    /// `YYYY-MM-DD`) give surprising results.
    pub fn yesterday_entry(&self) -> Result<&Entry> {
        let mut dailies = Vec::new();
        for entry in &self.entries {
            if let Some(date) = entry.is_a_daily_entry()? {
                dailies.push((date, entry));
            }
        }
        dailies.sort_by_key(|(date, _)| *date);

        match dailies.len().checked_sub(2) {
            Some(index) => Ok(dailies[index].1),
            None => Err(JournalError::NotFound(format!(
                "need at least two daily entries, found {}",
                dailies.len()
            ))),
        }
    }

    /// Run the standard listener pipeline over every entry.
    pub fn scan(&self) -> Result<ScanReport> {
        self.scan_with(&mut ScanPipeline::standard(&self.config))
    }

    /// Run `pipeline` over every entry.
    pub fn scan_with(&self, pipeline: &mut ScanPipeline) -> Result<ScanReport> {
        pipeline.run(&self.layout, &self.entries)
    }

    fn filter<F>(&self, mut predicate: F) -> Result<Vec<&Entry>>
    where
        F: FnMut(&Entry) -> Result<bool>,
    {
        let mut out = Vec::new();
        for entry in &self.entries {
            if predicate(entry)? {
                out.push(entry);
            }
        }
        Ok(out)
    }
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn load_entries(layout: &Layout) -> Result<Vec<Entry>> {
    let dir = layout.ensure_worklogs()?;
    let mut entries = Vec::new();

    for item in WalkDir::new(&dir).min_depth(1).max_depth(1).follow_links(true) {
        let item = match item {
            Ok(item) => item,
            Err(e) if e.io_error().is_some_and(|err| err.kind() == io::ErrorKind::NotFound) => {
                warn!("Skipping dangling link: {e}");
                continue;
            }
            Err(e) => return Err(io::Error::from(e).into()),
        };
        if !item.file_type().is_file() || !has_extension(item.path(), layout.extension()) {
            continue;
        }
        let Some(file_name) = item.file_name().to_str() else {
            warn!("Skipping non UTF-8 file name {}", item.path().display());
            continue;
        };
        entries.push(Entry::from_file(&dir, file_name)?);
    }
    Ok(entries)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}
