//! Scan pipeline.
//!
//! A scan drives a list of listeners over every entry in three strictly
//! sequential phases:
//!
//! ```text
//! PreScan ──► PerEntry (× entries, × listeners) ──► PostScan
//! ```
//!
//! Every listener's pre-scan hook finishes before any listener sees its first
//! entry, so cleanup work done in `on_pre_scan` (see
//! [`StaleLinkCleaner`](crate::StaleLinkCleaner)) always precedes link
//! creation in `on_entry`, whatever the order of the listener list.
//!
//! The first error from any hook aborts the scan. It is logged with the
//! listener and entry that raised it and returned unchanged; remaining
//! entries and the post-scan phase are skipped.

use std::fmt;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::{JournalConfig, Layout};
use crate::entry::Entry;
use crate::error::Result;
use crate::open_with::OpenWithSetter;
use crate::quick_cleaner::StaleLinkCleaner;
use crate::symlinker::SymlinkReconciler;

/// Hooks called by [`ScanPipeline`]. All hooks default to no-ops.
///
/// A listener keeps whatever state it needs in its own fields; the pipeline
/// hands every hook the shared [`ScanContext`].
pub trait ScanListener {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn on_pre_scan(&mut self, _ctx: &mut ScanContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_entry(&mut self, _ctx: &mut ScanContext<'_>, _entry: &Entry) -> Result<()> {
        Ok(())
    }

    fn on_post_scan(&mut self, _ctx: &mut ScanContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Phase of a scan, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    PreScan,
    PerEntry,
    PostScan,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PreScan => "pre-scan",
            Self::PerEntry => "per-entry",
            Self::PostScan => "post-scan",
        };
        f.write_str(name)
    }
}

/// State shared by all listeners during one scan.
pub struct ScanContext<'a> {
    layout: &'a Layout,
    report: ScanReport,
}

impl<'a> ScanContext<'a> {
    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    pub fn report(&self) -> &ScanReport {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut ScanReport {
        &mut self.report
    }
}

/// Summary of a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of entries visited.
    pub entries_scanned: usize,

    /// Directory entries removed from the quick tree before relinking.
    pub stale_removed: usize,

    /// Quick links created.
    pub links_created: usize,

    /// Quick links that already pointed at their entry.
    pub links_existing: usize,

    /// "Open With" attributes written.
    pub attributes_set: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Ordered list of listeners run over all entries.
#[derive(Default)]
pub struct ScanPipeline {
    listeners: Vec<Box<dyn ScanListener>>,
}

impl ScanPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cleaner, the symlink reconciler and, unless disabled in `config`,
    /// the "Open With" attribute setter.
    pub fn standard(config: &JournalConfig) -> Self {
        let pipeline = Self::new()
            .with_listener(StaleLinkCleaner)
            .with_listener(SymlinkReconciler);
        if config.set_open_with {
            pipeline.with_listener(OpenWithSetter)
        } else {
            pipeline
        }
    }

    /// Append a listener.
    pub fn with_listener(mut self, listener: impl ScanListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Names of the listeners, in run order.
    pub fn listener_names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    /// Run every listener over `entries`.
    pub fn run(&mut self, layout: &Layout, entries: &[Entry]) -> Result<ScanReport> {
        let start = Instant::now();
        let mut ctx = ScanContext {
            layout,
            report: ScanReport::default(),
        };
        info!("Scanning {} entries under {}", entries.len(), layout.root().display());

        for listener in &mut self.listeners {
            listener.on_pre_scan(&mut ctx).inspect_err(|e| {
                error!("Listener {} failed during {}: {e}", listener.name(), ScanPhase::PreScan);
            })?;
        }

        for entry in entries {
            debug!("Visiting entry {}", entry.guid());
            for listener in &mut self.listeners {
                listener.on_entry(&mut ctx, entry).inspect_err(|e| {
                    error!(
                        "Listener {} failed during {} on entry {} ({}): {e}",
                        listener.name(),
                        ScanPhase::PerEntry,
                        entry.guid(),
                        entry.file_path().display()
                    );
                })?;
            }
            ctx.report.entries_scanned += 1;
        }

        for listener in &mut self.listeners {
            listener.on_post_scan(&mut ctx).inspect_err(|e| {
                error!("Listener {} failed during {}: {e}", listener.name(), ScanPhase::PostScan);
            })?;
        }

        let mut report = ctx.report;
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Scanned {} entries in {}ms (links created: {}, unchanged: {}, attributes set: {})",
            report.entries_scanned,
            report.duration_ms,
            report.links_created,
            report.links_existing,
            report.attributes_set
        );
        Ok(report)
    }
}
