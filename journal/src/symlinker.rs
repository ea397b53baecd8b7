//! Quick-link reconciliation.
//!
//! Every `@quick(a/b/c)` tag maps to the link `quick/a/b/c.<ext>` pointing
//! at the tagging entry's file. A link that already points at the same file
//! is left alone; one that points elsewhere is a conflict.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::entry::Entry;
use crate::error::{JournalError, Result};
use crate::scan::{ScanContext, ScanListener};
use crate::tag::QUICK;

/// Creates one symlink per quick tag value.
#[derive(Debug, Default)]
pub struct SymlinkReconciler;

impl SymlinkReconciler {
    fn link(&self, ctx: &mut ScanContext<'_>, entry: &Entry, value: &str) -> Result<()> {
        let segments: Vec<&str> = value.split('/').collect();
        if segments.contains(&"..") {
            return Err(JournalError::InvalidQuickPath(value.to_string()));
        }
        let Some((last, dirs)) = segments.split_last() else {
            return Ok(());
        };

        let into_dir = ctx.layout().ensure_quick(dirs)?;
        let link = into_dir.join(format!("{last}.{}", entry.file_extension()));
        let target = entry.file_path();

        match fs::symlink_metadata(&link) {
            Ok(_) => {
                let owner = fs::read_link(&link)?;
                if owner == target {
                    debug!("Link {} already in place", link.display());
                    ctx.report_mut().links_existing += 1;
                    return Ok(());
                }
                return Err(JournalError::Conflict {
                    value: value.to_string(),
                    owner,
                    claimant: target,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        create_symlink(&target, &link)?;
        debug!("Linked {} -> {}", link.display(), target.display());
        ctx.report_mut().links_created += 1;
        Ok(())
    }
}

impl ScanListener for SymlinkReconciler {
    fn name(&self) -> &'static str {
        "symlink-reconciler"
    }

    fn on_entry(&mut self, ctx: &mut ScanContext<'_>, entry: &Entry) -> Result<()> {
        for tag in entry.tags()? {
            if tag.name() != QUICK {
                continue;
            }
            if let Some(value) = tag.value() {
                self.link(ctx, entry, value)?;
            }
        }
        Ok(())
    }

    fn on_post_scan(&mut self, ctx: &mut ScanContext<'_>) -> Result<()> {
        let report = ctx.report();
        debug!(
            "Quick links: {} created, {} unchanged",
            report.links_created, report.links_existing
        );
        Ok(())
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{JournalConfig, Layout};
    use crate::scan::{ScanPipeline, ScanReport};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn entry(layout: &Layout, file_name: &str, content: &str) -> Entry {
        let dir = layout.ensure_worklogs().unwrap();
        fs::write(dir.join(file_name), content).unwrap();
        Entry::from_file(dir, file_name).unwrap()
    }

    fn reconcile(layout: &Layout, entries: &[Entry]) -> Result<ScanReport> {
        ScanPipeline::new()
            .with_listener(SymlinkReconciler)
            .run(layout, entries)
    }

    #[test]
    fn test_links_nested_values() {
        let temp_dir = TempDir::new().unwrap();
        let layout = JournalConfig::new(temp_dir.path()).layout();
        let one = entry(&layout, "AAA.txt", "@quick(tickets/PERF-1188) @quick(solo) @ft\n");

        let report = reconcile(&layout, std::slice::from_ref(&one)).unwrap();

        assert_eq!(report.links_created, 2);
        assert_eq!(
            fs::read_link(layout.quick().join("tickets/PERF-1188.txt")).unwrap(),
            one.file_path()
        );
        assert_eq!(fs::read_link(layout.quick().join("solo.txt")).unwrap(), one.file_path());
    }

    #[test]
    fn test_existing_link_to_same_entry_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let layout = JournalConfig::new(temp_dir.path()).layout();
        let one = entry(&layout, "AAA.txt", "@quick(solo) @quick(solo)\n");

        let report = reconcile(&layout, std::slice::from_ref(&one)).unwrap();
        assert_eq!(report.links_created, 1);
        assert_eq!(report.links_existing, 1);

        let again = reconcile(&layout, std::slice::from_ref(&one)).unwrap();
        assert_eq!(again.links_created, 0);
        assert_eq!(again.links_existing, 2);
    }

    #[test]
    fn test_conflicting_owners() {
        let temp_dir = TempDir::new().unwrap();
        let layout = JournalConfig::new(temp_dir.path()).layout();
        let one = entry(&layout, "AAA.txt", "@quick(foo)\n");
        let two = entry(&layout, "BBB.txt", "@quick(foo)\n");

        let result = reconcile(&layout, &[one.clone(), two.clone()]);

        match result {
            Err(JournalError::Conflict {
                value,
                owner,
                claimant,
            }) => {
                assert_eq!(value, "foo");
                assert_eq!(owner, one.file_path());
                assert_eq!(claimant, two.file_path());
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_parent_segments() {
        let temp_dir = TempDir::new().unwrap();
        let layout = JournalConfig::new(temp_dir.path()).layout();
        let one = entry(&layout, "AAA.txt", "@quick(../escape)\n");

        let result = reconcile(&layout, &[one]);
        assert!(matches!(result, Err(JournalError::InvalidQuickPath(v)) if v == "../escape"));
    }

    #[test]
    fn test_valueless_quick_tags_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let layout = JournalConfig::new(temp_dir.path()).layout();
        let one = entry(&layout, "AAA.txt", "@quick @ft\n");

        let report = reconcile(&layout, &[one]).unwrap();
        assert_eq!(report.links_created, 0);
        assert!(!layout.quick().exists());
    }
}
