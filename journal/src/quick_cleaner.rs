//! Pre-scan removal of the derived quick-link tree.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::scan::{ScanContext, ScanListener};

/// Deletes the quick directory before any links are created.
///
/// The whole tree goes, links and nested directories included. It is
/// recreated lazily when the first link is made, so a journal without quick
/// tags ends up with no `quick/` at all.
#[derive(Debug, Default)]
pub struct StaleLinkCleaner;

impl ScanListener for StaleLinkCleaner {
    fn name(&self) -> &'static str {
        "stale-link-cleaner"
    }

    fn on_pre_scan(&mut self, ctx: &mut ScanContext<'_>) -> Result<()> {
        let quick = ctx.layout().quick();
        info!("Scanning {}", quick.display());
        ctx.report_mut().stale_removed = remove_tree(&quick)?;
        Ok(())
    }
}

/// Remove `dir` and everything under it without following symlinks.
/// Returns how many top-level children it held.
fn remove_tree(dir: &Path) -> Result<usize> {
    let metadata = match fs::symlink_metadata(dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_dir() {
        fs::remove_file(dir)?;
        debug!("Removed {}", dir.display());
        return Ok(1);
    }

    let children = fs::read_dir(dir)?.count();
    fs::remove_dir_all(dir)?;
    debug!("Removed {} ({children} children)", dir.display());
    Ok(children)
}
