//! "Open With" extended attribute for `@ft` entries.
//!
//! On macOS, Launch Services keeps the per-file application override in a
//! binary plist stored under [`OPEN_WITH_ATTR_NAME`]. Entries tagged `@ft` get
//! the attribute pointing at FoldingText. Elsewhere the listener does nothing.

use std::path::Path;

use tracing::debug;

use crate::entry::Entry;
use crate::error::Result;
use crate::scan::{ScanContext, ScanListener};
use crate::tag::FT;

/// Extended attribute read by Launch Services.
pub const OPEN_WITH_ATTR_NAME: &str = "com.apple.LaunchServices.OpenWith";

/// Binary plist selecting `/Applications/FoldingText.app`
/// (`com.foldingtext.FoldingText`). Dump another file's value with
/// `xattr -px com.apple.LaunchServices.OpenWith FILE` to target a different
/// application.
pub const OPEN_WITH_ATTR: [u8; 150] = [
    0x62, 0x70, 0x6c, 0x69, 0x73, 0x74, 0x30, 0x30, 0xd3, 0x01, 0x02, 0x03,
    0x04, 0x05, 0x06, 0x57, 0x76, 0x65, 0x72, 0x73, 0x69, 0x6f, 0x6e, 0x54,
    0x70, 0x61, 0x74, 0x68, 0x5f, 0x10, 0x10, 0x62, 0x75, 0x6e, 0x64, 0x6c,
    0x65, 0x69, 0x64, 0x65, 0x6e, 0x74, 0x69, 0x66, 0x69, 0x65, 0x72, 0x10,
    0x00, 0x5f, 0x10, 0x1d, 0x2f, 0x41, 0x70, 0x70, 0x6c, 0x69, 0x63, 0x61,
    0x74, 0x69, 0x6f, 0x6e, 0x73, 0x2f, 0x46, 0x6f, 0x6c, 0x64, 0x69, 0x6e,
    0x67, 0x54, 0x65, 0x78, 0x74, 0x2e, 0x61, 0x70, 0x70, 0x5f, 0x10, 0x1b,
    0x63, 0x6f, 0x6d, 0x2e, 0x66, 0x6f, 0x6c, 0x64, 0x69, 0x6e, 0x67, 0x74,
    0x65, 0x78, 0x74, 0x2e, 0x46, 0x6f, 0x6c, 0x64, 0x69, 0x6e, 0x67, 0x54,
    0x65, 0x78, 0x74, 0x08, 0x0f, 0x17, 0x1c, 0x2f, 0x31, 0x51, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x6f,
];

/// Writes [`OPEN_WITH_ATTR`] on every entry tagged `@ft`.
#[derive(Debug, Default)]
pub struct OpenWithSetter;

impl ScanListener for OpenWithSetter {
    fn name(&self) -> &'static str {
        "open-with-setter"
    }

    fn on_entry(&mut self, ctx: &mut ScanContext<'_>, entry: &Entry) -> Result<()> {
        if !entry.has_tag(FT, None)? {
            return Ok(());
        }
        if set_open_with(&entry.file_path())? {
            ctx.report_mut().attributes_set += 1;
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn set_open_with(path: &Path) -> std::io::Result<bool> {
    xattr::set(path, OPEN_WITH_ATTR_NAME, &OPEN_WITH_ATTR)?;
    debug!("Set {OPEN_WITH_ATTR_NAME} on {}", path.display());
    Ok(true)
}

#[cfg(not(target_os = "macos"))]
fn set_open_with(path: &Path) -> std::io::Result<bool> {
    debug!("Skipping {OPEN_WITH_ATTR_NAME} on {}: unsupported platform", path.display());
    Ok(false)
}
