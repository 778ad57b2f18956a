//! Timestamped backups of a results file, taken when it is opened.
//!
//! A crash between an in-memory mutation and the following save can leave the
//! file behind the session; the backup lets an operator recover the state the
//! session started from.

use chrono::Local;
use log::info;
use quizflow_traits::DocumentError;
use std::fs;
use std::path::{Path, PathBuf};

const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copies `path` to `<dir>/<stem>_backup_<YYYYMMDD_HHMMSS>.<ext>` and returns the copy's path.
///
/// A counter is appended when a backup with the same stamp already exists.
pub fn backup_file(path: &Path) -> Result<PathBuf, DocumentError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DocumentError::NotFound(format!("{} has no file name", path.display())))?;
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("xml");
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let stamp = Local::now().format(BACKUP_STAMP_FORMAT);

    let mut target = dir.join(format!("{stem}_backup_{stamp}.{extension}"));
    let mut counter = 1;
    while target.exists() {
        target = dir.join(format!("{stem}_backup_{stamp}_{counter}.{extension}"));
        counter += 1;
    }

    fs::copy(path, &target)?;
    info!("Backed up {} to {}", path.display(), target.display());
    Ok(target)
}
