//! PNG output.
//!
//! Bytes are written to `<dest>.part` and renamed into place, so a failed
//! write never leaves a truncated PNG at the destination. An existing file at
//! the destination is replaced.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("cannot write {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Write `png` to `dest`, creating parent directories as needed.
pub fn write_png(dest: &Path, png: &[u8]) -> Result<(), WriteError> {
    let fail = |source: std::io::Error| WriteError {
        path: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(fail)?;
    }

    let part = part_path(dest);
    if let Err(e) = fs::write(&part, png).and_then(|()| fs::rename(&part, dest)) {
        let _ = fs::remove_file(&part);
        return Err(fail(e));
    }
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
