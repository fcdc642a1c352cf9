//! Filesystem helpers for the copy stage.

use filetime::{set_file_times, FileTime};
use std::fs;
use std::io;
use std::path::Path;

/// Create `dir` and its parents.
///
/// Another worker creating the same directory first is not an error.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Copy bytes, permissions and access/modification times from `src` to `dst`.
///
/// Fails if `dst` already exists; a concurrent writer is never clobbered.
pub fn copy_with_metadata(src: &Path, dst: &Path) -> io::Result<()> {
    let mut reader = fs::File::open(src)?;
    let mut writer = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)?;

    if let Err(e) = io::copy(&mut reader, &mut writer) {
        drop(writer);
        let _ = fs::remove_file(dst);
        return Err(e);
    }
    drop(writer);

    let stat_src = fs::metadata(src)?;
    fs::set_permissions(dst, stat_src.permissions())?;
    set_file_times(
        dst,
        FileTime::from_last_access_time(&stat_src),
        FileTime::from_last_modification_time(&stat_src),
    )?;
    Ok(())
}
