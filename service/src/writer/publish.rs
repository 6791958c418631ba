//! Atomic publication of rendered documents

use dezmap_core::error::{MappingError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Write `bytes` to `dest` through a temporary file in the same directory
///
/// Nothing appears under the final name unless the whole document was written;
/// the temporary file is removed on any failure.
///
/// # Errors
///
/// Returns `MappingError::Output` with the destination path if the directory
/// does not exist or the file cannot be written or renamed.
pub fn publish(bytes: &[u8], dest: &Path) -> Result<PathBuf> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !dir.is_dir() {
        return Err(MappingError::output_at(
            format!("destination directory {} does not exist", dir.display()),
            dest,
        ));
    }

    let fail = |action: &str, e: std::io::Error| {
        MappingError::output_at(format!("failed to {action}: {e}"), dest)
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| fail("create temporary file", e))?;
    tmp.write_all(bytes)
        .map_err(|e| fail("write temporary file", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| fail("flush temporary file", e))?;
    tmp.persist(dest)
        .map_err(|e| fail("publish document", e.error))?;

    info!("Published {} ({} bytes)", dest.display(), bytes.len());
    Ok(dest.to_path_buf())
}
