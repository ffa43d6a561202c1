//! Quarantine of unparsable telemetry files
//!
//! Files are moved byte-for-byte under their own name. Nothing reads the
//! quarantine directory back; an operator inspects it by hand.

use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Destination for files that failed to parse
#[derive(Debug, Clone)]
pub struct Quarantine {
    dir: PathBuf,
}

impl Quarantine {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Move `path` into the quarantine directory, creating it on demand.
    ///
    /// Returns the new location. An existing file of the same name is
    /// replaced.
    pub fn isolate(&self, path: &Path) -> io::Result<PathBuf> {
        let name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?;

        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(name);

        if let Err(e) = std::fs::rename(path, &target) {
            // rename fails across filesystems
            warn!(
                "Rename of {} failed ({}), copying instead",
                path.display(),
                e
            );
            std::fs::copy(path, &target)?;
            std::fs::remove_file(path)?;
        }

        Ok(target)
    }
}
