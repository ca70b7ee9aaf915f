//! Input file discovery.
//!
//! Enumerates the CSV files under the input root. Traversal order is
//! whatever the directory walk yields; downstream components must not
//! rely on it.

use crate::constants::CSV_EXTENSION;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recursively collect every `.csv` file under `root`.
///
/// An unreadable root is fatal for the run; unreadable entries below it
/// are logged and skipped.
pub fn scan_csv_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_csv_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                // depth 0 means the root itself could not be read
                if e.depth() == 0 {
                    return Err(Error::Scan {
                        path: root.to_path_buf(),
                        source: e.into_io_error().unwrap_or_else(|| {
                            std::io::Error::new(
                                std::io::ErrorKind::Other,
                                "directory walk failed",
                            )
                        }),
                    });
                }
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
            }
        }
    }

    debug!("Found {} CSV files under {}", files.len(), root.display());
    Ok(files)
}

fn is_csv_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CSV_EXTENSION)
}
