//! Persistence of rendered invoices.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, trace};

/// Create `dir` one component at a time.
///
/// A component that already exists, including one created concurrently by
/// someone else, counts as success. Any other failure is returned.
pub async fn ensure_directory(dir: &Path) -> std::io::Result<()> {
    let mut current = PathBuf::new();

    for component in dir.components() {
        current.push(component);
        if fs::try_exists(&current).await? {
            continue;
        }

        trace!("Creating directory {}", current.display());
        match fs::create_dir(&current).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Directory {} appeared concurrently", current.display());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Write a rendered invoice to `base/directory/file_name`, creating directories as needed.
pub async fn write_invoice(
    base: &Path,
    directory: &str,
    file_name: &str,
    document: &[u8],
) -> std::io::Result<PathBuf> {
    let dir = base.join(directory);
    ensure_directory(&dir).await?;

    let path = dir.join(file_name);
    fs::write(&path, document).await?;
    debug!("Wrote {} bytes to {}", document.len(), path.display());

    Ok(path)
}
