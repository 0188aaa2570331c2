//! Scratch directory utilities.

use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::MediaResult;

/// Clear a directory, creating it if it does not exist yet.
///
/// Scratch directories are cleared at job start rather than job end,
/// which bounds disk growth across repeated runs while leaving the
/// previous run's artifacts inspectable in between.
pub async fn clean_dir(dir: impl AsRef<Path>) -> MediaResult<()> {
    let dir = dir.as_ref();

    if !dir.exists() {
        fs::create_dir_all(dir).await?;
        debug!("Created directory: {}", dir.display());
        return Ok(());
    }

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
        debug!("Removed: {}", path.display());
    }

    Ok(())
}
