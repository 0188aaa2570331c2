//! Stock clip and background song downloads.

use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};

/// Download a stock clip into the scratch directory.
///
/// The file is named with a fresh UUID so repeated downloads of the
/// same URL never collide within a job.
pub async fn save_clip(client: &reqwest::Client, url: &str, dir: &Path) -> MediaResult<PathBuf> {
    let path = dir.join(format!("{}.mp4", Uuid::new_v4()));

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("{}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(MediaError::download_failed(format!(
            "{}: HTTP {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| MediaError::download_failed(format!("{}: {}", url, e)))?;

    tokio::fs::write(&path, &bytes).await?;

    info!("Saved clip {} -> {}", url, path.display());
    Ok(path)
}

/// Fetch the songs archive into the songs directory.
///
/// The archive is expected to be unpacked out of band; song selection
/// ignores the archive file itself.
pub async fn fetch_songs(client: &reqwest::Client, zip_url: &str, songs_dir: &Path) -> MediaResult<PathBuf> {
    tokio::fs::create_dir_all(songs_dir).await?;

    let archive_path = songs_dir.join("songs.zip");

    let response = client
        .get(zip_url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("songs archive: {}", e)))?;

    if !response.status().is_success() {
        return Err(MediaError::download_failed(format!(
            "songs archive: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| MediaError::download_failed(format!("songs archive: {}", e)))?;

    tokio::fs::write(&archive_path, &bytes).await?;

    info!("Fetched songs archive -> {}", archive_path.display());
    Ok(archive_path)
}

/// Pick a random song from the songs directory.
pub fn choose_random_song(songs_dir: &Path) -> MediaResult<PathBuf> {
    let songs: Vec<PathBuf> = std::fs::read_dir(songs_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| !ext.eq_ignore_ascii_case("zip"))
                    .unwrap_or(false)
        })
        .collect();

    if songs.is_empty() {
        warn!("No songs found in {}", songs_dir.display());
        return Err(MediaError::FileNotFound(songs_dir.to_path_buf()));
    }

    let index = rand::rng().random_range(0..songs.len());
    let song = songs[index].clone();
    info!("Chose song: {}", song.display());
    Ok(song)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_choose_random_song_skips_archive() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("songs.zip"), b"zip").unwrap();
        std::fs::write(dir.path().join("track.mp3"), b"mp3").unwrap();

        let song = choose_random_song(dir.path()).unwrap();
        assert_eq!(song.file_name().unwrap(), "track.mp3");
    }

    #[test]
    fn test_choose_random_song_empty_dir_fails() {
        let dir = TempDir::new().unwrap();
        assert!(choose_random_song(dir.path()).is_err());
    }
}
