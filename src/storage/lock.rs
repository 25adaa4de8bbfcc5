//! Crawl lock
//!
//! The snapshot, blacklist, and meta files assume a single writer. A cron
//! tick and a manual admin action can fire at the same time, so the driver
//! and the blacklist editor take this advisory lock for the duration of
//! their work. A crashed holder leaves its lock behind; locks older than
//! the grace window are broken with a warning.

use crate::{Result, StokerError};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// An advisory lock file, removed on drop
pub struct CrawlLock {
    path: PathBuf,
}

impl CrawlLock {
    /// Derives the lock path for a sitemap snapshot
    pub fn path_for(sitemap_path: &Path) -> PathBuf {
        let mut name = sitemap_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquires the lock, breaking it first if older than `grace`
    ///
    /// # Errors
    ///
    /// [`StokerError::Locked`] when another holder is within the grace
    /// window; IO errors otherwise.
    pub fn acquire(path: PathBuf, grace: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        for attempt in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt == 0 => {
                    if Self::is_stale(&path, grace) {
                        tracing::warn!(
                            "Breaking stale crawl lock at {} (older than {:?})",
                            path.display(),
                            grace
                        );
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    return Err(StokerError::Locked {
                        path: path.display().to_string(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(StokerError::Locked {
                        path: path.display().to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StokerError::Locked {
            path: path.display().to_string(),
        })
    }

    fn is_stale(path: &Path, grace: Duration) -> bool {
        let Ok(metadata) = fs::metadata(path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age > grace)
            .unwrap_or(false)
    }
}

impl Drop for CrawlLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GRACE: Duration = Duration::from_secs(600);

    #[test]
    fn test_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let path = CrawlLock::path_for(&dir.path().join("crawlermap.data"));

        {
            let _lock = CrawlLock::acquire(path.clone(), GRACE).unwrap();
            assert!(path.exists());
        }

        // Released on drop.
        assert!(!path.exists());
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let path = CrawlLock::path_for(&dir.path().join("crawlermap.data"));

        let _held = CrawlLock::acquire(path.clone(), GRACE).unwrap();
        let second = CrawlLock::acquire(path, GRACE);
        assert!(matches!(second, Err(StokerError::Locked { .. })));
    }

    #[test]
    fn test_stale_lock_is_broken() {
        let dir = TempDir::new().unwrap();
        let path = CrawlLock::path_for(&dir.path().join("crawlermap.data"));

        // Simulate a crashed holder: a bare lock file outliving a tiny
        // grace window.
        fs::write(&path, "12345").unwrap();
        std::thread::sleep(Duration::from_millis(50));

        let lock = CrawlLock::acquire(path.clone(), Duration::from_millis(10));
        assert!(lock.is_ok());
    }

    #[test]
    fn test_lock_path_naming() {
        let path = CrawlLock::path_for(Path::new("/var/stoker/crawlermap-2.data"));
        assert_eq!(path, Path::new("/var/stoker/crawlermap-2.data.lock"));
    }
}
