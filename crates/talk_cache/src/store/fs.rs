use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::{
    store::{BustFlags, CacheEntry, CacheError, CacheStore},
    CacheDomain, CacheKey,
};

/// Filesystem-backed cache store rooted at an explicit directory,
/// with one subdirectory per domain.
///
/// The root is threaded in by the caller; there is no process-wide
/// ambient cache location. Writes go to a temp file in the same
/// directory and are renamed into place, so a read either sees the
/// full payload or nothing.
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
    bust: BustFlags,
}

impl FsCache {
    pub fn new(root: impl Into<PathBuf>, bust: BustFlags) -> Self {
        FsCache {
            root: root.into(),
            bust,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root
            .join(key.domain().as_str())
            .join(key.entry_name())
    }
}

impl CacheStore for FsCache {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        if self.is_busted(key.domain()) {
            tracing::debug!(domain = key.domain().as_str(), "Cache domain busted, treating as miss");
            return None;
        }

        let path = self.entry_path(key);
        let payload = fs::read_to_string(&path).ok()?;
        let stored_at = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        tracing::debug!(path = %path.display(), "Cache hit");
        Some(CacheEntry { payload, stored_at })
    }

    fn put(&self, key: &CacheKey, payload: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let dir = path
            .parent()
            .expect("entry path always has a domain parent")
            .to_path_buf();
        fs::create_dir_all(&dir)?;

        // Write-then-rename keeps partially written entries invisible.
        let tmp = dir.join(format!(
            ".{}.tmp{}",
            key.entry_name(),
            std::process::id()
        ));
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(path = %path.display(), "Cache write");
        Ok(())
    }

    fn is_busted(&self, domain: CacheDomain) -> bool {
        self.bust.is_busted(domain)
    }
}
