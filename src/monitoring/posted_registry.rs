use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Urls that have already been sent, mirrored in an append-only file with
/// one url per line.
///
/// Entries are never evicted, so the file grows for the lifetime of the
/// deployment.
#[derive(Debug)]
pub struct PostedRegistry {
    path: PathBuf,
    posted: HashSet<String>,
}

impl PostedRegistry {
    /// Reads every recorded url. A missing file is an empty registry.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();

        let posted = match fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e),
        };

        tracing::info!("Loaded {} posted items from {}", posted.len(), path.display());
        Ok(Self { path, posted })
    }

    pub fn contains(&self, url: &str) -> bool {
        self.posted.contains(url)
    }

    /// Appends `url` and syncs it to disk before adding it to the set.
    ///
    /// Returns `Ok(false)` without touching the file when the url is already
    /// recorded. On error the in-memory set is left unchanged.
    pub fn record(&mut self, url: &str) -> io::Result<bool> {
        if self.posted.contains(url) {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // One write per line keeps a failed append from leaving half a url
        // for the next record to join onto.
        file.write_all(format!("{url}\n").as_bytes())?;
        file.flush()?;
        file.sync_data()?;

        self.posted.insert(url.to_string());
        tracing::debug!("Recorded {} as posted", url);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.posted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posted.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = PostedRegistry::load(dir.path().join("posted_items.txt")).unwrap();
        assert!(registry.is_empty());
        assert!(!registry.contains("/item/1"));
    }

    #[test]
    fn test_record_twice_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted_items.txt");
        let mut registry = PostedRegistry::load(&path).unwrap();

        assert!(registry.record("/item/1").unwrap());
        assert!(!registry.record("/item/1").unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), "/item/1\n");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reload_sees_recorded_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted_items.txt");
        fs::write(&path, "/item/1\n\n/item/2\n").unwrap();

        let mut registry = PostedRegistry::load(&path).unwrap();
        registry.record("/item/3").unwrap();
        registry.record("/item/2").unwrap();

        let reloaded = PostedRegistry::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded.contains("/item/1"));
        assert!(reloaded.contains("/item/3"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "/item/1\n\n/item/2\n/item/3\n"
        );
    }

    #[test]
    fn test_url_with_whitespace_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted_items.txt");
        let mut registry = PostedRegistry::load(&path).unwrap();
        registry.record("/item/1 ").unwrap();

        let mut reloaded = PostedRegistry::load(registry.path()).unwrap();

        assert!(reloaded.contains("/item/1 "));
        assert!(!reloaded.record("/item/1 ").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "/item/1 \n");
    }

    #[test]
    fn test_failed_write_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        // The parent directory does not exist, so opening for append fails.
        let mut registry = PostedRegistry::load(dir.path().join("gone/posted.txt")).unwrap();

        assert!(registry.record("/item/1").is_err());
        assert!(!registry.contains("/item/1"));
    }
}
