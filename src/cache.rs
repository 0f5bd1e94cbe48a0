// Explicit table cache keyed by a source fingerprint.
//
// Loading is deterministic for identical input, so a table only needs to be
// parsed once per distinct file state. The fingerprint covers path, length,
// and modification time: replacing the report on disk naturally misses the
// cache, and `invalidate` drops stale entries for a path that is being
// re-uploaded.
use crate::loader::{self, LoadReport};
use crate::types::Record;
use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("fingerprinting {}", path.display()))?;
        Ok(SourceFingerprint {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<SourceFingerprint, Vec<Record>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the normalized table for `path`, parsing it only when no entry
    /// exists for the file's current fingerprint.
    pub fn get_or_load(&mut self, path: &Path) -> Result<&[Record]> {
        let fingerprint = SourceFingerprint::of(path)?;
        match self.entries.entry(fingerprint) {
            Entry::Occupied(entry) => {
                debug!("cache hit for {}", path.display());
                Ok(entry.into_mut().as_slice())
            }
            Entry::Vacant(entry) => {
                let (records, report) = loader::load_from_path(path)?;
                log_load(path, &report);
                Ok(entry.insert(records).as_slice())
            }
        }
    }

    /// Drop all cached tables for `path`, regardless of fingerprint.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.retain(|fp, _| fp.path != path);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn log_load(path: &Path, report: &LoadReport) {
    info!(
        "loaded {} ({} rows, {} normalized, {} skipped)",
        path.display(),
        report.total_rows,
        report.loaded_rows,
        report.skipped_rows
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_report(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn repeated_loads_reuse_the_cached_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, "report.csv", "Sprint,Cost Savings in $\nS1,200\n");
        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap().to_vec();
        let second = cache.get_or_load(&path).unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forgets_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, "report.csv", "Sprint\nS1\n");
        let mut cache = TableCache::new();
        cache.get_or_load(&path).unwrap();
        assert!(!cache.is_empty());
        cache.invalidate(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_file_is_an_error_not_a_panic() {
        let mut cache = TableCache::new();
        assert!(cache.get_or_load(Path::new("no/such/report.csv")).is_err());
    }
}
