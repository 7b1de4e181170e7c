// src/cache/mod.rs
use crate::error::LoadError;
use crate::process::{self, Source, SourceKey};
use crate::table::TitleTable;
use once_cell::sync::OnceCell;
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, RwLock},
};
use tracing::{debug, info, warn};

type Slot = Arc<OnceCell<Arc<TitleTable>>>;

/// Upload tables kept before the oldest one is dropped.
pub const DEFAULT_UPLOAD_CAPACITY: usize = 8;

/// Attempts at loading a file that keeps changing underneath us.
const CHANGED_RETRIES: usize = 3;

#[derive(Default)]
struct Slots {
    by_key: HashMap<SourceKey, Slot>,
    /// Upload keys, oldest first.
    uploads: VecDeque<SourceKey>,
}

/// Thread-safe read-through cache of loaded tables, keyed by source identity.
///
/// Each key gets its own once-initialised slot. The map lock is only held to
/// find or create a slot, so a slow parse of one source never blocks loads of
/// another, and concurrent loads of the same source parse it exactly once.
///
/// A file keeps one entry: loading it under a new fingerprint drops the old
/// one. Uploads are capped at `upload_capacity` entries, oldest evicted first.
pub struct LoadCache {
    slots: RwLock<Slots>,
    upload_capacity: usize,
}

impl Default for LoadCache {
    fn default() -> Self {
        Self::with_upload_capacity(DEFAULT_UPLOAD_CAPACITY)
    }
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_capacity(upload_capacity: usize) -> Self {
        Self {
            slots: RwLock::new(Slots::default()),
            upload_capacity: upload_capacity.max(1),
        }
    }

    fn slot(&self, key: &SourceKey) -> Slot {
        if let Some(slot) = self.slots.read().unwrap_or_else(|e| e.into_inner()).by_key.get(key) {
            return slot.clone();
        }

        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.by_key.get(key) {
            return slot.clone();
        }
        match key.path() {
            Some(path) => {
                // older fingerprints of the same file are stale
                slots.by_key.retain(|k, _| k.path() != Some(path));
            }
            None => {
                slots.uploads.push_back(key.clone());
                while slots.uploads.len() > self.upload_capacity {
                    if let Some(old) = slots.uploads.pop_front() {
                        slots.by_key.remove(&old);
                        debug!(?old, "evicted oldest upload");
                    }
                }
            }
        }
        slots.by_key.entry(key.clone()).or_default().clone()
    }

    /// Return the cached table for `key`, running `loader` if there is none.
    ///
    /// If `loader` fails nothing is cached and the next call retries.
    pub fn get_or_load_with<F>(&self, key: &SourceKey, loader: F) -> Result<Arc<TitleTable>, LoadError>
    where
        F: FnOnce() -> Result<TitleTable, LoadError>,
    {
        let slot = self.slot(key);
        let mut loaded = false;
        let table = slot
            .get_or_try_init(|| {
                loaded = true;
                loader().map(Arc::new)
            })?
            .clone();
        if loaded {
            info!(rows = table.num_rows(), "cache miss; table loaded");
        } else {
            debug!("cache hit");
        }
        Ok(table)
    }

    /// Load `source`, serving a previous result for the same source identity.
    ///
    /// A file that changes while it is read is re-keyed and read again, so
    /// bytes are never cached under a fingerprint they do not match.
    pub fn get_or_load(&self, source: &Source) -> Result<Arc<TitleTable>, LoadError> {
        let mut attempt = 1;
        loop {
            let key = source.key()?;
            match self.get_or_load_with(&key, || process::load_unchanged(source, &key)) {
                Err(LoadError::Changed { path }) if attempt < CHANGED_RETRIES => {
                    warn!(path = %path.display(), attempt, "file changed during load; retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &SourceKey) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.uploads.retain(|k| k != key);
        slots.by_key.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.by_key.clear();
        slots.uploads.clear();
    }

    /// Number of keys with a slot, loaded or in flight.
    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(|e| e.into_inner()).by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixtures::HEADER;
    use anyhow::Result;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tempfile::NamedTempFile;

    fn csv(rows: &[&str]) -> Vec<u8> {
        let mut s = format!("{}\n", HEADER);
        for r in rows {
            s.push_str(r);
            s.push('\n');
        }
        s.into_bytes()
    }

    #[test]
    fn identical_uploads_share_one_table() -> Result<()> {
        let cache = LoadCache::new();
        let body = csv(&["s1,Movie,A,D,US,2021-01-01,2020,Drama"]);
        let a = cache.get_or_load(&Source::from_upload("a.csv", body.clone()))?;
        let b = cache.get_or_load(&Source::from_upload("again.csv", body))?;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn different_uploads_never_cross() -> Result<()> {
        let cache = LoadCache::new();
        let one = cache.get_or_load(&Source::from_upload(
            "x.csv",
            csv(&["s1,Movie,A,D,US,2021-01-01,2020,Drama"]),
        ))?;
        let two = cache.get_or_load(&Source::from_upload(
            "x.csv",
            csv(&[
                "s1,Movie,A,D,US,2021-01-01,2020,Drama",
                "s2,Movie,B,D,US,2021-01-01,2020,Drama",
            ]),
        ))?;
        assert_eq!(one.num_rows(), 1);
        assert_eq!(two.num_rows(), 2);
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache = LoadCache::new();
        let bad = Source::from_upload("bad.csv", b"type,director\nMovie,A\n".to_vec());
        assert!(matches!(
            cache.get_or_load(&bad),
            Err(LoadError::MissingColumns(_))
        ));
        assert!(cache.get_or_load(&bad).is_err());

        let key = bad.key().unwrap();
        let table = cache
            .get_or_load_with(&key, || Ok(crate::table::fixtures::two_titles()))
            .unwrap();
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn invalidate_forces_reload() -> Result<()> {
        let cache = LoadCache::new();
        let src = Source::from_upload("a.csv", csv(&["s1,Movie,A,D,US,2021-01-01,2020,Drama"]));
        let key = src.key()?;
        let first = cache.get_or_load(&src)?;
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        let second = cache.get_or_load(&src)?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);

        cache.clear();
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn edited_file_replaces_stale_entry() -> Result<()> {
        let cache = LoadCache::new();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&csv(&["s1,Movie,A,D,US,2021-01-01,2020,Drama"]))?;
        tmp.flush()?;
        let src = Source::from_path(tmp.path());

        let before = cache.get_or_load(&src)?;
        assert_eq!(before.num_rows(), 1);

        tmp.write_all(b"s2,TV Show,B,E,UK,2022-01-01,2021,Comedy\n")?;
        tmp.flush()?;
        let after = cache.get_or_load(&src)?;
        assert_eq!(after.num_rows(), 2);
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn uploads_beyond_capacity_evict_the_oldest() -> Result<()> {
        let cache = LoadCache::with_upload_capacity(2);
        let uploads: Vec<Source> = (1..=3)
            .map(|n| {
                let rows: Vec<String> = (0..n)
                    .map(|i| format!("s{i},Movie,T,D,US,2021-01-01,2020,Drama"))
                    .collect();
                let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
                Source::from_upload("u.csv", csv(&refs))
            })
            .collect();

        let first = cache.get_or_load(&uploads[0])?;
        let second = cache.get_or_load(&uploads[1])?;
        cache.get_or_load(&uploads[2])?;
        assert_eq!(cache.len(), 2);

        // the newer upload survived, the oldest was dropped
        assert!(Arc::ptr_eq(&second, &cache.get_or_load(&uploads[1])?));
        let reloaded = cache.get_or_load(&uploads[0])?;
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(reloaded.num_rows(), 1);
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn uploads_and_files_are_capped_separately() -> Result<()> {
        let cache = LoadCache::with_upload_capacity(1);
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&csv(&["s1,Movie,A,D,US,2021-01-01,2020,Drama"]))?;
        tmp.flush()?;
        let file = cache.get_or_load(&Source::from_path(tmp.path()))?;

        cache.get_or_load(&Source::from_upload("a.csv", csv(&["s1,Movie,A,D,US,,2020,Drama"])))?;
        cache.get_or_load(&Source::from_upload("b.csv", csv(&["s1,Movie,B,D,UK,,2020,Drama"])))?;
        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&file, &cache.get_or_load(&Source::from_path(tmp.path()))?));
        Ok(())
    }

    #[test]
    fn concurrent_loads_of_one_source_run_loader_once() -> Result<()> {
        let cache = LoadCache::new();
        let key = Source::from_upload("a.csv", b"same".to_vec()).key()?;
        let calls = AtomicUsize::new(0);

        let tables: Vec<Arc<TitleTable>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        cache
                            .get_or_load_with(&key, || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                Ok(crate::table::fixtures::two_titles())
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        Ok(())
    }

    #[test]
    fn concurrent_loads_of_different_sources_stay_separate() -> Result<()> {
        let cache = LoadCache::new();
        let bodies: Vec<Vec<u8>> = (1..=6)
            .map(|n| {
                let rows: Vec<String> = (0..n)
                    .map(|i| format!("s{i},Movie,T,D,US,2021-01-01,2020,Drama"))
                    .collect();
                let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
                csv(&refs)
            })
            .collect();

        thread::scope(|s| {
            for (i, body) in bodies.iter().enumerate() {
                let cache = &cache;
                s.spawn(move || {
                    for _ in 0..10 {
                        let t = cache
                            .get_or_load(&Source::from_upload("u.csv", body.clone()))
                            .unwrap();
                        assert_eq!(t.num_rows(), i + 1);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 6);
        Ok(())
    }
}
