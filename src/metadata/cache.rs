//! Per-client cache of parsed index metadata
//!
//! - One entry per table name, populated on first use
//! - Entries are immutable once set and never invalidated
//! - Concurrent misses on the same table share one fetch
//! - A failed fetch leaves the entry empty, so the next caller retries
//!
//! The map lock is only held to find or create a table's cell, never across
//! an await. Each cell is a `tokio::sync::OnceCell`: waiters block on the
//! cell, not on the map. If the caller running the fetch is cancelled, the
//! next waiter runs its own fetch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use tokio::sync::OnceCell;

use super::errors::{MetadataError, MetadataResult};
use super::index::TableIndexMetadata;

type Cell = Arc<OnceCell<Arc<TableIndexMetadata>>>;

/// How a lookup was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Entry was already populated
    Hit,
    /// This caller ran the fetch
    Fetched,
    /// Another concurrent caller's fetch populated the entry while we waited
    Shared,
}

/// Table name → index metadata
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<String, Cell>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata, without fetching
    pub fn get(&self, table_name: &str) -> MetadataResult<Option<Arc<TableIndexMetadata>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| MetadataError::Internal("Lock poisoned".into()))?;
        Ok(entries
            .get(table_name)
            .and_then(|cell| cell.get())
            .cloned())
    }

    /// Cached metadata, or the result of `fetch` which is then cached.
    ///
    /// Errors from `fetch` are returned unchanged and not cached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        table_name: &str,
        fetch: F,
    ) -> MetadataResult<(Arc<TableIndexMetadata>, CacheLookup)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = MetadataResult<TableIndexMetadata>>,
    {
        let cell = self.cell(table_name)?;
        if let Some(metadata) = cell.get() {
            return Ok((Arc::clone(metadata), CacheLookup::Hit));
        }

        let mut fetched = false;
        let metadata = cell
            .get_or_try_init(|| async {
                fetched = true;
                fetch().await.map(Arc::new)
            })
            .await?;

        let lookup = if fetched {
            CacheLookup::Fetched
        } else {
            CacheLookup::Shared
        };
        Ok((Arc::clone(metadata), lookup))
    }

    /// Names of populated tables, sorted
    pub fn tables(&self) -> MetadataResult<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| MetadataError::Internal("Lock poisoned".into()))?;
        let mut names: Vec<String> = entries
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn cell(&self, table_name: &str) -> MetadataResult<Cell> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|_| MetadataError::Internal("Lock poisoned".into()))?;
            if let Some(cell) = entries.get(table_name) {
                return Ok(Arc::clone(cell));
            }
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| MetadataError::Internal("Lock poisoned".into()))?;
        Ok(Arc::clone(
            entries.entry(table_name.to_string()).or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::description::KeySchemaElement;
    use crate::metadata::index::Index;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn metadata(table: &str) -> TableIndexMetadata {
        let primary = Index::primary(table, &[KeySchemaElement::hash("pk")], 1).unwrap();
        TableIndexMetadata::new(table, vec![primary]).unwrap()
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = MetadataCache::new();
        assert!(cache.get("t").unwrap().is_none());

        let (_, lookup) = cache
            .get_or_fetch("t", || async { Ok::<_, MetadataError>(metadata("t")) })
            .await
            .unwrap();
        assert_eq!(lookup, CacheLookup::Fetched);

        let (meta, lookup) = cache
            .get_or_fetch("t", || async {
                Err::<TableIndexMetadata, _>(MetadataError::Internal("fetched twice".into()))
            })
            .await
            .unwrap();
        assert_eq!(lookup, CacheLookup::Hit);
        assert_eq!(meta.table_name(), "t");
        assert!(cache.get("t").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let cache = MetadataCache::new();

        let err = cache
            .get_or_fetch("t", || async { Err::<TableIndexMetadata, _>(MetadataError::Throttled("busy".into())) })
            .await
            .unwrap_err();
        assert_eq!(err, MetadataError::Throttled("busy".into()));
        assert!(cache.get("t").unwrap().is_none());
        assert!(cache.tables().unwrap().is_empty());

        let (_, lookup) = cache
            .get_or_fetch("t", || async { Ok::<_, MetadataError>(metadata("t")) })
            .await
            .unwrap();
        assert_eq!(lookup, CacheLookup::Fetched);
    }

    #[tokio::test]
    async fn test_tables_sorted_and_populated_only() {
        let cache = MetadataCache::new();
        for name in ["zeta", "alpha"] {
            cache
                .get_or_fetch(name, || async move { Ok::<_, MetadataError>(metadata(name)) })
                .await
                .unwrap();
        }
        let _ = cache
            .get_or_fetch("broken", || async { Err::<TableIndexMetadata, _>(MetadataError::Transport("x".into())) })
            .await;

        assert_eq!(cache.tables().unwrap(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let cache = Arc::new(MetadataCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_fetch("t", || async {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, MetadataError>(metadata("t"))
                        })
                        .await
                        .map(|(meta, _)| meta)
                })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap().unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_cancelled_fetch_leaves_entry_empty() {
        let cache = MetadataCache::new();

        let slow = cache.get_or_fetch("t", || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, MetadataError>(metadata("t"))
        });
        assert!(tokio::time::timeout(Duration::from_millis(10), slow)
            .await
            .is_err());
        assert!(cache.get("t").unwrap().is_none());

        let (_, lookup) = cache
            .get_or_fetch("t", || async { Ok::<_, MetadataError>(metadata("t")) })
            .await
            .unwrap();
        assert_eq!(lookup, CacheLookup::Fetched);
    }
}
