// File: wearview-core/src/cache/profile_cache.rs

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::warn;

use wearview_common::Error;
use wearview_common::models::Profile;

type Slot = Arc<OnceCell<Option<Arc<Profile>>>>;

/// Process-lifetime memoization of profile lookups, keyed by profile
/// identifier. Missing profiles are cached too (as `None`), so repeated
/// resolutions never re-hit the network until an explicit `reset`.
///
/// Concurrent lookups for the same key share one in-flight fetch.
#[derive(Default)]
pub struct ProfileCache {
    entries: DashMap<String, Slot>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached profile for `id`, running `fetch` at most once
    /// per key per cache generation. Fetch errors are logged and cached
    /// as "no profile" - profile lookups never fail a resolution.
    pub async fn get_or_fetch<F, Fut>(&self, id: &str, fetch: F) -> Option<Arc<Profile>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Profile>, Error>>,
    {
        let cell: Slot = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_init(|| async move {
            match fetch().await {
                Ok(profile) => profile.map(Arc::new),
                Err(e) => {
                    warn!("Profile fetch for {id} failed => {e}; treating as no profile");
                    None
                }
            }
        })
        .await
        .clone()
    }

    /// Drops all cached entries. Idempotent; lookups already in flight
    /// keep their own cells and complete undisturbed.
    pub fn reset(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{Duration, sleep};
    use wearview_common::models::ProfileAvatar;

    fn profile_with_one_avatar() -> Profile {
        Profile {
            avatars: vec![ProfileAvatar::default()],
        }
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let cache = ProfileCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result = cache
                .get_or_fetch("alice", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(profile_with_one_avatar()))
                })
                .await;
            assert!(result.is_some());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_profile_cached_as_none() {
        let cache = ProfileCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = cache
                .get_or_fetch("nobody", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await;
            assert!(result.is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_forces_refetch() {
        let cache = ProfileCache::new();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(profile_with_one_avatar()))
        };
        cache.get_or_fetch("alice", fetch).await;
        cache.reset();
        cache.reset(); // second reset is a no-op
        cache.get_or_fetch("alice", fetch).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_degrades_to_none() {
        let cache = ProfileCache::new();
        let result = cache
            .get_or_fetch("broken", || async {
                Err(Error::Transport("boom".to_string()))
            })
            .await;
        assert!(result.is_none());
        // The failure is cached; no second fetch happens.
        let result = cache
            .get_or_fetch("broken", || async {
                panic!("should not re-fetch a cached failure");
            })
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_fetch() {
        let cache = Arc::new(ProfileCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..4 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("alice", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        sleep(Duration::from_millis(50)).await;
                        Ok(Some(profile_with_one_avatar()))
                    })
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
