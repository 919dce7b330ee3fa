//! Speculative prefetch planning and dispatch.
//!
//! One prefetch cycle: take the first and last key of an observed page,
//! derive the expected key density, tile contiguous windows past the page's
//! end, run one sub-range worker per window on the bounded pool, wait for
//! all of them, then build the cache.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;
use wl_error::{ListError, Result};

use crate::cache::ObjectCache;
use crate::config::ListingConfig;
use crate::endpoint::ListEndpoint;
use crate::keymath::KeyNumber;
use crate::subrange::{run_subrange, KeyWindow};

/// Strip the shared prefix before key arithmetic.
fn relative<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

/// Compute `count` contiguous windows past `last_key`.
///
/// The distance between the page's first and last key, shrunk by `alpha`,
/// estimates how much key space one page covers. The first window starts one
/// past the page's last key so its probe can never re-fetch a key already
/// emitted; each window is `distance` wide and starts where the previous one
/// ends.
fn plan_windows(
    first_key: &str,
    last_key: &str,
    prefix: &str,
    count: usize,
    alpha: f32,
) -> Result<Vec<KeyWindow>> {
    let first = KeyNumber::from_key(relative(first_key, prefix))?;
    let last = KeyNumber::from_key(relative(last_key, prefix))?;
    let distance = last.checked_sub(&first)?.scale(alpha)?;

    let base = &last + 1;
    let mut windows = Vec::with_capacity(count);
    for i in 0..count {
        let start = &base + &(&distance * i);
        let end = &start + &distance;
        windows.push(KeyWindow { start, end });
    }
    Ok(windows)
}

/// Run one prefetch cycle and leave the cache built, or cleared on failure.
///
/// Workers beyond the pool size queue on the semaphore. All workers are
/// awaited before any error is surfaced; the first captured error wins.
pub(crate) async fn run_prefetch<E: ListEndpoint + 'static>(
    endpoint: &Arc<E>,
    bucket: &str,
    prefix: &str,
    first_key: &str,
    last_key: &str,
    cache: &mut ObjectCache,
    pool: &Arc<Semaphore>,
    config: &ListingConfig,
) -> Result<()> {
    cache.clear();

    let windows = plan_windows(
        first_key,
        last_key,
        prefix,
        config.num_parallel_requests,
        config.multiplication_length,
    )?;

    debug!(
        bucket = %bucket,
        prefix = %prefix,
        windows = windows.len(),
        workers = config.num_workers,
        "dispatching speculative sub-range listings"
    );

    let mut handles = Vec::with_capacity(windows.len());
    for window in windows {
        let endpoint = Arc::clone(endpoint);
        let pool = Arc::clone(pool);
        let inserter = cache.inserter();
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();
        let page_size = config.list_object_keys_size;

        handles.push(tokio::spawn(async move {
            let _permit = pool
                .acquire_owned()
                .await
                .map_err(|_| ListError::Invariant("worker pool closed".to_string()))?;
            run_subrange(endpoint, &bucket, &prefix, window, page_size, inserter).await
        }));
    }

    let mut first_error = None;
    for joined in join_all(handles).await {
        let outcome = joined.unwrap_or_else(|e| {
            Err(ListError::Invariant(format!("listing worker panicked: {e}")))
        });
        if let Err(error) = outcome {
            first_error.get_or_insert(error);
        }
    }

    if let Some(error) = first_error {
        cache.clear();
        return Err(error);
    }

    cache.build();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockEndpoint;

    #[test]
    fn test_windows_tile_contiguously() {
        let windows = plan_windows("b", "f", "", 3, 1.0).unwrap();
        assert_eq!(windows.len(), 3);

        // f encodes to 42, b to 38: distance 4, base 43
        let expected_start = KeyNumber::from(43);
        assert_eq!(windows[0].start, expected_start);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for w in &windows {
            assert_eq!(w.end, &w.start + &KeyNumber::from(4));
        }
    }

    #[test]
    fn test_windows_shrink_with_alpha() {
        let full = plan_windows("b", "f", "", 1, 1.0).unwrap();
        let shrunk = plan_windows("b", "f", "", 1, 0.5).unwrap();
        assert!(shrunk[0].end < full[0].end);
        assert_eq!(shrunk[0].start, full[0].start);
    }

    #[test]
    fn test_windows_strip_prefix() {
        let with_prefix = plan_windows("data/b", "data/f", "data/", 2, 1.0).unwrap();
        let bare = plan_windows("b", "f", "", 2, 1.0).unwrap();
        assert_eq!(with_prefix[0].start, bare[0].start);
        assert_eq!(with_prefix[1].end, bare[1].end);
    }

    #[test]
    fn test_windows_reject_bad_keys() {
        let err = plan_windows("a/0", "a/9", "", 2, 0.9).unwrap_err();
        assert!(matches!(err, ListError::UnsupportedKeyChar { ch: '/', .. }));
    }

    #[tokio::test]
    async fn test_prefetch_failure_clears_cache() {
        // plenty of keys so every window sees data, with listings denied
        // somewhere inside the speculative region
        let keys: Vec<String> = ('b'..='y').map(String::from).collect();
        let endpoint = Arc::new(MockEndpoint::with_keys(keys).deny_from("j"));
        let pool = Arc::new(Semaphore::new(2));
        let mut cache = ObjectCache::new();

        let config = ListingConfig::new()
            .with_list_object_keys_size(2)
            .with_num_workers(2)
            .with_num_parallel_requests(4)
            .with_multiplication_length(1.0);

        let err = run_prefetch(
            &endpoint, "bucket", "", "b", "d", &mut cache, &pool, &config,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ListError::Endpoint { ref code, .. } if code == "AccessDenied"));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_prefetch_builds_cache_past_page_end() {
        let keys: Vec<String> = ('b'..='y').map(String::from).collect();
        let endpoint = Arc::new(MockEndpoint::with_keys(keys));
        let pool = Arc::new(Semaphore::new(2));
        let mut cache = ObjectCache::new();

        let config = ListingConfig::new()
            .with_list_object_keys_size(3)
            .with_num_workers(2)
            .with_num_parallel_requests(3)
            .with_multiplication_length(1.0);

        run_prefetch(
            &endpoint, "bucket", "", "b", "e", &mut cache, &pool, &config,
        )
        .await
        .unwrap();

        let cached = cache.batch_after("e", 100);
        assert!(!cached.is_empty());
        // everything staged lies strictly past the observed page
        assert!(cached.iter().all(|o| o.key.as_str() > "e"));
        // ascending and duplicate-free
        for pair in cached.windows(2) {
            assert!(pair[0].key < pair[1].key);
        }
    }
}
