//! Forward iterator over a bucket/prefix with speculative prefetch.

use std::sync::Arc;

use async_stream::try_stream;
use futures::Stream;
use tokio::sync::Semaphore;
use tracing::debug;
use wl_error::Result;

use crate::cache::ObjectCache;
use crate::config::ListingConfig;
use crate::endpoint::ListEndpoint;
use crate::planner;
use crate::ObjectSummary;

/// Batched forward iterator over the objects under `(bucket, prefix)`.
///
/// `next_batch` alternates between draining the ordered cache and issuing a
/// live page. The first truncated live page triggers one speculative
/// prefetch cycle that fills the cache in parallel; after that, batches come
/// from RAM until the cache runs dry past the cursor, at which point live
/// paging resumes and patches any coverage gaps authoritatively.
///
/// Within a cache drain keys ascend strictly; across the cache/live boundary
/// the emitted key set matches a sequential listing, though interleaving may
/// differ from it.
pub struct ListingIterator<E: ListEndpoint + 'static> {
    endpoint: Arc<E>,
    bucket: String,
    prefix: String,
    config: ListingConfig,
    cache: ObjectCache,
    pool: Arc<Semaphore>,
    /// Last key emitted to the consumer; advanced only on successful emission.
    start_after: String,
    /// Whether the speculative cycle is still available. Consumed by the
    /// first truncated live page.
    cache_primed: bool,
    exhausted: bool,
}

impl<E: ListEndpoint + 'static> ListingIterator<E> {
    pub fn new(
        endpoint: Arc<E>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        config: ListingConfig,
    ) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(Semaphore::new(config.num_workers.max(1)));
        Ok(Self {
            endpoint,
            bucket: bucket.into(),
            prefix: prefix.into(),
            config,
            cache: ObjectCache::new(),
            pool,
            start_after: String::new(),
            cache_primed: true,
            exhausted: false,
        })
    }

    /// Append the next batch of objects and report whether more may follow.
    ///
    /// Returns `false` exactly once exhaustion is proven: the store reported
    /// no further keys and the cache holds nothing past the cursor.
    pub async fn next_batch(&mut self, batch: &mut Vec<ObjectSummary>) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        let page_size = self.config.list_object_keys_size;

        // a full batch from the cache costs no round trip; anything short of
        // full falls through to an authoritative live page, which also covers
        // keys a speculative worker may have skipped
        let cached = self.cache.batch_after(&self.start_after, page_size);
        if cached.len() == page_size {
            if let Some(last) = cached.last() {
                self.start_after = last.key.clone();
            }
            batch.extend(cached);
            return Ok(true);
        }

        let cursor = (!self.start_after.is_empty()).then_some(self.start_after.as_str());
        let page = self
            .endpoint
            .list_page(&self.bucket, &self.prefix, cursor, page_size)
            .await?;

        let truncated = page.truncated;
        let Some(last) = page.objects.last() else {
            // nothing past the cursor; a truncated empty page leaves the
            // cursor in place so the next call retries from the same spot
            self.exhausted = !truncated;
            return Ok(truncated);
        };
        let first_key = page.objects[0].key.clone();
        let last_key = last.key.clone();
        self.start_after = last_key.clone();
        batch.extend(page.objects);

        if truncated && self.config.use_parallel_listing && self.cache_primed {
            // one speculative cycle per iteration; the planner leaves the
            // cache built on success and cleared on failure
            self.cache_primed = false;
            debug!(
                bucket = %self.bucket,
                prefix = %self.prefix,
                "page truncated, starting prefetch cycle"
            );
            planner::run_prefetch(
                &self.endpoint,
                &self.bucket,
                &self.prefix,
                &first_key,
                &last_key,
                &mut self.cache,
                &self.pool,
                &self.config,
            )
            .await?;
        }

        if !truncated {
            debug!(bucket = %self.bucket, prefix = %self.prefix, "listing exhausted");
            self.exhausted = true;
        }
        Ok(truncated)
    }

    /// Adapt the iterator into a stream of single objects.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<ObjectSummary>> {
        try_stream! {
            let mut batch = Vec::new();
            loop {
                batch.clear();
                let more = self.next_batch(&mut batch).await?;
                for object in batch.drain(..) {
                    yield object;
                }
                if !more {
                    break;
                }
            }
        }
    }
}
