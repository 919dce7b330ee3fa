//! One speculative sub-range listing worker.

use std::sync::Arc;

use tracing::trace;
use wl_error::Result;

use crate::cache::CacheInserter;
use crate::endpoint::ListEndpoint;
use crate::keymath::KeyNumber;

/// A half-open key window `[start, end)` assigned to one worker, expressed
/// relative to the shared prefix.
#[derive(Debug, Clone)]
pub(crate) struct KeyWindow {
    pub start: KeyNumber,
    pub end: KeyNumber,
}

/// Page through one window, staging every object seen.
///
/// The first request probes with `max_keys = 1`: windows are computed from a
/// density estimate and overlap their neighbours on uneven distributions, so
/// a full page at the window edge would mostly duplicate work. After the
/// probe, full pages, until the store runs dry, the window turns out to be
/// empty, or the last returned key crosses into the next worker's territory.
pub(crate) async fn run_subrange<E: ListEndpoint + ?Sized>(
    endpoint: Arc<E>,
    bucket: &str,
    prefix: &str,
    window: KeyWindow,
    page_size: usize,
    inserter: CacheInserter,
) -> Result<()> {
    let mut start_after = format!("{prefix}{}", window.start.to_key());
    let mut probe = true;

    loop {
        let max_keys = if probe { 1 } else { page_size };
        probe = false;

        let page = endpoint
            .list_page(bucket, prefix, Some(&start_after), max_keys)
            .await?;

        let Some(last_key) = page.objects.last().map(|object| object.key.clone()) else {
            break;
        };
        let staged = page.objects.len();
        inserter.insert(page.objects);
        trace!(start_after = %start_after, staged, "staged speculative page");

        if !page.truncated {
            break;
        }
        let relative = last_key.strip_prefix(prefix).unwrap_or(&last_key);
        if window.end <= KeyNumber::from_key(relative)? {
            break;
        }
        start_after = last_key;
    }

    Ok(())
}
