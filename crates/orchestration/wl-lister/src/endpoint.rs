//! The listing endpoint seam.
//!
//! Everything above this trait is endpoint-agnostic; the S3 implementation
//! lives in [`crate::s3`], and tests substitute an in-process mock.

use async_trait::async_trait;
use wl_error::Result;

use crate::ObjectSummary;

/// One page of a listing response.
#[derive(Debug, Clone)]
pub struct ListPage {
    /// Objects in ascending key order, as the store returns them.
    pub objects: Vec<ObjectSummary>,
    /// Whether further keys exist beyond this page.
    pub truncated: bool,
}

/// A paged, start-after-addressable listing endpoint.
///
/// `start_after` is an exclusive cursor: only keys strictly greater than it
/// are returned. The endpoint must be safe to call from many tasks at once.
#[async_trait]
pub trait ListEndpoint: Send + Sync {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: Option<&str>,
        max_keys: usize,
    ) -> Result<ListPage>;
}

/// Sequentially collect up to `max_keys` objects under a prefix.
///
/// A one-shot convenience for callers that want a `Vec` rather than an
/// iterator; `max_keys == 0` means unbounded.
pub async fn list_all<E: ListEndpoint + ?Sized>(
    endpoint: &E,
    bucket: &str,
    prefix: &str,
    max_keys: usize,
) -> Result<Vec<ObjectSummary>> {
    const PAGE_SIZE: usize = 1000;

    let mut children: Vec<ObjectSummary> = Vec::new();
    let mut start_after: Option<String> = None;

    loop {
        let page_size = if max_keys > 0 {
            (max_keys - children.len()).min(PAGE_SIZE)
        } else {
            PAGE_SIZE
        };
        let page = endpoint
            .list_page(bucket, prefix, start_after.as_deref(), page_size)
            .await?;

        let Some(last) = page.objects.last() else {
            break;
        };
        start_after = Some(last.key.clone());
        children.extend(page.objects);

        if max_keys > 0 && children.len() >= max_keys {
            break;
        }
        if !page.truncated {
            break;
        }
    }

    Ok(children)
}
