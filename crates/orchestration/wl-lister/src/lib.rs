//! wl-lister - parallel prefix-range listing accelerator for S3.
//!
//! `ListObjectsV2` is strictly sequential: each response carries at most one
//! bounded page and the next request must resume from the last returned key.
//! Enumerating millions of keys serialises into hundreds of round trips at
//! ~100ms each. The request does accept an arbitrary `start_after` key
//! though, so when key density is roughly uniform, future pages can be
//! fetched speculatively in parallel from guessed start points and staged in
//! an ordered client-side cache that the sequential iterator drains.
//!
//! This crate provides:
//!
//! - Base-64 key-space arithmetic for computing speculative start points
//! - An ordered cache filled concurrently and drained deterministically
//! - Sub-range workers that tolerate window overlap and under-coverage
//! - A batched [`ListingIterator`] (with a `Stream` adapter) that interleaves
//!   live paging with cache drains
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wl_lister::{create_s3_client, ListingConfig, ListingIterator, S3Config, S3Endpoint};
//!
//! let client = create_s3_client(&S3Config::new("my-bucket")).await;
//! let endpoint = Arc::new(S3Endpoint::new(client));
//!
//! let mut iterator = ListingIterator::new(
//!     endpoint,
//!     "my-bucket",
//!     "logs/2024/",
//!     ListingConfig::new().with_num_parallel_requests(16),
//! )?;
//!
//! let mut batch = Vec::new();
//! while iterator.next_batch(&mut batch).await? {
//!     for object in batch.drain(..) {
//!         println!("{} ({} bytes)", object.key, object.size);
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod config;
pub mod endpoint;
pub mod iterator;
pub mod keymath;
mod planner;
pub mod s3;
mod subrange;
#[cfg(test)]
mod testutil;

pub use config::ListingConfig;
pub use endpoint::{list_all, ListEndpoint, ListPage};
pub use iterator::ListingIterator;
pub use keymath::KeyNumber;
pub use s3::{create_s3_client, S3Config, S3Endpoint};

/// One listed object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// The object key (full path within the bucket)
    pub key: String,

    /// Size of the object in bytes
    pub size: u64,

    /// Last modified timestamp (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    /// Entity tag as returned by the store (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}
