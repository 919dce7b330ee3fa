//! Listing integration tests using LocalStack.
//!
//! Verifies that parallel and sequential listing agree on a real endpoint.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::common::LocalStackTestContext;
use wl_lister::{list_all, ListingConfig, ListingIterator, ObjectSummary, S3Endpoint};

async fn collect(
    endpoint: Arc<S3Endpoint>,
    bucket: &str,
    prefix: &str,
    config: ListingConfig,
) -> Vec<ObjectSummary> {
    let mut iterator = ListingIterator::new(endpoint, bucket, prefix, config).unwrap();
    let mut all = Vec::new();
    loop {
        let mut batch = Vec::new();
        let more = iterator.next_batch(&mut batch).await.unwrap();
        all.extend(batch);
        if !more {
            return all;
        }
    }
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_parallel_and_sequential_listing_agree() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "test-warplist-parity";
    ctx.create_bucket(bucket).await.unwrap();

    // enough keys for several pages at the configured page size
    for i in 0..120 {
        ctx.put_object(bucket, &format!("data{i:04}", i = i * 7))
            .await
            .unwrap();
    }

    let endpoint = Arc::new(S3Endpoint::new(ctx.s3.clone()));

    let sequential = collect(
        Arc::clone(&endpoint),
        bucket,
        "data",
        ListingConfig::new()
            .with_list_object_keys_size(25)
            .with_use_parallel_listing(false),
    )
    .await;

    let parallel = collect(
        Arc::clone(&endpoint),
        bucket,
        "data",
        ListingConfig::new()
            .with_list_object_keys_size(25)
            .with_num_workers(4)
            .with_num_parallel_requests(4),
    )
    .await;

    assert_eq!(sequential.len(), 120);

    let sequential_keys: BTreeSet<String> =
        sequential.into_iter().map(|o| o.key).collect();
    let parallel_keys: Vec<String> = parallel.into_iter().map(|o| o.key).collect();
    let parallel_set: BTreeSet<String> = parallel_keys.iter().cloned().collect();

    assert_eq!(
        parallel_set.len(),
        parallel_keys.len(),
        "parallel listing emitted duplicates"
    );
    assert_eq!(sequential_keys, parallel_set);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_list_all_bounded() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "test-warplist-list-all";
    ctx.create_bucket(bucket).await.unwrap();
    for i in 0..30 {
        ctx.put_object(bucket, &format!("item{i:03}")).await.unwrap();
    }

    let endpoint = S3Endpoint::new(ctx.s3.clone());
    let bounded = list_all(&endpoint, bucket, "item", 10).await.unwrap();
    assert_eq!(bounded.len(), 10);

    let everything = list_all(&endpoint, bucket, "item", 0).await.unwrap();
    assert_eq!(everything.len(), 30);
    assert!(everything.iter().all(|o| o.etag.is_some()));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_bucket_is_classified() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let endpoint = S3Endpoint::new(ctx.s3.clone());
    let err = list_all(&endpoint, "warplist-no-such-bucket", "", 0)
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}
