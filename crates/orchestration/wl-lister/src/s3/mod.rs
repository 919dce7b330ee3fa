//! S3 implementation of the listing endpoint.

mod client;

pub use client::{create_s3_client, S3Config};

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::Client;
use chrono::DateTime;
use wl_error::{ListError, Result};

use crate::endpoint::{ListEndpoint, ListPage};
use crate::ObjectSummary;

/// [`ListEndpoint`] backed by `ListObjectsV2`.
///
/// Pagination goes through `start_after` rather than continuation tokens so
/// that speculative workers can begin a listing at an arbitrary key.
#[derive(Debug, Clone)]
pub struct S3Endpoint {
    client: Client,
}

impl S3Endpoint {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListEndpoint for S3Endpoint {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: Option<&str>,
        max_keys: usize,
    ) -> Result<ListPage> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys as i32);

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(start_after) = start_after.filter(|cursor| !cursor.is_empty()) {
            request = request.start_after(start_after);
        }

        let response = request
            .send()
            .await
            .map_err(|e| endpoint_error(bucket, prefix, &e))?;

        let objects = response
            .contents
            .unwrap_or_default()
            .into_iter()
            .map(|object| ObjectSummary {
                key: object.key.unwrap_or_default(),
                size: object.size.unwrap_or(0) as u64,
                last_modified: object
                    .last_modified
                    .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                etag: object.e_tag,
            })
            .collect();

        Ok(ListPage {
            objects,
            truncated: response.is_truncated == Some(true),
        })
    }
}

fn endpoint_error<E, R>(bucket: &str, prefix: &str, error: &SdkError<E, R>) -> ListError
where
    E: ProvideErrorMetadata,
{
    let name = match error {
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        SdkError::ServiceError(_) => "ServiceError",
        _ => "Unknown",
    };
    let code = error.code().unwrap_or("Unknown").to_string();
    let message = error
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());

    ListError::Endpoint {
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
        code,
        name: name.to_string(),
        message,
    }
}
