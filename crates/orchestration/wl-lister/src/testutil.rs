//! In-process listing endpoint for tests.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use wl_error::{ListError, Result};

use crate::endpoint::{ListEndpoint, ListPage};
use crate::ObjectSummary;

/// BTreeMap-backed endpoint with S3 `start_after` semantics, call counting
/// and optional failure injection.
pub(crate) struct MockEndpoint {
    objects: BTreeMap<String, ObjectSummary>,
    calls: AtomicUsize,
    /// Requests whose cursor is at or past this key fail with AccessDenied.
    deny_from: Option<String>,
}

impl MockEndpoint {
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let objects = keys
            .into_iter()
            .map(|key| {
                let key = key.into();
                let summary = ObjectSummary {
                    size: key.len() as u64,
                    key: key.clone(),
                    last_modified: None,
                    etag: Some(format!("\"etag-{key}\"")),
                };
                (key, summary)
            })
            .collect();
        Self {
            objects,
            calls: AtomicUsize::new(0),
            deny_from: None,
        }
    }

    pub fn deny_from(mut self, key: &str) -> Self {
        self.deny_from = Some(key.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListEndpoint for MockEndpoint {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: Option<&str>,
        max_keys: usize,
    ) -> Result<ListPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let cursor = start_after.unwrap_or("");
        if let Some(deny) = &self.deny_from {
            if cursor >= deny.as_str() {
                return Err(ListError::Endpoint {
                    bucket: bucket.to_string(),
                    prefix: prefix.to_string(),
                    code: "AccessDenied".to_string(),
                    name: "ServiceError".to_string(),
                    message: "injected failure".to_string(),
                });
            }
        }

        let mut matching = self
            .objects
            .range::<str, _>((Bound::Excluded(cursor), Bound::Unbounded))
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, object)| object.clone());

        let objects: Vec<ObjectSummary> = matching.by_ref().take(max_keys).collect();
        let truncated = matching.next().is_some();

        Ok(ListPage { objects, truncated })
    }
}
