//! Listing configuration.

use serde::{Deserialize, Serialize};
use wl_error::{ListError, Result};

/// Tunables for one listing iteration. Captured at iterator construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Maximum keys requested per endpoint call.
    pub list_object_keys_size: usize,

    /// Master switch; when false the iterator degrades to pure sequential
    /// paging.
    pub use_parallel_listing: bool,

    /// Size of the per-iterator worker pool.
    pub num_workers: usize,

    /// How many sub-ranges one prefetch cycle schedules. Excess over
    /// `num_workers` queues on the pool.
    pub num_parallel_requests: usize,

    /// Shrink factor applied to the observed key density when sizing
    /// sub-range windows. Below 1.0 trades inter-window gaps (patched by
    /// live paging) against deep overlap (wasted quota).
    pub multiplication_length: f32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            list_object_keys_size: 1000,
            use_parallel_listing: true,
            num_workers: 10,
            num_parallel_requests: 10,
            multiplication_length: 0.9,
        }
    }
}

impl ListingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum keys per endpoint call.
    pub fn with_list_object_keys_size(mut self, size: usize) -> Self {
        self.list_object_keys_size = size;
        self
    }

    /// Enable or disable parallel listing.
    pub fn with_use_parallel_listing(mut self, enabled: bool) -> Self {
        self.use_parallel_listing = enabled;
        self
    }

    /// Set the worker pool size.
    pub fn with_num_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    /// Set the number of sub-ranges per prefetch cycle.
    pub fn with_num_parallel_requests(mut self, requests: usize) -> Self {
        self.num_parallel_requests = requests;
        self
    }

    /// Set the shrink factor.
    pub fn with_multiplication_length(mut self, factor: f32) -> Self {
        self.multiplication_length = factor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.list_object_keys_size == 0 {
            return Err(ListError::Config(
                "list_object_keys_size must be positive".to_string(),
            ));
        }
        if self.use_parallel_listing {
            if self.num_workers == 0 {
                return Err(ListError::Config("num_workers must be positive".to_string()));
            }
            if self.num_parallel_requests == 0 {
                return Err(ListError::Config(
                    "num_parallel_requests must be positive".to_string(),
                ));
            }
            if !(self.multiplication_length > 0.0 && self.multiplication_length <= 1.0) {
                return Err(ListError::Config(format!(
                    "multiplication_length must be in (0, 1], got {}",
                    self.multiplication_length
                )));
            }
        }
        Ok(())
    }
}
