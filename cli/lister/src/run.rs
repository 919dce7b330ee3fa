//! Main execution logic for the warplist CLI.

use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use wl_lister::{
    create_s3_client, ListingConfig, ListingIterator, S3Config, S3Endpoint,
};

use crate::args::{Cli, LogLevel, OutputFormat};

/// Initialize logging on stderr, keeping stdout clean for listed objects.
///
/// `--log-level` sets the default; a `RUST_LOG` directive string takes
/// precedence when present, so individual modules can be turned up without
/// drowning the summary in SDK noise.
pub fn init_logging(level: LogLevel) -> Result<()> {
    let level: Level = level.into();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Counters for the completion summary.
#[derive(Debug, Default)]
pub struct ListingStats {
    pub objects: u64,
    pub bytes: u64,
    pub batches: u64,
    pub elapsed: Duration,
}

/// Execute the listing with the provided arguments.
pub async fn execute(args: Cli) -> Result<ListingStats> {
    let mut s3_config = S3Config::new(&args.bucket).with_region(&args.region);

    if !args.prefix.is_empty() {
        s3_config = s3_config.with_prefix(&args.prefix);
    }
    if let Some(endpoint) = &args.s3_endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }
    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        s3_config = s3_config.with_credentials(access_key, secret_key, None);
    }
    if let Some(profile) = &args.profile {
        s3_config = s3_config.with_profile(profile);
    }

    let client = create_s3_client(&s3_config).await;
    let endpoint = Arc::new(S3Endpoint::new(client));

    let config = ListingConfig::new()
        .with_list_object_keys_size(args.page_size)
        .with_use_parallel_listing(!args.sequential)
        .with_num_workers(args.num_workers)
        .with_num_parallel_requests(args.num_parallel_requests)
        .with_multiplication_length(args.shrink);

    let mut iterator =
        ListingIterator::new(endpoint, &args.bucket, &args.prefix, config)?;

    let started = Instant::now();
    let mut stats = ListingStats::default();
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut batch = Vec::new();

    'listing: loop {
        batch.clear();
        let more = iterator.next_batch(&mut batch).await?;
        if !batch.is_empty() {
            stats.batches += 1;
        }
        for object in batch.drain(..) {
            match args.format {
                OutputFormat::Jsonl => {
                    serde_json::to_writer(&mut out, &object)?;
                    out.write_all(b"\n")?;
                }
                OutputFormat::Keys => {
                    out.write_all(object.key.as_bytes())?;
                    out.write_all(b"\n")?;
                }
            }
            stats.objects += 1;
            stats.bytes += object.size;
            if args.max_objects > 0 && stats.objects >= args.max_objects {
                break 'listing;
            }
        }
        if !more {
            break;
        }
    }
    out.flush()?;

    stats.elapsed = started.elapsed();
    Ok(stats)
}

/// Format bytes as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64;
    let mut unit = "";
    for candidate in UNITS {
        value /= 1024.0;
        unit = candidate;
        if value < 1024.0 {
            break;
        }
    }
    format!("{value:.2} {unit}")
}
