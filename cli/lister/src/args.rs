//! CLI argument definitions for warplist.

use clap::{Parser, ValueEnum};
use tracing::Level;

/// Fast S3 prefix listing.
///
/// Lists every object under a bucket/prefix and writes one JSON object per
/// line to stdout. Once the first page proves the prefix is large, further
/// pages are fetched speculatively in parallel from guessed start points.
///
/// ## Examples
///
/// Basic usage:
///   warplist -b my-bucket -p logs/2024/
///
/// Against LocalStack, sequential paging only:
///   warplist -b my-bucket --s3-endpoint http://localhost:4566 --sequential
#[derive(Parser, Debug)]
#[command(name = "warplist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === S3 Configuration ===
    /// S3 bucket name
    #[arg(short, long, env = "WARPLIST_BUCKET")]
    pub bucket: String,

    /// Key prefix to list under
    #[arg(short, long, env = "WARPLIST_PREFIX", default_value = "")]
    pub prefix: String,

    /// Custom S3 endpoint URL (for LocalStack/MinIO)
    #[arg(long, env = "WARPLIST_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    // === Listing Options ===
    /// Maximum keys per listing request
    #[arg(long, default_value = "1000")]
    pub page_size: usize,

    /// Disable speculative parallel listing
    #[arg(long)]
    pub sequential: bool,

    /// Worker pool size for speculative listings
    #[arg(long, default_value = "10")]
    pub num_workers: usize,

    /// Sub-ranges scheduled per prefetch cycle
    #[arg(long, default_value = "10")]
    pub num_parallel_requests: usize,

    /// Window shrink factor in (0, 1]
    #[arg(long, default_value = "0.9")]
    pub shrink: f32,

    /// Stop after this many objects (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_objects: u64,

    // === Output Options ===
    /// Output format for stdout
    #[arg(long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,

    /// Log level (logs go to stderr)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

/// Output format for discovered objects.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line
    Jsonl,
    /// Bare keys, one per line
    Keys,
}

/// Logging verbosity.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
