//! warplist CLI
//!
//! Fast S3 prefix listing with speculative parallel paging.

use clap::Parser;

mod args;
mod run;

use args::Cli;
use run::format_bytes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr; stdout carries the listed objects
    run::init_logging(args.log_level)?;

    let stats = run::execute(args).await?;

    eprintln!();
    eprintln!("Listing completed:");
    eprintln!("  Objects:  {}", stats.objects);
    eprintln!("  Bytes:    {}", format_bytes(stats.bytes));
    eprintln!("  Batches:  {}", stats.batches);
    let secs = stats.elapsed.as_secs_f64();
    eprintln!("  Duration: {secs:.2}s");
    if secs > 0.0 {
        eprintln!("  Throughput: {:.1} objects/sec", stats.objects as f64 / secs);
    }

    Ok(())
}
