use clap::Parser;
use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;

use json2bib::{
    batch::{self, Summary},
    cli::Cli,
    fetch::HttpFetcher,
};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_level());

    let output = args.output_path(chrono::Utc::now());
    let fetcher = HttpFetcher::new(args.timeout());
    let summary = batch::run(
        &args.input,
        &output,
        &fetcher,
        args.policy(),
        args.show_progress(),
    )?;

    report(&summary);
    eprintln!("wrote {}", output.display());
    if !summary.failures.is_empty() {
        anyhow::bail!(
            "{} of {} URLs failed",
            summary.failures.len(),
            summary.failures.len() + summary.written
        );
    }
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(summary: &Summary) {
    let ok = format!("✓ {}", summary.written);
    let failed = format!("✗ {}", summary.failures.len());
    eprintln!(
        "{} {}",
        ok.if_supports_color(Stream::Stderr, |t| t.green()),
        failed.if_supports_color(Stream::Stderr, |t| t.red()),
    );
    for failure in &summary.failures {
        eprintln!(
            "  {} line {} {}: {:#}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            failure.line,
            failure.url,
            failure.error
        );
    }
}
