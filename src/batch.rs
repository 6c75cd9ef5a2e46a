use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{entry, fetch::Fetch};

/// What to do when one URL cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failure. Entries written so far stay in the output.
    #[default]
    Abort,
    /// Log the failure, skip the URL and carry on.
    Isolate,
}

/// A URL that was skipped under [`ErrorPolicy::Isolate`].
#[derive(Debug)]
pub struct Failure {
    /// 1-based line number in the input file.
    pub line: usize,
    pub url: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub written: usize,
    pub failures: Vec<Failure>,
}

/// Read the URL list, one URL per line.
pub fn read_urls(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read URL list {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Convert every URL listed in `input` and write the entries to `output`.
///
/// The output file is truncated up front and held open until all URLs have been processed.
/// `show_progress` draws a progress bar on stderr; leave it off while log lines go there too.
pub fn run<F: Fetch>(
    input: &Path,
    output: &Path,
    fetcher: &F,
    policy: ErrorPolicy,
    show_progress: bool,
) -> anyhow::Result<Summary> {
    let urls = read_urls(input)?;
    let file = File::create(output)
        .with_context(|| format!("failed to create output file {}", output.display()))?;
    let mut out = BufWriter::new(file);

    let progress = progress_bar(urls.len(), show_progress);
    let summary = convert_all(&urls, fetcher, &mut out, policy, &progress);
    progress.finish_and_clear();
    let summary = summary?;

    out.flush()
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        output = %output.display(),
        written = summary.written,
        failed = summary.failures.len(),
        "batch finished"
    );
    Ok(summary)
}

/// Fetch, assemble and write each URL in order. Every entry is followed by a blank line and
/// flushed before the next URL is fetched.
pub fn convert_all<F: Fetch, W: Write>(
    urls: &[String],
    fetcher: &F,
    out: &mut W,
    policy: ErrorPolicy,
    progress: &ProgressBar,
) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();
    for (idx, url) in urls.iter().enumerate() {
        let line = idx + 1;
        let url = url.trim();
        progress.set_message(url.to_string());

        match convert_one(url, fetcher) {
            Ok(entry) => {
                out.write_all(entry.as_str().as_bytes())
                    .and_then(|()| out.write_all(b"\n"))
                    .and_then(|()| out.flush())
                    .context("failed to write entry")?;
                tracing::debug!(line, label = entry.label(), "entry written");
                summary.written += 1;
            }
            Err(error) => match policy {
                ErrorPolicy::Abort => {
                    return Err(error.context(format!("line {line}: {url}")));
                }
                ErrorPolicy::Isolate => {
                    tracing::error!(line, url, "skipping: {error:#}");
                    summary.failures.push(Failure {
                        line,
                        url: url.to_string(),
                        error,
                    });
                }
            },
        }
        progress.inc(1);
    }
    Ok(summary)
}

fn convert_one<F: Fetch>(url: &str, fetcher: &F) -> anyhow::Result<entry::Entry> {
    let record = fetcher.fetch(url)?;
    Ok(entry::assemble(&record)?)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }
    bar
}
