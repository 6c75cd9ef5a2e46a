use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser};

use crate::batch::ErrorPolicy;

/// Convert citation metadata fetched from a list of URLs into BibTeX `@article` entries.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File with one citation-metadata URL per line
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the BibTeX entries [default: bibtex_<UTC timestamp>.bib]
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Per-request timeout in seconds, 0 to disable
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Skip URLs that fail instead of aborting the whole batch
    #[arg(long)]
    pub keep_going: bool,

    /// Increase logging verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The requested output path, or a timestamped default in the working directory.
    pub fn output_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(now))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    pub fn policy(&self) -> ErrorPolicy {
        if self.keep_going {
            ErrorPolicy::Isolate
        } else {
            ErrorPolicy::Abort
        }
    }

    /// The progress bar shares stderr with log output, so it is only drawn at default verbosity.
    pub fn show_progress(&self) -> bool {
        self.verbose == 0
    }

    /// Default tracing filter directive for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn default_output_path(now: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!("bibtex_{}.bib", now.format("%Y%m%dT%H%M%S%.6fZ")))
}
