//! Fetch CSL-JSON citation metadata from URLs and render it as BibTeX `@article` entries.
//!
//! The pipeline is strictly linear: [`fetch`] turns a URL into a [`record::Record`],
//! [`entry::assemble`] turns a record into an [`entry::Entry`], and [`batch`] drives a whole URL
//! list into one output file.

pub mod batch;
pub mod cli;
pub mod entry;
pub mod error;
pub mod fetch;
pub mod field;
pub mod record;
