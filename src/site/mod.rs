// src/site/mod.rs
// =============================================================================
// Building the static site.
//
// Submodules:
// - session: the backend, poller, and output sink a run holds open
// - pipeline: fetch, transform, and write every page under a deadline
// - output: the destination directory and its optional zip mirror
// - style: the site stylesheet
// - index: the root package index
// =============================================================================

mod index;
mod output;
mod pipeline;
mod session;
mod style;

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub use pipeline::{Pipeline, PipelineStats};
pub use session::Session;

/// Summary of a finished run, printed as a table or as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub destination: PathBuf,
    pub archive: Option<PathBuf>,
    pub packages: usize,
    pub package_pages: usize,
    pub source_pages: usize,
    pub linked: usize,
    pub files_written: usize,
    pub elapsed_ms: u64,
}

impl SiteReport {
    pub fn new(
        destination: PathBuf,
        archive: Option<PathBuf>,
        packages: usize,
        stats: PipelineStats,
        files_written: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            destination,
            archive,
            packages,
            package_pages: stats.package_pages,
            source_pages: stats.source_pages,
            linked: stats.linked,
            files_written,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}
