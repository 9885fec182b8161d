// src/error.rs
// =============================================================================
// Every way a site generation run can fail.
//
// Modules below the top-level run function return SiteError so the caller can
// tell a timeout apart from a transform bug or a filesystem problem. The entry
// point (main.rs) wraps these in anyhow with extra context and decides the
// exit code.
//
// Categories:
// - Configuration: MissingDestination, NoPackages, ReadInput, InvalidModule
// - Backend: BackendStart, BadAddress, Timeout, Fetch
// - Page production: Transform, Write, Archive
// - Collaborator: Listing
// =============================================================================

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Which stage of the run a deadline was guarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PackageDocs,
    SourceFiles,
    Stylesheet,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PackageDocs => write!(f, "package documentation"),
            Phase::SourceFiles => write!(f, "source files"),
            Phase::Stylesheet => write!(f, "stylesheet"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("--destination must be set")]
    MissingDestination,

    #[error("failed to generate docs: provide the name of at least one package to generate documentation for")]
    NoPackages,

    #[error("failed to read {what} file {}: {source}", .path.display())]
    ReadInput {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mod file {}: no module directive", .path.display())]
    InvalidModule { path: PathBuf },

    #[error("failed to start documentation backend `{program}`: {source}\ninstall godoc by running: go install golang.org/x/tools/cmd/godoc@latest")]
    BackendStart {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("documentation backend `{program}` exited early ({status}); is another server already using the listen address?")]
    BackendExited {
        program: String,
        status: std::process::ExitStatus,
    },

    #[error("invalid backend address {address}: {source}")]
    BadAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("documentation backend failed to respond in time ({phase} not finished after {after:?})")]
    Timeout { phase: Phase, after: Duration },

    #[error("failed to get page {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to transform page {path}: {message}")]
    Transform { path: String, message: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write archive entry {name}: {source}")]
    Archive {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to list packages: {0}")]
    Listing(String),
}

impl SiteError {
    /// True when the backend never produced a page before a deadline fired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SiteError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinguishable() {
        let timeout = SiteError::Timeout {
            phase: Phase::PackageDocs,
            after: Duration::from_secs(15),
        };
        assert!(timeout.is_timeout());
        assert!(timeout.to_string().contains("failed to respond in time"));

        let transform = SiteError::Transform {
            path: "/pkg/x/".to_string(),
            message: "bad markup".to_string(),
        };
        assert!(!transform.is_timeout());
    }
}
