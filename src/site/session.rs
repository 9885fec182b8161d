// src/site/session.rs
// =============================================================================
// Everything a run holds open: the backend process, the HTTP poller that
// talks to it, and the output sink the site is written to.
//
// Session::shutdown is the one teardown path. It stops the backend and
// finalizes the archive, and the caller runs it whether the pipeline
// succeeded or not. If the session is dropped without it (e.g. on Ctrl-C),
// the backend child is still killed on drop.
// =============================================================================

use std::path::PathBuf;
use tracing::debug;

use super::output::OutputSink;
use crate::backend::{Backend, Poller};
use crate::config::SiteConfig;
use crate::error::Result;

pub struct Session {
    pub backend: Backend,
    pub poller: Poller,
    pub output: OutputSink,
}

impl Session {
    /// Prepares the destination and the poller. The backend is not started
    /// until the pipeline asks for its first root.
    pub fn open(config: &SiteConfig) -> Result<Self> {
        let poller = Poller::new(&config.listen_address, config.timing.request_timeout)?;
        let output = OutputSink::create(&config.destination, config.zip.as_deref())?;
        let backend = Backend::new(
            config.backend.clone(),
            &config.listen_address,
            config.timing.warmup,
        );

        debug!(destination = %config.destination.display(), "session opened");
        Ok(Self {
            backend,
            poller,
            output,
        })
    }

    /// Stops the backend, then finishes the archive. Returns the archive
    /// path when one was written.
    pub async fn shutdown(mut self) -> Result<Option<PathBuf>> {
        self.backend.stop().await;
        self.output.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendMode;
    use crate::config::Timing;
    use crate::packages::Exclusions;

    fn config(address: &str, destination: &std::path::Path) -> SiteConfig {
        SiteConfig {
            listen_address: address.to_string(),
            site_name: "Docs".to_string(),
            description_html: None,
            footer_html: None,
            destination: destination.to_path_buf(),
            zip: Some("docs.zip".to_string()),
            link_index: false,
            exclusions: Exclusions::default(),
            packages: Vec::new(),
            backend: BackendMode::External,
            timing: Timing::default(),
            json: false,
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_backend_and_closes_archive() {
        let dest = tempfile::tempdir().unwrap();
        let mut session = Session::open(&config("127.0.0.1:9", dest.path())).unwrap();

        assert!(session.backend.serve_root(None).await.unwrap());
        session.output.write("x", "index.html", b"x").await.unwrap();

        let archive = session.shutdown().await.unwrap();
        assert_eq!(archive, Some(dest.path().join("docs.zip")));
        assert!(dest.path().join("docs.zip").is_file());
    }

    #[test]
    fn test_open_rejects_bad_address() {
        let dest = tempfile::tempdir().unwrap();
        let result = Session::open(&config("not a host:port", dest.path()));
        assert!(result.is_err());
    }
}
