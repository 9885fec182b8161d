// src/backend/process.rs
// =============================================================================
// Owns the godoc process the site is scraped from.
//
// godoc serves module packages relative to the directory it was started in,
// so a run documenting several module roots has to restart it between them.
// That is modelled as a small state machine:
//
//   Stopped --serve_root(R)--> Starting(R) --wait_ready--> Ready(R)
//   Starting(R) / Ready(R) --serve_root(S), S != R--> Starting(S)
//
// serve_root is the only transition that can restart the process, and it
// only does so when the requested root differs from the current one.
//
// In External mode nothing is spawned: the backend is assumed to already be
// listening, and the state machine only tracks which root was asked for.
//
// Rust concepts used:
// - enums with data: each state carries exactly what is known in that state
// - Option<Child>: the process handle exists only while something runs
// - kill_on_drop: if the Backend is dropped early, tokio kills the child
// =============================================================================

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Result, SiteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    /// Spawn and manage `<program> -http=<listen address>`
    Managed { program: String },
    /// Use a server someone else started
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendState {
    Stopped,
    Starting { root: Option<PathBuf>, since: Instant },
    Ready { root: Option<PathBuf> },
}

impl BackendState {
    // Outer None: nothing running. Inner None: running in the neutral dir.
    fn root(&self) -> Option<Option<&Path>> {
        match self {
            BackendState::Stopped => None,
            BackendState::Starting { root, .. } | BackendState::Ready { root } => {
                Some(root.as_deref())
            }
        }
    }
}

#[derive(Debug)]
pub struct Backend {
    mode: BackendMode,
    listen_address: String,
    warmup: Duration,
    state: BackendState,
    child: Option<Child>,
}

impl Backend {
    pub fn new(mode: BackendMode, listen_address: &str, warmup: Duration) -> Self {
        Self {
            mode,
            listen_address: listen_address.to_string(),
            warmup,
            state: BackendState::Stopped,
            child: None,
        }
    }

    pub fn state(&self) -> &BackendState {
        &self.state
    }

    /// Makes sure the backend serves packages from `root`.
    ///
    /// Returns true when the backend had to be (re)started.
    pub async fn serve_root(&mut self, root: Option<&Path>) -> Result<bool> {
        // Already serving this root, keep the warm process
        if self.state.root() == Some(root) {
            return Ok(false);
        }

        // Only one godoc can hold the listen address
        self.stop().await;

        if let BackendMode::Managed { program } = &self.mode {
            let dir = root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
            info!(%program, dir = %dir.display(), address = %self.listen_address, "starting documentation backend");

            // Output is discarded; a dead backend is noticed by `exited`
            let child = Command::new(program)
                .arg(format!("-http={}", self.listen_address))
                .env("GO111MODULE", "auto")
                .current_dir(&dir)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| SiteError::BackendStart {
                    program: program.clone(),
                    source,
                })?;
            self.child = Some(child);
        } else {
            debug!(root = ?root, "using external documentation backend");
        }

        self.state = BackendState::Starting {
            root: root.map(Path::to_path_buf),
            since: Instant::now(),
        };
        Ok(true)
    }

    /// Sleeps out whatever is left of the warm-up period, then marks the
    /// backend ready. Does nothing unless the backend is starting.
    ///
    /// Fails if a managed process already exited during warm-up.
    pub async fn wait_ready(&mut self) -> Result<()> {
        if let BackendState::Starting { root, since } = &self.state {
            let root = root.clone();
            let ready_at = *since + self.warmup;
            if ready_at > Instant::now() {
                debug!(remaining = ?(ready_at - Instant::now()), "waiting for backend warm-up");
                tokio::time::sleep_until(ready_at).await;
            }

            // try_wait never blocks: Some(status) means it is already gone
            if let Some(child) = &mut self.child {
                if let Ok(Some(status)) = child.try_wait() {
                    return Err(self.exited_with(status));
                }
            }
            self.state = BackendState::Ready { root };
        }
        Ok(())
    }

    /// Resolves only when a managed backend process exits, returning the
    /// error that describes it. Never resolves in External mode or while
    /// nothing is running.
    ///
    /// Waiting on the child is cancel safe, so this can be raced against
    /// a fetch.
    pub async fn exited(&mut self) -> SiteError {
        let status = match &mut self.child {
            Some(child) => child.wait().await,
            // Nothing to watch; let the other branch of the race win
            None => std::future::pending().await,
        };

        match status {
            Ok(status) => self.exited_with(status),
            Err(source) => {
                let program = self.program().to_string();
                self.child = None;
                self.state = BackendState::Stopped;
                SiteError::BackendStart { program, source }
            }
        }
    }

    fn exited_with(&mut self, status: ExitStatus) -> SiteError {
        warn!(%status, "documentation backend exited");
        self.child = None;
        self.state = BackendState::Stopped;
        SiteError::BackendExited {
            program: self.program().to_string(),
            status,
        }
    }

    fn program(&self) -> &str {
        match &self.mode {
            BackendMode::Managed { program } => program,
            BackendMode::External => "external backend",
        }
    }

    /// Kills the backend process, if one is running.
    pub async fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!("failed to stop documentation backend: {}", e);
            }
        }
        self.state = BackendState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external(warmup: Duration) -> Backend {
        Backend::new(BackendMode::External, "127.0.0.1:9", warmup)
    }

    #[tokio::test]
    async fn test_restart_only_when_root_changes() {
        let mut backend = external(Duration::ZERO);
        assert_eq!(backend.state(), &BackendState::Stopped);

        assert!(backend.serve_root(None).await.unwrap());
        assert!(!backend.serve_root(None).await.unwrap());

        backend.wait_ready().await.unwrap();
        assert_eq!(backend.state(), &BackendState::Ready { root: None });
        assert!(!backend.serve_root(None).await.unwrap());

        let root = PathBuf::from("/tmp/module");
        assert!(backend.serve_root(Some(&root)).await.unwrap());
        assert!(matches!(backend.state(), BackendState::Starting { root: Some(r), .. } if r == &root));
        assert!(!backend.serve_root(Some(&root)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ready_sleeps_only_the_remainder() {
        let mut backend = external(Duration::from_secs(3));
        backend.serve_root(None).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        let before = Instant::now();
        backend.wait_ready().await.unwrap();
        assert_eq!(Instant::now() - before, Duration::from_secs(1));

        // already ready: no further sleeping
        let before = Instant::now();
        backend.wait_ready().await.unwrap();
        assert_eq!(Instant::now() - before, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_stop_resets_state() {
        let mut backend = external(Duration::ZERO);
        backend.serve_root(None).await.unwrap();
        backend.stop().await;
        assert_eq!(backend.state(), &BackendState::Stopped);
        assert!(backend.serve_root(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_program_is_a_start_error() {
        let mut backend = Backend::new(
            BackendMode::Managed {
                program: "definitely-not-a-real-godoc-binary".to_string(),
            },
            "127.0.0.1:9",
            Duration::ZERO,
        );
        let result = backend.serve_root(None).await;
        assert!(matches!(result, Err(SiteError::BackendStart { .. })));
        assert_eq!(backend.state(), &BackendState::Stopped);
    }

    fn exits_immediately(warmup: Duration) -> Backend {
        // `false` ignores its arguments and exits with status 1
        Backend::new(
            BackendMode::Managed {
                program: "false".to_string(),
            },
            "127.0.0.1:9",
            warmup,
        )
    }

    #[tokio::test]
    async fn test_early_exit_is_reported() {
        let mut backend = exits_immediately(Duration::ZERO);
        assert!(backend.serve_root(None).await.unwrap());

        let err = tokio::time::timeout(Duration::from_secs(5), backend.exited())
            .await
            .expect("backend should exit on its own");
        match err {
            SiteError::BackendExited { program, status } => {
                assert_eq!(program, "false");
                assert!(!status.success());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.state(), &BackendState::Stopped);
    }

    #[tokio::test]
    async fn test_wait_ready_notices_exit_during_warmup() {
        let mut backend = exits_immediately(Duration::from_millis(500));
        backend.serve_root(None).await.unwrap();

        let result = backend.wait_ready().await;
        assert!(matches!(result, Err(SiteError::BackendExited { .. })));
        assert_eq!(backend.state(), &BackendState::Stopped);
    }

    #[tokio::test]
    async fn test_external_backend_never_exits() {
        let mut backend = external(Duration::ZERO);
        backend.serve_root(None).await.unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(50), backend.exited()).await;
        assert!(waited.is_err());
    }
}
