// src/test_support.rs
// =============================================================================
// Test doubles shared by the unit tests.
//
// - FakeLister: a PackageLister answering from in-memory maps
// - MockBackend: an axum server standing in for godoc on 127.0.0.1
// - unreachable_address: a local address nothing is listening on
// =============================================================================

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::backend::SCAN_INCOMPLETE;
use crate::error::{Result, SiteError};
use crate::packages::PackageLister;

#[derive(Debug, Clone, Default)]
pub struct FakeLister {
    all: Vec<String>,
    dirs: HashMap<String, PathBuf>,
    sources: HashMap<String, Vec<String>>,
    synopses: HashMap<String, String>,
    // (identifier, root) of every synopsis request, in order
    synopsis_requests: Arc<Mutex<Vec<(String, Option<PathBuf>)>>>,
}

impl FakeLister {
    pub fn with_all(mut self, identifiers: &[&str]) -> Self {
        self.all = identifiers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_dir(mut self, identifier: &str, dir: &Path) -> Self {
        self.dirs.insert(identifier.to_string(), dir.to_path_buf());
        self
    }

    pub fn with_sources(mut self, identifier: &str, files: &[&str]) -> Self {
        self.sources.insert(
            identifier.to_string(),
            files.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_synopsis(mut self, identifier: &str, synopsis: &str) -> Self {
        self.synopses
            .insert(identifier.to_string(), synopsis.to_string());
        self
    }

    /// Root each synopsis was requested with, keyed by identifier.
    pub fn synopsis_roots(&self) -> HashMap<String, Option<PathBuf>> {
        self.synopsis_requests
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PackageLister for FakeLister {
    async fn all_packages(&self) -> Result<Vec<String>> {
        Ok(self.all.clone())
    }

    async fn package_dir(&self, identifier: &str) -> Result<Option<PathBuf>> {
        Ok(self.dirs.get(identifier).cloned())
    }

    async fn source_files(
        &self,
        identifier: &str,
        _root: Option<&Path>,
    ) -> Result<Option<Vec<String>>> {
        Ok(self.sources.get(identifier).cloned())
    }

    async fn synopsis(&self, identifier: &str, root: Option<&Path>) -> Result<String> {
        self.synopsis_requests
            .lock()
            .unwrap()
            .push((identifier.to_string(), root.map(Path::to_path_buf)));
        self.synopses
            .get(identifier)
            .cloned()
            .ok_or_else(|| SiteError::Listing(format!("no synopsis for {}", identifier)))
    }
}

#[derive(Clone, Default)]
struct MockState {
    pages: Arc<HashMap<String, String>>,
    indexing_rounds: Arc<AtomicUsize>,
    hits: Arc<AtomicUsize>,
}

#[derive(Default)]
pub struct MockBackendBuilder {
    pages: HashMap<String, String>,
    indexing_rounds: usize,
}

impl MockBackendBuilder {
    pub fn page(mut self, path: &str, body: &str) -> Self {
        self.pages.insert(path.to_string(), body.to_string());
        self
    }

    /// Answer this many requests with the "scan not complete" placeholder
    /// before serving real pages.
    pub fn indexing_rounds(mut self, rounds: usize) -> Self {
        self.indexing_rounds = rounds;
        self
    }

    pub async fn start(self) -> MockBackend {
        let state = MockState {
            pages: Arc::new(self.pages),
            indexing_rounds: Arc::new(AtomicUsize::new(self.indexing_rounds)),
            hits: Arc::new(AtomicUsize::new(0)),
        };
        let hits = state.hits.clone();

        let app = Router::new().fallback(serve_page).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend { address, hits }
    }
}

pub struct MockBackend {
    pub address: String,
    hits: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::default()
    }

    /// Requests served so far, placeholders included.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve_page(State(state): State<MockState>, uri: Uri) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let indexing = state
        .indexing_rounds
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if indexing {
        return format!(
            "<html><body><div>{} Please wait.</span></div></body></html>",
            SCAN_INCOMPLETE
        )
        .into_response();
    }

    match state.pages.get(uri.path()) {
        Some(body) => body.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A 127.0.0.1 address whose port was free a moment ago.
pub async fn unreachable_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}
