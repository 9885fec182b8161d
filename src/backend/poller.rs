// src/backend/poller.rs
// =============================================================================
// Fetches pages from the documentation backend, waiting for it to be ready.
//
// godoc accepts connections before it can answer them: right after start-up
// requests are refused, and for a while after that it serves a placeholder
// page saying its package scan is not complete. The poller keeps asking
// until it gets a real page:
//
// - network error (refused, reset, per-request timeout): retry immediately
// - "still indexing" response: sleep briefly, then retry
// - anything else: return the body
//
// There is no overall deadline in here. Callers race fetches against their
// own deadline and drop the future when it fires.
// =============================================================================

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Result, SiteError};

/// Placeholder godoc renders while its package scan is still running.
pub const SCAN_INCOMPLETE: &str =
    r#"<span class="alert" style="font-size:120%">Scan is not yet complete."#;

const INDEXING_RETRY_DELAY: Duration = Duration::from_millis(25);

/// What a single backend response amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResponse {
    Ready(String),
    Indexing,
}

/// Classifies a response body. A 503 or the scan placeholder both mean the
/// backend has not finished indexing.
pub fn classify(status: StatusCode, body: String) -> BackendResponse {
    if status == StatusCode::SERVICE_UNAVAILABLE || body.contains(SCAN_INCOMPLETE) {
        BackendResponse::Indexing
    } else {
        BackendResponse::Ready(body)
    }
}

#[derive(Debug, Clone)]
pub struct Poller {
    client: Client,
    base: Url,
}

impl Poller {
    pub fn new(listen_address: &str, request_timeout: Duration) -> Result<Self> {
        let address = format!("http://{}/", listen_address);
        let base = Url::parse(&address).map_err(|source| SiteError::BadAddress {
            address: listen_address.to_string(),
            source,
        })?;

        // One client for the whole run so connections are reused
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|source| SiteError::Fetch {
                path: address.clone(),
                source,
            })?;

        Ok(Self { client, base })
    }

    pub fn url_for(&self, path: &str) -> Result<Url> {
        // Url::join replaces the whole path on a leading slash, so strip it
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|source| SiteError::BadAddress {
                address: format!("{}{}", self.base, path.trim_start_matches('/')),
                source,
            })
    }

    /// Fetches `path` (e.g. "/pkg/fmt/"), retrying until the backend
    /// returns a real page.
    pub async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path)?;
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;

            let response = match self.client.get(url.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    trace!(%url, attempts, "backend not reachable yet: {}", e);
                    // Connection refused can resolve without ever yielding;
                    // give the caller's deadline a chance to fire.
                    tokio::task::yield_now().await;
                    continue;
                }
            };

            // Headers arrived, but the body can still stall
            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) if e.is_timeout() => {
                    trace!(%url, attempts, "timed out reading body, retrying");
                    continue;
                }
                Err(source) => {
                    return Err(SiteError::Fetch {
                        path: path.to_string(),
                        source,
                    })
                }
            };

            match classify(status, body) {
                BackendResponse::Ready(body) => {
                    if !status.is_success() {
                        debug!(%url, %status, "backend answered with an error page");
                    }
                    trace!(%url, attempts, bytes = body.len(), "fetched page");
                    return Ok(body);
                }
                BackendResponse::Indexing => {
                    trace!(%url, attempts, "backend still indexing");
                    tokio::time::sleep(INDEXING_RETRY_DELAY).await;
                }
            }
        }
    }
}
