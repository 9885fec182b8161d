// src/backend/mod.rs
// =============================================================================
// The documentation backend: the godoc process and the HTTP poller that
// scrapes it.
//
// Submodules:
// - process: start/stop/restart of godoc as an explicit state machine
// - poller: GET with retry until the backend serves a real page
// =============================================================================

mod poller;
mod process;

pub use poller::Poller;
pub use process::{Backend, BackendMode};

#[cfg(test)]
pub use poller::SCAN_INCOMPLETE;
