// src/packages/lister.rs
// =============================================================================
// The package-listing collaborator.
//
// The pipeline needs three facts about a package that only the Go toolchain
// knows: where it lives on disk, which source files it has, and its one-line
// documentation synopsis. They sit behind the PackageLister trait so the
// pipeline can be driven by a fake in tests.
//
// GoList answers them by running `go list -find`.
// =============================================================================

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SiteError};

// #[async_trait] lets a trait have async methods and still be used as
// `&dyn PackageLister`
#[async_trait]
pub trait PackageLister: Send + Sync {
    /// Every package the toolchain knows about. Used when no packages are given.
    async fn all_packages(&self) -> Result<Vec<String>>;

    /// Directory holding the package's source, if it can be found.
    async fn package_dir(&self, identifier: &str) -> Result<Option<PathBuf>>;

    /// Source file names of a package, searched from `root` when given.
    ///
    /// Ok(None) means the package has no source listing, which is normal.
    async fn source_files(&self, identifier: &str, root: Option<&Path>)
        -> Result<Option<Vec<String>>>;

    /// One-line documentation synopsis, looked up from `root` when given.
    /// Module packages only resolve from inside their module.
    async fn synopsis(&self, identifier: &str, root: Option<&Path>) -> Result<String>;
}

// Every file category `go list` reports, one name per line
const SOURCE_FILES_TEMPLATE: &str = concat!(
    "{{ join .GoFiles \"\\n\" }}\n",
    "{{ join .CgoFiles \"\\n\" }}\n",
    "{{ join .CFiles \"\\n\" }}\n",
    "{{ join .CXXFiles \"\\n\" }}\n",
    "{{ join .MFiles \"\\n\" }}\n",
    "{{ join .HFiles \"\\n\" }}\n",
    "{{ join .FFiles \"\\n\" }}\n",
    "{{ join .SFiles \"\\n\" }}\n",
    "{{ join .SwigFiles \"\\n\" }}\n",
    "{{ join .SwigCXXFiles \"\\n\" }}\n",
    "{{ join .TestGoFiles \"\\n\" }}\n",
    "{{ join .XTestGoFiles \"\\n\" }}",
);

/// Lists packages with the `go` command.
#[derive(Debug, Clone)]
pub struct GoList {
    program: String,
    go_path: PathBuf,
}

impl GoList {
    pub fn new() -> Self {
        Self {
            program: "go".to_string(),
            go_path: default_go_path(),
        }
    }

    // Runs `go` with module mode on auto, the way godoc expects to find
    // both GOPATH and module packages.
    async fn go(&self, args: &[&str], dir: Option<&Path>) -> std::io::Result<Option<String>> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .env("GO111MODULE", "auto")
            .current_dir(dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // A failing `go list` is an answer ("not found"), not an error
        let output = command.output().await?;
        if !output.status.success() {
            debug!(?args, status = %output.status, "go list exited unsuccessfully");
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

impl Default for GoList {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageLister for GoList {
    async fn all_packages(&self) -> Result<Vec<String>> {
        let listing = self
            .go(&["list", "..."], None)
            .await
            .map_err(|e| SiteError::Listing(format!("failed to list system packages: {}", e)))?
            .ok_or_else(|| SiteError::Listing("failed to list system packages".to_string()))?;

        Ok(non_empty_lines(&listing))
    }

    async fn package_dir(&self, identifier: &str) -> Result<Option<PathBuf>> {
        // GOPATH layout first, it needs no subprocess
        let src_dir = self.go_path.join("src").join(identifier);
        if src_dir.is_dir() {
            return Ok(Some(src_dir));
        }

        let listing = self
            .go(&["list", "-find", "-f", "{{ .Dir }}", identifier], None)
            .await
            .map_err(|e| SiteError::Listing(format!("failed to locate {}: {}", identifier, e)))?;

        Ok(listing
            .and_then(|out| non_empty_lines(&out).into_iter().next())
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir()))
    }

    async fn source_files(
        &self,
        identifier: &str,
        root: Option<&Path>,
    ) -> Result<Option<Vec<String>>> {
        let listing = self
            .go(&["list", "-find", "-f", SOURCE_FILES_TEMPLATE, identifier], root)
            .await
            .map_err(|e| SiteError::Listing(format!("failed to list sources of {}: {}", identifier, e)))?;

        Ok(listing.map(|out| non_empty_lines(&out)))
    }

    async fn synopsis(&self, identifier: &str, root: Option<&Path>) -> Result<String> {
        let listing = self
            .go(&["list", "-find", "-f", "{{ .Doc }}", identifier], root)
            .await
            .map_err(|e| SiteError::Listing(format!("failed to read synopsis of {}: {}", identifier, e)))?
            .ok_or_else(|| SiteError::Listing(format!("no synopsis for {}", identifier)))?;

        Ok(listing.trim().to_string())
    }
}

// $GOPATH, falling back to ~/go like the go command does
fn default_go_path() -> PathBuf {
    if let Some(path) = std::env::var_os("GOPATH").filter(|p| !p.is_empty()) {
        // GOPATH may hold a list; the first entry is where `go get` writes
        if let Some(first) = std::env::split_paths(&path).next() {
            return first;
        }
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join("go")
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
