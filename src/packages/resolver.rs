// src/packages/resolver.rs
// =============================================================================
// Expands the user's package arguments into the sets the pipeline works on.
//
// How it works:
// 1. An argument naming a directory is a module root: its go.mod "module"
//    line gives the identifier, and the backend must be started from there
// 2. Any other argument is a package path, located through the lister
// 3. Every sub-directory below a located root becomes a sub-package
//    (directories starting with "." are pruned, along with everything
//    beneath them)
// 4. The filter set is everything found so far; the full set adds every
//    path-prefix ancestor
//
// Each identifier also remembers which root the backend must serve it from.
// Ancestors inherit the root of the descendant that pulled them in.
//
// Identifiers become output directories, so a path with empty, "." or ".."
// segments is dropped with a warning instead of being documented.
// =============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::lister::PackageLister;
use super::set::{ancestors, is_well_formed, PackageSet};
use crate::error::{Result, SiteError};

/// Outcome of package resolution. Both sets are sorted.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub full: PackageSet,
    pub filter: PackageSet,
    roots: HashMap<String, PathBuf>,
}

impl Resolution {
    /// Builds the full set from `filter`. Every ancestor inherits the root
    /// of the first requested package below it.
    pub fn new(filter: PackageSet, mut roots: HashMap<String, PathBuf>) -> Self {
        let full = filter.with_ancestors();
        for identifier in filter.iter() {
            let Some(root) = roots.get(identifier).cloned() else {
                continue;
            };
            for ancestor in ancestors(identifier) {
                roots.entry(ancestor.to_string()).or_insert_with(|| root.clone());
            }
        }

        Self {
            full: full.sorted(),
            filter: filter.sorted(),
            roots,
        }
    }

    /// Directory the backend must run in to serve `identifier`.
    /// None means a neutral working directory (GOPATH mode).
    pub fn root_of(&self, identifier: &str) -> Option<&Path> {
        self.roots.get(identifier).map(PathBuf::as_path)
    }
}

pub struct Resolver<'a> {
    lister: &'a dyn PackageLister,
}

impl<'a> Resolver<'a> {
    pub fn new(lister: &'a dyn PackageLister) -> Self {
        Self { lister }
    }

    pub async fn resolve(&self, identifiers: &[String]) -> Result<Resolution> {
        let mut filter = PackageSet::new();
        let mut roots = HashMap::new();

        // Blank arguments (e.g. from an unset shell variable) are ignored
        let requested: Vec<String> = identifiers
            .iter()
            .map(|identifier| identifier.trim().to_string())
            .filter(|identifier| !identifier.is_empty())
            .collect();

        if requested.is_empty() {
            info!("no packages given, documenting every known package");
            for identifier in self.lister.all_packages().await? {
                filter.insert(&identifier);
            }
        }

        for argument in &requested {
            // A directory on disk wins over a package path of the same name
            let path = Path::new(argument);
            if path.is_dir() {
                let module = read_module_path(path)?;
                debug!(%module, dir = %path.display(), "resolved module root");

                filter.insert(&module);
                roots.insert(module.clone(), path.to_path_buf());
                for identifier in discover_subpackages(&module, path) {
                    roots.insert(identifier.clone(), path.to_path_buf());
                    filter.insert(&identifier);
                }
            } else if !is_well_formed(argument) {
                warn!(package = %argument, "ignoring package path with empty or relative segments");
            } else {
                filter.insert(argument);
                match self.lister.package_dir(argument).await? {
                    Some(dir) => {
                        debug!(package = %argument, dir = %dir.display(), "located package");
                        for identifier in discover_subpackages(argument, &dir) {
                            filter.insert(&identifier);
                        }
                    }
                    None => debug!(package = %argument, "package directory not found, relying on backend"),
                }
            }
        }

        if filter.is_empty() {
            return Err(SiteError::NoPackages);
        }

        let resolution = Resolution::new(filter, roots);
        info!(
            requested = resolution.filter.len(),
            total = resolution.full.len(),
            "resolved packages"
        );

        Ok(resolution)
    }
}

/// Identifiers for every non-hidden directory below `dir`, in walk order.
pub fn discover_subpackages(parent: &str, dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        // filter_entry also skips everything below a rejected directory
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            // Rebuild the identifier with '/' whatever the OS separator is
            let relative = entry.path().strip_prefix(dir).ok()?;
            let segments: Vec<String> = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect();
            Some(format!("{}/{}", parent.trim_end_matches('/'), segments.join("/")))
        })
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Reads the module path out of `<dir>/go.mod`.
pub fn read_module_path(dir: &Path) -> Result<String> {
    let mod_file = dir.join("go.mod");
    let contents = std::fs::read_to_string(&mod_file).map_err(|source| SiteError::ReadInput {
        what: "mod",
        path: mod_file.clone(),
        source,
    })?;

    // First `module <path>` line, ignoring // comments; the path may be quoted
    contents
        .lines()
        .map(|line| line.split("//").next().unwrap_or("").trim())
        .find_map(|line| {
            line.strip_prefix("module")
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .map(|rest| rest.trim().trim_matches('"').to_string())
        .filter(|module| !module.is_empty())
        .ok_or(SiteError::InvalidModule { path: mod_file })
}
