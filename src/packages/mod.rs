// src/packages/mod.rs
// =============================================================================
// Everything about which packages end up in the site.
//
// Submodules:
// - set: ordered, deduplicated identifier sets and prefix helpers
// - exclude: rules that keep packages out of the index
// - lister: the `go list` collaborator (paths, source files, synopses)
// - resolver: turns command-line arguments into the filter and full sets
// =============================================================================

mod exclude;
mod lister;
mod resolver;
mod set;

pub use exclude::Exclusions;
pub use lister::{GoList, PackageLister};
pub use resolver::{Resolution, Resolver};
pub use set::{base_name, PackageSet};
