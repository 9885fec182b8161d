// src/page/mod.rs
// =============================================================================
// Turning live backend pages into static ones.
//
// Submodules:
// - links: pure href rewriting (backend paths -> site-relative paths)
// - topbar: the navigation bar every page shares
// - transform: the ordered rewrite rules applied to each scraped page
// =============================================================================

mod links;
mod topbar;
mod transform;

pub use links::relative_base_path;
pub use topbar::top_bar;
pub use transform::{Page, PageKind, PageTransformer};
