// src/packages/set.rs
// =============================================================================
// An ordered, deduplicated collection of package identifiers.
//
// A package identifier is a `/`-separated path such as "github.com/user/repo/x".
// Two sets are built from the user's input:
// - the filter set: packages the user asked for, which get linked in the index
// - the full set: the filter set plus every path-prefix ancestor, so the
//   navigation tree has no gaps
//
// Sort order is case-insensitive lexicographic. It decides both the order
// pages are fetched in and which rows sit next to each other in the index.
// =============================================================================

use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl PackageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identifier, trimming whitespace and surrounding slashes.
    ///
    /// Returns false when the identifier is malformed (see `is_well_formed`)
    /// or already present.
    pub fn insert(&mut self, identifier: &str) -> bool {
        if !is_well_formed(identifier) {
            return false;
        }
        let identifier = normalize(identifier);
        if self.seen.contains(identifier) {
            return false;
        }
        self.seen.insert(identifier.to_string());
        self.items.push(identifier.to_string());
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Returns a copy with every strict path-prefix ancestor added.
    ///
    /// `a/b/c` contributes `a` and `a/b`.
    pub fn with_ancestors(&self) -> PackageSet {
        let mut full = self.clone();
        for identifier in &self.items {
            for ancestor in ancestors(identifier) {
                full.insert(ancestor);
            }
        }
        full
    }

    /// Sorts in place, case-insensitively. Identifiers that differ only in
    /// case fall back to a byte comparison so the order stays total.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| compare_identifiers(a, b));
    }

    pub fn sorted(mut self) -> PackageSet {
        self.sort();
        self
    }
}

impl<'a> FromIterator<&'a str> for PackageSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = PackageSet::new();
        for identifier in iter {
            set.insert(identifier);
        }
        set
    }
}

pub fn compare_identifiers(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Strict path-prefix ancestors, shortest first.
pub fn ancestors(identifier: &str) -> impl Iterator<Item = &str> {
    identifier
        .match_indices('/')
        .map(move |(index, _)| &identifier[..index])
        .filter(|ancestor| !ancestor.is_empty())
}

/// Last path segment, used when retitling pages.
pub fn base_name(identifier: &str) -> &str {
    identifier.rsplit('/').next().unwrap_or(identifier)
}

/// True when every segment is a real name. Identifiers become output paths,
/// so empty, `.` and `..` segments are refused.
pub fn is_well_formed(identifier: &str) -> bool {
    let identifier = normalize(identifier);
    !identifier.is_empty()
        && identifier
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

fn normalize(identifier: &str) -> &str {
    identifier.trim().trim_matches('/')
}
