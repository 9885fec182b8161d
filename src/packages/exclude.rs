// src/packages/exclude.rs
// =============================================================================
// Decides which packages are left out of the site index.
//
// A package is excluded when:
// - it equals one of the user's --exclude entries, or sits underneath one
//   ("a/b" excludes "a/b" and "a/b/c" but not "a/bc")
// - it looks hidden, internal, or like test data (always applied)
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    patterns: Vec<String>,
}

impl Exclusions {
    /// Builds the list from the space-separated --exclude flag value.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split_whitespace())
    }

    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().trim().trim_matches('/').to_string())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn is_excluded(&self, identifier: &str) -> bool {
        if is_always_excluded(identifier) {
            return true;
        }

        self.patterns.iter().any(|pattern| {
            identifier == pattern
                || identifier
                    .strip_prefix(pattern.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

// Paths nobody wants in a public index: Windows-style leftovers, hidden
// directories, internal packages, test fixtures, and the bare "cmd" tree root.
fn is_always_excluded(identifier: &str) -> bool {
    identifier.contains('\\')
        || identifier == "cmd"
        || identifier.split('/').any(|segment| {
            segment.starts_with('.') || segment == "internal" || segment == "testdata"
        })
}
