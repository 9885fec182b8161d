// src/site/index.rs
// =============================================================================
// Builds the site's root index.html: a table of every package, indented as a
// tree.
//
// How rows are laid out:
// 1. Excluded packages are dropped first, then the ancestors of whatever is
//    left are added back so the tree stays connected
// 2. Rows are walked in sorted order; each row is compared with the one
//    before it, and the number of leading path segments they share becomes
//    the indentation depth (20px per level)
// 3. The label is the identifier minus those shared segments
// 4. Only requested, non-excluded packages are links; pure ancestors are
//    plain text
//
// Example:
//   a        depth 0, label "a"
//   a/b      depth 1, label "b"
//   a/b/c    depth 2, label "c"
//   a/x      depth 1, label "x"
// =============================================================================

use tracing::debug;

use crate::markdown::escape;
use crate::packages::{Exclusions, PackageLister, PackageSet, Resolution};
use crate::page::top_bar;

/// Indentation per shared path segment, in pixels.
pub const INDENT_PX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRow {
    pub identifier: String,
    pub label: String,
    pub depth: usize,
    pub href: Option<String>,
}

/// Number of leading path segments `current` shares with `previous`,
/// compared case-insensitively. Never the whole of `current`, so the label
/// left over is never empty.
pub fn shared_prefix_depth(previous: &str, current: &str) -> usize {
    let current_segments: Vec<&str> = current.split('/').collect();
    let shared = previous
        .split('/')
        .zip(&current_segments)
        .take_while(|(a, b)| a.to_lowercase() == b.to_lowercase())
        .count();
    shared.min(current_segments.len().saturating_sub(1))
}

/// Lays out the index rows for the full package set.
pub fn navigation_rows(
    full: &PackageSet,
    filter: &PackageSet,
    exclusions: &Exclusions,
    link_index: bool,
) -> Vec<NavigationRow> {
    let kept: PackageSet = full
        .iter()
        .filter(|identifier| !exclusions.is_excluded(identifier))
        .collect();
    let rows = kept.with_ancestors().sorted();

    let mut previous: Option<&str> = None;
    let mut out = Vec::with_capacity(rows.len());

    for identifier in rows.iter() {
        let depth = previous
            .map(|previous| shared_prefix_depth(previous, identifier))
            .unwrap_or(0);
        let label = identifier.split('/').skip(depth).collect::<Vec<_>>().join("/");

        let linked = filter.contains(identifier) && !exclusions.is_excluded(identifier);
        let href = linked.then(|| {
            if link_index {
                format!("{}/index.html", identifier)
            } else {
                format!("{}/", identifier)
            }
        });

        out.push(NavigationRow {
            identifier: identifier.to_string(),
            label,
            depth,
            href,
        });
        previous = Some(identifier);
    }

    out
}

pub struct IndexBuilder<'a> {
    pub lister: &'a dyn PackageLister,
    pub site_name: &'a str,
    pub description_html: Option<&'a str>,
    pub footer_html: Option<&'a str>,
    pub exclusions: &'a Exclusions,
    pub link_index: bool,
}

impl IndexBuilder<'_> {
    /// Renders the index for `resolution`. Each synopsis is looked up from
    /// the root the backend served that package from.
    pub async fn build(&self, resolution: &Resolution) -> String {
        let rows = navigation_rows(
            &resolution.full,
            &resolution.filter,
            self.exclusions,
            self.link_index,
        );
        let site_name = escape(self.site_name);

        let mut b = String::new();
        b.push_str(&format!(
            r##"<!DOCTYPE html>
<html>
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="theme-color" content="#375EAB">
<title>{site_name}</title>
<link type="text/css" rel="stylesheet" href="lib/style.css">
</head>
<body>

<div id="topbar" class="wide">{top_bar}</div>
<div id="page" class="wide">
<div class="container">
"##,
            top_bar = top_bar("", self.site_name, self.link_index),
        ));

        if let Some(description) = self.description_html {
            b.push_str(description);
        }

        b.push_str(
            r#"
<h1>
	Packages
</h1>
<div class="pkg-dir">
	<table>
		<tr>
			<th class="pkg-name">Name</th>
			<th class="pkg-synopsis">Synopsis</th>
		</tr>
"#,
        );

        for row in &rows {
            let root = resolution.root_of(&row.identifier);
            let synopsis = match self.lister.synopsis(&row.identifier, root).await {
                Ok(synopsis) => synopsis,
                Err(e) => {
                    debug!(package = %row.identifier, "no synopsis: {}", e);
                    String::new()
                }
            };

            let name = match &row.href {
                Some(href) => format!(r#"<a href="{}">{}</a>"#, escape(href), escape(&row.label)),
                None => escape(&row.label),
            };

            b.push_str(&format!(
                r#"
		<tr>
			<td class="pkg-name" style="padding-left: {}px;">{}</td>
			<td class="pkg-synopsis">
				{}
			</td>
		</tr>
"#,
                row.depth * INDENT_PX,
                name,
                escape(&synopsis),
            ));
        }

        b.push_str(
            r#"
	</table>
</div>
"#,
        );

        if let Some(footer) = self.footer_html {
            b.push_str(&format!("<div id=\"footer\">\n{}</div>\n", footer));
        }

        b.push_str(
            r#"</div>
</div>
</body>
</html>
"#,
        );
        b
    }
}
