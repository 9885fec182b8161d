// src/page/transform.rs
// =============================================================================
// Rewrites a page scraped from the backend so it works as a static file.
//
// We use two HTML crates:
// - `scraper` reads the page once up front to collect the text of every
//   disclosure widget's summary (it needs the widget's children, which a
//   streaming rewriter has not seen yet when the widget opens)
// - `lol_html` then streams the page through the rewrite rules below
//
// Rules, in order. For any one element the handlers run in this order, so a
// later rule always sees what earlier rules did to it:
//   0. retitle the page
//   1. drop every <link> and <script> (backend assets don't travel)
//   2. add one stylesheet link to <base>lib/style.css
//   3. replace the #topbar contents with the static top bar
//   4. rewrite /src/ and /pkg/ hrefs to site-relative paths
//   5. turn div.toggle widgets into <details>/<summary>
//   6. source pages only: add .html to file links inside .layout listings
//   7. drop the backend's #footer
//
// Rules 1-3 are idempotent. Rule 4 is not: a page must go through here
// exactly once.
//
// Summaries are matched to widgets by position. If the two parsers ever
// disagree on how many widgets a page has, the run goes on but a warning
// names the page.
// =============================================================================

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use scraper::{Html, Selector};
use std::collections::VecDeque;
use tracing::warn;

use super::links::{normalize_listing_href, rewrite_backend_href};
use super::topbar::top_bar;
use crate::error::{Result, SiteError};
use crate::markdown::escape;

/// Summary used when a disclosure widget has no recognizable heading.
pub const MISSING_SUMMARY: &str = "Summary not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    PackageDoc,
    SourceFile,
}

/// Where a page came from and where it is going.
#[derive(Debug, Clone)]
pub struct Page {
    /// Backend path the page was fetched from, for error messages
    pub backend_path: String,
    /// Relative path from the page's output directory to the site root
    pub base_path: String,
    pub title: Option<String>,
    pub kind: PageKind,
}

#[derive(Debug, Clone)]
pub struct PageTransformer {
    site_name: String,
    link_index: bool,
}

impl PageTransformer {
    pub fn new(site_name: &str, link_index: bool) -> Self {
        Self {
            site_name: site_name.to_string(),
            link_index,
        }
    }

    pub fn transform(&self, html: &str, page: &Page) -> Result<String> {
        let base_path = page.base_path.as_str();
        let link_index = self.link_index;

        let stylesheet = format!(
            r#"<link type="text/css" rel="stylesheet" href="{}lib/style.css">"#,
            escape(base_path)
        );
        let top_bar = top_bar(base_path, &self.site_name, link_index);
        let mut summaries = SummaryQueue::new(disclosure_summaries(html));
        let mut title_set = false;
        let mut top_bar_set = false;

        let mut handlers = vec![
            // 0
            element!("title", |el| {
                if let Some(title) = &page.title {
                    if !title_set {
                        el.set_inner_content(title, ContentType::Text);
                        title_set = true;
                    }
                }
                Ok(())
            }),
            // 1
            element!("link", |el| {
                el.remove();
                Ok(())
            }),
            element!("script", |el| {
                el.remove();
                Ok(())
            }),
            // 2
            element!("head", |el| {
                el.append(&stylesheet, ContentType::Html);
                Ok(())
            }),
            // 3
            element!("#topbar", |el| {
                if !top_bar_set {
                    el.set_inner_content(&top_bar, ContentType::Html);
                    top_bar_set = true;
                }
                Ok(())
            }),
            // 4
            element!("a[href]", |el| {
                let rewritten = el
                    .get_attribute("href")
                    .and_then(|href| rewrite_backend_href(&href, base_path, link_index));
                if let Some(href) = rewritten {
                    el.set_attribute("href", &href)?;
                }
                Ok(())
            }),
            // 5
            element!("div.toggle", |el| {
                let summary = summaries.pop();

                let classes = el.get_attribute("class").unwrap_or_default();
                let kept: Vec<&str> = classes
                    .split_whitespace()
                    .filter(|class| *class != "toggle")
                    .collect();
                if kept.is_empty() {
                    el.remove_attribute("class");
                } else {
                    el.set_attribute("class", &kept.join(" "))?;
                }

                el.set_tag_name("details")?;
                el.prepend(&format!("<summary>{}</summary>", summary), ContentType::Html);
                Ok(())
            }),
            element!("div.toggle .collapsed", |el| {
                el.remove();
                Ok(())
            }),
            element!("div.toggle .toggleButton", |el| {
                el.remove();
                Ok(())
            }),
        ];

        // 6
        if page.kind == PageKind::SourceFile {
            handlers.push(element!(".layout a[href]", |el| {
                let normalized = el
                    .get_attribute("href")
                    .and_then(|href| normalize_listing_href(&href));
                if let Some(href) = normalized {
                    el.set_attribute("href", &href)?;
                }
                Ok(())
            }));
        }

        // 7
        handlers.push(element!("#footer", |el| {
            el.remove();
            Ok(())
        }));

        let out = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: handlers,
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| SiteError::Transform {
            path: page.backend_path.clone(),
            message: e.to_string(),
        })?;

        if let Some((collected, rewritten)) = summaries.mismatch() {
            warn!(
                page = %page.backend_path,
                collected,
                rewritten,
                "disclosure summaries may be attached to the wrong widgets"
            );
        }
        Ok(out)
    }
}

// Hands summaries to widgets in document order and counts how many were
// asked for.
#[derive(Debug, Default)]
struct SummaryQueue {
    pending: VecDeque<String>,
    collected: usize,
    taken: usize,
}

impl SummaryQueue {
    fn new(summaries: VecDeque<String>) -> Self {
        Self {
            collected: summaries.len(),
            pending: summaries,
            taken: 0,
        }
    }

    fn pop(&mut self) -> String {
        self.taken += 1;
        self.pending
            .pop_front()
            .unwrap_or_else(|| MISSING_SUMMARY.to_string())
    }

    /// (collected, rewritten) when the widget counts differ.
    fn mismatch(&self) -> Option<(usize, usize)> {
        (self.collected != self.taken).then_some((self.collected, self.taken))
    }
}

// Inner HTML of each toggle's collapsed heading, in document order.
//
// godoc marks a widget up as
//   <div class="toggle">
//     <div class="collapsed"><p class="toggleButton">▹ <span class="text">Example</span></p></div>
//     <div class="expanded">...</div>
//   </div>
fn disclosure_summaries(html: &str) -> VecDeque<String> {
    let document = Html::parse_document(html);

    // Both selectors are constants known to be valid
    let toggle = Selector::parse("div.toggle").expect("valid selector");
    let heading = Selector::parse(".collapsed span.text").expect("valid selector");

    document
        .select(&toggle)
        .map(|widget| {
            widget
                .select(&heading)
                .next()
                .map(|text| text.inner_html())
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| MISSING_SUMMARY.to_string())
        })
        .collect()
}
