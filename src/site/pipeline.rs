// src/site/pipeline.rs
// =============================================================================
// Scrapes the backend into a static site.
//
// Steps, strictly in this order:
// 1. Start the backend for the first package's root and sit out its warm-up
// 2. Package docs: every package in the full set, /pkg/<id>/ -> <id>/index.html
// 3. Source files: every requested package's files plus its listing,
//    /src/<id>/<file> -> src/<id>/<file>.html
// 4. Stylesheet: /lib/godoc/style.css -> lib/style.css
// 5. The root index.html
//
// Steps 2-4 each race one deadline. The poller retries forever on its own,
// so when the deadline fires the phase future is dropped mid-fetch and the
// run fails with a timeout rather than hanging. Every fetch also races the
// backend process, so a godoc that dies is reported as such, not as a
// timeout.
//
// Packages are processed one at a time in sorted order; the backend only
// ever sees one request.
//
// Rust concepts used:
// - Borrowing: the pipeline holds `&mut Session` for the whole run, so
//   nothing else can touch the backend or the output while it works
// - Futures are values: a phase is an ordinary future handed to
//   `with_deadline`, and dropping it cancels whatever it was awaiting
// =============================================================================

use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::index::{navigation_rows, IndexBuilder};
use super::session::Session;
use super::style::{site_stylesheet, BACKEND_STYLESHEET};
use crate::config::SiteConfig;
use crate::error::{Phase, Result, SiteError};
use crate::packages::{base_name, PackageLister, Resolution};
use crate::page::{relative_base_path, Page, PageKind, PageTransformer};

/// What a finished run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub package_pages: usize,
    pub source_pages: usize,
    /// Packages the index links to
    pub linked: usize,
}

pub struct Pipeline<'a> {
    session: &'a mut Session,
    lister: &'a dyn PackageLister,
    config: &'a SiteConfig,
    transformer: PageTransformer,
}

impl<'a> Pipeline<'a> {
    pub fn new(session: &'a mut Session, lister: &'a dyn PackageLister, config: &'a SiteConfig) -> Self {
        Self {
            session,
            lister,
            config,
            transformer: PageTransformer::new(&config.site_name, config.link_index),
        }
    }

    pub async fn run(&mut self, resolution: &Resolution) -> Result<PipelineStats> {
        // The first package decides where godoc starts; later packages
        // restart it only if their root differs
        let first_root = resolution
            .full
            .iter()
            .next()
            .and_then(|identifier| resolution.root_of(identifier));
        self.use_root(first_root).await?;

        let deadline = self.config.timing.deadline;

        info!(packages = resolution.full.len(), "fetching package documentation");
        let package_pages =
            with_deadline(Phase::PackageDocs, deadline, self.package_docs(resolution)).await?;

        info!(packages = resolution.filter.len(), "fetching source files");
        let source_pages =
            with_deadline(Phase::SourceFiles, deadline, self.source_files(resolution)).await?;

        with_deadline(Phase::Stylesheet, deadline, self.stylesheet()).await?;

        // The index needs only the lister, so it is not raced
        let linked = self.write_index(resolution).await?;

        Ok(PipelineStats {
            package_pages,
            source_pages,
            linked,
        })
    }

    // (Re)starts the backend when `root` differs from the one it serves,
    // then waits out whatever is left of its warm-up.
    async fn use_root(&mut self, root: Option<&Path>) -> Result<()> {
        if self.session.backend.serve_root(root).await? {
            debug!(root = ?root, state = ?self.session.backend.state(), "backend restarted for new root");
        }
        self.session.backend.wait_ready().await
    }

    // A fetch that fails fast when a managed backend dies mid-retry,
    // instead of spinning until the phase deadline.
    async fn fetch(&mut self, path: &str) -> Result<String> {
        // Split the borrow: the poller and the backend are separate fields,
        // so both can be borrowed mutably at once
        let Session { backend, poller, .. } = &mut *self.session;
        tokio::select! {
            page = poller.fetch(path) => page,
            err = backend.exited() => Err(err),
        }
    }

    async fn package_docs(&mut self, resolution: &Resolution) -> Result<usize> {
        let mut written = 0;

        for identifier in resolution.full.iter() {
            self.use_root(resolution.root_of(identifier)).await?;

            let backend_path = format!("/pkg/{}/", identifier);
            let html = self.fetch(&backend_path).await?;

            // a/b/c is written to a/b/c/index.html, three levels down
            let page = Page {
                backend_path,
                base_path: relative_base_path(identifier),
                title: Some(self.title_for(identifier)),
                kind: PageKind::PackageDoc,
            };
            let html = self.transformer.transform(&html, &page)?;
            self.session
                .output
                .write(identifier, "index.html", html.as_bytes())
                .await?;

            debug!(package = %identifier, "wrote package page");
            written += 1;
        }

        Ok(written)
    }

    async fn source_files(&mut self, resolution: &Resolution) -> Result<usize> {
        let mut written = 0;

        for identifier in resolution.filter.iter() {
            let root = resolution.root_of(identifier);
            // A package without files is skipped, not an error
            let files = match self.lister.source_files(identifier, root).await {
                Ok(Some(files)) if !files.is_empty() => files,
                Ok(_) => {
                    debug!(package = %identifier, "no source files");
                    continue;
                }
                Err(e) => {
                    warn!(package = %identifier, "skipping source files: {}", e);
                    continue;
                }
            };

            self.use_root(root).await?;

            let dir = format!("src/{}", identifier);
            let base_path = relative_base_path(&dir);

            // Each file, then the directory listing itself
            for file in files.iter().map(String::as_str).chain(["index.html"]) {
                let backend_path = format!("/src/{}/{}", identifier, file);
                let html = self.fetch(&backend_path).await?;

                let page = Page {
                    backend_path,
                    base_path: base_path.clone(),
                    title: Some(self.title_for(identifier)),
                    kind: PageKind::SourceFile,
                };
                let html = self.transformer.transform(&html, &page)?;

                let name = if file.ends_with(".html") {
                    file.to_string()
                } else {
                    format!("{}.html", file)
                };
                self.session.output.write(&dir, &name, html.as_bytes()).await?;
                written += 1;
            }

            debug!(package = %identifier, files = files.len(), "wrote source pages");
        }

        Ok(written)
    }

    async fn stylesheet(&mut self) -> Result<()> {
        let css = self.fetch(BACKEND_STYLESHEET).await?;
        self.session
            .output
            .write("lib", "style.css", site_stylesheet(&css).as_bytes())
            .await?;
        Ok(())
    }

    async fn write_index(&mut self, resolution: &Resolution) -> Result<usize> {
        let builder = IndexBuilder {
            lister: self.lister,
            site_name: &self.config.site_name,
            description_html: self.config.description_html.as_deref(),
            footer_html: self.config.footer_html.as_deref(),
            exclusions: &self.config.exclusions,
            link_index: self.config.link_index,
        };
        let html = builder.build(resolution).await;
        self.session
            .output
            .write("", "index.html", html.as_bytes())
            .await?;

        // Same rows the builder laid out; count the ones that got a link
        let linked = navigation_rows(
            &resolution.full,
            &resolution.filter,
            &self.config.exclusions,
            self.config.link_index,
        )
        .iter()
        .filter(|row| row.href.is_some())
        .count();
        Ok(linked)
    }

    fn title_for(&self, identifier: &str) -> String {
        format!("{} - {}", base_name(identifier), self.config.site_name)
    }
}

/// Runs `work` until it finishes or `limit` elapses, whichever is first.
/// On timeout the work is dropped where it stands.
async fn with_deadline<T, F>(phase: Phase, limit: Duration, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        result = work => result,
        _ = tokio::time::sleep(limit) => {
            warn!(%phase, after = ?limit, "deadline elapsed");
            Err(SiteError::Timeout { phase, after: limit })
        }
    }
}
