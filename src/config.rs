// src/config.rs
// =============================================================================
// Turns parsed command-line flags into a validated SiteConfig.
//
// Everything that can fail without touching the backend fails here:
// a missing destination, or a description/footer file that cannot be read.
// Markdown is rendered once, so the rest of the run only deals in HTML.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::BackendMode;
use crate::cli::Cli;
use crate::error::{Result, SiteError};
use crate::markdown::render_markdown;
use crate::packages::Exclusions;

/// How long the run waits on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Limit for each fetch phase
    pub deadline: Duration,
    /// Grace period between starting the backend and the first request
    pub warmup: Duration,
    /// Limit for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(15),
            warmup: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub listen_address: String,
    pub site_name: String,
    pub description_html: Option<String>,
    pub footer_html: Option<String>,
    pub destination: PathBuf,
    pub zip: Option<String>,
    pub link_index: bool,
    pub exclusions: Exclusions,
    pub packages: Vec<String>,
    pub backend: BackendMode,
    pub timing: Timing,
    pub json: bool,
}

impl SiteConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        // clap already rejects an empty path, so only absence is left
        let destination = cli.destination.ok_or(SiteError::MissingDestination)?;

        let description = read_text(
            "site description",
            cli.site_description,
            cli.site_description_file.as_deref(),
        )?;
        let footer = read_text("site footer", cli.site_footer, cli.site_footer_file.as_deref())?;

        // --zip "" turns the archive off
        let zip = Some(cli.zip.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        // --external means someone else already runs godoc for us
        let backend = if cli.external {
            BackendMode::External
        } else {
            BackendMode::Managed { program: cli.godoc }
        };

        Ok(Self {
            listen_address: cli.listen_address,
            site_name: cli.site_name,
            description_html: description.as_deref().map(render_markdown),
            footer_html: footer.as_deref().map(render_markdown),
            destination,
            zip,
            link_index: cli.link_index,
            exclusions: Exclusions::parse(&cli.exclude),
            packages: cli.packages,
            backend,
            // Flags are whole seconds; everything downstream uses Duration
            timing: Timing {
                deadline: Duration::from_secs(cli.timeout),
                warmup: Duration::from_secs(cli.warmup),
                request_timeout: Duration::from_secs(cli.request_timeout),
            },
            json: cli.json,
        })
    }
}

// A file flag wins over its literal counterpart. Blank text counts as unset.
fn read_text(what: &'static str, literal: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| SiteError::ReadInput {
            what,
            path: path.to_path_buf(),
            source,
        })?,
        None => literal.unwrap_or_default(),
    };

    Ok(Some(text).filter(|text| !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<SiteConfig> {
        let cli = Cli::try_parse_from(std::iter::once("godoc-static").chain(args.iter().copied()))
            .unwrap();
        SiteConfig::from_cli(cli)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--destination", "out", "fmt", "net/http"]).unwrap();
        assert_eq!(config.listen_address, "localhost:9001");
        assert_eq!(config.site_name, "Documentation");
        assert_eq!(config.destination, PathBuf::from("out"));
        assert_eq!(config.zip.as_deref(), Some("docs.zip"));
        assert_eq!(config.packages, vec!["fmt", "net/http"]);
        assert_eq!(config.timing, Timing::default());
        assert_eq!(
            config.backend,
            BackendMode::Managed {
                program: "godoc".to_string()
            }
        );
        assert!(config.description_html.is_none());
        assert!(!config.link_index);
    }

    #[test]
    fn test_destination_is_required() {
        assert!(matches!(parse(&["fmt"]), Err(SiteError::MissingDestination)));
    }

    #[test]
    fn test_empty_destination_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["godoc-static", "--destination", "", "fmt"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_empty_zip_disables_archive() {
        let config = parse(&["--destination", "out", "--zip", ""]).unwrap();
        assert_eq!(config.zip, None);
    }

    #[test]
    fn test_description_is_rendered_markdown() {
        let config = parse(&["--destination", "out", "--site-description", "Docs for **acme**"]).unwrap();
        assert_eq!(
            config.description_html.as_deref(),
            Some("<p>Docs for <strong>acme</strong></p>\n")
        );
    }

    #[test]
    fn test_file_flag_wins_over_literal() {
        let dir = tempfile::tempdir().unwrap();
        let footer = dir.path().join("footer.md");
        std::fs::write(&footer, "# Thanks").unwrap();

        let config = parse(&[
            "--destination",
            "out",
            "--site-footer",
            "ignored",
            "--site-footer-file",
            footer.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(config.footer_html.as_deref(), Some("<h1>Thanks</h1>\n"));
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let result = parse(&["--destination", "out", "--site-description-file", "/nonexistent/desc.md"]);
        assert!(matches!(
            result,
            Err(SiteError::ReadInput {
                what: "site description",
                ..
            })
        ));
    }

    #[test]
    fn test_external_backend_and_timing() {
        let config = parse(&[
            "--destination",
            "out",
            "--external",
            "--timeout",
            "30",
            "--warmup",
            "0",
            "--exclude",
            "a/b c",
        ])
        .unwrap();
        assert_eq!(config.backend, BackendMode::External);
        assert_eq!(config.timing.deadline, Duration::from_secs(30));
        assert_eq!(config.timing.warmup, Duration::ZERO);
        assert!(config.exclusions.is_excluded("a/b/c"));
        assert!(config.exclusions.is_excluded("c"));
        assert!(!config.exclusions.is_excluded("a"));
    }
}
