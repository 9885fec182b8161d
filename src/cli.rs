// src/cli.rs
// =============================================================================
// The command-line interface, defined with clap's derive API.
//
// Every flag can also be set through a GODOC_STATIC_* environment variable,
// which is handy in CI where the same site settings are reused across jobs.
//
// Example:
//   godoc-static --destination=site --site-name="Acme Docs" ./ github.com/acme/tool
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "godoc-static",
    version,
    about = "Generate a static Go documentation site by scraping a godoc server",
    long_about = "godoc-static starts godoc, waits for it to index the requested packages, \
                  and saves every package page and source file as static HTML that can be \
                  served from any web server. Without package arguments, every package \
                  `go list` knows about is documented."
)]
pub struct Cli {
    /// Address the godoc server listens on (host:port)
    #[arg(long, env = "GODOC_STATIC_LISTEN_ADDRESS", default_value = "localhost:9001")]
    pub listen_address: String,

    /// Name shown in the top bar and page titles
    #[arg(long, env = "GODOC_STATIC_SITE_NAME", default_value = "Documentation")]
    pub site_name: String,

    /// Markdown shown above the package list
    #[arg(long, env = "GODOC_STATIC_SITE_DESCRIPTION")]
    pub site_description: Option<String>,

    /// Read the site description from a Markdown file instead
    #[arg(long, env = "GODOC_STATIC_SITE_DESCRIPTION_FILE", value_name = "PATH")]
    pub site_description_file: Option<PathBuf>,

    /// Markdown shown below the package list
    #[arg(long, env = "GODOC_STATIC_SITE_FOOTER")]
    pub site_footer: Option<String>,

    /// Read the site footer from a Markdown file instead
    #[arg(long, env = "GODOC_STATIC_SITE_FOOTER_FILE", value_name = "PATH")]
    pub site_footer_file: Option<PathBuf>,

    /// Directory the site is written to
    #[arg(long, env = "GODOC_STATIC_DESTINATION", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Zip archive written inside the destination (empty to disable)
    #[arg(long, env = "GODOC_STATIC_ZIP", default_value = "docs.zip")]
    pub zip: String,

    /// Link to index.html files instead of bare directories
    ///
    /// Needed when the site is browsed from disk or served by a server
    /// that does not resolve directory indexes.
    #[arg(long, env = "GODOC_STATIC_LINK_INDEX")]
    pub link_index: bool,

    /// Space-separated packages to leave out of the index
    ///
    /// A package also excludes everything underneath it.
    #[arg(long, env = "GODOC_STATIC_EXCLUDE", default_value = "")]
    pub exclude: String,

    /// Log every page as it is fetched and written
    #[arg(short, long, env = "GODOC_STATIC_VERBOSE")]
    pub verbose: bool,

    /// Print the run report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Seconds each phase may wait on godoc before giving up
    #[arg(long, env = "GODOC_STATIC_TIMEOUT", default_value_t = 15, value_name = "SECONDS")]
    pub timeout: u64,

    /// Seconds to let godoc start before the first request
    #[arg(long, env = "GODOC_STATIC_WARMUP", default_value_t = 3, value_name = "SECONDS")]
    pub warmup: u64,

    /// Seconds a single request may take before it is retried
    #[arg(long, env = "GODOC_STATIC_REQUEST_TIMEOUT", default_value_t = 5, value_name = "SECONDS")]
    pub request_timeout: u64,

    /// godoc binary to run
    #[arg(long, env = "GODOC_STATIC_GODOC", default_value = "godoc")]
    pub godoc: String,

    /// Scrape a godoc server that is already running instead of starting one
    #[arg(long, env = "GODOC_STATIC_EXTERNAL")]
    pub external: bool,

    /// Packages or module directories to document
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}
