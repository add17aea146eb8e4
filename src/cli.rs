use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;

use crate::config::{DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_RENDER_DELAY_MS};
use crate::{EngineConfig, RenderConfig, Result};

/// Printed to standard output on any argument error
pub const USAGE: &str = "Usage: graphrender URL filename [zoom]";

/// Printed to standard output when the page fails to load
pub const LOAD_FAILED_MESSAGE: &str = "Graph render - unable to load the address!";

#[derive(Parser, Debug)]
#[command(name = "graphrender", version)]
#[command(about = "Render a web page to an image or PDF with a headless browser")]
pub struct Cli {
    /// URL to load
    pub url: String,

    /// Output file; a .pdf suffix renders a PDF, other extensions pick the image format
    pub output: PathBuf,

    /// Zoom scale; values below 1 also shrink the 900x900 viewport
    pub zoom: Option<f64>,

    /// Milliseconds to wait after the page has loaded before capturing it
    #[arg(long, default_value_t = DEFAULT_RENDER_DELAY_MS)]
    pub delay_ms: u64,

    /// Page load timeout in milliseconds (0 waits indefinitely)
    #[arg(long, default_value_t = DEFAULT_LOAD_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Path to the Chrome/Chromium binary
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Launch the browser without its sandbox (needed in some containers)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// What the binary should do after parsing its arguments
#[derive(Debug)]
pub enum Invocation {
    Render(Cli),
    /// `--help` or `--version`: print the text and exit successfully
    Info(clap::Error),
    /// Wrong arguments: print [`USAGE`] and exit with code 1
    Usage(clap::Error),
}

/// Parse arguments (including the program name) into an [`Invocation`]
pub fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Invocation::Render(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => Invocation::Info(e),
        Err(e) => Invocation::Usage(e),
    }
}

impl Cli {
    /// Build the immutable render configuration for this invocation
    pub fn render_config(&self) -> Result<RenderConfig> {
        let timeout = match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        Ok(RenderConfig::new(self.url.clone(), self.output.clone(), self.zoom)?
            .with_render_delay(Duration::from_millis(self.delay_ms))
            .with_load_timeout(timeout))
    }

    /// Browser launch settings for `render`
    pub fn engine_config(&self, render: &RenderConfig) -> EngineConfig {
        EngineConfig {
            browser_path: self.chrome.clone(),
            sandbox: !self.no_sandbox,
            ..EngineConfig::for_render(render)
        }
    }
}
