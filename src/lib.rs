//! graphrender
//!
//! Loads a URL in a headless browser and saves the rendered page as an image
//! or a PDF, with a viewport and zoom derived from a single scale argument.
//!
//! # Features
//!
//! - **CDP Backend** (default): Uses Chrome DevTools Protocol via headless Chrome
//! - **Swappable engines**: anything implementing [`Engine`] can be driven by
//!   the [`PageRenderer`]
//!
//! # Example
//!
//! ```no_run
//! use graphrender::{Browser, EngineConfig, PageRenderer, RenderConfig};
//!
//! # async fn run() -> graphrender::Result<()> {
//! let config = RenderConfig::new("https://example.com", "graph.pdf", Some(0.5))?;
//! let browser = Browser::new(EngineConfig::for_render(&config)).await?;
//! let page = browser.new_page().await?;
//!
//! let outcome = PageRenderer::new(config).run(&page).await?;
//! println!("{:?}", outcome);
//! browser.close().await
//! # }
//! ```

use std::fmt;
use std::path::Path;

pub mod error;
pub use error::{Error, Result};

pub mod cli;
pub mod config;
pub use config::{EngineConfig, RenderConfig};

pub mod renderer;
pub use renderer::{Outcome, PageRenderer, RenderState};

#[cfg(feature = "cdp")]
pub mod cdp;

// Async-friendly browser API (worker-backed abstraction over any Engine)
pub mod async_api;

// Re-export the Browser type at the crate root for ergonomic examples
pub use async_api::{Browser, Page};

/// Viewport dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: config::BASE_VIEWPORT,
            height: config::BASE_VIEWPORT,
        }
    }
}

/// Physical page dimensions for PDF output, in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub width_in: f64,
    pub height_in: f64,
    pub margin_in: f64,
}

impl PaperSize {
    /// A square sheet with no margin
    pub fn square(side_in: f64) -> Self {
        Self {
            width_in: side_in,
            height_in: side_in,
            margin_in: 0.0,
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}in x {}in", self.width_in, self.height_in)
    }
}

/// Status reported by the engine when a page load finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Success,
    Fail,
}

/// File format of the rendered output, inferred from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
    Pdf,
}

impl OutputFormat {
    /// Infer the format from the extension of `path` (case-insensitive).
    /// Unknown or missing extensions fall back to PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => OutputFormat::Pdf,
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
            Some("webp") => OutputFormat::Webp,
            _ => OutputFormat::Png,
        }
    }
}

/// Core trait for browser engine implementations
///
/// An engine owns exactly one page. Methods are blocking; the
/// [`async_api`] module moves an engine onto a worker thread so the
/// renderer can await it.
pub trait Engine {
    /// Create a new engine instance with the given configuration
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized;

    /// Set the layout viewport of the page
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the zoom factor applied to page content. Engines keep their own
    /// default until this is called.
    fn set_zoom_factor(&mut self, zoom: f64) -> Result<()>;

    /// Set the paper size used when rendering to PDF
    fn set_paper_size(&mut self, paper: PaperSize) -> Result<()>;

    /// Load a URL and report whether navigation succeeded.
    ///
    /// Navigation failures are reported as [`LoadStatus::Fail`]; an `Err` is
    /// reserved for cases where the engine could not attempt the load.
    fn open(&mut self, url: &str) -> Result<LoadStatus>;

    /// Render the current page to `path`, inferring the format from its
    /// extension
    fn render(&mut self, path: &Path) -> Result<()>;

    /// Close the engine and clean up resources
    fn close(self) -> Result<()>;
}
