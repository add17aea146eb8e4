//! Render and engine configuration
//!
//! A [`RenderConfig`] is derived once from the command line and never
//! mutated afterwards; the renderer only reads it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, PaperSize, Result, Viewport};

/// Width and height of the viewport before scaling, in pixels
pub const BASE_VIEWPORT: u32 = 900;

/// Side of the PDF sheet before scaling, in inches
pub const BASE_PAPER_INCHES: f64 = 7.5;

/// Delay between a finished load and the capture
pub const DEFAULT_RENDER_DELAY_MS: u64 = 500;

/// Upper bound on a page load
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Everything needed to render one page to one file
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// URL to load
    pub address: String,
    /// Destination file
    pub output: PathBuf,
    /// Scale argument as given; `None` when it was omitted
    pub scale: Option<f64>,
    /// Layout viewport derived from the scale
    pub viewport: Viewport,
    /// Square paper size, only set for `.pdf` outputs
    pub paper_size: Option<PaperSize>,
    /// Settle delay after the page reports it has loaded
    pub render_delay: Duration,
    /// Bound on the page load; `None` waits indefinitely
    pub load_timeout: Option<Duration>,
}

impl RenderConfig {
    /// Derive the configuration for rendering `address` to `output`.
    ///
    /// The viewport only shrinks: a scale below 1 multiplies both sides of
    /// the 900x900 base, a scale of 1 or more leaves it untouched. A `.pdf`
    /// suffix (exact, case-sensitive) selects a square sheet of
    /// `7.5 * scale` inches with no margin.
    pub fn new(address: impl Into<String>, output: impl Into<PathBuf>, scale: Option<f64>) -> Result<Self> {
        let address = address.into();
        let output = output.into();

        if address.is_empty() {
            return Err(Error::Usage("URL must not be empty".into()));
        }
        if output.as_os_str().is_empty() {
            return Err(Error::Usage("output filename must not be empty".into()));
        }
        if let Some(s) = scale {
            if !s.is_finite() || s <= 0.0 {
                return Err(Error::ConfigError(format!("zoom must be a positive number, got {}", s)));
            }
        }

        let factor = scale.unwrap_or(1.0);
        let viewport = scaled_viewport(factor);
        let paper_size = if is_pdf_path(&output) {
            Some(PaperSize::square(BASE_PAPER_INCHES * factor))
        } else {
            None
        };

        Ok(Self {
            address,
            output,
            scale,
            viewport,
            paper_size,
            render_delay: Duration::from_millis(DEFAULT_RENDER_DELAY_MS),
            load_timeout: Some(Duration::from_millis(DEFAULT_LOAD_TIMEOUT_MS)),
        })
    }

    /// Replace the settle delay
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Replace the load timeout; `None` disables it
    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Zoom to apply to the page. Only set when a scale was given, so an
    /// omitted scale keeps the engine's own default.
    pub fn zoom_factor(&self) -> Option<f64> {
        self.scale
    }
}

/// Configuration for launching the browser engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial window size
    pub viewport: Viewport,
    /// Default timeout for engine operations in milliseconds; `u64::MAX`
    /// effectively disables it
    pub timeout_ms: u64,
    /// Browser binary; autodetected when `None`
    pub browser_path: Option<PathBuf>,
    /// Whether to keep the browser sandbox enabled
    pub sandbox: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            browser_path: None,
            sandbox: true,
        }
    }
}

impl EngineConfig {
    /// Engine settings matching a render job
    pub fn for_render(render: &RenderConfig) -> Self {
        Self {
            viewport: render.viewport,
            timeout_ms: render
                .load_timeout
                .map(|t| t.as_millis() as u64)
                .unwrap_or(u64::MAX),
            ..Default::default()
        }
    }
}

fn scaled_viewport(scale: f64) -> Viewport {
    if scale < 1.0 {
        let side = ((BASE_VIEWPORT as f64) * scale).round().max(1.0) as u32;
        Viewport { width: side, height: side }
    } else {
        Viewport::default()
    }
}

fn is_pdf_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".pdf")
}
