//! Chrome DevTools Protocol adapter implementation

use crate::{Engine, EngineConfig, Error, LoadStatus, OutputFormat, PaperSize, Result, Viewport};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::types::{Bounds, PrintToPdfOptions};
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// Extra time the tab waits beyond the load timeout, so the renderer's own
// bound fires first and reports a timeout rather than a load failure.
const TAB_TIMEOUT_GRACE_MS: u64 = 1_000;

// The tab adds its timeout to `Instant::now()`, which overflows on huge values
const MAX_TAB_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

// CSS `zoom` has no effect on an outermost <svg>, so a standalone SVG document
// is zoomed by scaling its size around a fixed viewBox instead.
const ZOOM_SCRIPT: &str = r#"(function(z){
    var root = document.documentElement;
    if (root instanceof SVGSVGElement) {
        var w = root.width.baseVal.value, h = root.height.baseVal.value;
        if (!root.hasAttribute('viewBox')) root.setAttribute('viewBox', '0 0 ' + w + ' ' + h);
        root.setAttribute('width', w * z);
        root.setAttribute('height', h * z);
    } else {
        root.style.zoom = z;
    }
})({{ZOOM}})"#;

// Full size of the laid-out document as "width,height" in CSS pixels
const PAGE_EXTENT_SCRIPT: &str = r#"(function(){
    var root = document.documentElement;
    var rect = root.getBoundingClientRect();
    var w = Math.max(window.innerWidth, root.scrollWidth, Math.ceil(rect.right));
    var h = Math.max(window.innerHeight, root.scrollHeight, Math.ceil(rect.bottom));
    if (document.body) {
        w = Math.max(w, document.body.scrollWidth);
        h = Math.max(h, document.body.scrollHeight);
    }
    return w + ',' + h;
})()"#;

/// CDP-based engine implementation (uses the `headless_chrome` crate)
///
/// This adapter launches a headless Chrome instance, manages a single tab,
/// and provides the `Engine` trait implementation over it.
pub struct CdpEngine {
    browser: Browser,
    tab: Arc<Tab>,
    viewport: Viewport,
    zoom: Option<f64>,
    paper: Option<PaperSize>,
}

impl Engine for CdpEngine {
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized,
    {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(config.sandbox)
            .path(config.browser_path.clone())
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

        let tab_timeout = Duration::from_millis(config.timeout_ms.saturating_add(TAB_TIMEOUT_GRACE_MS));
        tab.set_default_timeout(tab_timeout.min(MAX_TAB_TIMEOUT));

        Ok(Self {
            browser,
            tab,
            viewport: config.viewport,
            zoom: None,
            paper: None,
        })
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Normal {
                left: Some(0),
                top: Some(0),
                width: Some(viewport.width as f64),
                height: Some(viewport.height as f64),
            })
            .map_err(|e| Error::InitializationError(format!("Failed to set viewport: {}", e)))?;
        self.viewport = viewport;
        Ok(())
    }

    fn set_zoom_factor(&mut self, zoom: f64) -> Result<()> {
        // Applied to each document after navigation; see `apply_zoom`
        self.zoom = Some(zoom);
        Ok(())
    }

    fn set_paper_size(&mut self, paper: PaperSize) -> Result<()> {
        self.paper = Some(paper);
        Ok(())
    }

    fn open(&mut self, url: &str) -> Result<LoadStatus> {
        let parsed = url::Url::parse(url).map_err(|e| Error::LoadError(format!("{}: {}", url, e)))?;

        if let Err(e) = self.tab.navigate_to(parsed.as_str()) {
            warn!("Navigation to {} failed: {}", parsed, e);
            return Ok(LoadStatus::Fail);
        }
        if let Err(e) = self.tab.wait_until_navigated() {
            warn!("Waiting for {} failed: {}", parsed, e);
            return Ok(LoadStatus::Fail);
        }

        self.apply_zoom()?;
        Ok(LoadStatus::Success)
    }

    fn render(&mut self, path: &Path) -> Result<()> {
        let format = OutputFormat::from_path(path);
        debug!("Capturing {:?} to {}", format, path.display());

        let data = match format {
            OutputFormat::Pdf => self
                .tab
                .print_to_pdf(Some(pdf_options(self.paper)))
                .map_err(|e| Error::RenderError(format!("PDF printing failed: {}", e)))?,
            image => self.capture_full_page(screenshot_format(image))?,
        };

        std::fs::write(path, data)?;
        Ok(())
    }

    fn close(self) -> Result<()> {
        // Drop the tab before the browser so the child process is
        // terminated promptly.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

impl CdpEngine {
    fn apply_zoom(&self) -> Result<()> {
        let Some(zoom) = self.zoom else {
            return Ok(());
        };

        let script = ZOOM_SCRIPT.replace("{{ZOOM}}", &zoom.to_string());
        self.tab
            .evaluate(&script, false)
            .map_err(|e| Error::RenderError(format!("Failed to apply zoom: {}", e)))?;
        Ok(())
    }

    /// Capture the whole document, not just the visible viewport
    fn capture_full_page(&self, format: Page::CaptureScreenshotFormatOption) -> Result<Vec<u8>> {
        let extent = self
            .tab
            .evaluate(PAGE_EXTENT_SCRIPT, false)
            .map_err(|e| Error::RenderError(format!("Failed to measure page: {}", e)))?;
        let raw = extent
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::RenderError("No page size returned from evaluation".into()))?;
        let size = page_extent(raw, self.viewport)?;
        debug!("Page extent {}x{}", size.width, size.height);

        // Content outside the window is not painted, so grow it to the page
        if size != self.viewport {
            self.tab
                .set_bounds(Bounds::Normal {
                    left: Some(0),
                    top: Some(0),
                    width: Some(size.width as f64),
                    height: Some(size.height as f64),
                })
                .map_err(|e| Error::RenderError(format!("Failed to resize for capture: {}", e)))?;
        }

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: size.width as f64,
            height: size.height as f64,
            scale: 1.0,
        };
        self.tab
            .capture_screenshot(format, None, Some(clip), true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))
    }
}

/// Parse the "width,height" reported by the page, never smaller than `floor`
fn page_extent(raw: &str, floor: Viewport) -> Result<Viewport> {
    let invalid = || Error::RenderError(format!("Unexpected page size {:?}", raw));

    let (w, h) = raw.split_once(',').ok_or_else(invalid)?;
    let w: f64 = w.trim().parse().map_err(|_| invalid())?;
    let h: f64 = h.trim().parse().map_err(|_| invalid())?;
    if !w.is_finite() || !h.is_finite() {
        return Err(invalid());
    }

    Ok(Viewport {
        width: (w.ceil() as u32).max(floor.width),
        height: (h.ceil() as u32).max(floor.height),
    })
}

fn screenshot_format(format: OutputFormat) -> Page::CaptureScreenshotFormatOption {
    match format {
        OutputFormat::Jpeg => Page::CaptureScreenshotFormatOption::Jpeg,
        OutputFormat::Webp => Page::CaptureScreenshotFormatOption::Webp,
        _ => Page::CaptureScreenshotFormatOption::Png,
    }
}

fn pdf_options(paper: Option<PaperSize>) -> PrintToPdfOptions {
    match paper {
        Some(p) => PrintToPdfOptions {
            paper_width: Some(p.width_in),
            paper_height: Some(p.height_in),
            margin_top: Some(p.margin_in),
            margin_bottom: Some(p.margin_in),
            margin_left: Some(p.margin_in),
            margin_right: Some(p.margin_in),
            print_background: Some(true),
            ..Default::default()
        },
        None => PrintToPdfOptions {
            print_background: Some(true),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_options_use_square_paper_without_margin() {
        let opts = pdf_options(Some(PaperSize::square(3.75)));
        assert_eq!(opts.paper_width, Some(3.75));
        assert_eq!(opts.paper_height, Some(3.75));
        assert_eq!(opts.margin_top, Some(0.0));
        assert_eq!(opts.margin_right, Some(0.0));
    }

    #[test]
    fn pdf_options_default_to_engine_paper() {
        let opts = pdf_options(None);
        assert_eq!(opts.paper_width, None);
        assert_eq!(opts.margin_top, None);
    }

    #[test]
    fn image_formats_map_to_capture_formats() {
        assert!(matches!(
            screenshot_format(OutputFormat::Jpeg),
            Page::CaptureScreenshotFormatOption::Jpeg
        ));
        assert!(matches!(
            screenshot_format(OutputFormat::Png),
            Page::CaptureScreenshotFormatOption::Png
        ));
    }

    #[test]
    fn page_extent_grows_past_viewport() {
        let viewport = Viewport { width: 900, height: 900 };
        assert_eq!(
            page_extent("1800,1800", viewport).unwrap(),
            Viewport { width: 1800, height: 1800 }
        );
        assert_eq!(
            page_extent("900,2400.5", viewport).unwrap(),
            Viewport { width: 900, height: 2401 }
        );
    }

    #[test]
    fn page_extent_never_shrinks_below_viewport() {
        let viewport = Viewport { width: 450, height: 450 };
        assert_eq!(page_extent("300,120", viewport).unwrap(), viewport);
    }

    #[test]
    fn page_extent_rejects_garbage() {
        let viewport = Viewport::default();
        assert!(matches!(page_extent("", viewport), Err(Error::RenderError(_))));
        assert!(matches!(page_extent("wide,tall", viewport), Err(Error::RenderError(_))));
        assert!(matches!(page_extent("900", viewport), Err(Error::RenderError(_))));
    }

    #[test]
    fn zoom_script_embeds_factor() {
        let script = ZOOM_SCRIPT.replace("{{ZOOM}}", &2.0f64.to_string());
        assert!(script.ends_with("})(2)"));
        assert!(script.contains("SVGSVGElement"));
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_cdp_engine_creation() {
        let engine = CdpEngine::new(EngineConfig::default()).expect("Chrome should launch");
        assert_eq!(engine.viewport, Viewport { width: 900, height: 900 });
        engine.close().unwrap();
    }
}
