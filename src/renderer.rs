//! Load-then-capture pipeline for a single page
//!
//! [`PageRenderer::run`] has exactly two suspension points: the page load
//! (bounded by the configured timeout) and the settle delay before capture.

use log::{debug, info, warn};

use crate::async_api::{Browser, Page};
use crate::{Error, LoadStatus, RenderConfig, Result};

/// Where a renderer is in its single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Loading,
    Rendering,
    Done,
    Failed,
}

/// How a completed run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The output file was written
    Rendered,
    /// The engine reported that the address could not be loaded
    LoadFailed,
}

/// Renders one [`RenderConfig`] through a [`Page`]
#[derive(Debug)]
pub struct PageRenderer {
    config: RenderConfig,
    state: RenderState,
}

impl PageRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            state: RenderState::Idle,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Configure the page, load the address and write the output file.
    ///
    /// A load failure is an [`Outcome`], not an error. Errors are engine
    /// failures, a load timeout, or a failed capture. A renderer runs once;
    /// calling `run` again returns an error.
    pub async fn run(&mut self, page: &Page) -> Result<Outcome> {
        if self.state != RenderState::Idle {
            return Err(Error::Other(format!("renderer already ran (state {:?})", self.state)));
        }

        let res = self.drive(page).await;
        if res.is_err() {
            self.transition(RenderState::Failed);
        }
        res
    }

    /// Run on a fresh page of `browser`, then close the browser whatever the
    /// outcome.
    ///
    /// Commands are handled in order, so after a load timeout the close is
    /// queued behind the pending load and runs once the engine gives up on
    /// it. A close failure is only reported when the run itself succeeded.
    pub async fn run_to_completion(&mut self, browser: Browser) -> Result<Outcome> {
        let page = browser.new_page().await?;
        let res = self.run(&page).await;

        match (res, browser.close().await) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(e), close) => {
                if let Err(close_err) = close {
                    warn!("Closing browser after failed run: {}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn drive(&mut self, page: &Page) -> Result<Outcome> {
        self.configure(page).await?;

        self.transition(RenderState::Loading);
        let status = match self.config.load_timeout {
            Some(limit) => tokio::time::timeout(limit, page.open(&self.config.address))
                .await
                .map_err(|_| Error::Timeout(limit.as_millis() as u64))??,
            None => page.open(&self.config.address).await?,
        };

        if status == LoadStatus::Fail {
            warn!("Unable to load {}", self.config.address);
            self.transition(RenderState::Failed);
            return Ok(Outcome::LoadFailed);
        }

        self.transition(RenderState::Rendering);
        tokio::time::sleep(self.config.render_delay).await;
        page.render(self.config.output.clone()).await?;

        info!("Rendered {} to {}", self.config.address, self.config.output.display());
        self.transition(RenderState::Done);
        Ok(Outcome::Rendered)
    }

    async fn configure(&self, page: &Page) -> Result<()> {
        if let Some(paper) = self.config.paper_size {
            debug!("Paper size {}", paper);
            page.set_paper_size(paper).await?;
        }

        let viewport = self.config.viewport;
        debug!("Viewport {}x{}", viewport.width, viewport.height);
        page.set_viewport(viewport).await?;

        if let Some(zoom) = self.config.zoom_factor() {
            debug!("Zoom factor {}", zoom);
            page.set_zoom_factor(zoom).await?;
        }
        Ok(())
    }

    fn transition(&mut self, next: RenderState) {
        debug!("Renderer {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, EngineConfig, PaperSize, Viewport};
    use std::path::Path;
    use std::time::Duration;

    /// Engine whose load status is fixed and whose render never touches disk
    struct FixedEngine {
        status: LoadStatus,
    }

    impl Engine for FixedEngine {
        fn new(_config: EngineConfig) -> Result<Self> {
            Ok(Self { status: LoadStatus::Success })
        }
        fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
            Ok(())
        }
        fn set_zoom_factor(&mut self, _zoom: f64) -> Result<()> {
            Ok(())
        }
        fn set_paper_size(&mut self, _paper: PaperSize) -> Result<()> {
            Ok(())
        }
        fn open(&mut self, _url: &str) -> Result<LoadStatus> {
            Ok(self.status)
        }
        fn render(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
        fn close(self) -> Result<()> {
            Ok(())
        }
    }

    fn config() -> RenderConfig {
        RenderConfig::new("http://localhost/", "unused.png", None)
            .unwrap()
            .with_render_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn successful_run_ends_done() {
        let browser = Browser::spawn(|| FixedEngine::new(EngineConfig::default())).await.unwrap();
        let page = browser.new_page().await.unwrap();

        let mut renderer = PageRenderer::new(config());
        assert_eq!(renderer.state(), RenderState::Idle);
        assert_eq!(renderer.run(&page).await.unwrap(), Outcome::Rendered);
        assert_eq!(renderer.state(), RenderState::Done);

        browser.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_load_ends_failed() {
        let browser = Browser::spawn(|| Ok(FixedEngine { status: LoadStatus::Fail })).await.unwrap();
        let page = browser.new_page().await.unwrap();

        let mut renderer = PageRenderer::new(config());
        assert_eq!(renderer.run(&page).await.unwrap(), Outcome::LoadFailed);
        assert_eq!(renderer.state(), RenderState::Failed);
    }

    #[tokio::test]
    async fn renderer_runs_once() {
        let browser = Browser::spawn(|| FixedEngine::new(EngineConfig::default())).await.unwrap();
        let page = browser.new_page().await.unwrap();

        let mut renderer = PageRenderer::new(config());
        renderer.run(&page).await.unwrap();
        assert!(renderer.run(&page).await.is_err());
        assert_eq!(renderer.state(), RenderState::Done);
    }
}
