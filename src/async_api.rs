use crate::{Engine, Error, LoadStatus, PaperSize, Result, Viewport};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    SetViewport(Viewport, oneshot::Sender<Result<()>>),
    SetZoom(f64, oneshot::Sender<Result<()>>),
    SetPaperSize(PaperSize, oneshot::Sender<Result<()>>),
    Open(String, oneshot::Sender<Result<LoadStatus>>),
    Render(PathBuf, oneshot::Sender<Result<()>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly browser abstraction backed by a dedicated worker thread.
///
/// The worker thread owns a synchronous [`Engine`] instance and executes
/// commands sent from async tasks so callers can use an async interface
/// without requiring the engine to be `Send` across threads.
#[derive(Clone)]
pub struct Browser {
    cmd_tx: Sender<Command>,
}

/// A handle representing the page owned by the browser's engine.
#[derive(Clone)]
pub struct Page {
    cmd_tx: Sender<Command>,
}

impl Browser {
    /// Launch headless Chrome on a background thread.
    #[cfg(feature = "cdp")]
    pub async fn new(config: crate::EngineConfig) -> Result<Self> {
        Self::spawn(move || crate::cdp::CdpEngine::new(config)).await
    }

    /// Run the engine built by `factory` on a background thread.
    pub async fn spawn<E, F>(factory: F) -> Result<Self>
    where
        E: Engine + 'static,
        F: FnOnce() -> Result<E> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Initialize engine on the worker thread
            let mut engine = match factory() {
                Ok(e) => e,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::SetViewport(viewport, resp) => {
                        let _ = resp.send(engine.set_viewport(viewport));
                    }
                    Command::SetZoom(zoom, resp) => {
                        let _ = resp.send(engine.set_zoom_factor(zoom));
                    }
                    Command::SetPaperSize(paper, resp) => {
                        let _ = resp.send(engine.set_paper_size(paper));
                    }
                    Command::Open(url, resp) => {
                        let _ = resp.send(engine.open(&url));
                    }
                    Command::Render(path, resp) => {
                        let _ = resp.send(engine.render(&path));
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(engine.close());
                        break;
                    }
                }
            }
        });

        // Wait for the worker to report initialization success or failure
        let init_res = init_rx
            .await
            .map_err(|e| Error::InitializationError(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Open a page handle backed by the same worker thread.
    pub async fn new_page(&self) -> Result<Page> {
        Ok(Page {
            cmd_tx: self.cmd_tx.clone(),
        })
    }

    /// Shutdown the background worker and close the browser.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        send(&self.cmd_tx, Command::Close(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}

impl Page {
    /// Set the layout viewport
    pub async fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        send(&self.cmd_tx, Command::SetViewport(viewport, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("SetViewport canceled: {}", e)))?
    }

    /// Set the zoom factor
    pub async fn set_zoom_factor(&self, zoom: f64) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        send(&self.cmd_tx, Command::SetZoom(zoom, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("SetZoom canceled: {}", e)))?
    }

    /// Set the paper size used for PDF output
    pub async fn set_paper_size(&self, paper: PaperSize) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        send(&self.cmd_tx, Command::SetPaperSize(paper, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("SetPaperSize canceled: {}", e)))?
    }

    /// Navigate to a URL and report the load status
    pub async fn open(&self, url: &str) -> Result<LoadStatus> {
        let (tx, rx) = oneshot::channel();
        send(&self.cmd_tx, Command::Open(url.to_string(), tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Open canceled: {}", e)))?
    }

    /// Render the page to `path`
    pub async fn render(&self, path: impl Into<PathBuf>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        send(&self.cmd_tx, Command::Render(path.into(), tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Render canceled: {}", e)))?
    }
}

fn send(tx: &Sender<Command>, cmd: Command) -> Result<()> {
    tx.send(cmd)
        .map_err(|_| Error::Other("Browser worker has shut down".into()))
}
