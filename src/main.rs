use std::process::ExitCode;

use graphrender::cli::{self, Invocation, LOAD_FAILED_MESSAGE, USAGE};
use graphrender::{Browser, Outcome, PageRenderer, Result};
use log::debug;

#[tokio::main]
async fn main() -> ExitCode {
    // Standard output is reserved for the usage and load-failure messages
    env_logger::Builder::from_default_env()
        .filter_module("headless_chrome", log::LevelFilter::Warn)
        .init();

    let cli = match cli::parse_args(std::env::args_os()) {
        Invocation::Render(cli) => cli,
        Invocation::Info(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Invocation::Usage(e) => {
            debug!("{}", e);
            println!("{}", USAGE);
            return ExitCode::from(1);
        }
    };

    let render = match cli.render_config() {
        Ok(render) => render,
        Err(e) => {
            debug!("{}", e);
            println!("{}", USAGE);
            return ExitCode::from(1);
        }
    };
    let engine = cli.engine_config(&render);

    match run(engine, PageRenderer::new(render)).await {
        Ok(Outcome::Rendered) => ExitCode::SUCCESS,
        // Load failures keep the success exit status callers already rely on
        Ok(Outcome::LoadFailed) => {
            println!("{}", LOAD_FAILED_MESSAGE);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("graphrender: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(engine: graphrender::EngineConfig, mut renderer: PageRenderer) -> Result<Outcome> {
    // The browser process is only reaped when the engine is closed
    let browser = Browser::new(engine).await?;
    renderer.run_to_completion(browser).await
}
