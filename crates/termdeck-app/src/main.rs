use std::path::Path;
use std::sync::Arc;

use termdeck_app::cli;
use termdeck_app::driver::{self, Command};
use termdeck_app::{default_clipboard, TermdeckApp};
use termdeck_common::Rect;
use termdeck_config::schema::TermdeckConfig;
use termdeck_session::{NewSession, PtyHost, PtyRequest};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Pixel size of the headless viewport panes are laid out in.
const VIEWPORT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1280.0,
    height: 800.0,
};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let loaded = match &args.config {
        Some(path) => termdeck_config::load_config_from(Path::new(path)),
        None => termdeck_config::load_config(),
    };
    let (mut config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (TermdeckConfig::default(), Some(e)),
    };

    let directive = cli::log_directive(
        args.log_level.as_deref(),
        config.logging.level.as_filter(),
    );
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    tracing::info!("termdeck v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    if let Some(dir) = &args.directory {
        config.shell.working_directory = Some(dir.clone());
    }
    if let Some(shell) = &args.shell {
        config.shell.program = shell.clone();
    }

    let host = Arc::new(PtyHost::new(config.shell.clone()));
    let mut app = TermdeckApp::new(config, host.clone(), VIEWPORT, default_clipboard());

    for _ in 0..args.sessions.clamp(1, app.max_sessions()) {
        if let Err(e) = app.new_terminal(NewSession::default()) {
            tracing::error!("Failed to open terminal: {e}");
            break;
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("stdin read failed: {e}");
                break;
            }
        };

        match Command::parse(&line) {
            Command::Raw(body) => match PtyRequest::parse(&body) {
                Ok(request) => {
                    if let Some(reply) = termdeck_session::dispatch(host.as_ref(), request).await {
                        println!("{}", reply.to_json());
                    }
                }
                Err(e) => eprintln!("{e}"),
            },
            command => match driver::execute(&mut app, command) {
                Ok(Some(output)) => println!("{output}"),
                Ok(None) => {}
                Err(e) => eprintln!("{e}"),
            },
        }

        // Let routed output land before the next paint.
        tokio::task::yield_now().await;
        app.paint();
        if app.quit_requested() {
            break;
        }
    }

    app.shutdown();
    host.kill_all();
    tracing::info!("Shutdown complete");
}
