//! # Hover Console
//!
//! Operator console for a 3DOF hovercraft Pixhawk testbed.
//!
//! Connects to the vehicle autopilot over MAVLink, continuously ingests
//! attitude reports into a rolling history, renders the history on a fixed
//! period, and accepts operator commands on stdin.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration (optional TOML path as first argument)
//!    - Open the MAVLink link and wait for the heartbeat handshake,
//!      bounded by `link.handshake_timeout_s`
//!
//! 2. **Main Loop**
//!    - Ingestion worker blocks on the link on a dedicated thread
//!    - Render scheduler snapshots the history every `render.interval_ms`
//!    - Operator lines on stdin drive dispatch, logging and the render toggle
//!    - Ctrl+C (or `quit`) for graceful shutdown
//!
//! 3. **Graceful Shutdown**
//!    - Raise the ingestion stop flag before tearing down the link
//!    - Log the final session state
//!
//! # Operator Commands
//!
//! ```text
//! cmd <forward> <lateral> <vertical>   send a manual control vector
//! log <note...>                        append the newest sample to the log
//! pause | resume                       toggle rendering (ingestion continues)
//! status                               print the status line
//! quit                                 exit
//! ```
//!
//! # Errors
//!
//! Exits with an error if the configuration is invalid or the handshake
//! never completes. Runtime link loss is surfaced on the status line and
//! halts ingestion, but the console stays up so the operator sees it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use hover_console::command::CommandDispatcher;
use hover_console::config::Config;
use hover_console::error::HoverConsoleError;
use hover_console::link::{LinkTransport, MavlinkLink};
use hover_console::render::{RenderScheduler, TracePlotter};
use hover_console::samplelog::SampleLogger;
use hover_console::session::Session;
use hover_console::telemetry::{IngestionWorker, SharedHistory};

/// Default configuration path when no argument is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// One parsed operator input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleInput {
    Command {
        forward: String,
        lateral: String,
        vertical: String,
    },
    Log(String),
    Pause,
    Resume,
    Status,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_line(line: &str) -> ConsoleInput {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => ConsoleInput::Empty,
        Some("cmd") => {
            let forward = parts.next().unwrap_or_default().to_string();
            let lateral = parts.next().unwrap_or_default().to_string();
            let vertical = parts.next().unwrap_or_default().to_string();
            ConsoleInput::Command {
                forward,
                lateral,
                vertical,
            }
        }
        Some("log") => ConsoleInput::Log(parts.collect::<Vec<_>>().join(" ")),
        Some("pause") => ConsoleInput::Pause,
        Some("resume") => ConsoleInput::Resume,
        Some("status") => ConsoleInput::Status,
        Some("quit") | Some("exit") => ConsoleInput::Quit,
        Some(other) => ConsoleInput::Unknown(other.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Hover Console v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)?;

    let session = Arc::new(Session::new());

    // Handshake: nothing else starts until the vehicle answers, and the
    // wait is bounded so a dead link fails the process instead of hanging.
    let endpoint = config.link.endpoint.clone();
    info!("connecting to vehicle at {}", endpoint);
    let link = tokio::time::timeout(
        Duration::from_secs(config.link.handshake_timeout_s),
        tokio::task::spawn_blocking(move || MavlinkLink::connect(&endpoint)),
    )
    .await
    .map_err(|_| {
        HoverConsoleError::Connection(format!(
            "no heartbeat within {}s",
            config.link.handshake_timeout_s
        ))
    })?
    .context("handshake task failed")??;
    let link: Arc<dyn LinkTransport> = Arc::new(link);

    session.mark_ready();
    session.set_status("Connected - enter motor values to send");
    info!("vehicle connected at {}", link.endpoint());

    let history = SharedHistory::with_capacity(config.history.capacity);
    let stop = Arc::new(AtomicBool::new(false));

    // Ingestion runs on a dedicated thread; it may wait on the link
    // indefinitely without stalling this control context.
    let worker = IngestionWorker::new(
        link.clone(),
        history.clone(),
        session.clone(),
        stop.clone(),
    );
    let ingestion = std::thread::Builder::new()
        .name("ingestion".to_string())
        .spawn(move || worker.run())
        .context("failed to spawn ingestion worker")?;

    let dispatcher = CommandDispatcher::new(link.clone(), session.clone());
    let logger = SampleLogger::new(&config.log.path);
    let mut renderer =
        RenderScheduler::new(history.clone(), session.clone(), Box::new(TracePlotter));

    session.mark_running();
    if !config.render.start_active {
        session.toggle_render();
    }

    let mut render_interval = interval(Duration::from_millis(config.render.interval_ms));
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut link_loss_reported = false;

    info!(
        "console ready: rendering every {}ms, logging to {}",
        config.render.interval_ms, config.log.path
    );
    info!("commands: cmd F L V | log NOTE | pause | resume | status | quit");

    loop {
        tokio::select! {
            _ = render_interval.tick() => {
                renderer.tick();

                if session.is_disconnected() && !link_loss_reported {
                    warn!("telemetry link lost; dispatch disabled, console stays up");
                    link_loss_reported = true;
                }
            }

            line = stdin_lines.next_line() => {
                let Some(line) = line.context("failed to read operator input")? else {
                    info!("stdin closed, shutting down...");
                    break;
                };

                match parse_line(&line) {
                    ConsoleInput::Command { forward, lateral, vertical } => {
                        // Errors are already reflected on the status line
                        let _ = dispatcher.send_raw(&forward, &lateral, &vertical);
                        println!("{}", session.status());
                    }
                    ConsoleInput::Log(note) => {
                        match logger.log_latest(&history, &note) {
                            Ok(()) => session.set_status("Logged successfully"),
                            Err(e) => {
                                warn!("sample log failed: {e}");
                                session.set_status(format!("Log failed: {e}"));
                            }
                        }
                        println!("{}", session.status());
                    }
                    ConsoleInput::Pause => {
                        if session.render_active() {
                            session.toggle_render();
                        }
                        info!("rendering paused (ingestion continues)");
                    }
                    ConsoleInput::Resume => {
                        if !session.render_active() {
                            session.toggle_render();
                        }
                        info!("rendering resumed");
                    }
                    ConsoleInput::Status => {
                        println!("[{:?}] {}", session.state(), session.status());
                    }
                    ConsoleInput::Quit => {
                        info!("operator quit, shutting down...");
                        break;
                    }
                    ConsoleInput::Empty => {}
                    ConsoleInput::Unknown(word) => {
                        println!("unknown command {word:?} (cmd/log/pause/resume/status/quit)");
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    // Signal the worker before the link is torn down. A receive already in
    // flight cannot be interrupted; it is abandoned with the process.
    stop.store(true, Ordering::Relaxed);
    if ingestion.is_finished() {
        let _ = ingestion.join();
    } else {
        info!("ingestion worker still blocked on receive, detaching");
    }

    info!(
        "shutdown complete, final session state: {:?}",
        session.state()
    );
    Ok(())
}
