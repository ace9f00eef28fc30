// AfriLearn - multilingual AI tutor and mentorship intake
//
// Serves a JSON API for a tutoring chat (English, French, Swahili) plus two
// request forms whose submissions are kept in CSV files.
//
// Architecture:
// - Server (axum): HTTP routes, one handler per interaction
// - App: dispatcher applying commands to per-session state
// - Sessions: in-memory registry, idle sessions swept on a timer
// - Tutor: chat turns against a hosted model or a local offline model,
//   plus text-to-speech for the latest reply
// - Store: append/load/update over the two CSV files
// - Admin: shared-secret gate over the request dashboards

mod admin;
mod app;
mod cli;
mod config;
mod forms;
mod logging;
mod server;
mod session;
mod startup;
mod store;
mod tutor;

use anyhow::Result;
use app::App;
use config::Config;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI subcommands (config --show, etc.) before anything else
    if cli::handle_cli()? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n  CONFIG ERROR: {:#}\n", e);
            if let Some(path) = Config::config_path() {
                eprintln!("  To reset, run `afrilearn config --reset` or delete {}\n", path.display());
            }
            std::process::exit(1);
        }
    };

    // Keep the guard alive so file logs flush on exit
    let _log_guard = logging::init(&config.logging);

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::warn!(
            "Could not create data directory {}: {}",
            config.data_dir.display(),
            e
        );
    }

    let app = Arc::new(App::from_config(&config));

    startup::print_startup(&config, &app);
    startup::log_startup(&config, &app);

    // Idle session expiry, off when the timeout is 0
    let sweeper = config
        .sessions
        .idle_timeout()
        .map(|_| server::spawn_session_sweeper(app.clone(), config.sessions.sweep_interval()));

    // Shutdown signal for the server
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let mut server_handle = {
        let app = app.clone();
        let bind_addr = config.bind_addr;
        tokio::spawn(async move { server::start_server(bind_addr, app, shutdown_rx).await })
    };

    let server_exited = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            false
        }
        // Server stopped on its own (bind failure etc.)
        result = &mut server_handle => {
            result??;
            true
        }
    };

    if !server_exited {
        tracing::info!("Shutting down...");
        // Receiver is gone if the server already stopped
        let _ = shutdown_tx.send(());
        server_handle.await??;
    }

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
