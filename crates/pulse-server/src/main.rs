//! Pulse — community intelligence server for group chat streams.

use std::path::PathBuf;
use std::sync::Arc;

use pulse_core::{Clock, PulseConfig, SystemClock};
use pulse_ingest::StaticAliases;
use pulse_runtime::{Engine, FlushGuard, PersistenceWorker};
use pulse_store::JsonFileStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("PULSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn open_engine(config: &PulseConfig, clock: &dyn Clock) -> Engine {
    let store = Arc::new(JsonFileStore::new(&config.data_paths.snapshot_file));
    let aliases = Arc::new(StaticAliases::load(&config.data_paths.aliases_file));
    Engine::open(config.engine.clone(), store, aliases, clock.now_ms())
}

/// Flush the engine before the default panic output, so a crash still
/// leaves the latest snapshot on disk.
fn install_panic_flush(engine: Arc<Engine>, clock: Arc<dyn Clock>) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        engine.flush(clock.now_ms());
        default_hook(panic_info);
    }));
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "--report" | "report" => {
                let config = PulseConfig::from_env(resolve_data_dir())?;
                let clock = SystemClock;
                let engine = open_engine(&config, &clock);
                let report = engine.build_report(args.get(2).map(String::as_str), clock.now_ms());
                println!("{}", serde_json::to_string_pretty(report.as_ref())?);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("Pulse — community intelligence server");
                println!();
                println!("Usage: pulse [command]");
                println!();
                println!("Commands:");
                println!("  (none)                   Start the server");
                println!("  report [group-id]        Print a report from the saved snapshot");
                println!("  help                     Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'pulse help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let data_dir = resolve_data_dir();

    info!("Data directory: {}", data_dir.display());

    let config = PulseConfig::from_env(&data_dir)?;
    let port = config.port;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let engine = Arc::new(open_engine(&config, clock.as_ref()));

    install_panic_flush(engine.clone(), clock.clone());
    let flush_guard = FlushGuard::new(engine.clone(), clock.clone());

    // Periodic and debounced snapshot saves
    let worker = PersistenceWorker::spawn(engine.clone(), clock.clone());

    let state = Arc::new(AppState::new(config, engine, clock));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Pulse server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker.shutdown().await;
    drop(flush_guard);
    info!("Shutdown complete");

    Ok(())
}
