use axum::routing::get;
use axum::Router;
use clap::{Parser, ValueHint};
use log::LevelFilter;
use std::num::NonZeroU16;
use std::path::PathBuf;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::process::Executor;
use crate::routes::AppState;
use crate::store::Store;

mod error;
mod process;
mod routes;
mod store;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .filter(Some("tower_http"), LevelFilter::Debug)
        .filter(Some("command_runner_server"), LevelFilter::Debug)
        .parse_default_env()
        .init();

    let CliArgs {
        host,
        port,
        database_url,
        shell,
    } = CliArgs::parse();

    log::info!(
        version = env!("CARGO_PKG_VERSION"),
        api_version = command_runner_api::api::VERSION;
        "Initializing server"
    );

    // Startup without a working database is fatal.
    let store = match Store::connect(&database_url).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("cannot open database: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = store.initialize().await {
        log::error!("cannot create commands table: {e}");
        std::process::exit(1);
    }

    log::info!(shell:debug; "commands will be run with this shell");
    let state = AppState {
        store,
        executor: Executor::new(shell),
    };

    let router = Router::new()
        .merge(routes::routes(state))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!(
        addr:display = host,
        port = port.get();
        "listening to TCP"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[derive(Parser)]
struct CliArgs {
    /// The host address for the command runner server.
    #[arg(
        long,
        value_name = "URI",
        value_hint = ValueHint::Hostname,
        default_value = "0.0.0.0",
        env = "HOST",
    )]
    host: String,
    /// The host port for the command runner server.
    #[arg(
        short,
        long,
        value_name = "PORT",
        value_hint = ValueHint::Other,
        default_value = "8080",
        env = "PORT",
    )]
    port: NonZeroU16,
    /// Where the commands table lives, e.g. `sqlite://commands.db?mode=rwc`.
    #[arg(
        long,
        value_name = "URL",
        value_hint = ValueHint::Url,
        default_value = "sqlite://commands.db?mode=rwc",
        env = "DATABASE_URL",
    )]
    database_url: String,
    /// Shell used to run stored commands as `<shell> -c <content>`.
    #[arg(
        long,
        value_name = "PATH",
        value_hint = ValueHint::CommandName,
        default_value = "bash",
        env = "COMMAND_RUNNER_SHELL",
    )]
    shell: PathBuf,
}

/// Resolves once SIGINT or SIGTERM arrives, axum then drains open requests.
///
/// A signal that can't be listened for never resolves instead of stopping the server.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            log::warn!("cannot listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    log::info!(signal = received; "shutting down");
}
