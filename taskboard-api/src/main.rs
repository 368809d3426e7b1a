//! # Taskboard API Server
//!
//! HTTP server for the collaborative task board: boards, columns, tasks,
//! memberships, and a live per-board event stream.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! ```

use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::db::migrations::run_migrations;
use taskboard_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use taskboard_shared::db::TxCoordinator;
use taskboard_shared::events::EventFanout;
use taskboard_shared::ops::BoardOps;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=info,taskboard_shared=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let fanout = EventFanout::new();
    let ops = BoardOps::new(TxCoordinator::new(pool.clone()), fanout.clone());

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config, ops);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(fanout))
        .await?;

    tracing::info!("Shutting down");
    close_pool(pool).await;

    Ok(())
}

/// Resolves once a shutdown signal arrives.
///
/// Closes the event fanout before resolving: open NDJSON streams only end
/// when their channels close, so the fanout must shut down before the server
/// starts waiting for in-flight connections to drain.
async fn shutdown_signal(fanout: std::sync::Arc<EventFanout>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|e| tracing::error!(error = %e, "Failed to listen for ctrl-c"));
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    fanout.shutdown();
}
