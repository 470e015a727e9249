use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pillbox::api::{create_router, AppState};
use pillbox::config::Config;
use pillbox::db::{Database, LibSqlBackend, PillCatalog};
use pillbox::vision::{TextDetector, VisionProvider};

#[derive(Parser)]
#[command(name = "pillbox")]
#[command(about = "Pill catalog search service with photo-based imprint identification")]
struct Args {
    /// Bind address (overrides PILLBOX_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides PILLBOX_PORT)
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pillbox=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn PillCatalog> = Arc::new(LibSqlBackend::new(raw_db.clone()));

    tracing::info!("Initializing vision provider: {}...", config.vision.model);
    let vision = VisionProvider::new(&config.vision);
    if !vision.is_available() {
        tracing::warn!("Vision unavailable - image search will return 501");
    }
    let vision: Arc<dyn TextDetector> = Arc::new(vision);

    let state = AppState::new(config.clone(), db, vision);
    let app = create_router(state);

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let replica_sync = raw_db.is_replica().then(|| {
        tracing::info!(
            "Starting replica sync... (interval={}s)",
            config.database.sync_interval_secs
        );
        raw_db.spawn_sync_loop(
            Duration::from_secs(config.database.sync_interval_secs),
            cancel_token.child_token(),
        )
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Pillbox starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);
    tracing::info!("  API docs:     http://{}/api/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.clone().cancelled_owned())
        .await?;

    cancel_token.cancel();
    if let Some(handle) = replica_sync {
        if let Err(e) = handle.await {
            tracing::error!("Replica sync task failed: {}", e);
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, draining connections...");
    cancel_token.cancel();
}
