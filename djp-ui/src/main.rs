//! djp-ui - Planning web interface
//!
//! Serves the JSON API for performers and the coordinator over the shared
//! planning database. Login/session handling sits in front of this
//! service; handlers take the acting performer explicitly.

use anyhow::Result;
use clap::Parser;
use djp_common::config::{self, AdminBootstrap};
use djp_common::db::{ensure_default_admin, init_database, settings};
use djp_common::notify::{spawn_dispatcher, TracingNotifier};
use djp_ui::{build_router, AppState};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "djp-ui", about = "Venue planning web interface")]
struct Args {
    /// Data root folder (overrides DJP_ROOT and the config file)
    #[arg(long)]
    root: Option<String>,

    /// Listen port (overrides the http_port setting)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting planning web interface (djp-ui) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root.as_deref());
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    ensure_default_admin(&pool, &AdminBootstrap::from_env()).await?;

    let port = match args.port {
        Some(p) => p,
        None => settings::get_setting(&pool, "http_port")
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(5780),
    };

    // Delivery transport lives outside this service; log-only here
    let (notify_tx, _dispatcher) = spawn_dispatcher(Arc::new(TracingNotifier));

    let state = AppState::new(pool, notify_tx);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("djp-ui listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
