//! # Server
//!
//! JSON API in front of the spot book's record and object stores.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/spots?area=&line=&conditions=` | approved spots, filtered |
//! | GET | `/spots/{id}` | one approved spot |
//! | GET | `/filters` | areas, lines and conditions to offer |
//! | POST | `/admin/spots` | multipart create, image included |
//!
//! Conditions are comma separated slugs (`near-station,multi-line`) or their
//! Japanese labels. An unknown condition is a 400, never an empty result.
//!
//! Liked / visited / stamped state belongs to the visitor and has no endpoint.
//!
//!
//!
//! # Setup
//!
//! Secrets are read from `/run/secrets/<NAME>` and fall back to the environment.
//! ```sh
//! export SUPABASE_URL=https://<project>.supabase.co
//! export SUPABASE_ANON_KEY=...
//! export SUPABASE_SERVICE_ROLE_KEY=...
//! RUST_LOG=info cargo run -p server
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use routes::{create_spot_handler, filters_handler, spot_handler, spots_handler};
use state::State;

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/spots", get(spots_handler))
        .route("/spots/{id}", get(spot_handler))
        .route("/filters", get(filters_handler))
        .route("/admin/spots", post(create_spot_handler))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config);

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
