//! # Saladly Backend
//!
//! Order intake service for the Saladly meal subscription site.
//!
//! # General Infrastructure
//! - Landing, trial, subscribe and checkout pages are served elsewhere and
//!   call `POST /api/submit-order` on this server
//! - The call is fire-and-forget with `keepalive`, the browser navigates to
//!   checkout without waiting for us
//! - A Google Sheet is the system of record, one row per order
//! - Every new order and every lead that converts to Paid is announced by
//!   email to the kitchen inbox
//!
//! # Flow
//! - Subscribe/trial pages submit an **Abandoned Cart** order before the
//!   customer reaches the payment gateway
//! - After the gateway confirms, a second call with the assigned order id
//!   flips the row to **Paid**
//! - Because nobody waits on this endpoint, store and email failures are
//!   logged and swallowed, the response stays a success
//!
//! # Notes
//!
//! ## Id Allocation
//! The sheet exposes no atomic counter, so the next id is found by scanning
//! every row for the highest `S-<n>` suffix and adding one. Two simultaneous
//! creates can read the same maximum and allocate the same id. Known race,
//! accepted at current order volume; see DESIGN.md.
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod notify;
pub mod orders;
pub mod routes;
pub mod sheets;
pub mod state;

use routes::submit_order_handler;
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/api/submit-order", post(submit_order_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
