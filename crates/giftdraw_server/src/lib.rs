//! HTTP backend for the GiftDraw gift-exchange organizer.
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/participants` | |
//! | POST | `/participants` | `{name}` |
//! | GET | `/participants/{id}` | |
//! | POST | `/participants/{id}/items` | `{text}` |
//! | DELETE | `/participants/{id}/items/{itemId}` | |
//! | PUT | `/purchase/{recipientId}/{itemId}` | `{buyerId, action}` |
//! | POST | `/draw` | |
//! | POST | `/reset` | |
//! | GET | `/health` | |
//!
//! Errors are JSON `{"error": "..."}` with `400` for bad input or too few
//! participants and `404` for unknown ids.
//!
//! # Configuration
//!
//! See [`config`] for the `GIFTDRAW_*` environment variables.
use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post, put},
    Router,
};

use log::info;
use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use routes::{
    add_wish_handler, create_participant_handler, draw_handler, get_participant_handler,
    health_handler, list_participants_handler, purchase_handler, remove_wish_handler,
    reset_handler,
};
use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/participants",
            get(list_participants_handler).post(create_participant_handler),
        )
        .route("/participants/{id}", get(get_participant_handler))
        .route("/participants/{id}/items", post(add_wish_handler))
        .route(
            "/participants/{id}/items/{item_id}",
            delete(remove_wish_handler),
        )
        .route("/purchase/{recipient_id}/{item_id}", put(purchase_handler))
        .route("/draw", post(draw_handler))
        .route("/reset", post(reset_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("event=server_bind module=server status=start address={address}");

    let listener = TcpListener::bind(&address).await?;
    info!("event=server_bind module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("event=shutdown module=server status=ok signal=ctrl_c"),
            Err(err) => {
                log::error!("event=shutdown module=server status=error signal=ctrl_c error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=server status=ok signal=terminate");
            }
            Err(err) => {
                log::error!(
                    "event=shutdown module=server status=error signal=terminate error={err}"
                );
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
}
