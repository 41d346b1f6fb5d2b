use anyhow::Result;
use std::time::Duration;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::{info, warn};

use super::song_routes::make_song_routes;
use super::state::ServerState;
use super::{handle_panic, instrument_request, log_requests};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

pub fn make_app(state: ServerState) -> Router {
    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .nest("/api", make_song_routes(state.clone()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(state, log_requests))
        .layer(middleware::from_fn(instrument_request))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve `app` until `shutdown` is cancelled, then give in-flight requests
/// up to `grace` to finish.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<()> {
    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown.clone().cancelled_owned());
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = shutdown.cancelled() => {}
    }

    info!("Shutting down, waiting up to {:?} for in-flight requests", grace);
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => Ok(result??),
        Err(_) => {
            warn!("Grace period elapsed, dropping remaining connections");
            server.abort();
            Ok(())
        }
    }
}

pub async fn run_server(state: ServerState, shutdown: CancellationToken) -> Result<()> {
    let address = format!("{}:{}", state.config.host, state.config.port);
    let grace = state.config.shutdown_grace;
    let app = make_app(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, app, shutdown, grace).await
}
