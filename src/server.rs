//! Webhook HTTP server: event intake and landing page.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::Html,
    routing::get,
};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::{base::types::{InboundEvent, Void}, interaction, runtime::Runtime};

/// Static landing page served to browsers.
const HOME_PAGE: &str = include_str!("../templates/home.html");

/// Build the router for the webhook endpoints.
pub fn router(runtime: Runtime) -> Router {
    Router::new().route("/", get(home).post(receive_event)).with_state(runtime)
}

/// Bind and serve until ctrl-c.
pub async fn serve(runtime: Runtime) -> Void {
    let addr = format!("0.0.0.0:{}", runtime.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening for chat events on {}", addr);

    axum::serve(listener, router(runtime)).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down ...");
}

/// Landing page for GET requests to this endpoint.
async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

/// Webhook intake for chat platform events.
///
/// The platform's delivery contract requires only an acknowledgment; the
/// actual reply is posted back through the REST API from a spawned task. The
/// response is therefore always `200` with an empty JSON object, including
/// for bodies that fail to parse (a non-2xx would only trigger redelivery of
/// an event that will never parse).
#[instrument(skip_all)]
async fn receive_event(State(runtime): State<Runtime>, body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<InboundEvent>(&body) {
        Ok(event) => interaction::chat_event::handle_chat_event(event, runtime.chat.clone(), runtime.relay.clone(), runtime.config.clone()),
        Err(err) => warn!("Ignoring malformed event: {}", err),
    }

    Json(json!({}))
}
