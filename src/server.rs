//! Minimal HTTP API.
//!
//! A single `GET /` endpoint returning a fixed JSON greeting. No state, no
//! persistence, no authentication.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::info;

/// Payload returned by the root endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Greeting {
    pub message: String,
}

async fn read_root() -> Json<Greeting> {
    Json(Greeting {
        message: "Welcome to the Margin Calc API".to_string(),
    })
}

/// Build the application router.
pub fn app() -> Router {
    Router::new().route("/", get(read_root))
}

/// Serve the API on `addr` until interrupted.
///
/// # Errors
/// Returns an error if binding the listener or serving fails.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn root_returns_the_greeting() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Welcome to the Margin Calc API");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
