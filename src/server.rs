use axum::{Extension, Router, routing::get};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;

use crate::api::{self, CallbackContext};

/// Builds the callback router. `/callback` is the only route.
pub fn router(context: Arc<CallbackContext>) -> Router {
    Router::new().route("/callback", get(api::callback).layer(Extension(context)))
}

/// Serves the callback router on `listener` until `shutdown` resolves.
///
/// Shutdown is graceful: requests already being handled still get their
/// response written before the future returns.
///
/// # Arguments
///
/// * `listener` - Bound socket, so callers can choose the port (tests use 0)
/// * `context` - Shared state handed to the callback handler
/// * `shutdown` - Resolves once the login outcome has been taken
pub async fn start_api_server<F>(
    listener: TcpListener,
    context: Arc<CallbackContext>,
    shutdown: F,
) where
    F: Future<Output = ()> + Send + 'static,
{
    if let Err(e) = axum::serve(listener, router(context))
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!("Callback server stopped: {}", e);
    }
}
